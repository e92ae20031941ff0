//! Local addon inventory.
//!
//! For every category section the scanner resolves the category folder, lists its
//! immediate subdirectories in the order the filesystem returns them, and parses
//! each one with the active [`GameDescriptor`]. Failures are collected per
//! category and per addon in the [`ScanReport`]; they never stop the scan.

use crate::models::{CategorySection, InstalledAddon};
use crate::services::descriptor::GameDescriptor;
use crate::services::manifest::ManifestError;
use crate::services::paths::{PathError, PathPlaceholders};
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashSet;
use thiserror::Error;

/// A category or addon the scanner had to leave out
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Category {category}: {source}")]
    CategoryPath {
        category: String,
        #[source]
        source: PathError,
    },

    #[error("Category {category}: cannot list {path}: {source}")]
    CategoryUnreadable {
        category: String,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Addon {folder}: {source}")]
    Addon {
        folder: String,
        #[source]
        source: ManifestError,
    },
}

/// Outcome of one inventory scan
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Parsed addons in enumeration order, without remote info
    pub addons: Vec<InstalledAddon>,
    pub failures: Vec<ScanError>,
    /// Manifest lines skipped across all parsed addons
    pub malformed_lines: usize,
}

pub struct AddonScanner<'a> {
    descriptor: &'a GameDescriptor,
    placeholders: &'a PathPlaceholders,
}

impl<'a> AddonScanner<'a> {
    pub fn new(descriptor: &'a GameDescriptor, placeholders: &'a PathPlaceholders) -> Self {
        Self {
            descriptor,
            placeholders,
        }
    }

    /// Scan all category folders of an installation.
    pub fn scan(&self, install_root: &Utf8Path, categories: &[CategorySection]) -> ScanReport {
        let mut report = ScanReport::default();
        let mut scanned_paths: HashSet<Utf8PathBuf> = HashSet::new();

        for category in categories {
            let category_path = match self
                .placeholders
                .resolve(install_root, &category.relative_path)
            {
                Ok(path) => path,
                Err(source) => {
                    tracing::warn!("Skipping category {}: {}", category.name, source);
                    report.failures.push(ScanError::CategoryPath {
                        category: category.name.clone(),
                        source,
                    });
                    continue;
                }
            };

            // Two sections sharing a folder would list the same addons twice
            if !scanned_paths.insert(category_path.clone()) {
                tracing::debug!(
                    "Category {} shares {} with an earlier section",
                    category.name,
                    category_path
                );
                continue;
            }

            self.scan_category(&category.name, &category_path, &mut report);
        }

        tracing::info!(
            "Scanned {} addons for {} ({} failures, {} malformed manifest lines)",
            report.addons.len(),
            self.descriptor.slug,
            report.failures.len(),
            report.malformed_lines
        );

        report
    }

    fn scan_category(&self, name: &str, path: &Utf8Path, report: &mut ScanReport) {
        if !path.is_dir() {
            tracing::debug!("Category {} folder {} does not exist", name, path);
            return;
        }

        let entries = match path.read_dir_utf8() {
            Ok(entries) => entries,
            Err(source) => {
                report.failures.push(ScanError::CategoryUnreadable {
                    category: name.to_string(),
                    path: path.to_path_buf(),
                    source,
                });
                return;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(source) => {
                    report.failures.push(ScanError::CategoryUnreadable {
                        category: name.to_string(),
                        path: path.to_path_buf(),
                        source,
                    });
                    continue;
                }
            };

            let addon_path = entry.path();
            if !addon_path.is_dir() {
                continue;
            }

            match self.descriptor.parse_local_manifest(addon_path) {
                Ok(parsed) => {
                    tracing::debug!(
                        "Found addon {} (catalog id {:?})",
                        parsed.info.folder_name,
                        parsed.info.catalog_id
                    );
                    report.malformed_lines += parsed.malformed.len();
                    report.addons.push(InstalledAddon::local(parsed.info));
                }
                Err(source) => {
                    tracing::warn!("Skipping addon folder {}: {}", addon_path, source);
                    report.failures.push(ScanError::Addon {
                        folder: entry.file_name().to_string(),
                        source,
                    });
                }
            }
        }
    }
}
