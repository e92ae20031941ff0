//! Installation discovery from catalog location hints.
//!
//! Every hint yields at most one candidate directory:
//! - [`HintKind::Registry`] reads a value from the machine-wide configuration store,
//!   retrying under the alternate 32/64-bit view when the key is missing
//! - [`HintKind::DirectoryGlob`] probes a literal directory
//!
//! Candidates whose last component does not match the expected folder suffix are
//! dropped, the rest are deduplicated, and exactly one must remain. The resolver
//! never picks between several candidates.
//!
//! # Examples
//!
//! ```ignore
//! use cfaddons::services::location::{LocationResolver, SystemConfigStore};
//!
//! let store = SystemConfigStore;
//! let resolver = LocationResolver::new(&store, &placeholders);
//! let root = resolver.resolve(&game_info.location_hints, Some("_retail_"))?;
//! ```

use crate::models::{HintKind, LocationHint};
use crate::services::paths::{PathPlaceholders, final_component, trim_trailing_separators};
use camino::Utf8PathBuf;
use indexmap::IndexSet;
use thiserror::Error;

/// Registry prefix stripped from hint paths; lookups always target the machine hive.
const MACHINE_HIVE_PREFIX: &str = "HKEY_LOCAL_MACHINE";

/// Errors that end automatic discovery
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("Unsupported location hint type {kind} for {path}")]
    UnsupportedHint { kind: u32, path: String },

    #[error("No installation found")]
    NoInstallationFound,

    #[error("Found {} installations: {}", candidates.len(), format_candidates(candidates))]
    AmbiguousInstallation { candidates: Vec<Utf8PathBuf> },
}

fn format_candidates(candidates: &[Utf8PathBuf]) -> String {
    candidates
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Which architecture view of the configuration store to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryView {
    /// The view matching this process's bitness
    Native,
    /// The other 32/64-bit view
    Alternate,
}

/// Outcome of a single configuration store lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryLookup {
    KeyMissing,
    ValueMissing,
    Found(String),
}

/// Machine-wide key/value configuration store (the Windows registry, or a test double).
pub trait ConfigStore {
    fn lookup(&self, key: &str, value: &str, view: RegistryView) -> RegistryLookup;
}

/// The real configuration store of this machine.
///
/// Outside Windows there is no registry and every key is missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemConfigStore;

#[cfg(target_os = "windows")]
impl ConfigStore for SystemConfigStore {
    fn lookup(&self, key: &str, value: &str, view: RegistryView) -> RegistryLookup {
        use winreg::RegKey;
        use winreg::enums::*;

        let view_flag = match view {
            RegistryView::Native => 0,
            RegistryView::Alternate if cfg!(target_pointer_width = "64") => KEY_WOW64_32KEY,
            RegistryView::Alternate => KEY_WOW64_64KEY,
        };

        let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
        let Ok(subkey) = hklm.open_subkey_with_flags(key, KEY_READ | view_flag) else {
            return RegistryLookup::KeyMissing;
        };

        match subkey.get_value::<String, _>(value) {
            Ok(data) => RegistryLookup::Found(data),
            Err(_) => RegistryLookup::ValueMissing,
        }
    }
}

#[cfg(not(target_os = "windows"))]
impl ConfigStore for SystemConfigStore {
    fn lookup(&self, _key: &str, _value: &str, _view: RegistryView) -> RegistryLookup {
        RegistryLookup::KeyMissing
    }
}

/// A directory produced by one hint, before suffix filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateDirectory<'h> {
    pub path: Utf8PathBuf,
    pub hint: &'h LocationHint,
}

/// Resolves location hints to a single installation directory.
pub struct LocationResolver<'a, S: ConfigStore> {
    store: &'a S,
    placeholders: &'a PathPlaceholders,
}

impl<'a, S: ConfigStore> LocationResolver<'a, S> {
    pub fn new(store: &'a S, placeholders: &'a PathPlaceholders) -> Self {
        Self {
            store,
            placeholders,
        }
    }

    /// Resolve `hints` to exactly one directory.
    ///
    /// # Errors
    ///
    /// - [`DiscoveryError::UnsupportedHint`] as soon as a hint of unknown kind is met
    /// - [`DiscoveryError::NoInstallationFound`] when no candidate survives filtering
    /// - [`DiscoveryError::AmbiguousInstallation`] when several distinct candidates survive
    pub fn resolve(
        &self,
        hints: &[LocationHint],
        expected_suffix: Option<&str>,
    ) -> Result<Utf8PathBuf, DiscoveryError> {
        let mut distinct: IndexSet<Utf8PathBuf> = IndexSet::new();

        for candidate in self.candidates(hints)? {
            if let Some(suffix) = expected_suffix {
                if final_component(candidate.path.as_str()) != Some(suffix) {
                    tracing::debug!(
                        "Discarding {} (expected folder {})",
                        candidate.path,
                        suffix
                    );
                    continue;
                }
            }
            distinct.insert(candidate.path);
        }

        match distinct.len() {
            0 => Err(DiscoveryError::NoInstallationFound),
            1 => {
                let path = distinct.swap_remove_index(0).ok_or(DiscoveryError::NoInstallationFound)?;
                tracing::info!("Resolved installation directory: {}", path);
                Ok(path)
            }
            _ => Err(DiscoveryError::AmbiguousInstallation {
                candidates: distinct.into_iter().collect(),
            }),
        }
    }

    /// Evaluate every hint, in order, without suffix filtering or deduplication.
    pub fn candidates<'h>(
        &self,
        hints: &'h [LocationHint],
    ) -> Result<Vec<CandidateDirectory<'h>>, DiscoveryError> {
        let mut found = Vec::new();

        for hint in hints {
            let path = match hint.kind {
                HintKind::Registry => self.search_registry(hint),
                HintKind::DirectoryGlob => self.search_directory(hint),
                HintKind::Unknown(kind) => {
                    return Err(DiscoveryError::UnsupportedHint {
                        kind,
                        path: hint.path.clone(),
                    });
                }
            };

            if let Some(path) = path {
                tracing::debug!("Hint {:?} {} produced {}", hint.kind, hint.path, path);
                found.push(CandidateDirectory { path, hint });
            }
        }

        Ok(found)
    }

    fn search_registry(&self, hint: &LocationHint) -> Option<Utf8PathBuf> {
        let key = normalize_registry_key(&hint.path);
        let value = hint.key.as_deref().unwrap_or("");

        let lookup = match self.store.lookup(key, value, RegistryView::Native) {
            RegistryLookup::KeyMissing => {
                tracing::debug!("Registry key {} missing, trying alternate view", key);
                self.store.lookup(key, value, RegistryView::Alternate)
            }
            other => other,
        };

        match lookup {
            RegistryLookup::Found(data) if !data.trim().is_empty() => {
                Some(Utf8PathBuf::from(trim_trailing_separators(data.trim())))
            }
            _ => None,
        }
    }

    fn search_directory(&self, hint: &LocationHint) -> Option<Utf8PathBuf> {
        let expanded = match self.placeholders.expand(&hint.path) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("Skipping directory hint {}: {}", hint.path, e);
                return None;
            }
        };

        if !expanded.is_dir() {
            return None;
        }

        let absolute = std::path::absolute(expanded.as_std_path()).ok()?;
        let absolute = Utf8PathBuf::from_path_buf(absolute).ok()?;
        Some(Utf8PathBuf::from(trim_trailing_separators(absolute.as_str())))
    }
}

fn normalize_registry_key(path: &str) -> &str {
    path.strip_prefix(MACHINE_HIVE_PREFIX)
        .unwrap_or(path)
        .trim_matches('\\')
}
