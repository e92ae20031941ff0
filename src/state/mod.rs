// Installation state store
//
// One JSON record per game slug under `<data_dir>/installed_games/`. A missing
// record is the normal signal that a game has not been discovered yet.

use crate::models::InstalledGame;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use thiserror::Error;

/// Subdirectory of the data root holding one record per slug
pub const RECORDS_DIR: &str = "installed_games";

/// Errors from the installation store
#[derive(Error, Debug)]
pub enum StoreError {
    /// No record for this slug; run discovery
    #[error("{slug} has not been discovered yet (no record at {path})")]
    NotDiscovered { slug: String, path: Utf8PathBuf },

    #[error("Failed to access {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt installation record {path}: {source}")]
    Serialization {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid game slug for a record name: '{0}'")]
    InvalidSlug(String),
}

impl StoreError {
    pub fn is_not_discovered(&self) -> bool {
        matches!(self, StoreError::NotDiscovered { .. })
    }
}

/// File-backed store of resolved installations.
///
/// # Related Types
///
/// - [`crate::models::InstalledGame`]: the persisted aggregate
/// - [`crate::services::orchestrator::Orchestrator`]: loads before discovering, saves after
#[derive(Debug, Clone)]
pub struct InstallationStore {
    root: Utf8PathBuf,
}

impl InstallationStore {
    /// Store rooted at the application-data directory. Nothing is created until the first save.
    pub fn new<P: AsRef<Utf8Path>>(data_dir: P) -> Self {
        Self {
            root: data_dir.as_ref().to_path_buf(),
        }
    }

    /// Deterministic record location for `slug`
    pub fn record_path(&self, slug: &str) -> Result<Utf8PathBuf, StoreError> {
        if slug.is_empty()
            || slug == "."
            || slug == ".."
            || slug.contains(['/', '\\', ':'])
        {
            return Err(StoreError::InvalidSlug(slug.to_string()));
        }

        Ok(self.root.join(RECORDS_DIR).join(format!("{}.json", slug)))
    }

    pub fn exists(&self, slug: &str) -> bool {
        self.record_path(slug).is_ok_and(|p| p.is_file())
    }

    /// Write the full aggregate, creating parent directories on demand.
    ///
    /// The record is written to a temporary sibling first and renamed into place.
    pub fn save(&self, game: &InstalledGame) -> Result<Utf8PathBuf, StoreError> {
        let path = self.record_path(&game.slug)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(game).map_err(|source| StoreError::Serialization {
            path: path.clone(),
            source,
        })?;

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::info!(
            "Saved {} ({} addons) to {}",
            game.slug,
            game.addons.len(),
            path
        );
        Ok(path)
    }

    pub fn load(&self, slug: &str) -> Result<InstalledGame, StoreError> {
        let path = self.record_path(slug)?;

        if !path.is_file() {
            tracing::debug!("No stored record for {} at {}", slug, path);
            return Err(StoreError::NotDiscovered {
                slug: slug.to_string(),
                path,
            });
        }

        let contents = fs::read_to_string(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;

        let game: InstalledGame =
            serde_json::from_str(&contents).map_err(|source| StoreError::Serialization {
                path: path.clone(),
                source,
            })?;

        tracing::info!("Loaded {} from {}", slug, path);
        Ok(game)
    }

    /// Delete the record for `slug`.
    pub fn remove(&self, slug: &str) -> Result<(), StoreError> {
        let path = self.record_path(slug)?;

        if !path.is_file() {
            return Err(StoreError::NotDiscovered {
                slug: slug.to_string(),
                path,
            });
        }

        fs::remove_file(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::info!("Removed stored record for {}", slug);
        Ok(())
    }
}
