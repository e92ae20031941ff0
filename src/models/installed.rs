use crate::models::catalog::{AddonInfo, GameInfo};
use camino::Utf8PathBuf;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifying metadata read from one addon folder's manifest.
///
/// Only `folder_name` is guaranteed; every other field stays `None` when the
/// manifest does not carry (or carries an unreadable) tag for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonLocalInfo {
    pub folder_name: String,
    pub interface_version: Option<u32>,
    /// Display title with inline colour codes removed
    pub title: Option<String>,
    pub catalog_id: Option<u32>,
}

impl AddonLocalInfo {
    pub fn new(folder_name: impl Into<String>) -> Self {
        Self {
            folder_name: folder_name.into(),
            interface_version: None,
            title: None,
            catalog_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledAddon {
    pub local_info: AddonLocalInfo,
    /// Set only when the catalog lookup for `local_info.catalog_id` succeeded
    pub remote_info: Option<AddonInfo>,
    pub installed_at: Option<DateTime<Utc>>,
}

impl InstalledAddon {
    pub fn local(local_info: AddonLocalInfo) -> Self {
        Self {
            local_info,
            remote_info: None,
            installed_at: None,
        }
    }

    /// Title from the manifest, falling back to the folder name
    pub fn display_name(&self) -> &str {
        self.local_info
            .title
            .as_deref()
            .unwrap_or(&self.local_info.folder_name)
    }
}

/// A resolved installation with its addon inventory.
///
/// This is the record persisted by [`crate::state::InstallationStore`], one per slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledGame {
    pub slug: String,
    pub root_path: Utf8PathBuf,
    pub game_info: GameInfo,
    /// Scan order
    #[serde(default)]
    pub addons: Vec<InstalledAddon>,
}

impl InstalledGame {
    /// Number of addons that carry remote catalog metadata
    pub fn reconciled_count(&self) -> usize {
        self.addons.iter().filter(|a| a.remote_info.is_some()).count()
    }
}
