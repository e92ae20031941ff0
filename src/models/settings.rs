use serde::{Deserialize, Serialize};

/// Application settings from `settings.yaml`, overridable through `CFADDONS_*`
/// environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Application-data root; installed game records live under it
    pub data_dir: String,

    pub log_dir: String,

    pub debug_mode: bool,

    pub catalog: CatalogSettings,

    /// Overrides for path placeholder tokens found in catalog paths
    pub placeholders: Vec<PlaceholderOverride>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: "appdata".to_string(),
            log_dir: "logs".to_string(),
            debug_mode: false,
            catalog: CatalogSettings::default(),
            placeholders: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub max_concurrent_lookups: usize,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: format!("cfaddons/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            max_concurrent_lookups: 4,
        }
    }
}

fn default_base_url() -> String {
    "https://addons-ecs.forgesvc.net/api/v2".to_string()
}

/// Replaces the platform default for one placeholder token, e.g.
/// `%MYDOCUMENTS%` → `D:/Users/me/Documents`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderOverride {
    pub token: String,
    pub path: String,
}
