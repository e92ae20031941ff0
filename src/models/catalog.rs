use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a [`LocationHint`] is evaluated.
///
/// The catalog encodes this as a small integer (`hintType`); unknown values are
/// preserved so a stored record round-trips even if the catalog adds new kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum HintKind {
    /// Machine-wide configuration store (Windows registry) key/value lookup
    Registry,
    /// Literal directory probe
    DirectoryGlob,
    /// A kind this version does not know how to evaluate
    Unknown(u32),
}

impl From<u32> for HintKind {
    fn from(value: u32) -> Self {
        match value {
            1 => HintKind::Registry,
            2 => HintKind::DirectoryGlob,
            other => HintKind::Unknown(other),
        }
    }
}

impl From<HintKind> for u32 {
    fn from(kind: HintKind) -> Self {
        match kind {
            HintKind::Registry => 1,
            HintKind::DirectoryGlob => 2,
            HintKind::Unknown(other) => other,
        }
    }
}

/// One OS-specific recipe for locating a game installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationHint {
    pub kind: HintKind,
    /// Registry key path or directory path
    pub path: String,
    /// Registry value name (unused for directory hints)
    pub key: Option<String>,
    #[serde(default)]
    pub options: u32,
}

impl LocationHint {
    pub fn registry(path: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            kind: HintKind::Registry,
            path: path.into(),
            key: Some(key.into()),
            options: 0,
        }
    }

    pub fn directory(path: impl Into<String>) -> Self {
        Self {
            kind: HintKind::DirectoryGlob,
            path: path.into(),
            key: None,
            options: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameFile {
    pub is_required: bool,
    pub file_name: String,
    pub file_type: u32,
    pub platform_type: u32,
}

/// Layout of one addon category folder, e.g. `Interface\AddOns`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySection {
    pub name: String,
    pub package_kind: u32,
    /// Path as published by the catalog; may use `\` separators and start with a
    /// placeholder token such as `%MYDOCUMENTS%`
    pub relative_path: String,
    pub inclusion_pattern: String,
    pub extra_include_pattern: Option<String>,
}

/// Catalog metadata snapshot for one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameInfo {
    pub catalog_id: u32,
    pub name: String,
    pub slug: String,
    pub game_files: Vec<GameFile>,
    pub location_hints: Vec<LocationHint>,
    pub category_sections: Vec<CategorySection>,
    pub addon_settings_folder_filter: Option<String>,
    pub addon_settings_starting_folder: Option<String>,
    pub addon_settings_file_filter: Option<String>,
    pub addon_settings_file_removal_filter: Option<String>,
}

/// A downloadable file of a catalog addon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonFile {
    pub id: u64,
    pub display_name: String,
    pub file_name: String,
    pub file_date: DateTime<Utc>,
    pub url: String,
    /// Catalog ids of addons this file depends on
    pub dependencies: Vec<u32>,
    /// Top-level folder names the archive extracts to
    pub modules: Vec<String>,
    pub project_id: u32,
    pub game_id: u32,
    pub game_versions: Vec<String>,
    pub flavor: Option<String>,
}

/// Remote catalog record for one addon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonInfo {
    pub catalog_id: u32,
    pub name: String,
    pub authors: Vec<String>,
    pub url: String,
    pub summary: String,
    pub download_count: u64,
    /// Newest first
    pub latest_files: Vec<AddonFile>,
    pub category_section: CategorySection,
    pub slug: String,
}

impl AddonInfo {
    /// The most recent file matching the flavor the record was fetched for.
    pub fn latest_file(&self) -> Option<&AddonFile> {
        self.latest_files.first()
    }
}

/// Catalog search ordering, as understood by the search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Featured,
    #[default]
    Popularity,
    LastUpdate,
    Name,
    Author,
    TotalDownloads,
}

impl SortOrder {
    pub fn wire_value(self) -> u32 {
        match self {
            SortOrder::Featured => 0,
            SortOrder::Popularity => 1,
            SortOrder::LastUpdate => 2,
            SortOrder::Name => 3,
            SortOrder::Author => 4,
            SortOrder::TotalDownloads => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_kind_from_wire() {
        assert_eq!(HintKind::from(1), HintKind::Registry);
        assert_eq!(HintKind::from(2), HintKind::DirectoryGlob);
        assert_eq!(HintKind::from(7), HintKind::Unknown(7));
    }

    #[test]
    fn test_unknown_hint_kind_survives_serialization() {
        let hint = LocationHint {
            kind: HintKind::Unknown(9),
            path: "somewhere".to_string(),
            key: None,
            options: 3,
        };

        let json = serde_json::to_string(&hint).unwrap();
        assert!(json.contains("\"kind\":9"));

        let back: LocationHint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hint);
    }

    #[test]
    fn test_sort_order_wire_values() {
        assert_eq!(SortOrder::Featured.wire_value(), 0);
        assert_eq!(SortOrder::default().wire_value(), 1);
        assert_eq!(SortOrder::TotalDownloads.wire_value(), 5);
    }
}
