//! Supported games and their addon manifest dialects.
//!
//! A [`GameDescriptor`] ties a cfaddons slug to a catalog game id, the version
//! flavor used to filter catalog files, the folder name an installation must end
//! in, and a [`ManifestDialect`]. The [`DescriptorRegistry`] is built once at
//! startup and handed to everything that needs it by reference.

use crate::services::manifest::{self, INTERFACE_KEY, ManifestError, ParsedManifest};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use thiserror::Error;

/// How one title family writes addon manifests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManifestDialect {
    /// World of Warcraft: `<Addon>/<Addon>.toc`, `|cAARRGGBB` colour codes
    Toc,
    /// The Elder Scrolls Online: `<Addon>/<Addon>.txt`, `|cRRGGBB` colour codes
    Txt,
}

impl ManifestDialect {
    pub fn extension(self) -> &'static str {
        match self {
            ManifestDialect::Toc => "toc",
            ManifestDialect::Txt => "txt",
        }
    }

    /// Relative folder holding saved settings
    pub fn config_subdir(self) -> &'static str {
        match self {
            ManifestDialect::Toc => "WTF",
            ManifestDialect::Txt => "SavedVariables",
        }
    }

    pub fn is_interface_key(self, key: &str) -> bool {
        match self {
            ManifestDialect::Toc => key == INTERFACE_KEY,
            ManifestDialect::Txt => key == INTERFACE_KEY || key == "APIVersion",
        }
    }

    /// The part of an interface tag value that holds the version number.
    ///
    /// ESO manifests may list several API versions separated by spaces; the first counts.
    pub fn interface_token(self, value: &str) -> &str {
        match self {
            ManifestDialect::Toc => value,
            ManifestDialect::Txt => value.split_whitespace().next().unwrap_or(value),
        }
    }

    pub fn strip_title(self, title: &str) -> String {
        match self {
            ManifestDialect::Toc => manifest::strip_color_codes(title),
            ManifestDialect::Txt => manifest::strip_rgb_color_codes(title),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{slug} is not supported. Choose from {}", supported.join(", "))]
pub struct UnsupportedGame {
    pub slug: String,
    pub supported: Vec<String>,
}

/// Definition of one supported game edition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameDescriptor {
    /// Game id in the catalog
    pub catalog_id: u32,
    /// Key used on the command line and for stored records
    pub slug: String,
    /// Catalog file flavor, e.g. `wow_classic`
    pub flavor: String,
    /// Required last component of the installation directory, e.g. `_retail_`
    pub expected_folder_suffix: Option<String>,
    pub dialect: ManifestDialect,
}

impl GameDescriptor {
    pub fn new(
        catalog_id: u32,
        slug: &str,
        flavor: &str,
        expected_folder_suffix: Option<&str>,
        dialect: ManifestDialect,
    ) -> Self {
        Self {
            catalog_id,
            slug: slug.to_string(),
            flavor: flavor.to_string(),
            expected_folder_suffix: expected_folder_suffix.map(str::to_string),
            dialect,
        }
    }

    /// Parse the manifest of the addon stored in `addon_folder`.
    pub fn parse_local_manifest(&self, addon_folder: &Utf8Path) -> Result<ParsedManifest, ManifestError> {
        manifest::parse_addon_folder(self.dialect, addon_folder)
    }

    pub fn config_directory(&self, install_root: &Utf8Path) -> Utf8PathBuf {
        install_root.join(self.dialect.config_subdir())
    }

    /// Whether `path` ends in the folder this edition installs to.
    pub fn accepts_root(&self, path: &Utf8Path) -> bool {
        match &self.expected_folder_suffix {
            Some(suffix) => {
                crate::services::paths::final_component(path.as_str()) == Some(suffix.as_str())
            }
            None => true,
        }
    }
}

/// Immutable slug → descriptor map.
#[derive(Debug, Clone, Default)]
pub struct DescriptorRegistry {
    descriptors: IndexMap<String, GameDescriptor>,
}

impl DescriptorRegistry {
    /// The games cfaddons knows how to manage.
    pub fn builtin() -> Self {
        Self::from_descriptors([
            GameDescriptor::new(1, "wow_retail", "wow_retail", Some("_retail_"), ManifestDialect::Toc),
            GameDescriptor::new(1, "wow_classic", "wow_classic", Some("_classic_era_"), ManifestDialect::Toc),
            GameDescriptor::new(1, "wow_tbc", "wow_burning_crusade", Some("_classic_"), ManifestDialect::Toc),
            GameDescriptor::new(455, "teso", "teso", None, ManifestDialect::Txt),
        ])
    }

    pub fn from_descriptors(descriptors: impl IntoIterator<Item = GameDescriptor>) -> Self {
        Self {
            descriptors: descriptors
                .into_iter()
                .map(|d| (d.slug.clone(), d))
                .collect(),
        }
    }

    pub fn get(&self, slug: &str) -> Result<&GameDescriptor, UnsupportedGame> {
        self.descriptors.get(slug).ok_or_else(|| UnsupportedGame {
            slug: slug.to_string(),
            supported: self.slugs().map(str::to_string).collect(),
        })
    }

    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.descriptors.keys().map(String::as_str)
    }
}
