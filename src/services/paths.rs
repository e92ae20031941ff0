//! Catalog path handling.
//!
//! Catalog paths are Windows-flavoured (`Interface\AddOns`,
//! `%MYDOCUMENTS%\Elder Scrolls Online\live\AddOns`). They are split on both
//! separators so the same data resolves on every platform, and a leading
//! `%TOKEN%` segment is replaced through [`PathPlaceholders`].

use crate::models::PlaceholderOverride;
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use thiserror::Error;

/// Per-user documents folder token used by catalog category paths.
pub const MY_DOCUMENTS: &str = "%MYDOCUMENTS%";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("Unknown path placeholder {0}")]
    UnknownPlaceholder(String),
}

/// Token → absolute path mapping for catalog path placeholders.
///
/// Tokens are matched case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathPlaceholders {
    tokens: IndexMap<String, Utf8PathBuf>,
}

impl PathPlaceholders {
    /// An empty mapping; every placeholder is unknown.
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform defaults: `%MYDOCUMENTS%` → the user's documents folder.
    pub fn platform_defaults() -> Self {
        let mut placeholders = Self::new();

        let documents = dirs::document_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join("Documents")))
            .and_then(|p| Utf8PathBuf::from_path_buf(p).ok());

        match documents {
            Some(path) => placeholders.insert(MY_DOCUMENTS, path),
            None => tracing::warn!("Could not determine the documents folder for {}", MY_DOCUMENTS),
        }

        placeholders
    }

    pub fn with_overrides(mut self, overrides: &[PlaceholderOverride]) -> Self {
        for o in overrides {
            self.insert(&o.token, Utf8PathBuf::from(&o.path));
        }
        self
    }

    pub fn insert(&mut self, token: &str, path: impl Into<Utf8PathBuf>) {
        self.tokens.insert(token.to_ascii_uppercase(), path.into());
    }

    pub fn get(&self, token: &str) -> Option<&Utf8Path> {
        self.tokens
            .get(&token.to_ascii_uppercase())
            .map(|p| p.as_path())
    }

    /// Resolve a catalog path.
    ///
    /// A leading placeholder is substituted; anything else is joined onto `base`.
    pub fn resolve(&self, base: &Utf8Path, catalog_path: &str) -> Result<Utf8PathBuf, PathError> {
        let segments = split_segments(catalog_path);

        let (mut resolved, rest) = match segments.split_first() {
            Some((first, rest)) if is_placeholder(first) => {
                let root = self
                    .get(first)
                    .ok_or_else(|| PathError::UnknownPlaceholder(first.to_string()))?;
                (root.to_path_buf(), rest)
            }
            _ => (base.to_path_buf(), segments.as_slice()),
        };

        for segment in rest {
            resolved.push(segment);
        }

        Ok(resolved)
    }

    /// Expand a leading placeholder of a standalone path, leaving other paths untouched.
    pub fn expand(&self, raw: &str) -> Result<Utf8PathBuf, PathError> {
        let segments = split_segments(raw);
        match segments.first() {
            Some(first) if is_placeholder(first) => self.resolve(Utf8Path::new(""), raw),
            _ => Ok(Utf8PathBuf::from(raw)),
        }
    }
}

fn is_placeholder(segment: &str) -> bool {
    segment.len() > 2 && segment.starts_with('%') && segment.ends_with('%')
}

fn split_segments(raw: &str) -> Vec<&str> {
    raw.split(['/', '\\']).filter(|s| !s.is_empty()).collect()
}

/// Last path component of a native or Windows-style path, ignoring trailing separators.
pub fn final_component(raw: &str) -> Option<&str> {
    raw.trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .filter(|s| !s.is_empty())
}

/// Path with trailing separators removed, used as the dedup key for candidates.
pub fn trim_trailing_separators(raw: &str) -> &str {
    let trimmed = raw.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() { raw } else { trimmed }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placeholders() -> PathPlaceholders {
        let mut p = PathPlaceholders::new();
        p.insert(MY_DOCUMENTS, "/home/tester/Documents");
        p
    }

    #[test]
    fn test_relative_path_joins_install_root() {
        let resolved = placeholders()
            .resolve(Utf8Path::new("/games/wow/_retail_"), "Interface\\AddOns")
            .unwrap();
        assert_eq!(resolved, Utf8PathBuf::from("/games/wow/_retail_/Interface/AddOns"));
    }

    #[test]
    fn test_placeholder_replaces_install_root() {
        let resolved = placeholders()
            .resolve(
                Utf8Path::new("/games/eso"),
                "%MYDOCUMENTS%\\Elder Scrolls Online\\live\\AddOns",
            )
            .unwrap();
        assert_eq!(
            resolved,
            Utf8PathBuf::from("/home/tester/Documents/Elder Scrolls Online/live/AddOns")
        );
    }

    #[test]
    fn test_placeholder_is_case_insensitive() {
        let resolved = placeholders()
            .resolve(Utf8Path::new("/x"), "%MyDocuments%/Saves")
            .unwrap();
        assert_eq!(resolved, Utf8PathBuf::from("/home/tester/Documents/Saves"));
    }

    #[test]
    fn test_unknown_placeholder() {
        let err = placeholders()
            .resolve(Utf8Path::new("/x"), "%APPDATA%\\Foo")
            .unwrap_err();
        assert_eq!(err, PathError::UnknownPlaceholder("%APPDATA%".to_string()));
    }

    #[test]
    fn test_overrides_replace_defaults() {
        let p = placeholders().with_overrides(&[PlaceholderOverride {
            token: "%mydocuments%".to_string(),
            path: "/srv/docs".to_string(),
        }]);
        assert_eq!(p.get(MY_DOCUMENTS), Some(Utf8Path::new("/srv/docs")));
    }

    #[test]
    fn test_expand_leaves_plain_paths() {
        let p = placeholders();
        assert_eq!(
            p.expand("C:\\Games\\Foo").unwrap(),
            Utf8PathBuf::from("C:\\Games\\Foo")
        );
        assert_eq!(
            p.expand("%MYDOCUMENTS%/Game").unwrap(),
            Utf8PathBuf::from("/home/tester/Documents/Game")
        );
    }

    #[test]
    fn test_final_component() {
        assert_eq!(final_component("C:\\Games\\Foo\\_retail_"), Some("_retail_"));
        assert_eq!(final_component("/games/wow/_classic_/"), Some("_classic_"));
        assert_eq!(final_component("_retail_"), Some("_retail_"));
        assert_eq!(final_component("\\\\"), None);
    }

    #[test]
    fn test_trim_trailing_separators() {
        assert_eq!(trim_trailing_separators("C:\\Games\\Foo\\"), "C:\\Games\\Foo");
        assert_eq!(trim_trailing_separators("/"), "/");
    }
}
