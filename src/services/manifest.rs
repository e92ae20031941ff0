//! Addon manifest parsing.
//!
//! Manifests (`.toc` for WoW, `.txt` for ESO) are plain text. Lines starting with
//! `##` are tagged lines of the form `## Key: Value`; everything else is ignored.
//! Parsing is permissive: a tagged line that cannot be understood is reported as a
//! [`MalformedLine`] and skipped, and the rest of the manifest is still read.

use crate::models::AddonLocalInfo;
use crate::services::descriptor::ManifestDialect;
use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use std::fs;
use std::sync::LazyLock;
use thiserror::Error;

/// Inline colour escapes: `|cAARRGGBB` opens, `|r` closes.
static COLOR_CODES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\|c[0-9a-fA-F]{8}|\|r").expect("Invalid colour code regex"));

/// ESO accepts `|cRRGGBB` as well; the `|cAARRGGBB` form wins when both would match.
static RGB_COLOR_CODES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\|c(?:[0-9a-fA-F]{8}|[0-9a-fA-F]{6})|\|r").expect("Invalid colour code regex")
});

const TAG_PREFIX: &str = "##";

pub const INTERFACE_KEY: &str = "Interface";
pub const PROJECT_ID_KEY: &str = "X-Curse-Project-ID";
pub const TITLE_KEY: &str = "Title";

/// Errors that prevent an addon folder from being parsed at all
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("No *.{extension} manifest found in {folder}")]
    ManifestMissing { folder: Utf8PathBuf, extension: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Addon folder has no usable name: {0}")]
    InvalidFolder(Utf8PathBuf),
}

/// A tagged line that was skipped
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedLine {
    #[error("line {line}: tagged line has no ':' separator")]
    MissingSeparator { line: usize },

    #[error("line {line}: {key} value '{value}' is not a number")]
    InvalidNumber {
        line: usize,
        key: String,
        value: String,
    },
}

/// Result of parsing one manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedManifest {
    pub info: AddonLocalInfo,
    pub malformed: Vec<MalformedLine>,
}

/// Remove `|cAARRGGBB` / `|r` colour escapes from a display string.
pub fn strip_color_codes(text: &str) -> String {
    COLOR_CODES.replace_all(text, "").into_owned()
}

/// Remove `|cAARRGGBB`, `|cRRGGBB` and `|r` colour escapes.
pub fn strip_rgb_color_codes(text: &str) -> String {
    RGB_COLOR_CODES.replace_all(text, "").into_owned()
}

/// Split a tagged line into key and value.
///
/// Returns `None` for untagged lines. Leading `#` and spaces are dropped from the key.
pub fn parse_tagged_line(line: &str, line_number: usize) -> Option<Result<(&str, &str), MalformedLine>> {
    let line = line.trim();
    if !line.starts_with(TAG_PREFIX) {
        return None;
    }

    let body = line.trim_start_matches(['#', ' ']);
    Some(
        body.split_once(':')
            .map(|(k, v)| (k.trim(), v.trim()))
            .ok_or(MalformedLine::MissingSeparator { line: line_number }),
    )
}

/// Parse manifest text for the addon in `folder_name`.
pub fn parse_manifest_text(dialect: ManifestDialect, folder_name: &str, text: &str) -> ParsedManifest {
    let mut info = AddonLocalInfo::new(folder_name);
    let mut malformed = Vec::new();

    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    for (index, line) in text.lines().enumerate() {
        let line_number = index + 1;

        let (key, value) = match parse_tagged_line(line, line_number) {
            None => continue,
            Some(Ok(pair)) => pair,
            Some(Err(e)) => {
                malformed.push(e);
                continue;
            }
        };

        let parse_number = |raw: &str| {
            raw.parse::<u32>().map_err(|_| MalformedLine::InvalidNumber {
                line: line_number,
                key: key.to_string(),
                value: value.to_string(),
            })
        };

        let applied = if dialect.is_interface_key(key) {
            parse_number(dialect.interface_token(value)).map(|v| info.interface_version = Some(v))
        } else if key == PROJECT_ID_KEY {
            parse_number(value).map(|v| info.catalog_id = Some(v))
        } else if key == TITLE_KEY {
            info.title = Some(dialect.strip_title(value));
            Ok(())
        } else {
            Ok(())
        };

        if let Err(e) = applied {
            malformed.push(e);
        }
    }

    ParsedManifest { info, malformed }
}

/// Find the manifest file of an addon folder.
///
/// A manifest whose stem equals the folder name wins; otherwise the first
/// matching file in name order is used.
pub fn locate_manifest(dialect: ManifestDialect, addon_folder: &Utf8Path) -> Result<Utf8PathBuf, ManifestError> {
    let extension = dialect.extension();
    let folder_name = addon_folder.file_name().unwrap_or_default();

    let entries = addon_folder.read_dir_utf8().map_err(|source| ManifestError::Io {
        path: addon_folder.to_path_buf(),
        source,
    })?;

    let mut matches: Vec<Utf8PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
                && path.is_file()
        })
        .collect();

    matches.sort();

    let preferred = matches
        .iter()
        .position(|p| p.file_stem().is_some_and(|stem| stem.eq_ignore_ascii_case(folder_name)));

    match preferred {
        Some(index) => Ok(matches.swap_remove(index)),
        None => matches.into_iter().next().ok_or_else(|| ManifestError::ManifestMissing {
            folder: addon_folder.to_path_buf(),
            extension: extension.to_string(),
        }),
    }
}

/// Locate and parse the manifest of one addon folder.
pub fn parse_addon_folder(dialect: ManifestDialect, addon_folder: &Utf8Path) -> Result<ParsedManifest, ManifestError> {
    let folder_name = addon_folder
        .file_name()
        .ok_or_else(|| ManifestError::InvalidFolder(addon_folder.to_path_buf()))?;

    let manifest_path = locate_manifest(dialect, addon_folder)?;

    let bytes = fs::read(&manifest_path).map_err(|source| ManifestError::Io {
        path: manifest_path.clone(),
        source,
    })?;
    let text = String::from_utf8_lossy(&bytes);

    let parsed = parse_manifest_text(dialect, folder_name, &text);

    for issue in &parsed.malformed {
        tracing::debug!("{}: skipped {}", manifest_path, issue);
    }

    Ok(parsed)
}
