//! Integration tests for manifest parsing
//!
//! These tests verify:
//! - Permissive parsing: a malformed tagged line never changes the other fields
//! - Colour code stripping in titles
//! - Folder-level parsing through the game descriptors

use camino::Utf8PathBuf;
use cfaddons::models::AddonLocalInfo;
use cfaddons::services::manifest::{self, MalformedLine, parse_manifest_text};
use cfaddons::services::{DescriptorRegistry, ManifestDialect, ManifestError};
use proptest::prelude::*;
use std::fs;
use tempfile::TempDir;

fn valid_line() -> impl Strategy<Value = String> {
    prop_oneof![
        (1u32..200_000).prop_map(|v| format!("## Interface: {}", v)),
        any::<u32>().prop_map(|v| format!("## X-Curse-Project-ID: {}", v)),
        "[A-Za-z][A-Za-z ]{0,15}".prop_map(|t| format!("## Title: {}", t)),
        "[A-Za-z]{1,10}".prop_map(|n| format!("## Author: {}", n)),
        "[A-Za-z_]{1,10}\\.lua",
    ]
}

fn malformed_line() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Za-z]{1,12}".prop_map(|k| format!("## {}", k)),
        "[a-z]{1,6}".prop_map(|v| format!("## Interface: {}", v)),
        "[a-z]{1,6}".prop_map(|v| format!("## X-Curse-Project-ID: {}", v)),
    ]
}

proptest! {
    #[test]
    fn malformed_line_does_not_change_parsed_fields(
        lines in prop::collection::vec(valid_line(), 0..12),
        bad in malformed_line(),
        position in any::<prop::sample::Index>(),
    ) {
        let clean = lines.join("\n");

        let mut with_bad = lines.clone();
        with_bad.insert(position.index(lines.len() + 1), bad);
        let dirty = with_bad.join("\n");

        let expected = parse_manifest_text(ManifestDialect::Toc, "Addon", &clean);
        let actual = parse_manifest_text(ManifestDialect::Toc, "Addon", &dirty);

        prop_assert_eq!(&actual.info, &expected.info);
        prop_assert!(expected.malformed.is_empty());
        prop_assert_eq!(actual.malformed.len(), 1);
    }
}

#[test]
fn test_bagnon_title_is_stripped() {
    let parsed = parse_manifest_text(ManifestDialect::Toc, "Bagnon", "## Title: |cff00ff00Bagnon|r\n");
    assert_eq!(parsed.info.title.as_deref(), Some("Bagnon"));
    assert_eq!(manifest::strip_color_codes("|cff00ff00Bagnon|r"), "Bagnon");
}

#[test]
fn test_missing_separator_reports_line_number() {
    let text = "## Interface: 90005\n\n## Broken\n## Title: Ok\n";
    let parsed = parse_manifest_text(ManifestDialect::Toc, "Ok", text);
    assert_eq!(parsed.malformed, vec![MalformedLine::MissingSeparator { line: 3 }]);
}

#[test]
fn test_value_may_contain_colons() {
    let parsed = parse_manifest_text(
        ManifestDialect::Toc,
        "Details",
        "## Title: Details: Damage Meter\n",
    );
    assert_eq!(parsed.info.title.as_deref(), Some("Details: Damage Meter"));
}

#[test]
fn test_bigwigs_folder_through_descriptor() {
    let temp_dir = TempDir::new().unwrap();
    let folder = Utf8PathBuf::try_from(temp_dir.path().join("BigWigs")).unwrap();
    fs::create_dir(&folder).unwrap();
    fs::write(
        folder.join("BigWigs.toc"),
        "## Interface: 90005\r\n## X-Curse-Project-ID: 2398\r\n## Title: |cff3399ffBigWigs|r\r\n",
    )
    .unwrap();

    let registry = DescriptorRegistry::builtin();
    let parsed = registry
        .get("wow_retail")
        .unwrap()
        .parse_local_manifest(&folder)
        .unwrap();

    assert_eq!(
        parsed.info,
        AddonLocalInfo {
            folder_name: "BigWigs".to_string(),
            interface_version: Some(90005),
            title: Some("BigWigs".to_string()),
            catalog_id: Some(2398),
        }
    );
}

#[test]
fn test_eso_folder_uses_txt_manifest() {
    let temp_dir = TempDir::new().unwrap();
    let folder = Utf8PathBuf::try_from(temp_dir.path().join("LibAddonMenu-2.0")).unwrap();
    fs::create_dir(&folder).unwrap();
    fs::write(
        folder.join("LibAddonMenu-2.0.txt"),
        "## Title: |c00FF00LibAddonMenu|r-2.0\n## APIVersion: 101031 101032\n## X-Curse-Project-ID: 7070\n",
    )
    .unwrap();
    // A WoW manifest in an ESO addon folder is ignored
    fs::write(folder.join("LibAddonMenu-2.0.toc"), "## Title: Wrong\n").unwrap();

    let registry = DescriptorRegistry::builtin();
    let teso = registry.get("teso").unwrap();
    let parsed = teso.parse_local_manifest(&folder).unwrap();

    assert_eq!(parsed.info.title.as_deref(), Some("LibAddonMenu-2.0"));
    assert_eq!(parsed.info.interface_version, Some(101031));
    assert_eq!(parsed.info.catalog_id, Some(7070));
}

#[test]
fn test_folder_without_manifest() {
    let temp_dir = TempDir::new().unwrap();
    let folder = Utf8PathBuf::try_from(temp_dir.path().join("Textures")).unwrap();
    fs::create_dir(&folder).unwrap();
    fs::write(folder.join("icon.tga"), [0u8, 1, 2]).unwrap();

    let registry = DescriptorRegistry::builtin();
    let err = registry
        .get("wow_classic")
        .unwrap()
        .parse_local_manifest(&folder)
        .unwrap_err();

    assert!(matches!(err, ManifestError::ManifestMissing { .. }));
}
