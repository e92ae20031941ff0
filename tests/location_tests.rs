//! Integration tests for installation discovery
//!
//! These tests verify:
//! - The one / many / none candidate properties over generated hint sets
//! - Alternate registry view fallback
//! - Directory hints against real directories

use camino::Utf8PathBuf;
use cfaddons::models::LocationHint;
use cfaddons::services::PathPlaceholders;
use cfaddons::services::location::{
    ConfigStore, DiscoveryError, LocationResolver, RegistryLookup, RegistryView,
};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use tempfile::TempDir;

/// Registry double: key → InstallPath data, per view
#[derive(Default)]
struct MapRegistry {
    native: HashMap<String, String>,
    alternate: HashMap<String, String>,
}

impl ConfigStore for MapRegistry {
    fn lookup(&self, key: &str, value: &str, view: RegistryView) -> RegistryLookup {
        let keys = match view {
            RegistryView::Native => &self.native,
            RegistryView::Alternate => &self.alternate,
        };
        match keys.get(key) {
            None => RegistryLookup::KeyMissing,
            Some(_) if value != "InstallPath" => RegistryLookup::ValueMissing,
            Some(data) => RegistryLookup::Found(data.clone()),
        }
    }
}

fn install_dir() -> impl Strategy<Value = String> {
    (0u8..4, prop::sample::select(vec!["_retail_", "_classic_", "_classic_era_"]))
        .prop_map(|(drive, edition)| format!("C:\\Games{}\\World of Warcraft\\{}", drive, edition))
}

fn registry_hints(dirs: &[String]) -> (MapRegistry, Vec<LocationHint>) {
    let mut registry = MapRegistry::default();
    let mut hints = Vec::new();
    for (i, dir) in dirs.iter().enumerate() {
        let key = format!("SOFTWARE\\Hint{}", i);
        registry.native.insert(key.clone(), dir.clone());
        hints.push(LocationHint::registry(format!("HKEY_LOCAL_MACHINE\\{}", key), "InstallPath"));
    }
    (registry, hints)
}

proptest! {
    #[test]
    fn resolve_follows_distinct_candidate_count(dirs in prop::collection::vec(install_dir(), 0..6)) {
        let (registry, hints) = registry_hints(&dirs);
        let expected: BTreeSet<&str> = dirs
            .iter()
            .map(String::as_str)
            .filter(|d| d.ends_with("\\_retail_"))
            .collect();

        let placeholders = PathPlaceholders::new();
        let resolver = LocationResolver::new(&registry, &placeholders);
        let result = resolver.resolve(&hints, Some("_retail_"));

        match expected.len() {
            0 => prop_assert_eq!(result, Err(DiscoveryError::NoInstallationFound)),
            1 => {
                let only = expected.iter().next().copied().unwrap_or_default();
                prop_assert_eq!(result, Ok(Utf8PathBuf::from(only)));
            }
            n => match result {
                Err(DiscoveryError::AmbiguousInstallation { candidates }) => {
                    prop_assert_eq!(candidates.len(), n);
                    for candidate in &candidates {
                        prop_assert!(expected.contains(candidate.as_str()));
                    }
                }
                other => prop_assert!(false, "expected ambiguity, got {:?}", other),
            },
        }
    }

    #[test]
    fn resolve_without_suffix_counts_every_distinct_dir(dirs in prop::collection::vec(install_dir(), 1..6)) {
        let (registry, hints) = registry_hints(&dirs);
        let distinct: BTreeSet<&String> = dirs.iter().collect();

        let placeholders = PathPlaceholders::new();
        let resolver = LocationResolver::new(&registry, &placeholders);
        let result = resolver.resolve(&hints, None);

        if distinct.len() == 1 {
            prop_assert!(result.is_ok());
        } else {
            let is_ambiguous = matches!(result, Err(DiscoveryError::AmbiguousInstallation { .. }));
            prop_assert!(is_ambiguous);
        }
    }
}

#[test]
fn test_alternate_view_scenario() {
    let mut registry = MapRegistry::default();
    registry.alternate.insert(
        "SOFTWARE\\Game".to_string(),
        "C:\\Games\\Foo\\_retail_".to_string(),
    );

    let placeholders = PathPlaceholders::new();
    let resolver = LocationResolver::new(&registry, &placeholders);
    let hints = vec![LocationHint::registry("SOFTWARE\\Game", "InstallPath")];

    assert_eq!(
        resolver.resolve(&hints, Some("_retail_")).unwrap(),
        Utf8PathBuf::from("C:\\Games\\Foo\\_retail_")
    );
}

#[test]
fn test_directory_hints_probe_real_directories() {
    let temp_dir = TempDir::new().unwrap();
    let retail = temp_dir.path().join("World of Warcraft").join("_retail_");
    fs::create_dir_all(&retail).unwrap();
    let retail = Utf8PathBuf::try_from(retail).unwrap();

    let registry = MapRegistry::default();
    let placeholders = PathPlaceholders::new();
    let resolver = LocationResolver::new(&registry, &placeholders);

    // Same directory twice (once with a trailing separator) plus one that does not exist
    let hints = vec![
        LocationHint::directory(retail.as_str()),
        LocationHint::directory(format!("{}/", retail)),
        LocationHint::directory(retail.with_file_name("_classic_").as_str()),
    ];

    assert_eq!(resolver.resolve(&hints, Some("_retail_")).unwrap(), retail);
}

#[test]
fn test_directory_hint_with_placeholder() {
    let temp_dir = TempDir::new().unwrap();
    let docs = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    fs::create_dir_all(docs.join("Elder Scrolls Online").join("live")).unwrap();

    let mut placeholders = PathPlaceholders::new();
    placeholders.insert("%MYDOCUMENTS%", docs.clone());

    let registry = MapRegistry::default();
    let resolver = LocationResolver::new(&registry, &placeholders);
    let hints = vec![LocationHint::directory("%MYDOCUMENTS%\\Elder Scrolls Online\\live")];

    assert_eq!(
        resolver.resolve(&hints, None).unwrap(),
        docs.join("Elder Scrolls Online").join("live")
    );
}
