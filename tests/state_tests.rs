//! Integration tests for the installation store
//!
//! These tests verify:
//! - Lossless save/load of a fully populated installation
//! - Missing records signal discovery instead of failing hard
//! - One record per slug

use camino::Utf8PathBuf;
use cfaddons::models::{
    AddonFile, AddonInfo, AddonLocalInfo, CategorySection, GameFile, GameInfo, HintKind,
    InstalledAddon, InstalledGame, LocationHint,
};
use cfaddons::{InstallationStore, StoreError};
use chrono::{TimeZone, Utc};
use tempfile::TempDir;

fn create_test_store() -> (InstallationStore, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let root = Utf8PathBuf::try_from(temp_dir.path().join("appdata")).unwrap();
    (InstallationStore::new(root), temp_dir)
}

fn addons_section() -> CategorySection {
    CategorySection {
        name: "Addons".to_string(),
        package_kind: 1,
        relative_path: "Interface\\AddOns".to_string(),
        inclusion_pattern: "(?i)\\.toc$".to_string(),
        extra_include_pattern: Some("(?i)\\.lua$".to_string()),
    }
}

fn sample_game() -> InstalledGame {
    let bigwigs_remote = AddonInfo {
        catalog_id: 2398,
        name: "BigWigs Bossmods".to_string(),
        authors: vec!["funkehdude".to_string(), "Rabbit".to_string()],
        url: "https://www.curseforge.com/wow/addons/big-wigs".to_string(),
        summary: "Boss mods".to_string(),
        download_count: 123_456_789,
        latest_files: vec![AddonFile {
            id: 3_240_516,
            display_name: "v227".to_string(),
            file_name: "BigWigs-v227.zip".to_string(),
            file_date: Utc.with_ymd_and_hms(2021, 3, 10, 17, 4, 44).unwrap(),
            url: "https://edge.forgecdn.net/files/3240/516/BigWigs-v227.zip".to_string(),
            dependencies: vec![15049],
            modules: vec!["BigWigs".to_string(), "BigWigs_Core".to_string()],
            project_id: 2398,
            game_id: 1,
            game_versions: vec!["9.0.5".to_string()],
            flavor: Some("wow_retail".to_string()),
        }],
        category_section: addons_section(),
        slug: "big-wigs".to_string(),
    };

    let mut bigwigs = AddonLocalInfo::new("BigWigs");
    bigwigs.interface_version = Some(90005);
    bigwigs.title = Some("BigWigs".to_string());
    bigwigs.catalog_id = Some(2398);

    let mut bagnon = AddonLocalInfo::new("Bagnon");
    bagnon.title = Some("Bagnon".to_string());

    InstalledGame {
        slug: "wow_retail".to_string(),
        root_path: Utf8PathBuf::from("C:\\Games\\World of Warcraft\\_retail_"),
        game_info: GameInfo {
            catalog_id: 1,
            name: "World of Warcraft".to_string(),
            slug: "wow".to_string(),
            game_files: vec![GameFile {
                is_required: true,
                file_name: "Wow.exe".to_string(),
                file_type: 2,
                platform_type: 4,
            }],
            location_hints: vec![
                LocationHint::registry(
                    "HKEY_LOCAL_MACHINE\\SOFTWARE\\Blizzard Entertainment\\World of Warcraft",
                    "InstallPath",
                ),
                LocationHint {
                    kind: HintKind::Unknown(5),
                    path: "launcher://wow".to_string(),
                    key: None,
                    options: 1,
                },
            ],
            category_sections: vec![addons_section()],
            addon_settings_folder_filter: Some("WTF".to_string()),
            addon_settings_starting_folder: None,
            addon_settings_file_filter: Some("*.lua".to_string()),
            addon_settings_file_removal_filter: None,
        },
        addons: vec![
            InstalledAddon {
                local_info: bigwigs,
                remote_info: Some(bigwigs_remote),
                installed_at: Some(Utc.with_ymd_and_hms(2021, 3, 11, 8, 0, 0).unwrap()),
            },
            InstalledAddon::local(bagnon),
            InstalledAddon::local(AddonLocalInfo::new("Blizzard_Debug")),
        ],
    }
}

#[test]
fn test_round_trip_is_lossless() {
    let (store, _temp_dir) = create_test_store();
    let game = sample_game();

    store.save(&game).unwrap();
    let loaded = store.load("wow_retail").unwrap();

    assert_eq!(loaded, game);
    let order: Vec<&str> = loaded
        .addons
        .iter()
        .map(|a| a.local_info.folder_name.as_str())
        .collect();
    assert_eq!(order, vec!["BigWigs", "Bagnon", "Blizzard_Debug"]);
}

#[test]
fn test_save_overwrites_previous_record() {
    let (store, _temp_dir) = create_test_store();
    let mut game = sample_game();
    store.save(&game).unwrap();

    game.addons.truncate(1);
    store.save(&game).unwrap();

    assert_eq!(store.load("wow_retail").unwrap().addons.len(), 1);
}

#[test]
fn test_records_are_per_slug() {
    let (store, _temp_dir) = create_test_store();
    store.save(&sample_game()).unwrap();

    assert!(store.exists("wow_retail"));
    assert!(matches!(
        store.load("wow_classic"),
        Err(StoreError::NotDiscovered { slug, .. }) if slug == "wow_classic"
    ));
}

#[test]
fn test_record_is_plain_json() {
    let (store, _temp_dir) = create_test_store();
    let path = store.save(&sample_game()).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(value["slug"], "wow_retail");
    assert_eq!(value["game_info"]["location_hints"][0]["kind"], 1);
    assert_eq!(value["addons"][1]["remote_info"], serde_json::Value::Null);
}
