//! Preset store persistence through the JSON file repository.

use partyfinder::domain::{ListMode, LootRuleFlag, UiCategory};
use partyfinder::filter::{PresetId, TermKind};
use partyfinder::store::{JsonFileRepository, PresetManager, PresetRepository, StoreError};

fn manager(path: &std::path::Path) -> PresetManager<JsonFileRepository> {
    PresetManager::load(JsonFileRepository::new(path)).unwrap()
}

#[test]
fn missing_file_starts_empty_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("presets.json");
    let mgr = manager(&path);
    assert!(mgr.store().is_empty());
    assert!(!path.exists());
}

#[test]
fn edits_survive_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/presets.json");

    let mut mgr = manager(&path);
    let id = mgr.create().unwrap();
    mgr.rename(id, "Savage farm").unwrap();
    mgr.edit_preset(id, |p| {
        p.duties_mode = ListMode::Whitelist;
        p.add_duty(1010);
        p.set_category(UiCategory::Pvp, false);
        p.set_loot_rule_flag(LootRuleFlag::Lootmaster, false);
        p.set_min_item_level(700);
        p.add_term(TermKind::Highlight, "  Weekly ").unwrap();
        p.add_player("Bob", 73).unwrap();
    })
    .unwrap();
    let copy = mgr.duplicate(id).unwrap();
    mgr.update_settings(|s| s.show_description_on_join = true)
        .unwrap();

    let reloaded = manager(&path);
    assert_eq!(reloaded.store(), mgr.store());
    assert_eq!(reloaded.store().selected_preset, Some(copy));
    let preset = reloaded.store().get(id).unwrap();
    assert_eq!(preset.name, "Savage farm");
    assert!(preset.description_like.contains("weekly"));
    assert!(!preset.categories.contains(&UiCategory::Pvp));
    let copied = reloaded.store().get(copy).unwrap();
    assert_eq!(copied.name, "Savage farm (copy)");
}

#[test]
fn resave_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("presets.json");

    let mut mgr = manager(&path);
    let id = mgr.create().unwrap();
    mgr.edit_preset(id, |p| p.add_job_group()).unwrap();
    let first = std::fs::read(&path).unwrap();

    manager(&path).save().unwrap();
    let second = std::fs::read(&path).unwrap();
    assert_eq!(first, second);
    assert!(!dir.path().join("presets.tmp").exists());
}

#[test]
fn dangling_selection_is_demoted_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("presets.json");
    let missing = PresetId::new();
    let json = format!(
        r#"{{"version":1,"presets":{{}},"selected_preset":"{missing}"}}"#
    );
    std::fs::write(&path, json).unwrap();

    let repo = JsonFileRepository::new(&path);
    assert_eq!(repo.load().unwrap().unwrap().selected_preset, Some(missing));

    let mgr = manager(&path);
    assert_eq!(mgr.store().selected_preset, None);
    assert!(!mgr.active_filter(0).is_active());
}

#[test]
fn missing_fields_take_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("presets.json");
    let id = PresetId::new();
    let json = format!(
        r#"{{"presets":{{"{id}":{{"name":"Old"}}}},"selected_preset":"{id}"}}"#
    );
    std::fs::write(&path, json).unwrap();

    let mgr = manager(&path);
    let preset = mgr.store().get(id).unwrap();
    assert_eq!(preset.name, "Old");
    assert_eq!(preset.loot_rule, u32::MAX);
    assert!(preset.allow_huge_item_level);
    assert!(mgr.active_filter(0).is_active());
}

#[test]
fn newer_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("presets.json");
    std::fs::write(&path, r#"{"version":99}"#).unwrap();

    let result = PresetManager::load(JsonFileRepository::new(&path));
    let Err(StoreError::UnsupportedVersion { found, supported }) = result else {
        panic!("expected an unsupported version error");
    };
    assert_eq!((found, supported), (99, 1));
}

#[test]
fn corrupt_file_is_json_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("presets.json");
    std::fs::write(&path, "{ not json").unwrap();

    let result = PresetManager::load(JsonFileRepository::new(&path));
    assert!(matches!(result, Err(StoreError::Json(_))));
}

#[test]
fn failed_save_is_surfaced_and_change_kept() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("presets.json");
    let mut mgr = manager(&path);

    // the rename onto a directory fails
    std::fs::create_dir(&path).unwrap();
    let result = mgr.create();
    assert!(matches!(result, Err(StoreError::Io(_))));
    assert_eq!(mgr.store().len(), 1);
    assert!(mgr.store().selected_preset.is_some());
}
