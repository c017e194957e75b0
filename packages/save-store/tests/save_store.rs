//! Integration tests for slot lifecycle and on-disk persistence.

use std::fs;
use std::path::Path;

use ntest::timeout;
use save_store::format::{SaveFileHeader, HEADER_SIZE, SAVE_VERSION};
use save_store::{SaveConfig, SaveError, SaveStore};
use tempfile::tempdir;

fn new_store(dir: &Path) -> SaveStore {
    let mut store = SaveStore::new(SaveConfig::with_save_dir(dir));
    store.initialize().unwrap();
    store
}

#[timeout(5000)]
#[test]
fn test_save_load_cycle_across_instances() {
    let temp_dir = tempdir().unwrap();

    {
        let mut store = new_store(temp_dir.path());
        store.create_new_slot(0, "Nova").unwrap();
        store.set_int("chapter", 3).unwrap();
        store.save_slot(0).unwrap();
    }

    // Fresh instance, as after a restart
    let mut store = new_store(temp_dir.path());
    store.load_slot(0).unwrap();
    assert_eq!(store.get_int("chapter", -1), 3);
    assert_eq!(store.current_slot(), Some(0));

    let info = store.get_slot_info(0);
    assert!(info.exists);
    assert_eq!(info.player_name, "Nova");
    assert_eq!(info.chapter, 1);
    assert_eq!(info.level, 1);
    assert_eq!(info.playtime, 0.0);
    assert!(info.last_save_time > 0);
}

#[timeout(5000)]
#[test]
fn test_typed_values_round_trip() {
    let temp_dir = tempdir().unwrap();

    {
        let mut store = new_store(temp_dir.path());
        store.create_new_slot(2, "Orion").unwrap();
        store.set_string("ship", "Kestrel").unwrap();
        store.set_string("empty", "").unwrap();
        store.set_int("credits", -45_000_000_000).unwrap();
        store.set_float("fuel", 0.3333333333333333).unwrap();
        store.set_float("heat", -1e-12).unwrap();
        store.set_bool("docked", true).unwrap();
        store.set_bool("hostile", false).unwrap();
        store.save_slot(2).unwrap();
    }

    let mut store = new_store(temp_dir.path());
    store.load_slot(2).unwrap();
    assert_eq!(store.get_string("ship", ""), "Kestrel");
    assert_eq!(store.get_string("empty", "default"), "");
    assert_eq!(store.get_int("credits", 0), -45_000_000_000);
    assert_eq!(store.get_float("fuel", 0.0), 0.3333333333333333);
    assert_eq!(store.get_float("heat", 0.0), -1e-12);
    assert!(store.get_bool("docked", false));
    assert!(!store.get_bool("hostile", true));
    assert_eq!(
        store.keys().unwrap(),
        vec!["credits", "docked", "empty", "fuel", "heat", "hostile", "ship"]
    );
}

#[timeout(5000)]
#[test]
fn test_slot_bounds() {
    let temp_dir = tempdir().unwrap();
    let mut store = new_store(temp_dir.path());

    for slot in [-1, 3, i32::MAX, i32::MIN] {
        assert!(matches!(
            store.create_new_slot(slot, "x"),
            Err(SaveError::InvalidSlot { .. })
        ));
        assert!(store.load_slot(slot).is_err());
        assert!(store.delete_slot(slot).is_err());
        assert!(!store.does_slot_exist(slot));
        assert!(!store.get_slot_info(slot).exists);
    }

    store.create_new_slot(0, "Nova").unwrap();
    assert!(store.create_new_slot(3, "x").is_err());
    assert!(store.save_slot(-1).is_err());
    assert!(!store.does_slot_exist(5));
}

#[timeout(5000)]
#[test]
fn test_create_existing_slot_rejected() {
    let temp_dir = tempdir().unwrap();
    let mut store = new_store(temp_dir.path());

    store.create_new_slot(1, "Nova").unwrap();
    assert!(matches!(
        store.create_new_slot(1, "Vega"),
        Err(SaveError::SlotAlreadyExists(1))
    ));
    // The open slot is untouched by the rejected call
    assert_eq!(store.current_slot(), Some(1));
    assert_eq!(store.get_slot_info(1).player_name, "Nova");
}

#[timeout(5000)]
#[test]
fn test_loading_another_slot_replaces_data() {
    let temp_dir = tempdir().unwrap();
    let mut store = new_store(temp_dir.path());

    store.create_new_slot(0, "A").unwrap();
    store.set_string("only_in_a", "yes").unwrap();
    store.save_slot(0).unwrap();

    store.create_new_slot(1, "B").unwrap();
    store.set_string("only_in_b", "yes").unwrap();
    store.save_slot(1).unwrap();

    store.load_slot(0).unwrap();
    store.load_slot(1).unwrap();
    assert_eq!(store.get_string("only_in_a", "absent"), "absent");
    assert_eq!(store.get_string("only_in_b", "absent"), "yes");
    assert_eq!(store.current_slot(), Some(1));
}

#[timeout(5000)]
#[test]
fn test_slot_info_does_not_disturb_open_slot() {
    let temp_dir = tempdir().unwrap();
    let mut store = new_store(temp_dir.path());

    store.create_new_slot(0, "A").unwrap();
    store.create_new_slot(1, "B").unwrap();
    store.set_int("score", 12).unwrap();

    let slots = store.get_all_slots();
    assert_eq!(slots.len(), 3);
    assert_eq!(slots[0].player_name, "A");
    assert_eq!(slots[1].player_name, "B");
    assert!(!slots[2].exists);
    assert_eq!(
        slots.iter().map(|s| s.slot_id).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );

    assert_eq!(store.current_slot(), Some(1));
    assert_eq!(store.get_int("score", 0), 12);
}

#[timeout(5000)]
#[test]
fn test_metadata_updates_show_in_slot_info() {
    let temp_dir = tempdir().unwrap();
    let mut store = new_store(temp_dir.path());

    store.create_new_slot(0, "Nova").unwrap();
    store.set_metadata("chapter", "4").unwrap();
    store.set_metadata("playtime", "361.5").unwrap();
    store.save_slot(0).unwrap();

    let info = store.get_slot_info(0);
    assert_eq!(info.chapter, 4);
    assert_eq!(info.playtime, 361.5);
    assert_eq!(store.metadata("player_name").as_deref(), Some("Nova"));
}

#[timeout(5000)]
#[test]
fn test_corrupted_magic_fails_load() {
    let temp_dir = tempdir().unwrap();
    let mut store = new_store(temp_dir.path());
    store.create_new_slot(0, "Nova").unwrap();
    store.create_new_slot(1, "Vega").unwrap();

    let path = store.slot_file_path(0).unwrap();
    let mut bytes = fs::read(&path).unwrap();
    bytes[0..4].copy_from_slice(b"XXXX");
    fs::write(&path, &bytes).unwrap();

    assert!(matches!(
        store.load_slot(0),
        Err(SaveError::BadMagic { .. })
    ));
    // Failed load leaves nothing open, not even the previous slot
    assert!(!store.has_loaded_slot());
    assert_eq!(store.current_slot(), None);

    // File is present but unreadable
    assert!(store.does_slot_exist(0));
    assert!(!store.get_slot_info(0).exists);
}

#[timeout(5000)]
#[test]
fn test_future_version_still_loads() {
    let temp_dir = tempdir().unwrap();
    let mut store = new_store(temp_dir.path());
    store.create_new_slot(0, "Nova").unwrap();
    store.set_bool("met_captain", true).unwrap();
    store.save_slot(0).unwrap();
    store.close_current_slot();

    let path = store.slot_file_path(0).unwrap();
    let mut bytes = fs::read(&path).unwrap();
    let header = SaveFileHeader::from_bytes(bytes[..HEADER_SIZE].try_into().unwrap());
    assert_eq!(header.version, SAVE_VERSION);
    bytes[4..8].copy_from_slice(&(SAVE_VERSION + 1).to_le_bytes());
    fs::write(&path, &bytes).unwrap();

    store.load_slot(0).unwrap();
    assert!(store.get_bool("met_captain", false));
}

#[timeout(5000)]
#[test]
fn test_corrupted_payload_fails_load() {
    let temp_dir = tempdir().unwrap();
    let mut store = new_store(temp_dir.path());
    store.create_new_slot(0, "Nova").unwrap();

    let path = store.slot_file_path(0).unwrap();
    let bytes = fs::read(&path).unwrap();
    fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

    assert!(store.load_slot(0).is_err());
    assert!(!store.has_loaded_slot());
}

#[timeout(5000)]
#[test]
fn test_delete_slot() {
    let temp_dir = tempdir().unwrap();
    let mut store = new_store(temp_dir.path());

    store.create_new_slot(2, "Nova").unwrap();
    assert!(store.does_slot_exist(2));

    store.delete_slot(2).unwrap();
    assert!(!store.does_slot_exist(2));
    assert!(!store.has_loaded_slot());
    assert!(matches!(store.load_slot(2), Err(SaveError::SlotNotFound(2))));
    assert!(matches!(store.save_slot(2), Err(SaveError::NoActiveSlot)));

    // Slot can be created again once deleted
    store.create_new_slot(2, "Vega").unwrap();
    assert_eq!(store.get_slot_info(2).player_name, "Vega");
}

#[timeout(5000)]
#[test]
fn test_close_is_idempotent() {
    let temp_dir = tempdir().unwrap();
    let mut store = new_store(temp_dir.path());

    store.close_current_slot();
    store.create_new_slot(0, "Nova").unwrap();
    store.close_current_slot();
    store.close_current_slot();

    assert!(!store.has_loaded_slot());
    assert_eq!(store.current_slot(), None);
    assert!(store.does_slot_exist(0));
}

#[timeout(5000)]
#[test]
fn test_committed_transaction_persists() {
    let temp_dir = tempdir().unwrap();
    let mut store = new_store(temp_dir.path());
    store.create_new_slot(0, "Nova").unwrap();

    store.begin_transaction().unwrap();
    for i in 0..100 {
        store.set_int(&format!("item_{i:03}"), i).unwrap();
    }
    store.commit_transaction().unwrap();
    store.save_slot(0).unwrap();

    let mut reopened = new_store(temp_dir.path());
    reopened.load_slot(0).unwrap();
    assert_eq!(reopened.keys().unwrap().len(), 100);
    assert_eq!(reopened.get_int("item_042", -1), 42);
}

#[timeout(5000)]
#[test]
fn test_save_refused_inside_transaction() {
    let temp_dir = tempdir().unwrap();
    let mut store = new_store(temp_dir.path());
    store.create_new_slot(0, "Nova").unwrap();
    store.set_int("gold", 10).unwrap();
    store.save_slot(0).unwrap();

    store.begin_transaction().unwrap();
    store.set_int("gold", 99).unwrap();
    assert!(matches!(store.save_slot(0), Err(SaveError::Transaction(_))));
    assert!(store.in_transaction());
    store.rollback_transaction().unwrap();
    assert_eq!(store.get_int("gold", -1), 10);

    let mut reopened = new_store(temp_dir.path());
    reopened.load_slot(0).unwrap();
    assert_eq!(reopened.get_int("gold", -1), 10);

    store.save_slot(0).unwrap();
}

#[timeout(5000)]
#[test]
fn test_initialize_creates_nested_directory() {
    let temp_dir = tempdir().unwrap();
    let nested = temp_dir.path().join("profiles").join("default");

    let mut store = SaveStore::new(SaveConfig::default());
    store.initialize_at(&nested).unwrap();
    assert!(nested.is_dir());
    // Already existing is fine
    store.initialize().unwrap();

    let blocker = temp_dir.path().join("file");
    fs::write(&blocker, b"x").unwrap();
    assert!(store.initialize_at(blocker.join("saves")).is_err());
}

#[timeout(5000)]
#[test]
fn test_custom_slot_count_and_extension() {
    let temp_dir = tempdir().unwrap();
    let config = SaveConfig {
        save_dir: temp_dir.path().to_path_buf(),
        max_slots: 5,
        slot_extension: ".sav".to_string(),
        compression_level: 1,
    };
    let mut store = SaveStore::new(config);
    store.initialize().unwrap();

    store.create_new_slot(4, "Nova").unwrap();
    assert!(temp_dir.path().join("slot4.sav").exists());
    assert_eq!(store.get_all_slots().len(), 5);
}
