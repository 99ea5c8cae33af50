//! Tests for Q-table persistence.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use smb_ram_rl::qtable::backup_file_name;
use smb_ram_rl::{Action, DiscretizedState, QTable, QTableConfig, QTableError};

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "smb_ram_rl_{name}_{}_{}",
        std::process::id(),
        DIR_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn config() -> QTableConfig {
    QTableConfig {
        vision_range: 2,
        ..Default::default()
    }
}

// ============== Initialize ==============

#[test]
fn test_initialize_size_for_default_range() {
    let config = QTableConfig::default();
    let table = QTable::initialize(&config).unwrap();
    assert_eq!(table.len(), (config.vision_range as usize + 2).pow(5));
    assert!(
        table
            .iter()
            .all(|(_, values)| values.len() == Action::COUNT && values.iter().all(|&v| v == 0.0))
    );
}

// ============== Save / Load ==============

#[test]
fn test_save_then_load_round_trips() {
    let dir = scratch_dir("roundtrip");
    let path = dir.join("qTable.json");
    let mut table = QTable::initialize(&config()).unwrap();
    let s = DiscretizedState([0, 1, 2, 16, 0]);
    let next = DiscretizedState([1, 1, 2, 16, 0]);
    table.update(&s, &next, Action::Jump, 0.9, 0.1, 1.0 / 3.0).unwrap();
    table.update(&next, &s, Action::Right, 0.9, 0.25, -2.75).unwrap();

    table.save(&path).unwrap();
    let loaded = QTable::load(&path, &config()).unwrap();
    assert_eq!(loaded, table);
    assert!(!dir.join("qTable.json.tmp").exists());
}

#[test]
fn test_save_overwrites_existing_file() {
    let dir = scratch_dir("overwrite");
    let path = dir.join("qTable.json");
    std::fs::write(&path, "stale content that is much longer than nothing").unwrap();
    let table = QTable::initialize(&config()).unwrap();
    table.save(&path).unwrap();
    assert_eq!(QTable::load(&path, &config()).unwrap(), table);
}

#[test]
fn test_load_accepts_integer_values() {
    let dir = scratch_dir("ints");
    let path = dir.join("qTable.json");
    std::fs::write(&path, r#"{"(0, 0, 0, 0, 0)": {"0": 0, "1": 3}}"#).unwrap();
    let table = QTable::load(&path, &config()).unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(
        table.values(&DiscretizedState([0, 0, 0, 0, 0])).unwrap(),
        &[0.0, 3.0]
    );
}

#[test]
fn test_load_falls_back_on_missing_empty_or_corrupt() {
    let dir = scratch_dir("fallback");
    let fresh = QTable::initialize(&config()).unwrap();

    let missing = dir.join("missing.json");
    assert_eq!(QTable::load(&missing, &config()).unwrap(), fresh);

    let cases = [
        ("empty_file.json", ""),
        ("empty_object.json", "{}"),
        ("garbage.json", "{not json"),
        ("bad_key.json", r#"{"zero": {"0": 0.0, "1": 0.0}}"#),
        ("one_slot.json", r#"{"(0, 0, 0, 0, 0)": {"0": 1.0}}"#),
        ("wrong_slot.json", r#"{"(0, 0, 0, 0, 0)": {"0": 1.0, "2": 1.0}}"#),
    ];
    for (name, contents) in cases {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        assert_eq!(QTable::load(&path, &config()).unwrap(), fresh, "{name}");
    }

    let not_utf8 = dir.join("not_utf8.json");
    std::fs::write(&not_utf8, [0xFF, 0xFE, 0x7B]).unwrap();
    assert_eq!(QTable::load(&not_utf8, &config()).unwrap(), fresh);
}

#[test]
fn test_load_propagates_unreadable_file() {
    let dir = scratch_dir("unreadable");
    let table_path = dir.join("qTable.json");
    std::fs::create_dir(&table_path).unwrap();

    assert!(matches!(
        QTable::load(&table_path, &config()),
        Err(QTableError::Io { .. })
    ));
    assert!(table_path.is_dir());
}

#[test]
fn test_save_into_missing_directory_fails() {
    let dir = scratch_dir("nodir");
    let path = dir.join("absent").join("qTable.json");
    let table = QTable::initialize(&config()).unwrap();
    assert!(matches!(table.save(&path), Err(QTableError::Io { .. })));
}

// ============== Backup ==============

#[test]
fn test_backups_fill_suffixes_without_gaps() {
    let dir = scratch_dir("backup");
    let backup_dir = dir.join("backup");
    let table = QTable::initialize(&config()).unwrap();

    for expected in 0..4u64 {
        let path = table.backup(&backup_dir).unwrap();
        assert_eq!(path, backup_dir.join(backup_file_name(expected)));
    }

    let mut names: Vec<String> = std::fs::read_dir(&backup_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "qTable_backup_0.json",
            "qTable_backup_1.json",
            "qTable_backup_2.json",
            "qTable_backup_3.json",
        ]
    );

    let restored = QTable::load(backup_dir.join(backup_file_name(2)), &config()).unwrap();
    assert_eq!(restored, table);
}

#[test]
fn test_backup_reuses_lowest_free_suffix() {
    let dir = scratch_dir("backup_gap");
    std::fs::write(dir.join(backup_file_name(0)), "{}").unwrap();
    std::fs::write(dir.join(backup_file_name(2)), "{}").unwrap();
    std::fs::write(dir.join("notes.txt"), "unrelated").unwrap();

    let table = QTable::initialize(&config()).unwrap();
    assert_eq!(table.backup(&dir).unwrap(), dir.join(backup_file_name(1)));
    assert_eq!(table.backup(&dir).unwrap(), dir.join(backup_file_name(3)));
    assert_eq!(std::fs::read_to_string(dir.join(backup_file_name(0))).unwrap(), "{}");
}

#[test]
fn test_backup_ignores_zero_padded_names() {
    let dir = scratch_dir("backup_padded");
    std::fs::write(dir.join("qTable_backup_01.json"), "{}").unwrap();

    let table = QTable::initialize(&config()).unwrap();
    assert_eq!(table.backup(&dir).unwrap(), dir.join(backup_file_name(0)));
    assert_eq!(table.backup(&dir).unwrap(), dir.join(backup_file_name(1)));
    assert_eq!(std::fs::read_to_string(dir.join("qTable_backup_01.json")).unwrap(), "{}");
}
