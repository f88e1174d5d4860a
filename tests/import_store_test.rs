// ==========================================
// ImportStore 集成测试（文件数据库）
// ==========================================
// 测试目标: 映射按表格持久化 / 历史上限 / 登出语义 / 重新打开
// ==========================================

mod test_helpers;

use chrono::{Duration, Utc};
use product_sheet_importer::domain::{ImportHistoryEntry, JobState, LogicalField};
use product_sheet_importer::repository::{ImportStore, KvStore};
use product_sheet_importer::HISTORY_LIMIT;
use test_helpers::{col, create_test_db, create_test_store, mapping_abc, test_session};

fn history_entry(index: usize) -> ImportHistoryEntry {
    ImportHistoryEntry {
        entry_id: format!("entry-{}", index),
        imported_at: Utc::now() + Duration::seconds(index as i64),
        total_products: index * 10,
        spreadsheet_id: "sheet-x".to_string(),
        spreadsheet_name: Some("Catalog".to_string()),
        job_id: Some(format!("job-{}", index)),
        status: JobState::Queued,
    }
}

#[test]
fn test_mapping_roundtrip_per_spreadsheet() {
    let (_temp_file, store) = create_test_store();
    let mapping = mapping_abc().with(LogicalField::Msrp, col('H'));

    store.save_mapping("sheet-x", &mapping).unwrap();

    assert_eq!(store.load_mapping("sheet-x").unwrap(), Some(mapping));
    assert_eq!(store.load_mapping("sheet-y").unwrap(), None);
}

#[test]
fn test_mapping_survives_reopen() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    {
        let store = ImportStore::new(KvStore::new(&db_path).unwrap());
        store.save_mapping("sheet-x", &mapping_abc()).unwrap();
        store.save_session(&test_session()).unwrap();
    }

    let reopened = ImportStore::new(KvStore::new(&db_path).unwrap());
    assert_eq!(reopened.load_mapping("sheet-x").unwrap(), Some(mapping_abc()));
    assert_eq!(reopened.load_session().unwrap(), Some(test_session()));
}

#[test]
fn test_history_keeps_newest_ten() {
    let (_temp_file, store) = create_test_store();
    for index in 0..12 {
        store.append_history(history_entry(index)).unwrap();
    }

    let history = store.list_history().unwrap();
    assert_eq!(history.len(), HISTORY_LIMIT);
    assert_eq!(history[0].entry_id, "entry-11");
    assert_eq!(history[9].entry_id, "entry-2");
}

#[test]
fn test_update_history_status_by_job() {
    let (_temp_file, store) = create_test_store();
    store.append_history(history_entry(1)).unwrap();
    store.append_history(history_entry(2)).unwrap();

    assert!(store.update_history_status("job-1", JobState::Completed).unwrap());
    assert!(!store.update_history_status("job-missing", JobState::Failed).unwrap());

    let history = store.list_history().unwrap();
    assert_eq!(history[0].status, JobState::Queued);
    assert_eq!(history[1].status, JobState::Completed);
}

#[test]
fn test_logout_clears_credentials_and_mappings_keeps_history() {
    let (_temp_file, store) = create_test_store();
    store.save_session(&test_session()).unwrap();
    store.save_mapping("sheet-x", &mapping_abc()).unwrap();
    store.save_mapping("sheet-y", &mapping_abc()).unwrap();
    store.append_history(history_entry(1)).unwrap();

    store.logout().unwrap();

    assert_eq!(store.load_session().unwrap(), None);
    assert_eq!(store.load_mapping("sheet-x").unwrap(), None);
    assert_eq!(store.load_mapping("sheet-y").unwrap(), None);
    assert_eq!(store.list_history().unwrap().len(), 1);
}

#[test]
fn test_store_creates_missing_parent_directory() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("importer.db");

    let store = ImportStore::new(KvStore::new(db_path.to_str().unwrap()).unwrap());
    store.save_mapping("sheet-x", &mapping_abc()).unwrap();

    assert!(db_path.exists());
}
