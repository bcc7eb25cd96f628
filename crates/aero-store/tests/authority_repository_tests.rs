#![allow(clippy::unwrap_used, clippy::expect_used)]

// Integration tests for the SQLite-backed Authority repository

use aero_core::logging_facility::init_test_capture;
use aero_core::{Authority, PageRequest, Repository, Sort, StorageErrorKind};
use aero_core_types::schema::{EVENT_END_ERROR, FIELD_BACKEND, FIELD_ERR_CODE, FIELD_REQUEST_ID};
use aero_store::{open_authority_repository, SqliteRepository, StoreConfig};
use rusqlite::Connection;
use tempfile::TempDir;

fn memory_repo() -> SqliteRepository<Authority> {
    open_authority_repository(&StoreConfig::in_memory()).unwrap()
}

fn file_config(dir: &TempDir) -> StoreConfig {
    StoreConfig::at_path(dir.path().join("aero.db"))
}

fn key(id: &str) -> String {
    id.to_string()
}

#[test]
fn test_upsert_replaces_whole_record() {
    let repo = memory_repo();
    repo.save(Authority::new("A1", "Alpha")).unwrap();
    repo.save(Authority::new("A1", "Alpha-2")).unwrap();

    assert_eq!(
        repo.find_by_key(&key("A1")).unwrap(),
        Some(Authority::new("A1", "Alpha-2"))
    );
    assert_eq!(repo.count().unwrap(), 1);
}

#[test]
fn test_delete_then_list() {
    let repo = memory_repo();
    repo.save(Authority::new("B1", "Bravo")).unwrap();
    repo.save(Authority::new("B2", "Bravo-2")).unwrap();
    repo.delete_by_key(&key("B1")).unwrap();

    let all = repo.find_all(None).unwrap().into_content();
    assert_eq!(all, vec![Authority::new("B2", "Bravo-2")]);
}

#[test]
fn test_absence_is_not_an_error() {
    let repo = memory_repo();
    assert_eq!(repo.find_by_key(&key("ghost")).unwrap(), None);
    assert!(!repo.exists_by_key(&key("ghost")).unwrap());
    repo.delete_by_key(&key("ghost")).unwrap();
    repo.delete(&Authority::new("ghost", "")).unwrap();
}

#[test]
fn test_delete_all_and_count() {
    let repo = memory_repo();
    repo.save_all(vec![
        Authority::new("ROLE_ADMIN", "Administrator"),
        Authority::new("ROLE_USER", "User"),
    ])
    .unwrap();
    assert_eq!(repo.count().unwrap(), 2);

    repo.delete_all().unwrap();
    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn test_records_survive_reopen() {
    // Given: a file-backed repository with one record
    let dir = TempDir::new().unwrap();
    let config = file_config(&dir);
    {
        let repo = open_authority_repository(&config).unwrap();
        repo.save(Authority::new("ROLE_ADMIN", "Administrator")).unwrap();
    }

    // When: the database is opened again
    let repo = open_authority_repository(&config).unwrap();

    // Then: the record is still there
    assert_eq!(
        repo.find_by_key(&key("ROLE_ADMIN")).unwrap(),
        Some(Authority::new("ROLE_ADMIN", "Administrator"))
    );
}

#[test]
fn test_paged_sorted_listing() {
    let repo = memory_repo();
    for (id, name) in [("R1", "delta"), ("R2", "alpha"), ("R3", "charlie"), ("R4", "alpha"), ("R5", "bravo")] {
        repo.save(Authority::new(id, name)).unwrap();
    }

    let request = PageRequest::of_size(0, 3).with_sort(Sort::asc("name"));
    let first = repo.find_all(Some(&request)).unwrap();
    let ids: Vec<&str> = first.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["R2", "R4", "R5"]);
    assert_eq!(first.total(), 5);
    assert!(first.has_next());

    let request = PageRequest::of_size(1, 3).with_sort(Sort::asc("name"));
    let second = repo.find_all(Some(&request)).unwrap();
    let ids: Vec<&str> = second.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["R3", "R1"]);
    assert!(!second.has_next());

    let request = PageRequest::new(0, 2).with_sort(Sort::desc("id"));
    let ids: Vec<String> = repo
        .find_all(Some(&request))
        .unwrap()
        .into_iter()
        .map(|a| a.id)
        .collect();
    assert_eq!(ids, vec!["R5", "R4"]);
}

#[test]
fn test_zero_size_page_ends_walk() {
    let repo = memory_repo();
    repo.save(Authority::new("Z1", "Zulu")).unwrap();

    for number in 0..3 {
        let page = repo
            .find_all(Some(&PageRequest::of_size(number, 0)))
            .unwrap();
        assert!(page.is_empty());
        assert_eq!(page.total(), 1);
        assert!(!page.has_next());
    }
}

#[test]
fn test_failed_operation_tags_error_with_logged_request_id() {
    let capture = init_test_capture();
    let repo = memory_repo();

    let request = PageRequest::unpaged().with_sort(Sort::asc("request_id_column"));
    let err = repo.find_all(Some(&request)).unwrap_err();
    let id = err.request_id().expect("request id attached");

    let logged = capture.count_events(|e| {
        e.event.as_deref() == Some(EVENT_END_ERROR)
            && e.field(FIELD_BACKEND) == Some("sqlite")
            && e.field(FIELD_REQUEST_ID) == Some(id.as_str())
    });
    assert_eq!(logged, 1);
}

#[test]
fn test_sort_on_unknown_property_rejected() {
    let capture = init_test_capture();
    let repo = memory_repo();

    let request = PageRequest::unpaged().with_sort(Sort::asc("name; DROP TABLE authority"));
    let err = repo.find_all(Some(&request)).unwrap_err();
    assert_eq!(err.kind(), StorageErrorKind::InvalidSort);

    assert!(capture
        .events_for("find_all", EVENT_END_ERROR)
        .iter()
        .any(|e| e.field(FIELD_ERR_CODE) == Some("ERR_INVALID_SORT")));
    // table untouched
    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn test_find_all_by_keys_across_chunks() {
    let repo = memory_repo();
    let authorities: Vec<Authority> = (0..1_200)
        .map(|i| Authority::new(format!("K{:05}", i), format!("role {}", i)))
        .collect();
    repo.save_all(authorities).unwrap();

    let mut keys: Vec<String> = (0..1_200).rev().step_by(2).map(|i| format!("K{:05}", i)).collect();
    keys.push("missing".to_string());
    keys.push("K00001".to_string());

    let found = repo.find_all_by_keys(&keys).unwrap();
    assert_eq!(found.len(), 600);
    assert!(found.windows(2).all(|w| w[0].id < w[1].id));
    assert_eq!(found.first().unwrap().id, "K00001");
}

#[test]
fn test_constraint_violation_surfaces_and_batch_rolls_back() {
    // Given: a backing-store rule the repository knows nothing about
    let dir = TempDir::new().unwrap();
    let config = file_config(&dir);
    let repo = open_authority_repository(&config).unwrap();
    let raw = Connection::open(config.path.as_ref().unwrap()).unwrap();
    raw.execute_batch(
        "CREATE TRIGGER authority_name_required BEFORE INSERT ON authority
         WHEN NEW.name = ''
         BEGIN SELECT RAISE(ABORT, 'authority name required'); END;",
    )
    .unwrap();
    drop(raw);

    // When: a batch contains one offending record
    let err = repo
        .save_all(vec![
            Authority::new("OK_1", "fine"),
            Authority::new("BAD", ""),
        ])
        .unwrap_err();

    // Then: the failure is a constraint violation and nothing was written
    assert_eq!(err.kind(), StorageErrorKind::ConstraintViolation);
    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn test_busy_database_times_out() {
    let dir = TempDir::new().unwrap();
    let config = StoreConfig {
        busy_timeout_ms: 50,
        ..file_config(&dir)
    };
    let repo = open_authority_repository(&config).unwrap();

    // Another writer holds the write lock
    let blocker = Connection::open(config.path.as_ref().unwrap()).unwrap();
    blocker.execute_batch("BEGIN EXCLUSIVE").unwrap();

    let err = repo.save(Authority::new("A1", "Alpha")).unwrap_err();
    assert_eq!(err.kind(), StorageErrorKind::Timeout);

    blocker.execute_batch("ROLLBACK").unwrap();
    repo.save(Authority::new("A1", "Alpha")).unwrap();
    assert!(repo.exists_by_key(&key("A1")).unwrap());
}

#[test]
fn test_shared_across_threads() {
    use std::sync::Arc;

    let repo = Arc::new(memory_repo());
    let handles: Vec<_> = (0..4)
        .map(|t| {
            let repo = Arc::clone(&repo);
            std::thread::spawn(move || {
                for i in 0..25 {
                    repo.save(Authority::new(format!("T{}-{:02}", t, i), "threaded"))
                        .unwrap();
                }
                repo.save(Authority::new("SHARED", format!("writer {}", t)))
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(repo.count().unwrap(), 101);
}
