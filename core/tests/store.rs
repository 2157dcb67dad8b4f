//! Store locking behavior across connections.

use civicroute_core::store::CivicStore;
use std::thread;
use std::time::Duration;

/// Two connections writing at once: the second waits for the first
/// transaction to commit instead of failing with a busy error.
#[test]
fn overlapping_writers_wait_for_the_lock() {
    let _ = env_logger::builder().is_test(true).try_init();
    let path = std::env::temp_dir().join(format!("civicroute-lock-test-{}.db", std::process::id()));
    let path_str = path.to_string_lossy().into_owned();
    let _ = std::fs::remove_file(&path);

    let store = CivicStore::open(&path_str).unwrap();
    store.migrate().unwrap();
    let other = store.reopen().unwrap();

    let writer = thread::spawn(move || {
        store.with_tx(|tx| {
            tx.insert_department("Public Works Department")?;
            thread::sleep(Duration::from_millis(300));
            Ok(())
        })
    });
    // Let the first transaction take the write lock before contending.
    thread::sleep(Duration::from_millis(50));
    other
        .with_tx(|tx| tx.insert_department("Water Supply and Sewerage").map(|_| ()))
        .unwrap();
    writer.join().unwrap().unwrap();

    assert!(other.department_name(1).unwrap().is_some());
    assert!(other.department_name(2).unwrap().is_some());

    let _ = std::fs::remove_file(&path);
    let _ = std::fs::remove_file(path.with_extension("db-wal"));
    let _ = std::fs::remove_file(path.with_extension("db-shm"));
}
