use super::*;

async fn mem_storage() -> Storage {
    Storage::new("sqlite::memory:").await.expect("db")
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = mem_storage().await;
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let suffix = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = std::env::temp_dir().join(format!("wellvol_storage_test_{suffix}"));
    let db_path = temp_root.join("nested").join("results.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );

    std::fs::remove_dir_all(temp_root).expect("cleanup");
}

#[tokio::test]
async fn inserts_and_fetches_a_result() {
    let storage = mem_storage().await;
    let id = storage
        .insert("Springfield", "Well 7", 201.9, 1.3)
        .await
        .expect("insert");
    assert!(id.0 > 0);

    let result = storage.get(id).await.expect("get").expect("present");
    assert_eq!(result.id, id);
    assert_eq!(result.location_name, "Springfield");
    assert_eq!(result.site_name, "Well 7");
    assert_eq!(result.volume_liters, 201.9);
    assert_eq!(result.volume_barrels, 1.3);
    assert!(!result.recorded_at.is_empty());
}

#[tokio::test]
async fn lists_newest_first() {
    let storage = mem_storage().await;
    let first = storage.insert("a", "w1", 1.0, 0.1).await.expect("first");
    let second = storage.insert("b", "w2", 2.0, 0.2).await.expect("second");
    let third = storage.insert("c", "w3", 3.0, 0.3).await.expect("third");

    let results = storage.list_all().await.expect("list");
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].id, third);
    assert_eq!(results[1].id, second);
    assert_eq!(results[2].id, first);
}

#[tokio::test]
async fn trims_to_retention_cap_on_insert() {
    let storage = mem_storage().await;
    let mut ids = Vec::new();
    for i in 0..16 {
        let id = storage
            .insert("loc", "site", f64::from(i), 0.0)
            .await
            .expect("insert");
        ids.push(id);
    }

    let results = storage.list_all().await.expect("list");
    assert_eq!(results.len(), 15);
    assert_eq!(storage.count().await.expect("count"), 15);

    // The very first insert is gone; the 15 most recent survive.
    let surviving: Vec<ResultId> = results.iter().map(|r| r.id).collect();
    assert!(!surviving.contains(&ids[0]));
    for id in &ids[1..] {
        assert!(surviving.contains(id));
    }
    assert!(storage.get(ids[0]).await.expect("get").is_none());
}

#[tokio::test]
async fn ids_keep_increasing_after_trim() {
    let storage = mem_storage().await;
    let mut last = ResultId(0);
    for i in 0..20 {
        let id = storage
            .insert("loc", "site", f64::from(i), 0.0)
            .await
            .expect("insert");
        assert!(id.0 > last.0, "ids must be monotonically increasing");
        last = id;
    }
}

#[tokio::test]
async fn delete_then_get_is_absent() {
    let storage = mem_storage().await;
    let id = storage.insert("loc", "site", 5.0, 0.1).await.expect("insert");

    assert!(storage.delete(id).await.expect("delete"));
    assert!(storage.get(id).await.expect("get").is_none());
}

#[tokio::test]
async fn deleting_unknown_id_reports_absence_without_failing() {
    let storage = mem_storage().await;
    assert!(!storage.delete(ResultId(9999)).await.expect("delete"));
}

#[tokio::test]
async fn update_overwrites_fields_and_refreshes_timestamp() {
    let storage = mem_storage().await;
    let id = storage
        .insert("Springfield", "Well 7", 201.9, 1.3)
        .await
        .expect("insert");
    let before = storage.get(id).await.expect("get").expect("present");

    // recorded_at has one-second resolution; wait for a distinct value.
    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

    assert!(storage
        .update(id, "Shelbyville", "Well 9", 300.0, 1.9)
        .await
        .expect("update"));

    let after = storage.get(id).await.expect("get").expect("present");
    assert_eq!(after.location_name, "Shelbyville");
    assert_eq!(after.site_name, "Well 9");
    assert_eq!(after.volume_liters, 300.0);
    assert_eq!(after.volume_barrels, 1.9);
    assert_ne!(after.recorded_at, before.recorded_at);
}

#[tokio::test]
async fn update_takes_both_volumes_verbatim() {
    // An edit may break the liters/barrels ratio; the store must not re-derive.
    let storage = mem_storage().await;
    let id = storage.insert("loc", "site", 158.987, 1.0).await.expect("insert");

    assert!(storage
        .update(id, "loc", "site", 158.987, 42.0)
        .await
        .expect("update"));

    let result = storage.get(id).await.expect("get").expect("present");
    assert_eq!(result.volume_liters, 158.987);
    assert_eq!(result.volume_barrels, 42.0);
}

#[tokio::test]
async fn updating_unknown_id_reports_absence() {
    let storage = mem_storage().await;
    assert!(!storage
        .update(ResultId(9999), "loc", "site", 1.0, 0.1)
        .await
        .expect("update"));
}
