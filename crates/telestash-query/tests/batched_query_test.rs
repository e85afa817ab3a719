use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use serde_json::json;
use telestash_core::JSON_CONTENT_TYPE;
use telestash_query::{QueryFilter, QueryService, DEFAULT_BATCH_SIZE};
use telestash_storage::MemoryBlobStore;

#[tokio::test]
async fn test_query_spanning_several_batches() {
    let store = Arc::new(MemoryBlobStore::new("telemetry"));
    let base = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

    // 250 readings one minute apart, names sort in insertion order
    for i in 0..250 {
        store
            .insert_at(
                &format!("sensor-7_{:04}.json", i),
                format!(r#"{{"DeviceUID":"sensor-7","seq":{}}}"#, i),
                JSON_CONTENT_TYPE,
                base + Duration::minutes(i),
            )
            .await;
    }
    // One corrupt blob in the middle batch
    store
        .insert_at(
            "sensor-7_0150.json",
            "{\"seq\":",
            JSON_CONTENT_TYPE,
            base + Duration::minutes(150),
        )
        .await;

    let service = QueryService::new(store);
    assert_eq!(service.batch_size(), DEFAULT_BATCH_SIZE);

    let filter = QueryFilter::new(
        base + Duration::minutes(10),
        base + Duration::minutes(239),
        Some("sensor-7".to_string()),
    );
    let documents = service.query(&filter).await.unwrap();

    // Both bounds are inclusive
    assert_eq!(documents.len(), 230);
    assert_eq!(documents[0], json!({"DeviceUID": "sensor-7", "seq": 10}));
    assert_eq!(documents[229], json!({"DeviceUID": "sensor-7", "seq": 239}));

    let errors: Vec<usize> = documents
        .iter()
        .enumerate()
        .filter(|(_, d)| d.get("error").is_some())
        .map(|(i, _)| i)
        .collect();
    assert_eq!(errors, vec![140]);
}

#[tokio::test]
async fn test_query_unknown_device_is_empty() {
    let store = Arc::new(MemoryBlobStore::new("telemetry"));
    let now = Utc::now();
    store.insert_at("dev1_a.json", "{}", JSON_CONTENT_TYPE, now).await;

    let service = QueryService::new(store);
    let documents = service
        .query(&QueryFilter::new(
            now - Duration::hours(1),
            now + Duration::hours(1),
            Some("dev9".to_string()),
        ))
        .await
        .unwrap();

    assert!(documents.is_empty());
}
