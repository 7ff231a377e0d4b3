use std::io::{Cursor, Read};
use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use futures::StreamExt;

use pail::{
    compose_zip, ByteStream, MemoryStore, ObjectPut, OssError, StoreAdapter, DEFAULT_CONTENT_TYPE,
};

/// Test factory functions
fn adapter() -> StoreAdapter {
    StoreAdapter::new(MemoryStore::new())
}

fn body(data: &[u8]) -> ByteStream {
    chunked(&[data])
}

fn chunked(parts: &[&[u8]]) -> ByteStream {
    let items: Vec<Result<Bytes, std::io::Error>> = parts
        .iter()
        .map(|part| Ok(Bytes::copy_from_slice(part)))
        .collect();
    Box::pin(futures::stream::iter(items))
}

async fn read_all(mut stream: ByteStream) -> Vec<u8> {
    let mut out = Vec::new();
    while let Some(chunk) = stream.next().await {
        out.extend_from_slice(&chunk.expect("stream chunk"));
    }
    out
}

/// A1. Bucket lifecycle
#[tokio::test]
async fn create_bucket_is_idempotent() {
    let store = adapter();

    store.create_bucket("logo").await.unwrap();
    store.create_bucket("logo").await.unwrap();

    let buckets = store.list_buckets().await.unwrap();
    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0].name, "logo");
    assert!(buckets[0].created_at.is_some());
}

#[tokio::test]
async fn list_buckets_reports_all_created_buckets() {
    let store = adapter();
    store.create_bucket("beta").await.unwrap();
    store.create_bucket("alpha").await.unwrap();

    let names: Vec<String> = store
        .list_buckets()
        .await
        .unwrap()
        .into_iter()
        .map(|bucket| bucket.name)
        .collect();
    assert_eq!(names, vec!["alpha".to_string(), "beta".to_string()]);
}

#[tokio::test]
async fn remove_bucket_reports_not_found_when_absent() {
    let store = adapter();
    let err = store.remove_bucket("ghost").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn remove_bucket_refuses_non_empty_bucket() {
    let store = adapter();
    store.create_bucket("full").await.unwrap();
    store
        .put_object("full", "a.txt", None, body(b"x"), ObjectPut::new())
        .await
        .unwrap();

    let err = store.remove_bucket("full").await.unwrap_err();
    assert!(matches!(err, OssError::BackendUnavailable { .. }));
}

/// A2. Precondition violations
#[tokio::test]
async fn blank_identifiers_are_rejected() {
    let store = adapter();

    let err = store.create_bucket("  ").await.unwrap_err();
    assert!(matches!(err, OssError::InvalidArgument { .. }));

    let err = store
        .put_object("logo", "", None, body(b"x"), ObjectPut::new())
        .await
        .unwrap_err();
    assert!(matches!(err, OssError::InvalidArgument { .. }));

    let err = store.get_object("", "a.png", None).await.err().unwrap();
    assert!(matches!(err, OssError::InvalidArgument { .. }));

    let err = store.remove_object("logo", " ", None).await.unwrap_err();
    assert!(matches!(err, OssError::InvalidArgument { .. }));

    let err = store.object_url("logo", "", None).await.unwrap_err();
    assert!(matches!(err, OssError::InvalidArgument { .. }));
}

/// B1. Object round-trips
#[tokio::test]
async fn put_then_get_round_trips_identical_bytes() {
    let store = adapter();
    store.create_bucket("data").await.unwrap();

    let payload = b"spread over multiple chunks";
    let outcome = store
        .put_object(
            "data",
            "payload.bin",
            None,
            chunked(&[&payload[..6], &payload[6..12], &payload[12..]]),
            ObjectPut::new(),
        )
        .await
        .unwrap();
    assert_eq!(outcome.size_bytes, payload.len() as u64);
    assert!(outcome.etag.is_some());

    let stream = store.get_object("data", "payload.bin", None).await.unwrap();
    assert_eq!(read_all(stream).await, payload);
}

#[tokio::test]
async fn zero_length_payload_round_trips() {
    let store = adapter();
    store.create_bucket("data").await.unwrap();

    let outcome = store
        .put_object("data", "empty.bin", None, chunked(&[]), ObjectPut::new())
        .await
        .unwrap();
    assert_eq!(outcome.size_bytes, 0);

    let stream = store.get_object("data", "empty.bin", None).await.unwrap();
    assert!(read_all(stream).await.is_empty());
}

#[tokio::test]
async fn content_type_defaults_and_overrides() {
    let backend = Arc::new(MemoryStore::new());
    let store = StoreAdapter::with_shared(backend.clone());
    store.create_bucket("data").await.unwrap();

    store
        .put_object("data", "raw.bin", None, body(b"x"), ObjectPut::new())
        .await
        .unwrap();
    assert_eq!(
        backend.content_type_of("data", "raw.bin").as_deref(),
        Some(DEFAULT_CONTENT_TYPE)
    );

    store
        .put_object(
            "data",
            "a.png",
            Some("03/18"),
            body(b"x"),
            ObjectPut::new().with_content_type("image/png"),
        )
        .await
        .unwrap();
    assert_eq!(
        backend.content_type_of("data", "03/18/a.png").as_deref(),
        Some("image/png")
    );
}

/// B2. Key normalization agreement across operations
#[tokio::test]
async fn leading_separator_resolves_to_the_same_key_everywhere() {
    let store = adapter();
    store.create_bucket("logo").await.unwrap();

    // stored with a leading separator on the folder path
    store
        .put_object("logo", "a.png", Some("/03/18"), body(b"png"), ObjectPut::new())
        .await
        .unwrap();

    // retrieved without it
    let stream = store.get_object("logo", "a.png", Some("03/18")).await.unwrap();
    assert_eq!(read_all(stream).await, b"png");

    // both URL flavors reference the normalized key
    let url = store.object_url("logo", "a.png", Some("/03/18")).await.unwrap();
    assert_eq!(url, "memory://logo/03/18/a.png");

    // and delete agrees too
    store.remove_object("logo", "a.png", Some("03/18")).await.unwrap();
    let err = store.get_object("logo", "a.png", Some("/03/18")).await.err().unwrap();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn absent_folder_path_leaves_the_object_name_unchanged() {
    let store = adapter();
    store.create_bucket("logo").await.unwrap();
    store
        .put_object("logo", "plain.txt", None, body(b"t"), ObjectPut::new())
        .await
        .unwrap();

    let url = store.object_url("logo", "plain.txt", None).await.unwrap();
    assert_eq!(url, "memory://logo/plain.txt");
}

#[tokio::test]
async fn remove_object_on_missing_key_is_idempotent() {
    let store = adapter();
    store.create_bucket("logo").await.unwrap();

    store.remove_object("logo", "never-there.txt", None).await.unwrap();
    // and again, still no error
    store.remove_object("logo", "never-there.txt", None).await.unwrap();
}

#[tokio::test]
async fn get_object_reports_not_found() {
    let store = adapter();
    store.create_bucket("logo").await.unwrap();

    let err = store.get_object("logo", "missing.png", None).await.err().unwrap();
    assert!(err.is_not_found());
}

/// C1. Locators
#[tokio::test]
async fn permanent_and_presigned_urls_differ_only_in_expiry() {
    let store = adapter();
    store.create_bucket("logo").await.unwrap();
    store
        .put_object("logo", "a.png", Some("03/18"), body(b"png"), ObjectPut::new())
        .await
        .unwrap();

    let permanent = store.object_url("logo", "a.png", Some("03/18")).await.unwrap();
    assert_eq!(permanent, "memory://logo/03/18/a.png");

    let days = 2;
    let before = Utc::now().timestamp() + days * 24 * 60 * 60;
    let signed = store
        .presigned_object_url("logo", "a.png", Some("03/18"), days)
        .await
        .unwrap();
    let after = Utc::now().timestamp() + days * 24 * 60 * 60;

    let (base, query) = signed.split_once('?').expect("signed URL has a query");
    assert_eq!(base, permanent);
    let expires: i64 = query
        .strip_prefix("X-Amz-Expires=")
        .expect("expiry parameter")
        .parse()
        .unwrap();
    assert!(expires >= before && expires <= after);
}

/// C2. Listings
#[tokio::test]
async fn list_objects_by_prefix_filters_without_reordering() {
    let store = adapter();
    store.create_bucket("logs").await.unwrap();
    for key in ["04/01/c.log", "03/18/b.log", "03/18/a.log"] {
        store
            .put_object("logs", key, None, body(b"line"), ObjectPut::new())
            .await
            .unwrap();
    }

    let listed = store.list_objects_by_prefix("logs", "03/18", true).await.unwrap();
    let keys: Vec<&str> = listed.iter().map(|summary| summary.key.as_str()).collect();
    // backend order (lexicographic for the memory backend), untouched
    assert_eq!(keys, vec!["03/18/a.log", "03/18/b.log"]);
    assert!(listed.iter().all(|summary| summary.size_bytes == 4));
    assert!(listed.iter().all(|summary| summary.etag.is_some()));
}

/// D1. Retrieved streams feed the archive composer
#[tokio::test]
async fn retrieved_objects_bundle_into_one_archive() {
    let store = adapter();
    store.create_bucket("docs").await.unwrap();
    store
        .put_object("docs", "a.txt", None, body(b"alpha"), ObjectPut::new())
        .await
        .unwrap();
    store
        .put_object("docs", "b.txt", None, body(b"beta"), ObjectPut::new())
        .await
        .unwrap();

    let entries = vec![
        ("a.txt".to_string(), store.get_object("docs", "a.txt", None).await.unwrap()),
        ("b.txt".to_string(), store.get_object("docs", "b.txt", None).await.unwrap()),
    ];
    let archive = read_all(compose_zip(entries).await.unwrap()).await;

    let mut zip = zip::ZipArchive::new(Cursor::new(archive)).unwrap();
    assert_eq!(zip.len(), 2);
    let mut content = String::new();
    zip.by_name("a.txt").unwrap().read_to_string(&mut content).unwrap();
    assert_eq!(content, "alpha");
}
