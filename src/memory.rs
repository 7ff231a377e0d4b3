use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures_util::stream;
use parking_lot::RwLock;

use crate::{
    BucketSummary, ByteStream, ObjectStore, ObjectSummary, OssError, OssResult, PutOutcome,
};

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    content_type: String,
    etag: String,
    last_modified: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct MemoryBucket {
    created_at: DateTime<Utc>,
    // BTreeMap keeps listings in key order, independent of insertion order
    objects: BTreeMap<String, StoredObject>,
}

/// In-memory backend for testing and development.
///
/// Keys and payloads live in process memory; URLs use the `memory://` scheme.
/// The recursive listing flag is accepted and treated as a plain prefix
/// filter, the closest this backend has to delimiter semantics.
#[derive(Default)]
pub struct MemoryStore {
    buckets: RwLock<HashMap<String, MemoryBucket>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content type recorded for `key`, for inspection in tests
    pub fn content_type_of(&self, bucket: &str, key: &str) -> Option<String> {
        let buckets = self.buckets.read();
        let stored = buckets.get(bucket)?.objects.get(key)?;
        Some(stored.content_type.clone())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn bucket_exists(&self, bucket: &str) -> OssResult<bool> {
        Ok(self.buckets.read().contains_key(bucket))
    }

    async fn create_bucket(&self, bucket: &str) -> OssResult<()> {
        let mut buckets = self.buckets.write();
        buckets.entry(bucket.to_string()).or_insert_with(|| MemoryBucket {
            created_at: Utc::now(),
            objects: BTreeMap::new(),
        });
        Ok(())
    }

    async fn list_buckets(&self) -> OssResult<Vec<BucketSummary>> {
        let buckets = self.buckets.read();
        let mut summaries: Vec<BucketSummary> = buckets
            .iter()
            .map(|(name, bucket)| BucketSummary {
                name: name.clone(),
                created_at: Some(bucket.created_at),
            })
            .collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(summaries)
    }

    async fn delete_bucket(&self, bucket: &str) -> OssResult<()> {
        let mut buckets = self.buckets.write();
        match buckets.get(bucket) {
            None => Err(OssError::not_found(format!("bucket {}", bucket))),
            Some(existing) if !existing.objects.is_empty() => Err(OssError::backend(
                std::io::Error::new(std::io::ErrorKind::Other, "bucket is not empty"),
            )),
            Some(_) => {
                buckets.remove(bucket);
                Ok(())
            }
        }
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
        content_length: u64,
    ) -> OssResult<PutOutcome> {
        let mut buckets = self.buckets.write();
        let target = buckets
            .get_mut(bucket)
            .ok_or_else(|| OssError::not_found(format!("bucket {}", bucket)))?;
        let etag = format!("{:x}", md5::compute(&body));
        target.objects.insert(
            key.to_string(),
            StoredObject {
                data: body,
                content_type: content_type.to_string(),
                etag: etag.clone(),
                last_modified: Utc::now(),
            },
        );
        Ok(PutOutcome {
            etag: Some(etag),
            version_id: None,
            size_bytes: content_length,
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> OssResult<ByteStream> {
        let buckets = self.buckets.read();
        let stored = buckets
            .get(bucket)
            .and_then(|b| b.objects.get(key))
            .ok_or_else(|| OssError::not_found(format!("{}/{}", bucket, key)))?;
        let chunk: Result<Bytes, std::io::Error> = Ok(stored.data.clone());
        Ok(Box::pin(stream::once(async move { chunk })))
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> OssResult<()> {
        let mut buckets = self.buckets.write();
        if let Some(target) = buckets.get_mut(bucket) {
            target.objects.remove(key);
        }
        Ok(())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        _recursive: bool,
    ) -> OssResult<Vec<ObjectSummary>> {
        let buckets = self.buckets.read();
        let target = buckets
            .get(bucket)
            .ok_or_else(|| OssError::not_found(format!("bucket {}", bucket)))?;
        let summaries = target
            .objects
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, stored)| ObjectSummary {
                key: key.clone(),
                size_bytes: stored.data.len() as u64,
                last_modified: Some(stored.last_modified),
                etag: Some(stored.etag.clone()),
            })
            .collect();
        Ok(summaries)
    }

    async fn object_url(&self, bucket: &str, key: &str) -> OssResult<String> {
        Ok(format!("memory://{}/{}", bucket, key))
    }

    async fn presigned_url(
        &self,
        bucket: &str,
        key: &str,
        expires_at: DateTime<Utc>,
    ) -> OssResult<String> {
        Ok(format!(
            "memory://{}/{}?X-Amz-Expires={}",
            bucket,
            key,
            expires_at.timestamp()
        ))
    }
}
