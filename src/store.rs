use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::{BucketSummary, ByteStream, ObjectSummary, OssResult, PutOutcome};

/// Capability set every storage backend exposes to the facade.
///
/// Implementations hold their own client configuration (endpoint,
/// credentials, retries, timeouts) and are shared read-only behind an `Arc`,
/// so they must be safe for concurrent use.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Check whether `bucket` exists for the configured credential
    async fn bucket_exists(&self, bucket: &str) -> OssResult<bool>;

    /// Create `bucket`
    async fn create_bucket(&self, bucket: &str) -> OssResult<()>;

    /// List all buckets visible to the configured credential
    async fn list_buckets(&self) -> OssResult<Vec<BucketSummary>>;

    /// Delete `bucket`; the backend requires it to be empty
    async fn delete_bucket(&self, bucket: &str) -> OssResult<()>;

    /// Store a fully-buffered payload under `key`
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
        content_length: u64,
    ) -> OssResult<PutOutcome>;

    /// Open a stream over the content stored at `key`
    async fn get_object(&self, bucket: &str, key: &str) -> OssResult<ByteStream>;

    /// Delete `key`; deleting an absent key is not an error
    async fn delete_object(&self, bucket: &str, key: &str) -> OssResult<()>;

    /// List objects whose key starts with `prefix`, in backend order.
    ///
    /// `recursive` is an intent flag handed to the backend's own delimiter
    /// semantics; no implementation performs client-side expansion.
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        recursive: bool,
    ) -> OssResult<Vec<ObjectSummary>>;

    /// Permanent, unsigned locator for `key`
    async fn object_url(&self, bucket: &str, key: &str) -> OssResult<String>;

    /// Backend-signed locator valid until `expires_at`
    async fn presigned_url(
        &self,
        bucket: &str,
        key: &str,
        expires_at: DateTime<Utc>,
    ) -> OssResult<String>;
}
