use std::sync::Arc;

use bytes::Bytes;
use chrono::{Duration, Utc};
use futures_util::StreamExt;
use tracing::{debug, info, instrument};

use crate::{
    fetch::RemoteFetcher,
    key::object_key,
    BucketSummary, ByteStream, ObjectPut, ObjectStore, ObjectSummary, OssError, OssResult,
    PutOutcome, DEFAULT_CONTENT_TYPE,
};

/// The storage facade that service code embeds.
///
/// Holds an immutable, shared backend handle; there is no instance state to
/// synchronize, so a single adapter serves any number of concurrent callers.
/// Every key-bearing operation derives its backend key through
/// [`object_key`](crate::key::object_key), so put, get, delete, and URL
/// generation always agree on where an object lives.
pub struct StoreAdapter {
    store: Arc<dyn ObjectStore>,
    fetcher: RemoteFetcher,
}

impl StoreAdapter {
    /// Create an adapter over a backend implementation
    pub fn new<S: ObjectStore + 'static>(store: S) -> Self {
        Self {
            store: Arc::new(store),
            fetcher: RemoteFetcher::new(),
        }
    }

    /// Create an adapter over an already-shared backend handle
    pub fn with_shared(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            fetcher: RemoteFetcher::new(),
        }
    }

    /// Replace the fetcher used by [`get_object_by_url`](Self::get_object_by_url)
    pub fn with_fetcher(mut self, fetcher: RemoteFetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Create `bucket` unless it already exists
    pub async fn create_bucket(&self, bucket: &str) -> OssResult<()> {
        require_name(bucket, "bucket name")?;
        if self.store.bucket_exists(bucket).await? {
            debug!(bucket, "bucket already exists, nothing to create");
            return Ok(());
        }
        self.store.create_bucket(bucket).await?;
        info!(bucket, "created bucket");
        Ok(())
    }

    /// All buckets visible to the configured credential
    pub async fn list_buckets(&self) -> OssResult<Vec<BucketSummary>> {
        self.store.list_buckets().await
    }

    /// Delete `bucket`; the backend requires it to be empty
    pub async fn remove_bucket(&self, bucket: &str) -> OssResult<()> {
        require_name(bucket, "bucket name")?;
        self.store.delete_bucket(bucket).await
    }

    /// Upload an object under the normalized key.
    ///
    /// The stream is fully buffered into memory before transmission: the
    /// declared content length is exact, at a memory cost proportional to the
    /// payload. The content type defaults to `application/octet-stream`.
    #[instrument(skip(self, stream, put))]
    pub async fn put_object(
        &self,
        bucket: &str,
        object_name: &str,
        folder_path: Option<&str>,
        mut stream: ByteStream,
        put: ObjectPut,
    ) -> OssResult<PutOutcome> {
        require_name(bucket, "bucket name")?;
        require_name(object_name, "object name")?;
        let key = object_key(folder_path, object_name);

        let mut buffer = Vec::new();
        while let Some(chunk) = stream.next().await {
            buffer.extend_from_slice(&chunk?);
        }
        let body = Bytes::from(buffer);
        let content_length = put.content_length.unwrap_or(body.len() as u64);
        let content_type = put.content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE);

        debug!(bucket, key = %key, content_length, content_type, "uploading object");
        self.store
            .put_object(bucket, &key, body, content_type, content_length)
            .await
    }

    /// Open a stream over the object at the normalized key.
    ///
    /// The caller owns the returned stream and drops it when done.
    pub async fn get_object(
        &self,
        bucket: &str,
        object_name: &str,
        folder_path: Option<&str>,
    ) -> OssResult<ByteStream> {
        require_name(bucket, "bucket name")?;
        require_name(object_name, "object name")?;
        let key = object_key(folder_path, object_name);
        self.store.get_object(bucket, &key).await
    }

    /// Open a stream over an arbitrary URL, not necessarily this backend
    pub async fn get_object_by_url(&self, url: &str) -> OssResult<ByteStream> {
        self.fetcher.fetch(url).await
    }

    /// Permanent locator for the object at the normalized key.
    ///
    /// The URL is percent-decoded for display; re-encoding it before reuse in
    /// an HTTP client is the caller's concern.
    pub async fn object_url(
        &self,
        bucket: &str,
        object_name: &str,
        folder_path: Option<&str>,
    ) -> OssResult<String> {
        require_name(bucket, "bucket name")?;
        require_name(object_name, "object name")?;
        let key = object_key(folder_path, object_name);
        let url = self.store.object_url(bucket, &key).await?;
        decode_url(url)
    }

    /// Signed locator valid for `expires_days` whole days from now,
    /// percent-decoded like [`object_url`](Self::object_url)
    pub async fn presigned_object_url(
        &self,
        bucket: &str,
        object_name: &str,
        folder_path: Option<&str>,
        expires_days: i64,
    ) -> OssResult<String> {
        require_name(bucket, "bucket name")?;
        require_name(object_name, "object name")?;
        let key = object_key(folder_path, object_name);
        let expiry = Duration::try_days(expires_days)
            .ok_or_else(|| OssError::invalid("expiry day count out of range"))?;
        let expires_at = Utc::now() + expiry;
        let url = self.store.presigned_url(bucket, &key, expires_at).await?;
        decode_url(url)
    }

    /// Delete the object at the normalized key; deleting a missing key is a
    /// no-op
    pub async fn remove_object(
        &self,
        bucket: &str,
        object_name: &str,
        folder_path: Option<&str>,
    ) -> OssResult<()> {
        require_name(bucket, "bucket name")?;
        require_name(object_name, "object name")?;
        let key = object_key(folder_path, object_name);
        self.store.delete_object(bucket, &key).await
    }

    /// List objects whose key starts with `prefix`, in the order the backend
    /// returns them. `recursive` is forwarded to the backend's own delimiter
    /// handling; nothing is expanded client-side.
    pub async fn list_objects_by_prefix(
        &self,
        bucket: &str,
        prefix: &str,
        recursive: bool,
    ) -> OssResult<Vec<ObjectSummary>> {
        require_name(bucket, "bucket name")?;
        self.store.list_objects(bucket, prefix, recursive).await
    }
}

fn require_name(value: &str, what: &str) -> OssResult<()> {
    if value.trim().is_empty() {
        return Err(OssError::invalid(format!("{} must not be blank", what)));
    }
    Ok(())
}

fn decode_url(url: String) -> OssResult<String> {
    match urlencoding::decode(&url) {
        Ok(decoded) => Ok(decoded.into_owned()),
        Err(err) => Err(OssError::invalid(format!(
            "backend URL is not valid UTF-8 once decoded: {}",
            err
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_url_reverses_percent_encoding() {
        let decoded = decode_url("http://host/logo/03%2F18%2Fa%20copy.png".to_string()).unwrap();
        assert_eq!(decoded, "http://host/logo/03/18/a copy.png");
    }

    #[test]
    fn decode_url_leaves_plain_urls_untouched() {
        let url = "memory://logo/03/18/a.png".to_string();
        assert_eq!(decode_url(url.clone()).unwrap(), url);
    }

    #[test]
    fn require_name_rejects_blank_values() {
        assert!(require_name("", "bucket name").is_err());
        assert!(require_name("   ", "object name").is_err());
        assert!(require_name("logo", "bucket name").is_ok());
    }
}
