use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::timeout::TimeoutConfig;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream as SdkByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures_util::stream;
use tracing::debug;

use crate::{
    BucketSummary, ByteStream, ObjectStore, ObjectSummary, OssError, OssResult, PutOutcome,
};

/// Configuration for an S3-compatible endpoint (MinIO, Ceph RGW, AWS, ...)
#[derive(Debug, Clone)]
pub struct S3Config {
    /// Service endpoint, `host:port` or a full URL
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    /// Path-style (`endpoint/bucket`) vs virtual-hosted (`bucket.endpoint`)
    /// addressing; proxied and self-hosted deployments usually want path-style
    pub path_style_access: bool,
    /// Scheme applied when `endpoint` carries none
    pub protocol: String,
    /// Retries of failed requests, handled inside the SDK client
    pub max_error_retries: u32,
    /// Socket read timeout for a single attempt
    pub socket_timeout: Duration,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            access_key: String::new(),
            secret_key: String::new(),
            region: "region".to_string(),
            path_style_access: true,
            protocol: "https".to_string(),
            max_error_retries: 2,
            socket_timeout: Duration::from_secs(10),
        }
    }
}

impl S3Config {
    pub fn new<E, A, S>(endpoint: E, access_key: A, secret_key: S) -> Self
    where
        E: Into<String>,
        A: Into<String>,
        S: Into<String>,
    {
        Self {
            endpoint: endpoint.into(),
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            ..Self::default()
        }
    }

    pub fn with_region<S: Into<String>>(mut self, region: S) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_path_style_access(mut self, path_style: bool) -> Self {
        self.path_style_access = path_style;
        self
    }

    pub fn with_protocol<S: Into<String>>(mut self, protocol: S) -> Self {
        self.protocol = protocol.into();
        self
    }

    pub fn with_max_error_retries(mut self, retries: u32) -> Self {
        self.max_error_retries = retries;
        self
    }

    pub fn with_socket_timeout(mut self, timeout: Duration) -> Self {
        self.socket_timeout = timeout;
        self
    }

    /// Scheme-qualified endpoint URL
    fn endpoint_url(&self) -> String {
        if self.endpoint.contains("://") {
            self.endpoint.trim_end_matches('/').to_string()
        } else {
            format!("{}://{}", self.protocol, self.endpoint.trim_end_matches('/'))
        }
    }
}

/// `ObjectStore` backed by an S3-compatible service via the AWS SDK.
///
/// The client handle is built once and shared read-only for the process
/// lifetime; retry and timeout policy live entirely in its configuration.
pub struct S3Store {
    client: Client,
    config: S3Config,
}

impl S3Store {
    /// Build the SDK client from static credentials and endpoint configuration
    pub fn connect(config: S3Config) -> Self {
        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "pail-static",
        );
        let sdk_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(config.endpoint_url())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(config.path_style_access)
            .retry_config(RetryConfig::standard().with_max_attempts(config.max_error_retries + 1))
            .timeout_config(
                TimeoutConfig::builder()
                    .read_timeout(config.socket_timeout)
                    .build(),
            )
            .build();
        Self {
            client: Client::from_conf(sdk_config),
            config,
        }
    }

    /// Wrap an already-built SDK client
    pub fn from_client(client: Client, config: S3Config) -> Self {
        Self { client, config }
    }

    /// Compose the permanent locator the way the endpoint addresses buckets
    fn unsigned_url(&self, bucket: &str, key: &str) -> String {
        let endpoint = self.config.endpoint_url();
        if self.config.path_style_access {
            format!("{}/{}/{}", endpoint, bucket, key)
        } else {
            match endpoint.split_once("://") {
                Some((scheme, host)) => format!("{}://{}.{}/{}", scheme, bucket, host, key),
                None => format!("{}.{}/{}", bucket, endpoint, key),
            }
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn bucket_exists(&self, bucket: &str) -> OssResult<bool> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_not_found() {
                    Ok(false)
                } else {
                    Err(OssError::backend(service_err))
                }
            }
        }
    }

    async fn create_bucket(&self, bucket: &str) -> OssResult<()> {
        self.client
            .create_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|err| OssError::backend(err.into_service_error()))?;
        Ok(())
    }

    async fn list_buckets(&self) -> OssResult<Vec<BucketSummary>> {
        let resp = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|err| OssError::backend(err.into_service_error()))?;
        let buckets = resp
            .buckets()
            .iter()
            .filter_map(|bucket| {
                let name = bucket.name()?.to_string();
                let created_at = bucket.creation_date().and_then(to_chrono);
                Some(BucketSummary { name, created_at })
            })
            .collect();
        Ok(buckets)
    }

    async fn delete_bucket(&self, bucket: &str) -> OssResult<()> {
        match self.client.delete_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(()),
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.code() == Some("NoSuchBucket") {
                    Err(OssError::not_found(format!("bucket {}", bucket)))
                } else {
                    Err(OssError::backend(service_err))
                }
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
        let resp = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .content_length(content_length as i64)
            .body(SdkByteStream::from(body))
            .send()
            .await
            .map_err(|err| OssError::backend(err.into_service_error()))?;
        Ok(PutOutcome {
            etag: resp.e_tag().map(str::to_string),
            version_id: resp.version_id().map(str::to_string),
            size_bytes: content_length,
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> OssResult<ByteStream> {
        let resp = match self.client.get_object().bucket(bucket).key(key).send().await {
            Ok(resp) => resp,
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() || service_err.code() == Some("NoSuchBucket") {
                    return Err(OssError::not_found(format!("{}/{}", bucket, key)));
                }
                return Err(OssError::backend(service_err));
            }
        };
        let body = resp.body;
        let stream = stream::try_unfold(body, |mut body| async move {
            let chunk = body
                .try_next()
                .await
                .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;
            Ok(chunk.map(|bytes| (bytes, body)))
        });
        Ok(Box::pin(stream))
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> OssResult<()> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| OssError::backend(err.into_service_error()))?;
        Ok(())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        recursive: bool,
    ) -> OssResult<Vec<ObjectSummary>> {
        let mut summaries = Vec::new();
        let mut continuation_token: Option<String> = None;
        loop {
            let mut req = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .prefix(prefix);
            if !recursive {
                req = req.delimiter("/");
            }
            if let Some(token) = continuation_token.take() {
                req = req.continuation_token(token);
            }
            let resp = req
                .send()
                .await
                .map_err(|err| OssError::backend(err.into_service_error()))?;
            for object in resp.contents() {
                let Some(key) = object.key() else { continue };
                summaries.push(ObjectSummary {
                    key: key.to_string(),
                    size_bytes: object.size().unwrap_or(0).max(0) as u64,
                    last_modified: object.last_modified().and_then(to_chrono),
                    etag: object.e_tag().map(str::to_string),
                });
            }
            match resp.next_continuation_token() {
                Some(token) => continuation_token = Some(token.to_string()),
                None => break,
            }
        }
        debug!(bucket, prefix, count = summaries.len(), "listed objects");
        Ok(summaries)
    }

    async fn object_url(&self, bucket: &str, key: &str) -> OssResult<String> {
        Ok(self.unsigned_url(bucket, key))
    }

    async fn presigned_url(
        &self,
        bucket: &str,
        key: &str,
        expires_at: DateTime<Utc>,
    ) -> OssResult<String> {
        let expires_in = (expires_at - Utc::now())
            .to_std()
            .map_err(|_| OssError::invalid("expiry must be in the future"))?;
        // the SDK enforces the signature-lifetime cap of the signing scheme
        let presigning = PresigningConfig::expires_in(expires_in).map_err(OssError::backend)?;
        let presigned = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|err| OssError::backend(err.into_service_error()))?;
        Ok(presigned.uri().to_string())
    }
}

fn to_chrono(timestamp: &aws_sdk_s3::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(timestamp.secs(), timestamp.subsec_nanos())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> S3Config {
        S3Config::new("minio.internal:9000", "ak", "sk").with_protocol("http")
    }

    #[test]
    fn endpoint_url_applies_protocol_when_scheme_is_missing() {
        assert_eq!(config().endpoint_url(), "http://minio.internal:9000");
        let explicit = S3Config::new("https://s3.example.com/", "ak", "sk");
        assert_eq!(explicit.endpoint_url(), "https://s3.example.com");
    }

    #[test]
    fn unsigned_url_uses_path_style_addressing() {
        let store = S3Store::connect(config());
        assert_eq!(
            store.unsigned_url("logo", "03/18/a.png"),
            "http://minio.internal:9000/logo/03/18/a.png"
        );
    }

    #[test]
    fn unsigned_url_uses_virtual_hosted_addressing() {
        let store = S3Store::connect(config().with_path_style_access(false));
        assert_eq!(
            store.unsigned_url("logo", "a.png"),
            "http://logo.minio.internal:9000/a.png"
        );
    }
}
