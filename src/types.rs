use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures_core::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// Stream of bytes for object content
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Content type declared when the caller does not supply one
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A bucket visible to the configured credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketSummary {
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Listing entry for a stored object, in the order the backend reports it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSummary {
    pub key: String,
    pub size_bytes: u64,
    pub last_modified: Option<DateTime<Utc>>,
    pub etag: Option<String>,
}

/// Acknowledgment returned by the backend after an upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutOutcome {
    pub etag: Option<String>,
    pub version_id: Option<String>,
    pub size_bytes: u64,
}

/// Request metadata for storing an object
///
/// The declared content length normally comes from the buffered payload; the
/// override exists for callers that must declare a different length, and a
/// mismatched override is the caller's responsibility.
#[derive(Debug, Clone, Default)]
pub struct ObjectPut {
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
}

impl ObjectPut {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content_type<S: Into<String>>(mut self, content_type: S) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_content_length(mut self, length: u64) -> Self {
        self.content_length = Some(length);
        self
    }
}
