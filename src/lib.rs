//! # pail: a uniform facade over S3-compatible object storage
//!
//! `pail` gives application code one way to talk to any S3-compatible
//! backend (MinIO, Ceph RGW, AWS, ...): bucket lifecycle, object
//! put/get/delete/list, permanent and time-limited access URLs, remote-URL
//! ingestion, and zip bundling of retrieved streams.
//!
//! ## Key Features
//!
//! - **One key derivation everywhere**: put, get, delete, and URL generation
//!   resolve the same `(folder, name)` pair to the same backend key
//! - **Typed failures**: every operation returns [`OssResult`]; nothing is
//!   swallowed or logged-and-nulled
//! - **Backend agnostic**: the facade only sees the [`ObjectStore`] trait;
//!   ship [`S3Store`] in production, [`MemoryStore`] in tests
//! - **Stream ownership is explicit**: every returned [`ByteStream`] belongs
//!   to the caller, who reads it and drops it
//!
//! ## Quick Start
//!
//! ```rust
//! use pail::prelude::*;
//! use pail::MemoryStore;
//! use bytes::Bytes;
//!
//! # #[tokio::main]
//! # async fn main() -> OssResult<()> {
//! // 1. Build an adapter over a backend
//! let store = StoreAdapter::new(MemoryStore::new());
//!
//! // 2. Buckets are created idempotently
//! store.create_bucket("logo").await?;
//!
//! // 3. Upload into a folder; the key becomes "03/18/a.png"
//! let chunk: Result<Bytes, std::io::Error> = Ok(Bytes::from_static(b"\x89PNG"));
//! let body: ByteStream = Box::pin(futures::stream::once(async move { chunk }));
//! store
//!     .put_object("logo", "a.png", Some("03/18"), body,
//!         ObjectPut::new().with_content_type("image/png"))
//!     .await?;
//!
//! // 4. Hand out a locator for the same key
//! let url = store.object_url("logo", "a.png", Some("03/18")).await?;
//! assert!(url.ends_with("03/18/a.png"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────┐
//! │   Your Service    │  ← business logic only
//! ├───────────────────┤
//! │   StoreAdapter    │  ← key derivation, preconditions, buffering
//! ├───────────────────┤
//! │   ObjectStore     │  ← backend primitives (S3Store / MemoryStore)
//! └───────────────────┘
//! ```
//!
//! [`compose_zip`] and [`RemoteFetcher`] sit beside the adapter: the first
//! bundles named streams (typically freshly retrieved objects) into one zip
//! stream, the second pulls arbitrary URLs into the same stream shape.

pub mod adapter;
pub mod archive;
mod error;
mod fetch;
pub mod key;
mod memory;
mod s3_store;
pub mod store;
mod types;

// Re-export main types for clean API
pub use adapter::StoreAdapter;
pub use archive::compose_zip;
pub use error::{OssError, OssResult};
pub use fetch::RemoteFetcher;
pub use key::object_key;
pub use memory::MemoryStore;
pub use s3_store::{S3Config, S3Store};
pub use store::ObjectStore;
pub use types::{
    BucketSummary, ByteStream, ObjectPut, ObjectSummary, PutOutcome, DEFAULT_CONTENT_TYPE,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        ByteStream, ObjectPut, ObjectStore, OssError, OssResult, PutOutcome, StoreAdapter,
    };
}
