//! Raw pass-through retrieval of arbitrary URLs.

use futures_util::TryStreamExt;
use tracing::debug;

use crate::{ByteStream, OssError, OssResult};

/// Fetches arbitrary absolute URLs as byte streams.
///
/// A deliberate pass-through: no retry, authentication, or redirect policy
/// beyond the underlying client's defaults. Anything smarter belongs to the
/// calling layer.
#[derive(Clone, Default)]
pub struct RemoteFetcher {
    client: reqwest::Client,
}

impl RemoteFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Reuse an existing client and its connection pool
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Open a stream over the response body of a plain GET to `url`
    pub async fn fetch(&self, url: &str) -> OssResult<ByteStream> {
        debug!(url, "fetching remote content");
        let response = self.client.get(url).send().await.map_err(into_io)?;
        let response = response.error_for_status().map_err(into_io)?;
        Ok(Box::pin(response.bytes_stream().map_err(|err| {
            std::io::Error::new(std::io::ErrorKind::Other, err)
        })))
    }
}

fn into_io(err: reqwest::Error) -> OssError {
    OssError::Io {
        source: std::io::Error::new(std::io::ErrorKind::Other, err),
    }
}
