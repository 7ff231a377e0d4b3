//! Bundling of named byte streams into a single zip stream.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use bytes::Bytes;
use futures_util::StreamExt;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::{ByteStream, OssError, OssResult};

/// Bundle named byte streams into one deflate-compressed zip stream.
///
/// Entries are written in the supplied order and names must be unique. Each
/// source stream is drained chunk by chunk into its open archive entry and
/// dropped as the entry finishes. Any mid-copy failure aborts the whole
/// composition with a typed error; no partial archive is ever returned. An
/// empty entry list yields a valid, empty archive.
pub async fn compose_zip(entries: Vec<(String, ByteStream)>) -> OssResult<ByteStream> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut seen: HashSet<String> = HashSet::with_capacity(entries.len());

    for (name, mut stream) in entries {
        if !seen.insert(name.clone()) {
            return Err(OssError::invalid(format!(
                "duplicate archive entry name: {}",
                name
            )));
        }
        writer
            .start_file(&name, options)
            .map_err(|err| OssError::compression_from(format!("cannot open entry {}", name), err))?;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|err| {
                OssError::compression_from(format!("source stream for {} failed", name), err)
            })?;
            writer.write_all(&chunk).map_err(|err| {
                OssError::compression_from(format!("cannot write entry {}", name), err)
            })?;
        }
        debug!(entry = %name, "archive entry written");
    }

    let cursor = writer
        .finish()
        .map_err(|err| OssError::compression_from("cannot finalize archive", err))?;
    let archive: Result<Bytes, std::io::Error> = Ok(Bytes::from(cursor.into_inner()));
    Ok(Box::pin(futures_util::stream::once(async move { archive })))
}
