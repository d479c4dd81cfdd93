//! Loading raw CSV text from local files or HTTP URLs.
//!
//! This is the only async part of the crate; everything downstream works on
//! the in-memory text.

use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use tracing::debug;

use crate::error::{ReportError, Result};
use crate::fetch::{HttpClient, fetch_bytes};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// One uploaded file's display name and decoded text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub text: String,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Decodes raw bytes (optionally gzip-compressed) into a source.
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        let name = name.into();
        let text = decode_text(&name, bytes)?;
        Ok(Self { name, text })
    }
}

/// Returns `true` for `http://` and `https://` locations.
pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Reads a local path or fetches a URL and decodes it.
#[tracing::instrument(skip(client))]
pub async fn load_source<C: HttpClient>(client: &C, location: &str) -> Result<SourceFile> {
    let bytes = if is_remote(location) {
        fetch_bytes(client, location).await?
    } else {
        tokio::fs::read(location).await?
    };
    debug!(bytes = bytes.len(), "Source loaded");

    SourceFile::from_bytes(display_name(location), &bytes)
}

/// File name of a path, or the last path segment of a URL.
pub fn display_name(location: &str) -> String {
    let trimmed = if is_remote(location) {
        location
            .split(['?', '#'])
            .next()
            .unwrap_or(location)
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(location)
    } else {
        Path::new(location)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(location)
    };

    if trimmed.is_empty() {
        location.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Inflates gzip payloads and validates UTF-8.
pub fn decode_text(name: &str, bytes: &[u8]) -> Result<String> {
    let raw = if bytes.starts_with(&GZIP_MAGIC) {
        let mut out = Vec::new();
        GzDecoder::new(bytes).read_to_end(&mut out)?;
        out
    } else {
        bytes.to_vec()
    };

    String::from_utf8(raw).map_err(|_| ReportError::Encoding {
        name: name.to_string(),
    })
}
