use std::io::Read;

use flate2::read::{GzDecoder, ZlibDecoder};
use tracing::debug;

use crate::error::DecodeError;

/// Compressed transfer encodings the decoder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Gzip,
    Deflate,
}

impl Compression {
    fn name(&self) -> &'static str {
        match self {
            Compression::Gzip => "gzip",
            Compression::Deflate => "deflate",
        }
    }

    /// Finds a compressed marker in a `Content-Encoding` header value.
    pub fn from_header(announced: &str) -> Option<Self> {
        announced
            .split(',')
            .map(|token| token.trim().to_ascii_lowercase())
            .find_map(|token| match token.as_str() {
                "gzip" | "x-gzip" => Some(Compression::Gzip),
                "deflate" => Some(Compression::Deflate),
                _ => None,
            })
    }
}

/// Turns a fetched body into text, decompressing it first when the announced
/// encoding marks it as compressed. A leading UTF-8 byte order mark is dropped.
pub fn decode(body: &[u8], announced_encoding: Option<&str>) -> Result<String, DecodeError> {
    let bytes = match announced_encoding.and_then(Compression::from_header) {
        Some(compression) => {
            debug!(
                "Decompressing {} byte {} payload",
                body.len(),
                compression.name()
            );
            let mut out = Vec::new();
            let result = match compression {
                Compression::Gzip => GzDecoder::new(body).read_to_end(&mut out),
                Compression::Deflate => ZlibDecoder::new(body).read_to_end(&mut out),
            };
            result.map_err(|source| DecodeError::Decompress {
                encoding: compression.name(),
                source,
            })?;
            out
        }
        None => body.to_vec(),
    };

    let mut text = String::from_utf8(bytes)?;
    if text.starts_with('\u{feff}') {
        text.replace_range(..'\u{feff}'.len_utf8(), "");
    }
    Ok(text)
}
