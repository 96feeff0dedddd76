//! Reading saved HTML pages from disk.
//!
//! Pages are decoded strictly with the requested encoding first. When that
//! fails the Latin-1 family is tried, which `encoding_rs` maps to
//! windows-1252 per the WHATWG Encoding Standard.

use crate::error::{ExtractorError, Result};
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, WINDOWS_1252};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

fn fallback_encodings() -> [&'static Encoding; 1] {
    [WINDOWS_1252]
}

/// Decoded HTML text together with the encoding that produced it.
#[derive(Debug, Clone)]
pub struct DecodedSource {
    pub text: String,
    pub encoding: &'static Encoding,
    pub fell_back: bool,
}

/// Resolve a WHATWG encoding label such as `utf-8` or `latin-1`.
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| ExtractorError::UnknownEncoding {
        label: label.to_string(),
    })
}

pub fn read_html(path: &Path, encoding: &'static Encoding) -> Result<DecodedSource> {
    if !path.exists() {
        return Err(ExtractorError::InputNotFound {
            path: path.display().to_string(),
        });
    }

    let bytes = fs::read(path)?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());

    let decoded = decode_bytes(&bytes, encoding).ok_or_else(|| ExtractorError::Decode {
        path: path.display().to_string(),
        encoding: encoding.name().to_string(),
    })?;

    if decoded.fell_back {
        warn!(
            "Fallback to {} encoding for {}",
            decoded.encoding.name(),
            path.display()
        );
    }

    Ok(decoded)
}

/// Decode `bytes` with `encoding`, falling back to Latin-1 when it is malformed.
pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Option<DecodedSource> {
    if let Some(text) = decode_strict(bytes, encoding) {
        return Some(DecodedSource {
            text,
            encoding,
            fell_back: false,
        });
    }

    fallback_encodings()
        .into_iter()
        .filter(|candidate| *candidate != encoding)
        .find_map(|candidate| {
            decode_strict(bytes, candidate).map(|text| DecodedSource {
                text,
                encoding: candidate,
                fell_back: true,
            })
        })
}

fn decode_strict(bytes: &[u8], encoding: &'static Encoding) -> Option<String> {
    // Only a BOM belonging to the requested encoding is stripped.
    let body = match Encoding::for_bom(bytes) {
        Some((bom_encoding, bom_len)) if bom_encoding == encoding => &bytes[bom_len..],
        _ => bytes,
    };

    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .map(|text| text.into_owned())
}

/// Encode `text` for writing. Returns `None` when a character has no
/// representation in `encoding`.
pub fn encode_text(text: &str, encoding: &'static Encoding) -> Option<Vec<u8>> {
    // encoding_rs only decodes UTF-16, so it is produced by hand.
    if encoding == UTF_16LE {
        return Some(text.encode_utf16().flat_map(|unit| unit.to_le_bytes()).collect());
    }
    if encoding == UTF_16BE {
        return Some(text.encode_utf16().flat_map(|unit| unit.to_be_bytes()).collect());
    }

    let (bytes, _, had_unmappable) = encoding.encode(text);
    if had_unmappable {
        None
    } else {
        Some(bytes.into_owned())
    }
}
