//! Binary caching of compiled artifact sets.
//!
//! A cache blob lets a build skip recompilation when the editor data it was
//! produced from has not changed. The format is a 32-byte fixed header
//! followed by a bincode-encoded payload.
//!
//! ## Wire Format
//!
//! ```text
//! Offset  Size  Field
//! 0       4     Magic bytes: b"RFGE"
//! 4       2     Format version (u16, little-endian)
//! 6       2     Compiler version (u16, little-endian)
//! 8       4     Flags (u32, reserved)
//! 12      4     Payload length in bytes (u32, little-endian)
//! 16      16    BLAKE3 hash of the payload (truncated to 16 bytes)
//! 32..    var   Bincode-encoded payload
//! ```
//!
//! The format version must match exactly. The compiler version is
//! informational only.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ArtifactSet;

const MAGIC: &[u8; 4] = b"RFGE";
const FORMAT_VERSION: u16 = 1;
const COMPILER_VERSION: u16 = 1;
const HEADER_SIZE: usize = 32;

/// Errors that can occur when serializing an [`ArtifactSet`] to bytes.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("failed to encode artifacts: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("I/O error during serialization: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur when deserializing an [`ArtifactSet`] from bytes.
#[derive(Debug, Error)]
pub enum DeserializeError {
    #[error("not a ruleforge cache: invalid magic bytes")]
    BadMagic,

    #[error("incompatible format version: blob is v{blob}, compiler supports v{supported}")]
    IncompatibleVersion { blob: u16, supported: u16 },

    #[error("integrity check failed: BLAKE3 checksum mismatch")]
    ChecksumMismatch,

    #[error("payload length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: u32, actual: usize },

    #[error("failed to decode payload: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("I/O error during deserialization: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct CachePayload {
    file_count: usize,
    source_digest: Option<[u8; 32]>,
    files: Vec<(String, String)>,
}

fn validate(payload: &CachePayload) -> Result<(), DeserializeError> {
    if payload.file_count != payload.files.len() {
        return Err(DeserializeError::Validation(format!(
            "metadata says {} files but payload has {}",
            payload.file_count,
            payload.files.len()
        )));
    }
    for window in payload.files.windows(2) {
        if window[0].0 >= window[1].0 {
            return Err(DeserializeError::Validation(
                "file paths not sorted or not unique".to_owned(),
            ));
        }
    }
    for (path, _) in &payload.files {
        let escapes = path.starts_with('/') || path.split('/').any(|part| part == "..");
        if path.is_empty() || escapes {
            return Err(DeserializeError::Validation(format!(
                "file path '{path}' is not a relative path inside the output"
            )));
        }
    }
    Ok(())
}

fn write_header(buf: &mut Vec<u8>, payload: &[u8]) {
    let hash = blake3::hash(payload);

    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    buf.extend_from_slice(&COMPILER_VERSION.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes()); // flags (reserved)
    #[allow(clippy::cast_possible_truncation)] // generated mods stay far below 4 GiB
    let payload_len = payload.len() as u32;
    buf.extend_from_slice(&payload_len.to_le_bytes());
    buf.extend_from_slice(&hash.as_bytes()[..16]);
}

#[allow(clippy::cast_possible_truncation)] // HEADER_SIZE is 32
fn read_header(bytes: &[u8]) -> Result<(u16, u32, [u8; 16]), DeserializeError> {
    if bytes.len() < HEADER_SIZE {
        return Err(DeserializeError::LengthMismatch {
            expected: HEADER_SIZE as u32,
            actual: bytes.len(),
        });
    }
    if &bytes[0..4] != MAGIC {
        return Err(DeserializeError::BadMagic);
    }

    let format_version = u16::from_le_bytes([bytes[4], bytes[5]]);
    let payload_len = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]);
    let mut hash = [0u8; 16];
    hash.copy_from_slice(&bytes[16..32]);

    Ok((format_version, payload_len, hash))
}

fn encode(set: &ArtifactSet, source_text: Option<&str>) -> Result<Vec<u8>, SerializeError> {
    let files: Vec<(String, String)> = set
        .iter()
        .map(|(path, source)| (path.to_owned(), source.to_owned()))
        .collect();
    let payload = CachePayload {
        file_count: files.len(),
        source_digest: source_text.map(|s| *blake3::hash(s.as_bytes()).as_bytes()),
        files,
    };
    let payload = bincode::serde::encode_to_vec(&payload, bincode::config::standard())?;

    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    write_header(&mut buf, &payload);
    buf.extend_from_slice(&payload);
    Ok(buf)
}

fn decode(bytes: &[u8]) -> Result<CachePayload, DeserializeError> {
    let (format_version, payload_len, stored_hash) = read_header(bytes)?;
    if format_version != FORMAT_VERSION {
        return Err(DeserializeError::IncompatibleVersion {
            blob: format_version,
            supported: FORMAT_VERSION,
        });
    }

    let payload_end = HEADER_SIZE + payload_len as usize;
    if bytes.len() < payload_end {
        return Err(DeserializeError::LengthMismatch {
            expected: payload_len,
            actual: bytes.len() - HEADER_SIZE,
        });
    }
    let payload = &bytes[HEADER_SIZE..payload_end];
    if blake3::hash(payload).as_bytes()[..16] != stored_hash {
        return Err(DeserializeError::ChecksumMismatch);
    }

    let (decoded, _): (CachePayload, usize) =
        bincode::serde::decode_from_slice(payload, bincode::config::standard())?;
    validate(&decoded)?;
    Ok(decoded)
}

impl ArtifactSet {
    /// Serialize this set to a cache blob.
    ///
    /// The optional `source_text` is hashed (BLAKE3) and stored so
    /// [`is_fresh_for`](Self::is_fresh_for) can tell whether the blob is
    /// still current.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError`] if encoding fails.
    pub fn to_bytes(&self, source_text: Option<&str>) -> Result<Vec<u8>, SerializeError> {
        encode(self, source_text)
    }

    /// Restore a set from a blob produced by [`to_bytes`](Self::to_bytes).
    ///
    /// # Errors
    ///
    /// Returns [`DeserializeError`] on format, integrity or validation failure.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DeserializeError> {
        let payload = decode(bytes)?;
        let mut set = ArtifactSet::new();
        for (path, source) in payload.files {
            set.insert(path, source);
        }
        Ok(set)
    }

    /// True if `bytes` is a valid blob built from exactly `source_text`.
    ///
    /// Blobs written without a source digest are never fresh.
    ///
    /// # Errors
    ///
    /// Returns [`DeserializeError`] if the blob itself is unreadable.
    pub fn is_fresh_for(bytes: &[u8], source_text: &str) -> Result<bool, DeserializeError> {
        let payload = decode(bytes)?;
        let digest = *blake3::hash(source_text.as_bytes()).as_bytes();
        Ok(payload.source_digest == Some(digest))
    }

    /// Serialize this set and write it to a file.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError`] on encoding or I/O failure.
    pub fn to_cache_file(
        &self,
        path: impl AsRef<std::path::Path>,
        source_text: Option<&str>,
    ) -> Result<(), SerializeError> {
        std::fs::write(path, self.to_bytes(source_text)?)?;
        Ok(())
    }

    /// Read a cache file written by [`to_cache_file`](Self::to_cache_file).
    ///
    /// # Errors
    ///
    /// Returns [`DeserializeError`] on I/O, format, integrity or validation
    /// failure.
    pub fn from_cache_file(path: impl AsRef<std::path::Path>) -> Result<Self, DeserializeError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}
