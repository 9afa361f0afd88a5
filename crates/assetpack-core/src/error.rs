//! # Error Types
//!
//! Errors raised by the byte-level primitives. All of them indicate either
//! an I/O failure or data that was not produced by this system's own build
//! step, so callers treat them as fatal rather than recoverable.

use thiserror::Error;

/// Error from a compression, decompression, or text decoding primitive.
#[derive(Error, Debug)]
pub enum CodecError {
    /// gzip stream could not be written or read.
    #[error("gzip error: {0}")]
    Gzip(#[source] std::io::Error),

    /// brotli stream could not be written or read.
    #[error("brotli error: {0}")]
    Brotli(#[source] std::io::Error),

    /// The text-encoded payload is not valid base64.
    #[error("text decode error: {0}")]
    TextDecode(#[from] base64::DecodeError),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values have no single canonical rendering and are rejected.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error parsing a textual digest.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DigestError {
    /// Wrong number of hex characters.
    #[error("digest must be 64 hex chars, got {0} chars")]
    InvalidLength(usize),

    /// A character outside `[0-9a-fA-F]`.
    #[error("digest contains non-hex character {0:?}")]
    InvalidCharacter(char),
}
