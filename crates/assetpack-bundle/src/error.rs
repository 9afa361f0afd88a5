//! # Error Types
//!
//! `ResourceError` covers internal-consistency and data-corruption faults
//! while deriving a resource's forms. Neither is expected against output of
//! the build step; callers treat them as fatal. `FsError` is the
//! recoverable, caller-facing error of the virtual filesystem.

use assetpack_core::CodecError;
use thiserror::Error;

/// Failure to derive one of a resource's forms.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// The resource has neither a canonical payload nor cached bytes.
    #[error("resource {name} has no retrievable content: empty payload and no cached form")]
    NoContent {
        /// Resource name.
        name: String,
    },

    /// The embedded payload could not be decoded or decompressed.
    #[error("resource {name} payload is corrupt: {source}")]
    Codec {
        /// Resource name.
        name: String,
        /// Underlying codec failure.
        #[source]
        source: CodecError,
    },

    /// The unpacked bytes do not hash to the recorded digest.
    #[error("integrity violation: resource {name} has digest {actual} but records {expected}")]
    Integrity {
        /// Resource name.
        name: String,
        /// Digest recorded at build time.
        expected: String,
        /// Digest of the bytes actually unpacked.
        actual: String,
    },

    /// Writing a form to a sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error from the virtual filesystem.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FsError {
    /// No file or directory at this path.
    #[error("{0}: not found")]
    NotFound(String),

    /// Directory listing requested on a file.
    #[error("{0}: not a directory")]
    NotADirectory(String),

    /// Byte access requested on a directory.
    #[error("{0}: is a directory")]
    IsADirectory(String),
}
