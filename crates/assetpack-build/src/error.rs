//! # Error Types
//!
//! Every build failure is fatal: the pipeline aborts and leaves any
//! previously generated artifact untouched.

use std::path::PathBuf;

use assetpack_core::{CanonicalizationError, CodecError};
use thiserror::Error;

/// Error from the build pipeline.
#[derive(Error, Debug)]
pub enum BuildError {
    /// Reading, writing, or inspecting a file failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Compression or text encoding of a payload failed.
    #[error("payload encoding failed: {0}")]
    Codec(#[from] CodecError),

    /// Build options could not be canonicalized for the version digest.
    #[error("build options are not canonicalizable: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// The ignore pattern is not a valid regular expression.
    #[error("invalid ignore pattern: {0}")]
    IgnorePattern(#[from] regex::Error),

    /// An existing generated artifact carries no version marker.
    #[error("{}: existing artifact has no `const BundleVersion = ` marker in its first 1024 bytes", .0.display())]
    MissingVersionMarker(PathBuf),

    /// The configuration file could not be parsed.
    #[error("invalid configuration {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },

    /// Formatting the generated source failed.
    #[error("failed to render generated source: {0}")]
    Render(#[from] std::fmt::Error),

    /// The package name is not usable as a Rust module name.
    #[error("package name {0:?} is not a valid Rust identifier")]
    InvalidPackage(String),
}

impl BuildError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
