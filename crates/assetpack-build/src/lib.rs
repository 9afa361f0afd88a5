//! # assetpack-build: Bundle Generation
//!
//! Turns a directory of static files into a Rust source file that rebuilds
//! the same files as an [`assetpack_bundle::Bundle`] at run time.
//!
//! ## Pipeline
//!
//! 1. [`scan`] resolves the include list into sorted absolute file paths.
//! 2. [`version`] digests the inputs and options and compares the result with
//!    the digest embedded in the previous artifact. Equal digests end the
//!    build without writing.
//! 3. [`blob`] deduplicates file contents by SHA-256 and encodes each
//!    unique payload once.
//! 4. [`codegen`] renders resources, name constants, and blobs.
//! 5. [`embed`] writes the artifact atomically.
//!
//! ## Crate Policy
//!
//! - Every error is fatal and propagated as [`BuildError`]; nothing is
//!   retried and no partial artifact is ever written.
//! - Output is deterministic: equal inputs render byte-identical files.

pub mod blob;
pub mod codegen;
pub mod embed;
pub mod error;
pub mod naming;
pub mod options;
pub mod scan;
pub mod version;

pub use blob::{Blob, BlobRef, BlobStore};
pub use codegen::{render, ResourceEntry};
pub use embed::{check, embed, CheckReport, EmbedOutcome};
pub use error::BuildError;
pub use options::BuildOptions;
pub use scan::{collect_inputs, scan, IgnoreFilter};
pub use version::{compute_required_version, extract_embedded_version, needs_rebuild};
