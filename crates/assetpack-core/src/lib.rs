#![deny(missing_docs)]

//! # assetpack-core: Foundational Primitives
//!
//! The leaf crate of the assetpack workspace. Everything that touches raw
//! bytes without knowing about resources or bundles lives here:
//!
//! - **Codecs**: gzip and brotli compression, and the base64 text encoding
//!   used to embed compressed payloads inside generated source files.
//! - **Content digests**: SHA-256 digests of original (uncompressed) bytes.
//!   The hex form doubles as the HTTP `etag` and as the blob identity during
//!   builds.
//! - **Canonical bytes**: RFC 8785 JSON used to fold build options into the
//!   bundle version digest.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `assetpack-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests. Malformed payloads surface
//!   as [`CodecError`] and are treated as fatal by callers.

pub mod canonical;
pub mod codec;
pub mod digest;
pub mod error;

pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, sha256_hex, ContentDigest, DigestBuilder};
pub use error::{CanonicalizationError, CodecError, DigestError};
