//! # assetpack-bundle: Resources, Bundles, and the Virtual Filesystem
//!
//! The runtime half of assetpack. Generated bundle sources construct
//! [`Resource`] values from embedded payloads and collect them into a
//! [`Bundle`]; HTTP delivery (`assetpack-http`) and the [`Filesystem`]
//! adapter both read from that same bundle.
//!
//! ## Sharing model
//!
//! - A [`Bundle`] is an immutable snapshot. `put`/`remove` return a new
//!   bundle and leave the receiver untouched, so a bundle can be shared
//!   across threads without locking.
//! - Each [`Resource`] owns its own lock guarding its lazily computed
//!   forms. Requests for different resources never contend.

pub mod bundle;
pub mod error;
pub mod resource;
pub mod vfs;

pub use bundle::Bundle;
pub use error::{FsError, ResourceError};
pub use resource::{CachePolicy, CacheStats, Resource};
pub use vfs::{File, Filesystem, Metadata};
