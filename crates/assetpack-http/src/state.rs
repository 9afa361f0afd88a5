//! # Serving State
//!
//! Shared state handed to the delivery handler through the `State`
//! extractor. The bundle is an immutable snapshot, so cloning the state per
//! request costs two reference-count increments and no locking.

use std::sync::Arc;

use assetpack_bundle::Bundle;

/// Bundle and mount prefix of one router.
#[derive(Debug, Clone)]
pub struct ServeState {
    bundle: Bundle,
    prefix: Arc<str>,
}

impl ServeState {
    /// `prefix` is normalized to a leading slash and no trailing slash;
    /// `""` and `"/"` mean no prefix.
    pub fn new(bundle: Bundle, prefix: &str) -> Self {
        Self {
            bundle,
            prefix: normalize_prefix(prefix).into(),
        }
    }

    pub fn bundle(&self) -> &Bundle {
        &self.bundle
    }

    /// The normalized prefix, empty when unset.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
