//! # Blob Store: Content-Addressed Payload Deduplication
//!
//! During a build every file's bytes pass through [`BlobStore::add_payload`].
//! The SHA-256 digest of the raw bytes is the blob identity: identical
//! contents map to one blob, serialized once, and every resource carrying
//! those contents references the same generated constant.
//!
//! The constant name is derived from the digest alone, never from
//! insertion order, so generated output is stable across rebuilds and
//! independent of directory traversal order.

use std::collections::BTreeMap;

use assetpack_core::{codec, sha256_digest, ContentDigest};

use crate::error::BuildError;

/// Prefix of generated blob constants.
pub const BLOB_CONST_PREFIX: &str = "BLOB_";

/// Reference from a resource to its blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlobRef {
    digest: ContentDigest,
}

impl BlobRef {
    /// Digest of the raw bytes.
    pub fn digest(&self) -> &ContentDigest {
        &self.digest
    }

    /// Name of the generated constant holding the payload.
    pub fn const_name(&self) -> String {
        format!("{BLOB_CONST_PREFIX}{}", self.digest.to_hex().to_uppercase())
    }
}

/// One unique payload: brotli-compressed, text-encoded raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    digest: ContentDigest,
    encoded: String,
}

impl Blob {
    /// Digest of the raw bytes this blob was built from.
    pub fn digest(&self) -> &ContentDigest {
        &self.digest
    }

    /// Reference used by resource entries.
    pub fn blob_ref(&self) -> BlobRef {
        BlobRef {
            digest: self.digest,
        }
    }

    /// The canonical encoded payload.
    pub fn encoded(&self) -> &str {
        &self.encoded
    }
}

/// Blobs of a single build, ordered by digest.
#[derive(Debug, Default)]
pub struct BlobStore {
    blobs: BTreeMap<ContentDigest, Blob>,
    raw_bytes: u64,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add raw bytes, returning the reference of the blob holding them.
    ///
    /// Bytes already present are not compressed again.
    pub fn add_payload(&mut self, raw: &[u8]) -> Result<BlobRef, BuildError> {
        let digest = sha256_digest(raw);
        if !self.blobs.contains_key(&digest) {
            let encoded = codec::pack(raw)?;
            tracing::trace!(
                digest = %digest,
                raw = raw.len(),
                encoded = encoded.len(),
                "new blob"
            );
            self.raw_bytes += raw.len() as u64;
            self.blobs.insert(digest, Blob { digest, encoded });
        }
        Ok(BlobRef { digest })
    }

    pub fn get(&self, blob: &BlobRef) -> Option<&Blob> {
        self.blobs.get(&blob.digest)
    }

    /// All blobs, ordered by digest.
    pub fn blobs(&self) -> impl Iterator<Item = &Blob> {
        self.blobs.values()
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    /// Raw size of the unique payloads.
    pub fn raw_bytes(&self) -> u64 {
        self.raw_bytes
    }

    /// Size of all encoded payloads.
    pub fn encoded_bytes(&self) -> u64 {
        self.blobs.values().map(|b| b.encoded.len() as u64).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_bytes_share_one_blob() {
        let mut store = BlobStore::new();
        let a = store.add_payload(b"same content").unwrap();
        let b = store.add_payload(b"same content").unwrap();
        let c = store.add_payload(b"other content").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.const_name(), b.const_name());
        assert_ne!(a, c);
        assert_eq!(store.len(), 2);
        assert_eq!(store.raw_bytes(), 25);
    }

    #[test]
    fn const_name_is_prefix_plus_upper_hex() {
        let mut store = BlobStore::new();
        let r = store.add_payload(b"").unwrap();
        assert_eq!(
            r.const_name(),
            "BLOB_E3B0C44298FC1C149AFBF4C8996FB92427AE41E4649B934CA495991B7852B855"
        );
    }

    #[test]
    fn encoded_payload_unpacks_to_input() {
        let mut store = BlobStore::new();
        let r = store.add_payload(b"hello blob").unwrap();
        let blob = store.get(&r).unwrap();
        assert_eq!(codec::unpack(blob.encoded()).unwrap(), b"hello blob");
        assert_eq!(blob.blob_ref(), r);
    }

    #[test]
    fn insertion_order_does_not_change_output() {
        let inputs: [&[u8]; 3] = [b"one", b"two", b"three"];
        let mut forward = BlobStore::new();
        let mut backward = BlobStore::new();
        for i in inputs {
            forward.add_payload(i).unwrap();
        }
        for i in inputs.iter().rev() {
            backward.add_payload(i).unwrap();
        }
        let f: Vec<_> = forward.blobs().cloned().collect();
        let b: Vec<_> = backward.blobs().cloned().collect();
        assert_eq!(f, b);
        assert!(f.windows(2).all(|w| w[0].digest() < w[1].digest()));
    }
}
