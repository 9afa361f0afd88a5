//! # Resource: Named Content with Lazily Cached Encodings
//!
//! A [`Resource`] relates a name to the original bytes of a file and to
//! three derived forms that are computed on first use:
//!
//! | Channel   | Derivation                                                         |
//! |-----------|--------------------------------------------------------------------|
//! | unpacked  | decode + brotli-decompress the canonical payload                   |
//! | gzip      | gzip-compress the unpacked bytes                                   |
//! | brotli    | decode the canonical payload (it already is brotli), or compress the unpacked bytes when there is no payload |
//!
//! ## Cache state machine
//!
//! Each channel is independent. With its [`CachePolicy`] flag enabled the
//! first derivation is stored and every later read returns the very same
//! buffer. With the flag disabled every read derives again and nothing is
//! retained.
//!
//! ## Synchronization
//!
//! One `parking_lot::Mutex` per resource guards all three slots. The
//! check-derive-store sequence runs with the guard held, so concurrent
//! readers of the same channel wait for a single derivation and then share
//! its result, and nobody ever observes a half-written slot. The gzip and
//! brotli derivations obtain the unpacked bytes through the guard they
//! already hold.
//!
//! Uncached channels derive outside the guard. They take it only to read
//! the unpacked slot, so uncached compressions of one resource run in
//! parallel.

use std::borrow::Cow;
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use assetpack_core::{codec, sha256_hex, CodecError};
use bytes::Bytes;
use parking_lot::Mutex;

use crate::error::ResourceError;

/// Which derived forms a resource retains after first computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CachePolicy {
    /// Retain the unpacked (identity) bytes.
    pub unpacked: bool,
    /// Retain the brotli bytes.
    pub brotli: bool,
    /// Retain the gzip bytes.
    pub gzip: bool,
}

impl CachePolicy {
    /// Retain every form.
    pub const ALL: Self = Self {
        unpacked: true,
        brotli: true,
        gzip: true,
    };

    /// Retain nothing; every read derives again.
    pub const NONE: Self = Self {
        unpacked: false,
        brotli: false,
        gzip: false,
    };

    /// Build a policy from the three flags in generated-code order.
    pub const fn new(unpacked: bool, brotli: bool, gzip: bool) -> Self {
        Self {
            unpacked,
            brotli,
            gzip,
        }
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::ALL
    }
}

/// Number of derivations actually performed per channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Decode + decompress runs.
    pub unpacked: u64,
    /// gzip compressions.
    pub gzip: u64,
    /// brotli decodes or compressions.
    pub brotli: u64,
}

#[derive(Debug, Default)]
struct Slots {
    unpacked: Option<Bytes>,
    gzip: Option<Bytes>,
    brotli: Option<Bytes>,
}

#[derive(Debug, Default)]
struct Counters {
    unpacked: AtomicU64,
    gzip: AtomicU64,
    brotli: AtomicU64,
}

/// A named, addressable unit of content.
///
/// Everything except the lazily populated slots is immutable after
/// construction.
pub struct Resource {
    name: String,
    encoded: Cow<'static, str>,
    size: u64,
    mode: u32,
    modified: SystemTime,
    sha256_hex: String,
    policy: CachePolicy,
    slots: Mutex<Slots>,
    counters: Counters,
}

impl Resource {
    /// Create a resource from a canonical encoded payload.
    ///
    /// This is the constructor emitted by generated bundle sources; `encoded`
    /// is normally a `&'static str` constant shared by every resource with
    /// identical content.
    pub fn new(
        name: impl Into<String>,
        size: u64,
        mode: u32,
        modified: SystemTime,
        sha256_hex: impl Into<String>,
        policy: CachePolicy,
        encoded: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            name: name.into(),
            encoded: encoded.into(),
            size,
            mode,
            modified,
            sha256_hex: sha256_hex.into(),
            policy,
            slots: Mutex::new(Slots::default()),
            counters: Counters::default(),
        }
    }

    /// Create an in-memory resource from raw bytes.
    ///
    /// There is no canonical payload: the unpacked slot is populated up
    /// front, all cache flags are enabled, the mode is `0o777` and the
    /// modification time is now.
    pub fn from_bytes(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        let resource = Self::new(
            name,
            data.len() as u64,
            0o777,
            SystemTime::now(),
            sha256_hex(&data),
            CachePolicy::ALL,
            "",
        );
        resource.slots.lock().unpacked = Some(data);
        resource
    }

    /// The unique, slash-delimited name, e.g. `/css/app.css`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Length of the original (unpacked) bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Unix permission bits recorded at build time.
    pub fn mode(&self) -> u32 {
        self.mode
    }

    /// Modification time recorded at build time.
    pub fn modified(&self) -> SystemTime {
        self.modified
    }

    /// Lowercase hex SHA-256 of the original bytes. Served as the `etag`.
    pub fn sha256_hex(&self) -> &str {
        &self.sha256_hex
    }

    /// The retention policy for derived forms.
    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// True if the resource carries a canonical encoded payload.
    pub fn is_packed(&self) -> bool {
        !self.encoded.is_empty()
    }

    /// How many derivations have run so far, per channel.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            unpacked: self.counters.unpacked.load(Ordering::Relaxed),
            gzip: self.counters.gzip.load(Ordering::Relaxed),
            brotli: self.counters.brotli.load(Ordering::Relaxed),
        }
    }

    /// The original bytes.
    pub fn unpacked(&self) -> Result<Bytes, ResourceError> {
        if !self.policy.unpacked {
            if let Some(cached) = &self.slots.lock().unpacked {
                return Ok(cached.clone());
            }
            return self.derive_unpacked();
        }
        let mut slots = self.slots.lock();
        self.unpacked_locked(&mut slots)
    }

    /// The original bytes, gzip-compressed.
    pub fn gzip(&self) -> Result<Bytes, ResourceError> {
        if !self.policy.gzip {
            let unpacked = self.unpacked()?;
            return self.derive_gzip(&unpacked);
        }

        let mut slots = self.slots.lock();
        if let Some(cached) = &slots.gzip {
            return Ok(cached.clone());
        }
        let unpacked = self.unpacked_locked(&mut slots)?;
        let compressed = self.derive_gzip(&unpacked)?;
        slots.gzip = Some(compressed.clone());
        Ok(compressed)
    }

    /// The original bytes, brotli-compressed.
    ///
    /// When a canonical payload exists it already is the brotli stream and
    /// only needs decoding. In-memory resources without a payload compress
    /// their unpacked bytes instead.
    pub fn brotli(&self) -> Result<Bytes, ResourceError> {
        if !self.policy.brotli {
            return if self.encoded.is_empty() {
                let unpacked = self.unpacked()?;
                self.derive_brotli(Some(&unpacked))
            } else {
                self.derive_brotli(None)
            };
        }

        let mut slots = self.slots.lock();
        if let Some(cached) = &slots.brotli {
            return Ok(cached.clone());
        }
        let compressed = if self.encoded.is_empty() {
            let unpacked = self.unpacked_locked(&mut slots)?;
            self.derive_brotli(Some(&unpacked))?
        } else {
            self.derive_brotli(None)?
        };
        slots.brotli = Some(compressed.clone());
        Ok(compressed)
    }

    /// A reader over the original bytes.
    pub fn reader(&self) -> Result<Cursor<Bytes>, ResourceError> {
        Ok(Cursor::new(self.unpacked()?))
    }

    /// A reader over the gzip form.
    pub fn gzip_reader(&self) -> Result<Cursor<Bytes>, ResourceError> {
        Ok(Cursor::new(self.gzip()?))
    }

    /// A reader over the brotli form.
    pub fn brotli_reader(&self) -> Result<Cursor<Bytes>, ResourceError> {
        Ok(Cursor::new(self.brotli()?))
    }

    /// Write the original bytes into `dst`, returning the byte count.
    pub fn write_to(&self, dst: &mut impl Write) -> Result<usize, ResourceError> {
        let bytes = self.unpacked()?;
        dst.write_all(&bytes)?;
        Ok(bytes.len())
    }

    /// Write the gzip form into `dst`, returning the byte count.
    pub fn write_gzip_to(&self, dst: &mut impl Write) -> Result<usize, ResourceError> {
        let bytes = self.gzip()?;
        dst.write_all(&bytes)?;
        Ok(bytes.len())
    }

    /// Write the brotli form into `dst`, returning the byte count.
    pub fn write_brotli_to(&self, dst: &mut impl Write) -> Result<usize, ResourceError> {
        let bytes = self.brotli()?;
        dst.write_all(&bytes)?;
        Ok(bytes.len())
    }

    /// Recompute the digest of the unpacked bytes and compare it with the
    /// recorded one.
    pub fn verify_integrity(&self) -> Result<(), ResourceError> {
        let unpacked = self.unpacked()?;
        let actual = sha256_hex(&unpacked);
        if actual != self.sha256_hex {
            return Err(ResourceError::Integrity {
                name: self.name.clone(),
                expected: self.sha256_hex.clone(),
                actual,
            });
        }
        Ok(())
    }

    /// Read or fill the unpacked slot under a guard the caller holds.
    fn unpacked_locked(&self, slots: &mut Slots) -> Result<Bytes, ResourceError> {
        if let Some(cached) = &slots.unpacked {
            return Ok(cached.clone());
        }
        let unpacked = self.derive_unpacked()?;
        if self.policy.unpacked {
            slots.unpacked = Some(unpacked.clone());
        }
        Ok(unpacked)
    }

    fn derive_unpacked(&self) -> Result<Bytes, ResourceError> {
        if self.encoded.is_empty() {
            return Err(ResourceError::NoContent {
                name: self.name.clone(),
            });
        }
        let unpacked = Bytes::from(codec::unpack(&self.encoded).map_err(|e| self.codec_error(e))?);
        self.counters.unpacked.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(name = %self.name, bytes = unpacked.len(), "unpacked payload");
        Ok(unpacked)
    }

    fn derive_gzip(&self, unpacked: &[u8]) -> Result<Bytes, ResourceError> {
        let compressed =
            Bytes::from(codec::gzip_compress(unpacked).map_err(|e| self.codec_error(e))?);
        self.counters.gzip.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(name = %self.name, bytes = compressed.len(), "derived gzip form");
        Ok(compressed)
    }

    /// Compress `unpacked` when given, otherwise decode the payload.
    fn derive_brotli(&self, unpacked: Option<&[u8]>) -> Result<Bytes, ResourceError> {
        let derived = match unpacked {
            Some(unpacked) => codec::brotli_compress(unpacked),
            None => codec::decode_text(&self.encoded),
        };
        let compressed = Bytes::from(derived.map_err(|e| self.codec_error(e))?);
        self.counters.brotli.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(name = %self.name, bytes = compressed.len(), "derived brotli form");
        Ok(compressed)
    }

    fn codec_error(&self, source: CodecError) -> ResourceError {
        ResourceError::Codec {
            name: self.name.clone(),
            source,
        }
    }
}

impl std::fmt::Debug for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("mode", &format_args!("{:o}", self.mode))
            .field("sha256", &self.sha256_hex)
            .field("packed", &self.is_packed())
            .field("policy", &self.policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::sync::{Arc, Barrier};
    use std::time::UNIX_EPOCH;

    const BODY: &[u8] = b"body { color: rebeccapurple; } body { color: rebeccapurple; }";

    fn packed(name: &str, data: &[u8], policy: CachePolicy) -> Resource {
        Resource::new(
            name,
            data.len() as u64,
            0o644,
            UNIX_EPOCH,
            sha256_hex(data),
            policy,
            codec::pack(data).unwrap(),
        )
    }

    #[test]
    fn unpacked_returns_original_bytes() {
        let r = packed("/app.css", BODY, CachePolicy::ALL);
        assert_eq!(&r.unpacked().unwrap()[..], BODY);
        assert!(r.is_packed());
        assert_eq!(r.size(), BODY.len() as u64);
    }

    #[test]
    fn cached_unpack_runs_once_and_shares_buffer() {
        let r = packed("/app.css", BODY, CachePolicy::ALL);
        let first = r.unpacked().unwrap();
        let second = r.unpacked().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.as_ptr(), second.as_ptr());
        assert_eq!(r.stats().unpacked, 1);
    }

    #[test]
    fn uncached_unpack_recomputes() {
        let r = packed("/app.css", BODY, CachePolicy::NONE);
        assert_eq!(r.unpacked().unwrap(), r.unpacked().unwrap());
        assert_eq!(r.stats().unpacked, 2);
    }

    #[test]
    fn channels_are_independent() {
        let policy = CachePolicy::new(false, true, true);
        let r = packed("/app.css", BODY, policy);
        r.gzip().unwrap();
        r.gzip().unwrap();
        // gzip cached: derived once, needing one unpack. Unpacked is not
        // retained, so a direct read unpacks again.
        assert_eq!(r.stats().gzip, 1);
        assert_eq!(r.stats().unpacked, 1);
        r.unpacked().unwrap();
        assert_eq!(r.stats().unpacked, 2);
    }

    #[test]
    fn gzip_form_decompresses_to_original() {
        let r = packed("/app.css", BODY, CachePolicy::ALL);
        let gz = r.gzip().unwrap();
        assert_eq!(codec::gzip_decompress(&gz).unwrap(), BODY);
    }

    #[test]
    fn brotli_from_payload_is_decode_only() {
        let r = packed("/app.css", BODY, CachePolicy::ALL);
        let br = r.brotli().unwrap();
        assert_eq!(codec::brotli_decompress(&br).unwrap(), BODY);
        // No unpack was needed to serve brotli.
        assert_eq!(r.stats().unpacked, 0);
        assert_eq!(r.stats().brotli, 1);
    }

    #[test]
    fn from_bytes_serves_every_form() {
        let r = Resource::from_bytes("/mem.txt", BODY.to_vec());
        assert!(!r.is_packed());
        assert_eq!(r.sha256_hex(), sha256_hex(BODY));
        assert_eq!(r.mode(), 0o777);
        assert_eq!(&r.unpacked().unwrap()[..], BODY);
        assert_eq!(r.stats().unpacked, 0);

        let br = r.brotli().unwrap();
        assert_eq!(codec::brotli_decompress(&br).unwrap(), BODY);
        let gz = r.gzip().unwrap();
        assert_eq!(codec::gzip_decompress(&gz).unwrap(), BODY);
    }

    #[test]
    fn empty_payload_without_cache_is_an_error() {
        let r = Resource::new("/ghost", 3, 0o644, UNIX_EPOCH, "00", CachePolicy::ALL, "");
        assert!(matches!(
            r.unpacked(),
            Err(ResourceError::NoContent { .. })
        ));
        assert!(r.gzip().is_err());
        assert!(r.brotli().is_err());
    }

    #[test]
    fn corrupt_payload_is_reported() {
        let r = Resource::new(
            "/bad",
            3,
            0o644,
            UNIX_EPOCH,
            "00",
            CachePolicy::ALL,
            "@@not-base64@@",
        );
        assert!(matches!(r.unpacked(), Err(ResourceError::Codec { .. })));
    }

    #[test]
    fn verify_detects_digest_mismatch() {
        let good = packed("/ok", BODY, CachePolicy::ALL);
        assert!(good.verify_integrity().is_ok());

        let bad = Resource::new(
            "/tampered",
            BODY.len() as u64,
            0o644,
            UNIX_EPOCH,
            sha256_hex(b"something else"),
            CachePolicy::ALL,
            codec::pack(BODY).unwrap(),
        );
        assert!(matches!(bad.verify_integrity(), Err(ResourceError::Integrity { .. })));
    }

    #[test]
    fn readers_and_writers() {
        let r = packed("/app.css", BODY, CachePolicy::ALL);
        let mut s = Vec::new();
        r.reader().unwrap().read_to_end(&mut s).unwrap();
        assert_eq!(s, BODY);

        let mut sink = Vec::new();
        let n = r.write_gzip_to(&mut sink).unwrap();
        assert_eq!(n, sink.len());
        assert_eq!(codec::gzip_decompress(&sink).unwrap(), BODY);

        let mut sink = Vec::new();
        r.write_brotli_to(&mut sink).unwrap();
        assert_eq!(codec::brotli_decompress(&sink).unwrap(), BODY);

        let mut sink = Vec::new();
        assert_eq!(r.write_to(&mut sink).unwrap(), BODY.len());
    }

    #[test]
    fn concurrent_readers_converge_on_one_derivation() {
        let r = Arc::new(packed("/app.css", BODY, CachePolicy::ALL));
        let barrier = Arc::new(Barrier::new(8));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let r = Arc::clone(&r);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    (r.unpacked().unwrap(), r.gzip().unwrap())
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let stats = r.stats();
        assert_eq!(stats.unpacked, 1);
        assert_eq!(stats.gzip, 1);
        let (first_unpacked, first_gz) = &results[0];
        for (u, g) in &results {
            assert_eq!(u.as_ptr(), first_unpacked.as_ptr());
            assert_eq!(g.as_ptr(), first_gz.as_ptr());
        }
    }

    #[test]
    fn uncached_brotli_does_not_wait_for_the_guard() {
        let r = Arc::new(packed("/app.css", BODY, CachePolicy::NONE));
        let held = r.slots.lock();

        let (tx, rx) = std::sync::mpsc::channel();
        let worker = {
            let r = Arc::clone(&r);
            std::thread::spawn(move || {
                tx.send(r.brotli().unwrap()).unwrap();
            })
        };
        let br = rx
            .recv_timeout(std::time::Duration::from_secs(10))
            .expect("uncached brotli blocked on the resource guard");
        drop(held);
        worker.join().unwrap();
        assert_eq!(codec::brotli_decompress(&br).unwrap(), BODY);
    }

    #[test]
    fn uncached_gzip_derives_per_reader() {
        let policy = CachePolicy::new(true, true, false);
        let r = Arc::new(packed("/app.css", BODY, policy));
        let barrier = Arc::new(Barrier::new(4));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let r = Arc::clone(&r);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    r.gzip().unwrap()
                })
            })
            .collect();
        for h in handles {
            assert_eq!(codec::gzip_decompress(&h.join().unwrap()).unwrap(), BODY);
        }
        let stats = r.stats();
        assert_eq!(stats.gzip, 4);
        assert_eq!(stats.unpacked, 1);
        assert!(r.slots.lock().gzip.is_none());
    }

    #[test]
    fn debug_omits_payload() {
        let r = packed("/app.css", BODY, CachePolicy::ALL);
        let dbg = format!("{r:?}");
        assert!(dbg.contains("/app.css"));
        assert!(dbg.contains("644"));
        assert!(!dbg.contains(&codec::pack(BODY).unwrap()));
    }
}
