//! # Rebuild Gate
//!
//! A build is skipped when the digest of its inputs equals the digest
//! embedded in the previously generated artifact.
//!
//! The required digest covers, in order:
//!
//! 1. the contents of every input file, files sorted lexicographically by
//!    path and concatenated without separators;
//! 2. the canonical JSON bytes of the build options.
//!
//! The embedded digest is read from a marker line within the first
//! 1024 bytes of the artifact. An artifact that exists but carries no
//! marker is corrupt and aborts the build.

use std::io::Read;
use std::path::{Path, PathBuf};

use assetpack_core::{ContentDigest, DigestBuilder};

use crate::error::BuildError;
use crate::options::BuildOptions;

/// Text preceding the quoted digest on the marker line.
pub const VERSION_MARKER: &str = "const BundleVersion = ";

/// How much of an existing artifact is searched for the marker.
pub const MARKER_SCAN_BYTES: u64 = 1024;

/// Digest of the input set and options.
///
/// Independent of the order of `files`.
pub fn compute_required_version(
    files: &[PathBuf],
    opts: &BuildOptions,
) -> Result<ContentDigest, BuildError> {
    let mut sorted: Vec<&PathBuf> = files.iter().collect();
    sorted.sort();

    let mut builder = DigestBuilder::new();
    for file in sorted {
        let bytes = std::fs::read(file).map_err(|e| BuildError::io(file, e))?;
        builder.update(&bytes);
    }
    builder.update(opts.fingerprint()?);
    Ok(builder.finish())
}

/// The digest embedded in an existing artifact.
///
/// `Ok(None)` if the artifact does not exist.
pub fn extract_embedded_version(artifact: &Path) -> Result<Option<String>, BuildError> {
    let file = match std::fs::File::open(artifact) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(BuildError::io(artifact, e)),
    };

    let mut head = Vec::with_capacity(MARKER_SCAN_BYTES as usize);
    file.take(MARKER_SCAN_BYTES)
        .read_to_end(&mut head)
        .map_err(|e| BuildError::io(artifact, e))?;

    String::from_utf8_lossy(&head)
        .lines()
        .find_map(parse_marker_line)
        .map(Some)
        .ok_or_else(|| BuildError::MissingVersionMarker(artifact.to_path_buf()))
}

fn parse_marker_line(line: &str) -> Option<String> {
    let line = line.trim();
    let line = line.strip_prefix("//").map_or(line, str::trim_start);
    let value = line.strip_prefix(VERSION_MARKER)?;
    Some(value.replace('"', "").trim().to_string())
}

/// Render the marker line for `version`.
pub fn marker_line(version: &str) -> String {
    format!("{VERSION_MARKER}\"{version}\"")
}

/// True unless the embedded digest equals the required one exactly.
pub fn needs_rebuild(required: &str, embedded: Option<&str>) -> bool {
    embedded != Some(required)
}
