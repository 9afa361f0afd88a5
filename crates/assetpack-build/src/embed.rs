//! # Embed Pipeline
//!
//! ```text
//! include list ──► collect_inputs ──► compute_required_version
//!                                            │
//!                  extract_embedded_version ─┤ equal? ──► UpToDate
//!                                            │
//!                         BlobStore + ResourceEntry per file
//!                                            │
//!                                   render ──► temp file ──► rename
//! ```
//!
//! The artifact is replaced atomically: rendering happens fully in memory,
//! is written to a temporary file next to the target and renamed over it.
//! A failure at any stage leaves the previous artifact as it was.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::blob::BlobStore;
use crate::codegen::{render, ResourceEntry};
use crate::error::BuildError;
use crate::naming::resource_name;
use crate::options::BuildOptions;
use crate::scan::{collect_inputs, input_stats};
use crate::version::{compute_required_version, extract_embedded_version, needs_rebuild};

/// Result of a successful [`embed`] run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedOutcome {
    /// The artifact already matches the inputs; nothing was written.
    UpToDate { path: PathBuf, version: String },
    /// A new artifact was written.
    Written {
        path: PathBuf,
        resources: usize,
        blobs: usize,
        version: String,
    },
}

impl EmbedOutcome {
    pub fn path(&self) -> &Path {
        match self {
            Self::UpToDate { path, .. } | Self::Written { path, .. } => path,
        }
    }

    pub fn version(&self) -> &str {
        match self {
            Self::UpToDate { version, .. } | Self::Written { version, .. } => version,
        }
    }
}

/// Up-to-dateness of an artifact, without building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub path: PathBuf,
    pub required: String,
    pub embedded: Option<String>,
}

impl CheckReport {
    pub fn is_up_to_date(&self) -> bool {
        !needs_rebuild(&self.required, self.embedded.as_deref())
    }
}

/// Compare the artifact's embedded version with the inputs.
pub fn check(opts: &BuildOptions, cwd: &Path) -> Result<CheckReport, BuildError> {
    opts.validate()?;
    let files = collect_inputs(opts, cwd)?;
    let required = compute_required_version(&files, opts)?.to_hex();
    let path = opts.target_path(cwd);
    let embedded = extract_embedded_version(&path)?;
    Ok(CheckReport {
        path,
        required,
        embedded,
    })
}

/// Run the build. Relative paths in `opts` are resolved against `cwd`.
pub fn embed(opts: &BuildOptions, cwd: &Path) -> Result<EmbedOutcome, BuildError> {
    opts.validate()?;
    let files = collect_inputs(opts, cwd)?;
    let (count, total) = input_stats(&files)?;
    tracing::info!(
        files = count,
        bytes = total,
        mib = %format!("{:.2}", total as f64 / (1024.0 * 1024.0)),
        "collected inputs"
    );

    let version = compute_required_version(&files, opts)?.to_hex();
    let path = opts.target_path(cwd);
    let embedded = extract_embedded_version(&path)?;
    if !needs_rebuild(&version, embedded.as_deref()) {
        tracing::info!(path = %path.display(), "bundle is already up to date, nothing to do");
        return Ok(EmbedOutcome::UpToDate { path, version });
    }

    let strip_prefixes = opts.effective_strip_prefixes(cwd);
    let policy = opts.cache_policy();
    let mut store = BlobStore::new();
    let mut entries = Vec::with_capacity(files.len());
    for file in &files {
        let bytes = std::fs::read(file).map_err(|e| BuildError::io(file, e))?;
        let meta = std::fs::metadata(file).map_err(|e| BuildError::io(file, e))?;
        let blob = store.add_payload(&bytes)?;
        let name = resource_name(file, &strip_prefixes, &opts.prefix);
        tracing::debug!(file = %file.display(), name = %name, blob = %blob.digest(), "embedding");
        entries.push(ResourceEntry {
            name,
            size: bytes.len() as u64,
            mode: file_mode(&meta),
            modified: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            sha256_hex: blob.digest().to_hex(),
            policy,
            blob,
        });
    }

    let source = render(&opts.package, &version, &entries, &store)?;
    write_atomically(&path, source.as_bytes())?;
    tracing::info!(
        path = %path.display(),
        resources = entries.len(),
        blobs = store.len(),
        raw = store.raw_bytes(),
        encoded = store.encoded_bytes(),
        "wrote bundle"
    );

    Ok(EmbedOutcome::Written {
        path,
        resources: entries.len(),
        blobs: store.len(),
        version,
    })
}

fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), BuildError> {
    let dir = path.parent().unwrap_or(Path::new("."));
    std::fs::create_dir_all(dir).map_err(|e| BuildError::io(dir, e))?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| BuildError::io(dir, e))?;
    tmp.write_all(contents)
        .map_err(|e| BuildError::io(tmp.path(), e))?;

    // The temporary file is created 0600; keep the artifact's own mode.
    let permissions = match std::fs::metadata(path) {
        Ok(meta) => Some(meta.permissions()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => new_artifact_permissions(),
        Err(e) => return Err(BuildError::io(path, e)),
    };
    if let Some(permissions) = permissions {
        tmp.as_file()
            .set_permissions(permissions)
            .map_err(|e| BuildError::io(tmp.path(), e))?;
    }

    tmp.persist(path)
        .map_err(|e| BuildError::io(path, e.error))?;
    Ok(())
}

#[cfg(unix)]
fn new_artifact_permissions() -> Option<std::fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(std::fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_artifact_permissions() -> Option<std::fs::Permissions> {
    None
}

#[cfg(unix)]
fn file_mode(meta: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o777
}

#[cfg(not(unix))]
fn file_mode(meta: &std::fs::Metadata) -> u32 {
    if meta.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}
