//! # assetpack-cli: Command Line Interface
//!
//! Provides the `assetpack` binary.
//!
//! ## Subcommands
//!
//! - `assetpack embed`: Generate the bundle source for a set of asset
//!   directories; `--check` verifies it is current without writing.
//! - `assetpack check`: Shorthand for `embed --check`, for CI.
//! - `assetpack serve`: Serve a directory with the bundle delivery protocol.
//! - `assetpack ls`: List a directory through the virtual filesystem view.
//!
//! ```bash
//! assetpack embed web/dist --target-dir src --package assets
//! assetpack embed --config assetpack.yaml --check
//! assetpack serve web/dist --port 8080 --prefix /static
//! assetpack ls web/dist /css
//! ```
//!
//! ## Exit Codes
//!
//! `0` success, `1` when `embed --check` finds the artifact stale, `2` on
//! any operational error.

pub mod embed;
pub mod ls;
pub mod serve;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use assetpack_build::naming::resource_name;
use assetpack_build::{scan, IgnoreFilter};
use assetpack_bundle::{Bundle, Resource};

/// Walk up from `start` to the nearest directory holding a `Cargo.toml`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut dir = start;
    loop {
        if dir.join("Cargo.toml").is_file() {
            return Some(dir.to_path_buf());
        }
        dir = dir.parent()?;
    }
}

/// Read every file below `dir` into an in-memory bundle.
///
/// Resource names are paths relative to `dir`. Hidden directories are
/// skipped and `ignore` filters base names, as in `embed`.
pub fn load_dir_bundle(dir: &Path, ignore: Option<&str>) -> Result<Bundle> {
    let filter = IgnoreFilter::new(ignore)?;
    let files = scan(dir, &filter)
        .with_context(|| format!("failed to scan {}", dir.display()))?;
    let strip = [dir.to_path_buf()];
    let mut resources = Vec::with_capacity(files.len());
    for file in &files {
        let bytes = std::fs::read(file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        resources.push(Resource::from_bytes(resource_name(file, &strip, ""), bytes));
    }
    tracing::info!(dir = %dir.display(), resources = resources.len(), "loaded directory");
    Ok(Bundle::new(resources))
}
