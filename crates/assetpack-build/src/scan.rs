//! # Input Scanning
//!
//! Resolves the configured include list into the flat, sorted list of
//! absolute file paths the rest of the pipeline consumes. Directories are
//! walked recursively; hidden directories are skipped; files whose base
//! name matches the ignore pattern are dropped. Symbolic links are not
//! followed.

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::BuildError;
use crate::options::BuildOptions;

/// Base-name filter applied during directory scans.
#[derive(Debug, Clone, Default)]
pub struct IgnoreFilter {
    pattern: Option<Regex>,
}

impl IgnoreFilter {
    /// Compile `pattern`. `None` or an empty pattern ignores nothing.
    pub fn new(pattern: Option<&str>) -> Result<Self, BuildError> {
        let pattern = match pattern {
            Some(p) if !p.is_empty() => Some(Regex::new(p)?),
            _ => None,
        };
        Ok(Self { pattern })
    }

    pub fn is_ignored(&self, file_name: &str) -> bool {
        self.pattern
            .as_ref()
            .is_some_and(|re| re.is_match(file_name))
    }
}

/// Recursively collect regular files below `dir`, sorted.
pub fn scan(dir: &Path, filter: &IgnoreFilter) -> Result<Vec<PathBuf>, BuildError> {
    let mut files = Vec::new();
    scan_inner(dir, filter, &mut files)?;
    files.sort();
    Ok(files)
}

fn scan_inner(dir: &Path, filter: &IgnoreFilter, acc: &mut Vec<PathBuf>) -> Result<(), BuildError> {
    let entries = std::fs::read_dir(dir).map_err(|e| BuildError::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| BuildError::io(dir, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| BuildError::io(&path, e))?;
        let name = entry.file_name();
        let name = name.to_string_lossy();

        if file_type.is_dir() {
            if name.starts_with('.') {
                tracing::debug!(path = %path.display(), "skipping hidden directory");
                continue;
            }
            scan_inner(&path, filter, acc)?;
        } else if file_type.is_file() {
            if filter.is_ignored(&name) {
                tracing::debug!(path = %path.display(), "ignored by pattern");
                continue;
            }
            acc.push(path);
        }
    }
    Ok(())
}

/// Resolve `opts.include` against `cwd` into the build's input files.
///
/// Directory entries are scanned; file entries are taken as is. The result
/// is sorted and free of duplicates.
pub fn collect_inputs(opts: &BuildOptions, cwd: &Path) -> Result<Vec<PathBuf>, BuildError> {
    let filter = IgnoreFilter::new(opts.ignore_regex.as_deref())?;
    let mut files = Vec::new();
    for include in &opts.include {
        let path = cwd.join(include);
        let meta = std::fs::metadata(&path).map_err(|e| BuildError::io(&path, e))?;
        if meta.is_dir() {
            files.extend(scan(&path, &filter)?);
        } else if meta.is_file() {
            files.push(path);
        } else {
            tracing::warn!(path = %path.display(), "include is neither a file nor a directory, skipped");
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// Number of files and their total size in bytes.
pub fn input_stats(files: &[PathBuf]) -> Result<(usize, u64), BuildError> {
    let mut total = 0u64;
    for file in files {
        total += std::fs::metadata(file)
            .map_err(|e| BuildError::io(file, e))?
            .len();
    }
    Ok((files.len(), total))
}
