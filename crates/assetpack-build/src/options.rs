//! # Build Options
//!
//! The configuration record of a build. Loaded from YAML or JSON, then
//! overridden field by field by command-line flags. The canonical form of
//! the record is part of the version digest, so changing any option forces
//! regeneration even when no input file changed.

use std::path::{Path, PathBuf};

use assetpack_bundle::CachePolicy;
use assetpack_core::CanonicalBytes;
use serde::{Deserialize, Serialize};

use crate::error::BuildError;

/// Default package (module) name of the generated source.
pub const DEFAULT_PACKAGE: &str = "assets";

/// Configuration of a single build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildOptions {
    /// Directory receiving the generated source. Relative to the working
    /// directory unless absolute.
    pub target_dir: PathBuf,
    /// Module name of the generated source. Also the default file stem.
    pub package: String,
    /// File name of the generated source; `<package>.rs` when unset.
    pub output_file: Option<String>,
    /// Files and directories to embed.
    pub include: Vec<PathBuf>,
    /// Path prefixes removed from file paths to form resource names. The
    /// first matching entry wins. Empty means the working directory.
    pub strip_prefixes: Vec<PathBuf>,
    /// Attached in front of every resource name.
    pub prefix: String,
    /// Files whose base name matches are skipped during directory scans.
    pub ignore_regex: Option<String>,
    pub cache_unpacked: bool,
    pub cache_brotli: bool,
    pub cache_gzip: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            target_dir: PathBuf::from("."),
            package: DEFAULT_PACKAGE.to_string(),
            output_file: None,
            include: Vec::new(),
            strip_prefixes: Vec::new(),
            prefix: String::new(),
            ignore_regex: None,
            cache_unpacked: true,
            cache_brotli: true,
            cache_gzip: true,
        }
    }
}

impl BuildOptions {
    /// Load options from a YAML or JSON file. `.json` files are parsed as
    /// JSON, everything else as YAML.
    pub fn load(path: &Path) -> Result<Self, BuildError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| BuildError::io(path, source))?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let parsed = if is_json {
            serde_json::from_str(&content).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str(&content).map_err(|e| e.to_string())
        };
        parsed.map_err(|message| BuildError::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Reject a package name that cannot be a Rust module name.
    pub fn validate(&self) -> Result<(), BuildError> {
        let mut chars = self.package.chars();
        let valid = match chars.next() {
            Some(c) if c == '_' || c.is_ascii_alphabetic() => {
                chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
            }
            _ => false,
        };
        if !valid || self.package == "_" {
            return Err(BuildError::InvalidPackage(self.package.clone()));
        }
        Ok(())
    }

    /// Retention policy stamped on every generated resource.
    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy::new(self.cache_unpacked, self.cache_brotli, self.cache_gzip)
    }

    /// Generated file name.
    pub fn output_file_name(&self) -> String {
        self.output_file
            .clone()
            .unwrap_or_else(|| format!("{}.rs", self.package))
    }

    /// Absolute location of the generated source.
    pub fn target_path(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.target_dir).join(self.output_file_name())
    }

    /// Strip prefixes in effect: the configured ones, or `cwd`.
    pub fn effective_strip_prefixes(&self, cwd: &Path) -> Vec<PathBuf> {
        if self.strip_prefixes.is_empty() {
            vec![cwd.to_path_buf()]
        } else {
            self.strip_prefixes
                .iter()
                .map(|p| cwd.join(p))
                .collect()
        }
    }

    /// Canonical bytes folded into the version digest.
    pub fn fingerprint(&self) -> Result<CanonicalBytes, BuildError> {
        Ok(CanonicalBytes::new(self)?)
    }
}
