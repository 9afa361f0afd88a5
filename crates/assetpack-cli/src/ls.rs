//! # Ls Subcommand
//!
//! Loads a directory into a bundle and lists it through the virtual
//! filesystem, the same view a path-based file server would see.

use std::path::PathBuf;
use std::time::UNIX_EPOCH;

use anyhow::{Context, Result};
use clap::Args;

use assetpack_bundle::{Filesystem, Metadata};

use crate::load_dir_bundle;

/// Arguments for the `assetpack ls` subcommand.
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Directory to load.
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Path inside the bundle to list.
    #[arg(value_name = "PATH", default_value = "/")]
    pub path: String,

    /// List every path below PATH.
    #[arg(long, short)]
    pub recursive: bool,

    /// Regex over file base names to skip.
    #[arg(long)]
    pub ignore: Option<String>,
}

/// Execute the ls subcommand, returning the lines to print.
pub fn list(args: &LsArgs) -> Result<Vec<String>> {
    let bundle = load_dir_bundle(&args.dir, args.ignore.as_deref())?;
    let fs = Filesystem::new(&bundle);
    let handle = fs
        .open(&args.path)
        .with_context(|| format!("cannot open {}", args.path))?;

    if !handle.is_dir() {
        let meta = handle.stat();
        return Ok(vec![format_entry(&meta, &meta.name)]);
    }

    if args.recursive {
        let base = format!("/{}", args.path.trim_matches('/'));
        let base = base.trim_end_matches('/');
        return Ok(fs
            .walk()
            .into_iter()
            .filter(|(path, _)| {
                base.is_empty()
                    || path
                        .strip_prefix(base)
                        .is_some_and(|rest| rest.starts_with('/'))
            })
            .map(|(path, meta)| format_entry(&meta, &path))
            .collect());
    }

    Ok(handle
        .read_dir()?
        .iter()
        .map(|meta| format_entry(meta, &meta.name))
        .collect())
}

/// Execute the ls subcommand.
pub fn run_ls(args: &LsArgs) -> Result<u8> {
    for line in list(args)? {
        println!("{line}");
    }
    Ok(0)
}

/// `drwxrwxrwx  <size>  <unix-seconds>  <label>` with a trailing slash on
/// directories.
pub fn format_entry(meta: &Metadata, label: &str) -> String {
    let modified = meta
        .modified
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let suffix = if meta.is_dir { "/" } else { "" };
    format!(
        "{}  {:>10}  {:>10}  {label}{suffix}",
        mode_string(meta.mode, meta.is_dir),
        meta.size,
        modified
    )
}

fn mode_string(mode: u32, is_dir: bool) -> String {
    let mut s = String::with_capacity(10);
    s.push(if is_dir { 'd' } else { '-' });
    for shift in [6u32, 3, 0] {
        let bits = (mode >> shift) & 0o7;
        s.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        s.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        s.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    s
}
