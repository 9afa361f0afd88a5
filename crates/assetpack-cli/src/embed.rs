//! # Embed Subcommand
//!
//! Generates the bundle source, or with `--check` verifies that the existing
//! one matches the inputs. Options come from an optional YAML/JSON config
//! file; flags given on the command line take precedence.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use assetpack_build::{check, embed, BuildOptions, EmbedOutcome};

/// Arguments for the `assetpack embed` subcommand.
#[derive(Args, Debug, Default)]
pub struct EmbedArgs {
    /// Files or directories to embed.
    #[arg(value_name = "INCLUDE")]
    pub include: Vec<PathBuf>,

    /// YAML or JSON file with build options.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory receiving the generated source.
    #[arg(long)]
    pub target_dir: Option<PathBuf>,

    /// Module name of the generated source.
    #[arg(long)]
    pub package: Option<String>,

    /// File name of the generated source (default `<package>.rs`).
    #[arg(long)]
    pub output_file: Option<String>,

    /// Path prefix removed from resource names. Repeatable; first match wins.
    #[arg(long = "strip-prefix")]
    pub strip_prefixes: Vec<PathBuf>,

    /// Prefix attached to every resource name.
    #[arg(long)]
    pub prefix: Option<String>,

    /// Regex over file base names to skip, e.g. '\.map$|^\.'.
    #[arg(long)]
    pub ignore: Option<String>,

    /// Do not retain unpacked bytes after first use.
    #[arg(long)]
    pub no_cache_unpacked: bool,

    /// Do not retain brotli bytes after first use.
    #[arg(long)]
    pub no_cache_brotli: bool,

    /// Do not retain gzip bytes after first use.
    #[arg(long)]
    pub no_cache_gzip: bool,

    /// Project root that relative paths resolve against. Defaults to the
    /// nearest ancestor holding a Cargo.toml.
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Verify the generated source is current instead of writing it.
    #[arg(long)]
    pub check: bool,
}

/// Merge the config file (if any) with command-line overrides.
pub fn build_options(args: &EmbedArgs, root: &Path) -> Result<BuildOptions> {
    let mut opts = match &args.config {
        Some(path) => {
            let path = root.join(path);
            BuildOptions::load(&path)
                .with_context(|| format!("failed to load config {}", path.display()))?
        }
        None => BuildOptions::default(),
    };

    if !args.include.is_empty() {
        opts.include = args.include.clone();
    }
    if let Some(dir) = &args.target_dir {
        opts.target_dir = dir.clone();
    }
    if let Some(package) = &args.package {
        opts.package = package.clone();
    }
    if let Some(file) = &args.output_file {
        opts.output_file = Some(file.clone());
    }
    if !args.strip_prefixes.is_empty() {
        opts.strip_prefixes = args.strip_prefixes.clone();
    }
    if let Some(prefix) = &args.prefix {
        opts.prefix = prefix.clone();
    }
    if let Some(ignore) = &args.ignore {
        opts.ignore_regex = Some(ignore.clone());
    }
    opts.cache_unpacked &= !args.no_cache_unpacked;
    opts.cache_brotli &= !args.no_cache_brotli;
    opts.cache_gzip &= !args.no_cache_gzip;
    Ok(opts)
}

/// Execute the embed subcommand.
///
/// Returns exit code: 0 on success, 1 if --check finds the artifact stale.
pub fn run_embed(args: &EmbedArgs, root: &Path) -> Result<u8> {
    let root = args.root.as_deref().unwrap_or(root);
    let opts = build_options(args, root)?;
    tracing::debug!(?opts, root = %root.display(), "resolved build options");

    if args.check {
        let report = check(&opts, root).context("bundle check failed")?;
        if report.is_up_to_date() {
            println!("OK: {} is up to date ({})", report.path.display(), report.required);
            return Ok(0);
        }
        println!("STALE: {}", report.path.display());
        println!("  Required version: {}", report.required);
        println!(
            "  Embedded version: {}",
            report.embedded.as_deref().unwrap_or("<missing>")
        );
        return Ok(1);
    }

    match embed(&opts, root).context("bundle generation failed")? {
        EmbedOutcome::UpToDate { path, .. } => {
            println!("{} is already up to date", path.display());
        }
        EmbedOutcome::Written {
            path,
            resources,
            blobs,
            version,
        } => {
            println!(
                "wrote {} ({resources} resources, {blobs} blobs, version {version})",
                path.display()
            );
        }
    }
    Ok(0)
}
