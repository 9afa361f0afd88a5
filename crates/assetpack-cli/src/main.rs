//! # assetpack CLI entry point
//!
//! Parses command-line arguments, installs logging and dispatches to the
//! subcommand handlers in the library crate.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use assetpack_cli::embed::{run_embed, EmbedArgs};
use assetpack_cli::find_project_root;
use assetpack_cli::ls::{run_ls, LsArgs};
use assetpack_cli::serve::{run_serve, ServeArgs};

/// Embed static assets into Rust binaries and serve them.
#[derive(Parser, Debug)]
#[command(name = "assetpack", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the embedded bundle source, or verify it with --check.
    Embed(EmbedArgs),

    /// Verify the embedded bundle source is current. Same as `embed --check`.
    Check(EmbedArgs),

    /// Serve a directory over HTTP with etag and encoding negotiation.
    Serve(ServeArgs),

    /// List a directory through the virtual filesystem view.
    Ls(LsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over -v when set.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let root = find_project_root(&cwd).unwrap_or_else(|| {
        tracing::debug!("no Cargo.toml above the working directory; using it as the root");
        cwd.clone()
    });
    tracing::debug!(root = %root.display(), "resolved project root");

    let result = match cli.command {
        Commands::Embed(args) => run_embed(&args, &root),
        Commands::Check(mut args) => {
            args.check = true;
            run_embed(&args, &root)
        }
        Commands::Serve(args) => run_serve(&args),
        Commands::Ls(args) => run_ls(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
