//! CLI entry point for webauth.

pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Web authentication flow inspector
#[derive(Parser, Debug)]
#[command(name = "webauth", version, about = "Redirect auth flow tooling")]
pub struct Cli {
    /// Config file (defaults to ~/.webauth/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a fresh authorize URL with its state and PKCE verifier
    AuthorizeUrl,
    /// Classify a platform load error
    Classify(ClassifyArgs),
    /// Replay a recorded navigation trace through a session
    Replay(ReplayArgs),
}

/// Arguments for `webauth classify`.
#[derive(Parser, Debug)]
pub struct ClassifyArgs {
    /// Error domain (e.g. NSURLErrorDomain)
    #[arg(short, long)]
    pub domain: String,

    /// Numeric error code
    #[arg(long, allow_hyphen_values = true)]
    pub code: i64,

    /// Human-readable message reported with the error
    #[arg(short, long, default_value = "")]
    pub message: String,
}

/// Arguments for `webauth replay`.
#[derive(Parser, Debug)]
pub struct ReplayArgs {
    /// Trace file (.json or .toml)
    pub trace: PathBuf,

    /// Override the request URL recorded in the trace
    #[arg(long)]
    pub request_url: Option<String>,
}
