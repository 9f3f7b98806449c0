//! webauth CLI binary entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;
use webauth_flow::cli::{commands, Cli, Commands};
use webauth_flow::config::FlowConfig;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let config = FlowConfig::load(cli.config.as_deref())?;

    match &cli.command {
        Commands::AuthorizeUrl => commands::handle_authorize_url(&config).map(|()| true),
        Commands::Classify(args) => commands::handle_classify(&config, args).map(|()| true),
        Commands::Replay(args) => commands::handle_replay(&config, args),
    }
}
