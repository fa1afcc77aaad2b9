//! jellyplay - decide how a Jellyfin item will reach the TV
//!
//! # Usage
//!
//! ```bash
//! jellyplay resolve items.json
//! jellyplay summary library.json --profile apple-tv-hd
//! jellyplay check --container mkv --video h264 --audio aac
//! ```

use clap::Parser;
use tracing_subscriber::EnvFilter;

use jellyplay::cli::{Cli, Command, ExitCode, Output};
use jellyplay::commands;
use jellyplay::config::Config;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run_cli(cli).into()
}

/// Logs go to stderr so JSON on stdout stays parseable
fn init_logging(verbose: bool) {
    let default = if verbose { "jellyplay=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Run CLI command and return exit code
fn run_cli(cli: Cli) -> ExitCode {
    let output = Output::new(&cli);

    let config = match Config::resolve(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => return output.error(e.to_string(), ExitCode::ConfigError),
    };
    let profile = cli.profile.as_deref();

    match cli.command {
        Command::Resolve(cmd) => commands::resolve_cmd(cmd, &config, profile, &output),

        Command::Summary(cmd) => commands::summary_cmd(cmd, &config, profile, &output),

        Command::Check(cmd) => commands::check_cmd(cmd, &config, profile, &output),

        Command::Capabilities(cmd) => commands::capabilities_cmd(cmd, &config, profile, &output),

        Command::Modes(cmd) => commands::modes_cmd(cmd, &output),
    }
}
