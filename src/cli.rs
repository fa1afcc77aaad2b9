//! CLI - Command Line Interface for jellyplay
//!
//! Every command is scriptable. All output is JSON-parseable.
//!
//! # Examples
//!
//! ```bash
//! # Resolve every item in a saved /Items response
//! jellyplay resolve items.json --json
//!
//! # Pipe a single item straight from the server
//! curl -s "$SERVER/Users/$USER/Items/$ID" -H "X-Emby-Token: $TOKEN" | jellyplay resolve -
//!
//! # Ad-hoc check against a device profile
//! jellyplay check --container mkv --video h264 --audio aac -p apple-tv-hd
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::models::PlaybackMode;

// =============================================================================
// Exit Codes
// =============================================================================

/// Exit codes for CLI operations (semantic for scripting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General error
    Error = 1,
    /// Invalid arguments
    InvalidArgs = 2,
    /// Config file unreadable or profile unknown
    ConfigError = 3,
    /// Item document unreadable or malformed
    InputError = 4,
    /// Item document contained no items
    NoItems = 5,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> std::process::ExitCode {
        std::process::ExitCode::from(code as u8)
    }
}

// =============================================================================
// Main CLI Structure
// =============================================================================

/// jellyplay - decide how a Jellyfin item will reach the TV
#[derive(Parser, Debug)]
#[command(
    name = "jellyplay",
    version,
    about = "Decide direct play, remux, direct stream or transcode for Jellyfin items",
    long_about = "Classifies Jellyfin media items by how the server has to deliver them \
                  to a device: untouched (direct play), repackaged (remux), audio-only \
                  transcode (direct stream) or full transcode.\n\n\
                  Device capabilities come from named profiles in the config file.",
    after_help = "EXAMPLES:\n\
                  jellyplay resolve item.json               Resolve items in a document\n\
                  jellyplay summary library.json            Count items per mode\n\
                  jellyplay check --container mkv --video h264  Ad-hoc check\n\
                  jellyplay caps -p apple-tv-hd             Show a device profile"
)]
pub struct Cli {
    /// Output format as JSON (default for non-TTY)
    #[arg(long, short = 'j', global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable debug logging (decision traces on stderr)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Device capability profile
    #[arg(long, short = 'p', global = true)]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Check if JSON output should be used
    pub fn should_json(&self) -> bool {
        self.json || !std::io::stdout().is_terminal()
    }
}

// =============================================================================
// Subcommands
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve the playback mode of every item in a document
    #[command(visible_alias = "r")]
    Resolve(ResolveCmd),

    /// Count items per playback mode
    #[command(visible_alias = "sum")]
    Summary(SummaryCmd),

    /// Resolve an ad-hoc container/codec combination
    Check(CheckCmd),

    /// Show the active device profile
    #[command(visible_alias = "caps")]
    Capabilities(CapabilitiesCmd),

    /// List playback modes with quality and cost
    Modes(ModesCmd),
}

/// Resolve items from a Jellyfin JSON document
#[derive(Args, Debug)]
pub struct ResolveCmd {
    /// Item document path, or - for stdin
    #[arg(required = true)]
    pub input: PathBuf,

    /// Include the decision trace (per-dimension checks and reasons)
    #[arg(long, short = 't')]
    pub trace: bool,

    /// Only show items resolving to this mode
    #[arg(long, short = 'm', value_enum)]
    pub mode: Option<ModeFilter>,
}

/// Summarize a Jellyfin JSON document
#[derive(Args, Debug)]
pub struct SummaryCmd {
    /// Item document path, or - for stdin
    #[arg(required = true)]
    pub input: PathBuf,
}

/// Resolve one source described by flags
#[derive(Args, Debug)]
pub struct CheckCmd {
    /// Container identifier (e.g. mp4, mkv)
    #[arg(long)]
    pub container: Option<String>,

    /// Video codec identifier (e.g. h264, hevc)
    #[arg(long)]
    pub video: Option<String>,

    /// Audio codec identifier (e.g. aac, dts)
    #[arg(long)]
    pub audio: Option<String>,

    /// Treat the item as having no media source at all
    #[arg(long, conflicts_with_all = ["container", "video", "audio"])]
    pub no_source: bool,
}

#[derive(Args, Debug)]
pub struct CapabilitiesCmd {
    /// List profile names instead of the active profile's identifiers
    #[arg(long, short = 'l')]
    pub list: bool,
}

#[derive(Args, Debug)]
pub struct ModesCmd {}

/// Playback mode filter for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeFilter {
    #[value(alias = "direct")]
    DirectPlay,
    DirectStream,
    Remux,
    Transcode,
}

impl From<ModeFilter> for PlaybackMode {
    fn from(filter: ModeFilter) -> Self {
        match filter {
            ModeFilter::DirectPlay => PlaybackMode::DirectPlay,
            ModeFilter::DirectStream => PlaybackMode::DirectStream,
            ModeFilter::Remux => PlaybackMode::Remux,
            ModeFilter::Transcode => PlaybackMode::Transcode,
        }
    }
}

// =============================================================================
// Output Types
// =============================================================================

/// Generic JSON output wrapper with status
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "is_zero")]
    pub exit_code: i32,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

impl<T: Serialize> JsonOutput<T> {
    /// Create success output with data
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            exit_code: 0,
        }
    }

    /// Create error output (no data)
    pub fn error_msg(msg: impl Into<String>, code: ExitCode) -> JsonOutput<()> {
        JsonOutput::<()> {
            data: None,
            error: Some(msg.into()),
            exit_code: code.into(),
        }
    }
}

/// Output handler for consistent formatting
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

impl Output {
    pub fn new(cli: &Cli) -> Self {
        Self {
            json: cli.should_json(),
            quiet: cli.quiet,
        }
    }

    /// Print success data as a JSON envelope; no-op in text mode
    pub fn print<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        if self.json {
            let output = JsonOutput::success(data);
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Ok(())
    }

    /// Print a line of human-readable output; no-op in JSON mode
    pub fn text(&self, line: impl std::fmt::Display) {
        if !self.json {
            println!("{}", line);
        }
    }

    /// Print error and return exit code
    pub fn error(&self, msg: impl Into<String>, code: ExitCode) -> ExitCode {
        let msg = msg.into();
        if self.json {
            let output = JsonOutput::<()>::error_msg(&msg, code);
            if let Ok(json) = serde_json::to_string_pretty(&output) {
                eprintln!("{}", json);
            }
        } else if !self.quiet {
            eprintln!("Error: {}", msg);
        }
        code
    }

    /// Print info message (suppressed in quiet mode)
    pub fn info(&self, msg: impl std::fmt::Display) {
        if !self.quiet && !self.json {
            eprintln!("{}", msg);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
