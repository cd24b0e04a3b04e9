//! Clap derive structures for the `dottie` CLI.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use dottie_core::SourceGroup;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// dottie -- query WSDOT traffic and ferries data from the command line
#[derive(Debug, Parser)]
#[command(
    name = "dottie",
    version,
    about = "Query WSDOT traffic and ferries data from the command line",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "DOTTIE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Service host (overrides config)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Transport strategy (overrides config)
    #[arg(long, global = true)]
    pub transport: Option<TransportArg>,

    /// Request timeout in seconds (overrides config)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Shared Enums ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TransportArg {
    Auto,
    Direct,
    Jsonp,
}

impl TransportArg {
    pub fn as_config_value(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Direct => "direct",
            Self::Jsonp => "jsonp",
        }
    }
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List known endpoints
    #[command(alias = "ls")]
    Endpoints,

    /// Call an endpoint and print its JSON payload
    Fetch(FetchArgs),

    /// Show the last cache flush time of every ferries source group
    FlushDates,

    /// Poll cache flush markers and print invalidations until interrupted
    Watch(WatchArgs),

    /// Inspect configuration
    Config(ConfigArgs),
}

// ── Subcommand Args ──────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Endpoint id (see `dottie endpoints`)
    pub id: String,

    /// Template parameter as key=value (repeatable)
    #[arg(long = "param", short = 'p', value_parser = parse_key_val)]
    pub params: Vec<(String, String)>,

    /// Keep upstream date wrappers instead of converting them
    #[arg(long)]
    pub raw: bool,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Time between polls, e.g. "5m" or "90s" (overrides config)
    #[arg(long, value_parser = humantime::parse_duration)]
    pub interval: Option<Duration>,

    /// Only watch these groups (repeatable)
    #[arg(long = "group", short = 'g')]
    pub groups: Vec<SourceGroup>,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration (secrets masked)
    Show,
    /// Print the config file path
    Path,
}

fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    if key.trim().is_empty() {
        return Err(format!("missing key in '{raw}'"));
    }
    Ok((key.trim().to_owned(), value.to_owned()))
}
