use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::error::Result;
use crate::session::{print_defaults, run_record, run_replay, run_verify};

/// Default screen height when none is given (pan scale 4).
pub const DEFAULT_SCREEN_HEIGHT: f64 = 800.0;

#[derive(Debug, Parser)]
#[command(
    name = "podctl",
    about = "Replay, record and verify pod-control gesture sessions",
    version
)]
pub struct Cli {
    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Feed a gesture script through the controller and print each change.
    Replay(ReplayArgs),

    /// Record a gesture script into a verifiable session trace.
    Record(RecordArgs),

    /// Replay a session trace and fail if any checkpoint differs.
    Verify(VerifyArgs),

    /// Print the default configuration as JSON.
    Defaults,
}

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Newline-delimited JSON gesture events.
    pub script: PathBuf,

    /// Screen height in pixels (sets the pan scale).
    #[arg(long, default_value_t = DEFAULT_SCREEN_HEIGHT)]
    pub screen_height: f64,

    /// JSON configuration file overriding the defaults.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print JSON lines instead of text.
    #[arg(long)]
    pub json: bool,

    /// Also print ignored callbacks and bookkeeping.
    #[arg(long)]
    pub all: bool,
}

#[derive(Debug, Args)]
pub struct RecordArgs {
    /// Newline-delimited JSON gesture events.
    pub script: PathBuf,

    /// Where to write the session trace.
    pub output: PathBuf,

    #[arg(long, default_value_t = DEFAULT_SCREEN_HEIGHT)]
    pub screen_height: f64,

    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct VerifyArgs {
    /// Session trace written by `podctl record`.
    pub trace: PathBuf,

    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(cli, &mut out)
}

pub fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    match cli.command {
        Commands::Replay(args) => run_replay(&args, out),
        Commands::Record(args) => run_record(&args, out),
        Commands::Verify(args) => run_verify(&args, out),
        Commands::Defaults => print_defaults(out),
    }
}

fn init_logging(json: bool) {
    // A subscriber may already be installed; keep whichever came first.
    if json {
        let _ = podctl_core::logging::init_json_subscriber();
    } else {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }
}
