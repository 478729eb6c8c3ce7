///! Toolset CLI
///!
///! Replays scroll gestures through the pull-to-refresh coordinator and shows
///! what it would render and when it would refresh

mod commands;
mod config;
mod logging;
mod output;
mod scheduler;

use anyhow::Result;
use clap::{Parser, Subcommand};
use output::OutputFormat;
use std::path::PathBuf;
use std::time::Duration;
use toolset_common::trace::DEFAULT_PASS_INTERVAL_MS;
use toolset_common::ScrollTrace;
use tracing::{debug, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output format (table, json, yaml) [default: from config file]
    #[arg(short, long, global = true)]
    output: Option<String>,

    /// Pull distance that triggers a refresh
    #[arg(short, long, global = true)]
    threshold: Option<f64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scroll trace file (TOML or JSON)
    Simulate {
        /// Trace file
        #[arg(long)]
        trace: PathBuf,
        /// Replay in wall-clock time instead of on a virtual clock
        #[arg(long)]
        realtime: bool,
        /// Simulated duration of the refresh work in milliseconds
        #[arg(long)]
        work_ms: Option<u64>,
    },
    /// Simulate a synthetic pull-and-release gesture
    Pull {
        /// Pull distance at the bottom of the gesture
        #[arg(long)]
        to: f64,
        /// Passes from rest to the full distance
        #[arg(long, default_value_t = 10)]
        steps: usize,
        /// Milliseconds between passes
        #[arg(long, default_value_t = DEFAULT_PASS_INTERVAL_MS)]
        interval_ms: u64,
        /// Replay in wall-clock time instead of on a virtual clock
        #[arg(long)]
        realtime: bool,
        /// Simulated duration of the refresh work in milliseconds
        #[arg(long)]
        work_ms: Option<u64>,
    },
    /// Show the activity indicator rendered at a pull distance
    Indicator {
        /// Pull distance
        #[arg(long, allow_negative_numbers = true)]
        offset: f64,
        /// Render the refreshing (spinning) indicator
        #[arg(long)]
        refreshing: bool,
    },
    /// Manage the CLI configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Print the config file location
    Path,
    /// Set the refresh threshold
    SetThreshold { value: f64 },
    /// Set the haptic style (light, medium, heavy, soft, rigid, none)
    SetHaptic { style: String },
    /// Restore the default configuration
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, load_error) = match config::Config::load() {
        Ok(config) => (config, None),
        Err(e) => (config::Config::default(), Some(e)),
    };
    if let Some(threshold) = cli.threshold {
        config.refresh.threshold = threshold;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    let _log_guard = logging::LoggingConfig::from(&config.logging).init()?;
    if let Some(e) = load_error {
        warn!(error = %e, "Ignoring unreadable config file");
    }
    debug!(threshold = config.refresh.threshold, "Configuration loaded");

    let format = OutputFormat::from_str(cli.output.as_deref().unwrap_or(&config.default_output));
    let work = |work_ms: Option<u64>| Duration::from_millis(work_ms.unwrap_or(config.work_ms));

    match cli.command {
        Commands::Simulate {
            trace,
            realtime,
            work_ms,
        } => {
            let trace = commands::simulate::load_trace(&trace)?;
            commands::simulate::run(&trace, config.refresh.clone(), work(work_ms), realtime, format)
                .await?
        }
        Commands::Pull {
            to,
            steps,
            interval_ms,
            realtime,
            work_ms,
        } => {
            let trace = ScrollTrace::synthetic_pull(to, steps, interval_ms)?;
            commands::simulate::run(&trace, config.refresh.clone(), work(work_ms), realtime, format)
                .await?
        }
        Commands::Indicator { offset, refreshing } => {
            commands::indicator::run(config.refresh.clone(), offset, refreshing, format)?
        }
        Commands::Config { command } => commands::config::handle_config_command(command, format)?,
        Commands::Completions { shell } => {
            generate_completions(shell);
        }
    }

    Ok(())
}

/// Generate shell completions
fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();

    generate(shell, &mut cmd, name, &mut io::stdout());
}
