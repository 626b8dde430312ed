//! podwatch — monitoring plugin for CSI driver node pods and mounts.
//!
//! Prints exactly one status line on stdout and exits with the plugin
//! status convention (OK=0, WARNING=1, CRITICAL=2, UNKNOWN=3). Logs go
//! to stderr.
//!
//! # Usage
//!
//! ```text
//! podwatch pods --hostname worker-1 --kubeconfig /etc/kube/node.conf
//! podwatch restarts --warn 0
//! podwatch mounts
//! ```

use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use podwatch_core::{PodwatchConfig, Verdict};
use podwatch_health::Policy;

mod commands;

use commands::mounts::MountArgs;
use commands::output::{self, OutputFormat};
use commands::pods::PodArgs;

#[derive(Debug, Parser)]
#[command(
    name = "podwatch",
    about = "podwatch — CSI driver node health checks for Nagios-compatible monitoring",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Config file (default: /etc/podwatch.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check that exactly one healthy driver node pod runs on this node
    Pods(PodArgs),
    /// Check driver node pods on this node for restarts and failures only
    Restarts(PodArgs),
    /// Check that the driver's FUSE mounts on this node are live
    Mounts(MountArgs),
    /// Print a podwatch.toml with the built-in defaults
    InitConfig,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "warn,podwatch=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

/// Run the selected check. `None` means the command printed its own output.
async fn run(cli: &Cli) -> anyhow::Result<Option<Verdict>> {
    if let Commands::InitConfig = cli.command {
        print!("{}", PodwatchConfig::default().to_toml_string()?);
        return Ok(None);
    }

    let config = PodwatchConfig::load(cli.config.as_deref())?;

    let verdict = match &cli.command {
        Commands::Pods(args) => commands::pods::run(args, &config, Policy::Singleton).await?,
        Commands::Restarts(args) => commands::pods::run(args, &config, Policy::RestartsOnly).await?,
        Commands::Mounts(args) => commands::mounts::run(args, &config)?,
        Commands::InitConfig => return Ok(None),
    };
    Ok(Some(verdict))
}

/// First line of a clap error without its `error: ` prefix.
fn usage_summary(e: &clap::Error) -> String {
    if matches!(
        e.kind(),
        ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand | ErrorKind::MissingSubcommand
    ) {
        return "missing subcommand".to_string();
    }
    let rendered = e.to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.trim_start_matches("error: ").to_string()
}

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            // Usage errors must not masquerade as CRITICAL (clap exits 2).
            let verdict = Verdict::unknown(usage_summary(&e));
            println!("{}", output::render(&verdict, OutputFormat::Text));
            eprintln!("{e}");
            std::process::exit(verdict.exit_code());
        }
    };

    init_tracing(cli.verbose);

    let verdict = match run(&cli).await {
        Ok(Some(verdict)) => verdict,
        Ok(None) => return,
        Err(e) => Verdict::unknown(format!("{e:#}")),
    };
    println!("{}", output::render(&verdict, cli.format));
    std::process::exit(verdict.exit_code());
}
