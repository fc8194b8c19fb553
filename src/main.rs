use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::{
    BrowseCommand, ConfigCommand, InfoCommand, PrefsCommand, ProductCommand, RecordsCommand,
    StatusCommand,
};
use config::Config;

#[derive(Parser)]
#[command(name = "miclo")]
#[command(version)]
#[command(about = "Browse and capture products from the Miclo catalogue", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List compared, active and saved records
    Records(RecordsCommand),

    /// Browse and capture products
    Product(ProductCommand),

    /// Inspect and change preferences
    Prefs(PrefsCommand),

    /// Show about-us, FAQ and version information
    Info(InfoCommand),

    /// Show collection and loading state
    Status(StatusCommand),

    /// Interactive records browser
    Browse(BrowseCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

fn main() {
    init_tracing();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Logs go to stderr so command output on stdout stays clean.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "miclo=info,miclo_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Save config path for config commands
    let cli_config_path = cli.config.clone();

    let config = Config::load(cli.config)?;
    tracing::debug!(server_url = %config.server_url.value, "Loaded configuration");

    match &cli.command {
        Some(Commands::Records(cmd)) => cmd.run(&config)?,
        Some(Commands::Product(cmd)) => cmd.run(&config)?,
        Some(Commands::Prefs(cmd)) => cmd.run(&config)?,
        Some(Commands::Info(cmd)) => cmd.run(&config)?,
        Some(Commands::Status(cmd)) => cmd.run(&config)?,
        Some(Commands::Browse(cmd)) => cmd.run(&config)?,
        Some(Commands::Config(cmd)) => cmd.run(&config, cli_config_path)?,
        None => println!("Use --help to see available commands"),
    }

    Ok(())
}
