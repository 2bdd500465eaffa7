// Stancelab - multi-turn persuasion experiments
// Main entry point

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::style::Stylize;
use tracing_subscriber::EnvFilter;

use stancelab::cli::{self, Cli, Command, RunArgs};
use stancelab::config::load_config;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Fatal:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "stancelab=debug" } else { "stancelab=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command.unwrap_or_else(|| Command::Run(RunArgs::default())) {
        Command::Groups => {
            config.validate().context("Configuration validation failed")?;
            cli::print_groups(&cli::experiment_groups(&config, &[])?);
            Ok(())
        }
        Command::Run(args) => {
            args.apply_to(&mut config);
            cli::run_experiment(&config, &args.groups).await?;
            Ok(())
        }
    }
}
