// Command-line interface: argument parsing and console output

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use crossterm::style::Stylize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::experiment::{
    build_groups, select_groups, ExperimentController, ExperimentGroup, ExperimentSummary,
};
use crate::providers::OpenAiCompatibleClient;
use crate::recording::{output_path, CsvRunRecorder, RunRecorder};

/// Multi-turn persuasion experiments between a recommender and a simulated user
#[derive(Debug, Parser)]
#[command(name = "stancelab", version, about)]
pub struct Cli {
    /// Config file (default: ~/.stancelab/config.toml, if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug-level logging (RUST_LOG takes precedence when set)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the experiment matrix (default)
    Run(RunArgs),
    /// List the experiment groups without calling the API
    Groups,
}

/// Overrides for a single invocation
#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    /// Turns per run
    #[arg(long)]
    pub turns: Option<u32>,

    /// Runs per group
    #[arg(long)]
    pub runs: Option<u32>,

    /// Output base filename
    #[arg(short, long)]
    pub output: Option<String>,

    /// Only run these groups (repeatable), e.g. --group A-HIGH
    #[arg(short, long = "group")]
    pub groups: Vec<String>,
}

impl RunArgs {
    /// Apply command-line overrides on top of the loaded config
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(turns) = self.turns {
            config.num_turns = turns;
        }
        if let Some(runs) = self.runs {
            config.num_runs = runs;
        }
        if let Some(output) = &self.output {
            config.output_filename = output.clone();
        }
    }
}

/// The configured group matrix, narrowed to `labels` when any are given
pub fn experiment_groups(config: &Config, labels: &[String]) -> Result<Vec<ExperimentGroup>> {
    select_groups(
        build_groups(&config.recommender_personas, &config.user_personas),
        labels,
    )
}

/// Validate, open the output file, then run the whole matrix.
///
/// Config, credential and group checks all happen before the output file is
/// created, so a rejected invocation leaves nothing on disk.
pub async fn run_experiment(config: &Config, labels: &[String]) -> Result<ExperimentSummary> {
    config.validate().context("Configuration validation failed")?;
    config.require_api_key()?;
    let groups = experiment_groups(config, labels)?;

    let path = output_path(
        &config.output_filename,
        config.primary_topic(),
        chrono::Local::now(),
    );
    let mut recorder = CsvRunRecorder::create(&path)
        .context("Cannot create the output file, so no data could be recorded")?;

    let client = OpenAiCompatibleClient::from_settings(&config.api)
        .context("Failed to create HTTP client")?;
    let controller = ExperimentController::new(Arc::new(client), config);

    print_start(config, &groups, &recorder.location());
    let summary = controller
        .run_all(&config.topics, &groups, &mut recorder)
        .await;
    print_summary(&summary);

    Ok(summary)
}

const RULE: &str = "===================================================================";

/// Banner printed before the first run
pub fn print_start(config: &Config, groups: &[ExperimentGroup], sink: &str) {
    println!("{}", RULE);
    println!(
        "{} Experiment starting: {}",
        "▸".cyan().bold(),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    for (i, topic) in config.topics.iter().enumerate() {
        println!("  Topic {}: {}", i, topic);
    }
    println!(
        "  Groups: {} ({})",
        groups.len(),
        groups
            .iter()
            .map(|g| g.label.as_str())
            .collect::<Vec<_>>()
            .join(" · ")
            .cyan()
    );
    println!(
        "  {} run(s) per group, {} turn(s) per run",
        config.num_runs, config.num_turns
    );
    println!("  Models: recommender={} user={}", config.models.recommender, config.models.user);
    println!("  Output: {}", sink);
    println!("{}", RULE);
}

/// Final summary with totals and any degradations
pub fn print_summary(summary: &ExperimentSummary) {
    let diagnostics = summary.diagnostics();

    println!("\n{}", RULE);
    println!("{} All experiment groups finished", "✓".green().bold());
    println!("  Experiment: {}", summary.experiment_id);
    println!("  Data file:  {}", summary.sink);
    println!(
        "  Groups: {}  Runs: {}  Turns: {}",
        summary.groups.len(),
        summary.total_runs(),
        summary.total_turns()
    );
    println!("  Records written: {}", summary.records_written());

    let dropped = summary.records_dropped();
    if dropped > 0 {
        println!("  {} Records dropped: {}", "⚠".yellow().bold(), dropped);
    }
    if diagnostics.api_failures > 0 {
        println!(
            "  {} API failures (recorded as sentinels): {}",
            "⚠".yellow().bold(),
            diagnostics.api_failures
        );
    }
    if diagnostics.parse_misses + diagnostics.parse_degraded > 0 {
        println!(
            "  {} Stance fallbacks: {} missing, {} malformed",
            "⚠".yellow().bold(),
            diagnostics.parse_misses,
            diagnostics.parse_degraded
        );
    }
    if diagnostics.clamped > 0 {
        println!("  Stances clamped into range: {}", diagnostics.clamped);
    }
    println!("{}", RULE);
}

/// Listing for `stancelab groups`
pub fn print_groups(groups: &[ExperimentGroup]) {
    for group in groups {
        println!(
            "{} recommender: {} ({})  user: {} ({})",
            format!("{:<10}", group.label).bold(),
            group.recommender.label,
            group.recommender.name,
            group.user.label,
            group.user.name
        );
    }
}
