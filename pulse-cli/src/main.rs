//! Pulse CLI - program health and risk-matrix reports

#![deny(warnings)]

// Global invariants enforced:
// - Deterministic output ordering
// - Scores come from pulse-core only
// - Diagnostics go to stderr; stdout carries the report

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use pulse_core::config::{self, ResolvedConfig};
use pulse_core::report::{render_matrix_json, render_matrix_text, render_summary};
use pulse_core::{
    evaluate_with_config, load_snapshot, render_json, render_text, EvaluateOptions, ProgramSnapshot,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pulse")]
#[command(about = "Program health scores and probability x impact risk matrices")]
#[command(version = env!("PULSE_VERSION"))]
struct Cli {
    /// Log debug diagnostics to stderr (RUST_LOG overrides)
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score every program in a snapshot file
    Health {
        /// Path to snapshot JSON file
        path: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: HealthFormat,

        /// Reference instant for overdue checks, RFC 3339 (overrides config file)
        #[arg(long)]
        now: Option<String>,

        /// Show only top N (worst) programs (overrides config file)
        #[arg(long)]
        top: Option<usize>,

        /// Only show programs scoring at or below this value (overrides config file)
        #[arg(long)]
        max_score: Option<u8>,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Show the probability x impact risk matrix
    Matrix {
        /// Path to snapshot JSON file
        path: PathBuf,

        /// Program id (default: every program in the snapshot)
        #[arg(long)]
        program: Option<String>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: MatrixFormat,
    },
    /// Validate or show a configuration file
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file without running a report
    Validate {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum HealthFormat {
    Text,
    Json,
    Summary,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum MatrixFormat {
    Text,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Health {
            path,
            format,
            now,
            top,
            max_score,
            config: config_path,
        } => {
            let snapshot = read_snapshot(&path)?;

            let resolved_config =
                config::load_and_resolve(&std::env::current_dir()?, config_path.as_deref())
                    .context("failed to load configuration")?;
            if let Some(config_path) = &resolved_config.config_path {
                eprintln!("Using config: {}", config_path.display());
            }

            // CLI flags override config file values
            if let Some(max) = max_score {
                if max > 100 {
                    anyhow::bail!("--max-score must be between 0 and 100 (got {})", max);
                }
            }
            let options = EvaluateOptions {
                max_score: max_score.or(resolved_config.max_score),
                top_n: top.or(resolved_config.top_n),
            };
            let reference = reference_time(now.as_deref(), &resolved_config)?;

            let reports =
                evaluate_with_config(&snapshot, reference, options, Some(&resolved_config));
            tracing::debug!(
                reference = %reference.to_rfc3339(),
                programs = reports.len(),
                "evaluated snapshot"
            );

            match format {
                HealthFormat::Text => {
                    print!("{}", render_text(&reports));
                }
                HealthFormat::Json => {
                    println!("{}", render_json(&reports));
                }
                HealthFormat::Summary => {
                    for report in &reports {
                        println!("{}", render_summary(report));
                    }
                }
            }
        }
        Commands::Matrix {
            path,
            program,
            format,
        } => {
            let snapshot = read_snapshot(&path)?;

            let programs: Vec<_> = match &program {
                Some(id) => match snapshot.program(id) {
                    Some(p) => vec![p],
                    None => anyhow::bail!("Program not found in snapshot: {}", id),
                },
                None => snapshot.programs.iter().collect(),
            };

            match format {
                MatrixFormat::Text => {
                    for (i, p) in programs.iter().enumerate() {
                        if i > 0 {
                            println!();
                        }
                        println!("{} ({})", p.display_name(), p.id);
                        print!("{}", render_matrix_text(&pulse_core::build_risk_matrix(&p.risks)));
                    }
                }
                MatrixFormat::Json => {
                    println!("{}", render_matrix_json(&programs));
                }
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => {
                let root = std::env::current_dir()?;
                match config::load_and_resolve(&root, path.as_deref()) {
                    Ok(config) => {
                        if let Some(ref p) = config.config_path {
                            println!("Config valid: {}", p.display());
                        } else {
                            println!("No config file found. Using defaults.");
                        }
                    }
                    Err(e) => {
                        eprintln!("Config validation failed: {:#}", e);
                        std::process::exit(1);
                    }
                }
            }
            ConfigAction::Show { path } => {
                let root = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&root, path.as_deref())
                    .context("failed to load configuration")?;

                println!("Configuration:");
                if let Some(ref p) = resolved.config_path {
                    println!("  Source: {}", p.display());
                } else {
                    println!("  Source: defaults (no config file found)");
                }
                println!();
                println!("Reference time:");
                println!(
                    "  {}",
                    resolved
                        .reference_time
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_else(|| "current clock".to_string())
                );
                println!();
                println!("Filters:");
                println!(
                    "  max_score: {}",
                    resolved
                        .max_score
                        .map(|v| v.to_string())
                        .unwrap_or_else(|| "none".to_string())
                );
                println!(
                    "  top: {}",
                    resolved
                        .top_n
                        .map(|v| v.to_string())
                        .unwrap_or_else(|| "none".to_string())
                );
                println!(
                    "  include: {}",
                    if resolved.include.is_some() {
                        "custom patterns"
                    } else {
                        "all programs"
                    }
                );
            }
        },
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn read_snapshot(path: &Path) -> anyhow::Result<ProgramSnapshot> {
    if !path.exists() {
        anyhow::bail!("Path does not exist: {}", path.display());
    }

    let snapshot = load_snapshot(path)?;
    if snapshot.skipped.total() > 0 {
        eprintln!(
            "Skipped {} malformed entr{} in {}",
            snapshot.skipped.total(),
            if snapshot.skipped.total() == 1 { "y" } else { "ies" },
            path.display()
        );
    }
    Ok(snapshot)
}

/// `--now` wins over the config file; otherwise use the clock
fn reference_time(flag: Option<&str>, resolved: &ResolvedConfig) -> anyhow::Result<DateTime<Utc>> {
    if let Some(raw) = flag {
        return config::parse_reference_time(raw).context("invalid --now value");
    }
    Ok(resolved.reference_time.unwrap_or_else(Utc::now))
}
