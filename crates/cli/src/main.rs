//! Vigilance CLI - quality gate enforcement.

mod render;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vigilance_core::QualityError;
use vigilance_quality::{
    BasicQualityEngine, EngineConfig, QualityEngine, VigilanceConfig, DEFAULT_CONFIG_FILE,
};
use vigilance_suites::default_catalog;

#[derive(Parser)]
#[command(name = "vigilance")]
#[command(
    about = "Enforce quality constraints on test and documentation reports",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file
    #[arg(long, short, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Evaluate suites in parallel
    #[arg(long, global = true)]
    parallel: bool,

    /// Log every evaluation step
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the configured suites (default)
    Check,
    /// List available suites and their constraints
    Suites,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("vigilance: {:#}", err);
            match err.downcast_ref::<QualityError>() {
                Some(quality) => ExitCode::from(quality.exit_code()),
                None => ExitCode::FAILURE,
            }
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let catalog = default_catalog()?;

    match cli.command.unwrap_or(Commands::Check) {
        Commands::Suites => {
            print!("{}", render::suites(&catalog));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check => {
            let config = VigilanceConfig::load(&cli.config)?;
            info!("Using configuration {}", cli.config.display());
            let engine = BasicQualityEngine::new(catalog).with_config(EngineConfig {
                parallel: cli.parallel,
            });

            let verdict = engine.run(&config).await?;
            match cli.format {
                OutputFormat::Text => print!("{}", render::text(&verdict)),
                OutputFormat::Json => println!("{}", render::json(&verdict)?),
            }

            match verdict.into_result() {
                Ok(_) => Ok(ExitCode::SUCCESS),
                Err(violations) => Ok(ExitCode::from(violations.exit_code())),
            }
        }
    }
}
