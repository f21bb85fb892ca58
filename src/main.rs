//! bumpdeps - bump dependency constraints in pyproject.toml
//!
//! Reads `[project].dependencies` and `[project.optional-dependencies]`,
//! looks up the newest releases on a PyPI-compatible index and rewrites the
//! constraints in place.

use bumpdeps::cli::CliArgs;
use bumpdeps::config::RunConfig;
use bumpdeps::error::AppError;
use bumpdeps::orchestrator::Orchestrator;
use bumpdeps::output::{create_formatter, OutputConfig};
use clap::Parser;
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_level()))
        .init();

    // Run the main logic and handle errors
    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {}", e);
            let code = e.downcast_ref::<AppError>().map_or(1, AppError::exit_code);
            ExitCode::from(code)
        }
    }
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let config = RunConfig::from_args(&args).map_err(AppError::from)?;
    log::debug!("bumpdeps v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("manifest: {}", config.file_path.display());
    log::debug!("index: {}", config.index_url);

    let orchestrator = Orchestrator::new(config)?;
    let result = orchestrator.run_with_progress(args.show_progress()).await?;

    let output_config = OutputConfig::from_cli(args.json, args.quiet, args.dry_run)
        .with_color(io::stdout().is_terminal());
    let formatter = create_formatter(output_config);

    let mut stdout = io::stdout().lock();
    formatter.format(&result, &mut stdout)?;
    stdout.flush()?;

    Ok(ExitCode::SUCCESS)
}
