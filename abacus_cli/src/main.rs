//! # Abacus CLI
//!
//! Command line front end for `abacus_core`: list and describe calculators,
//! run them against JSON or `key=value` inputs, self-check the catalogue and
//! print its markdown reference.
//!
//! Exit codes for `run`: 0 on success, 1 when the inputs are invalid, 2 on a
//! calculation failure or an unknown calculator. `check` exits 1 when any
//! calculator fails.

mod cli;
mod commands;

use std::process::ExitCode;
use std::sync::Arc;

use abacus_core::{catalogue, CalcResult, Engine, EngineConfig, Registry};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

const DEFAULT_FILTER: &str = "abacus_core=info";

fn init_tracing(config: &EngineConfig, verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::try_new(config.log_filter.as_deref().unwrap_or(DEFAULT_FILTER))
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
        }),
        1 => EnvFilter::new("abacus_core=debug"),
        _ => EnvFilter::new("abacus_core=trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn build_engine(config: EngineConfig) -> CalcResult<Engine> {
    let registry = Arc::new(Registry::with_policy(config.registry.duplicate_policy));
    catalogue::register_all(&registry)?;
    Ok(Engine::new(registry, config))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match EngineConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(2);
            }
        },
        None => EngineConfig::default(),
    };
    init_tracing(&config, cli.verbose);

    let engine = match build_engine(config) {
        Ok(engine) => {
            tracing::debug!(calculators = engine.registry().len(), "engine ready");
            engine
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };

    let result = match cli.command {
        Commands::List { category, search } => {
            commands::list(&engine, category.as_deref(), search.as_deref())
        }
        Commands::Describe { id, json } => commands::describe(&engine, &id, json),
        Commands::Run {
            id,
            input,
            set,
            report,
            json,
        } => commands::run(&engine, &id, input.as_deref(), &set, report, json),
        Commands::Check { json } => commands::check(&engine, json),
        Commands::Catalogue => commands::catalogue(&engine),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(commands::exit_code(&e))
        }
    }
}
