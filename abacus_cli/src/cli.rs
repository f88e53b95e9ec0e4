//! CLI argument parsing.
//!
//! Global flags (`--config`, `--verbose`) are inherited by all subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Abacus - run financial and business calculators from the command line
#[derive(Parser, Debug)]
#[command(name = "abacus")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Engine configuration file (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List registered calculators
    List {
        /// Only calculators in this category
        #[arg(long)]
        category: Option<String>,

        /// Case-insensitive search over id, name, description and tags
        #[arg(long)]
        search: Option<String>,
    },

    /// Show a calculator's inputs, outputs and examples
    Describe {
        id: String,

        /// Print the definition as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate and run a calculator
    Run {
        id: String,

        /// JSON file holding the input object
        #[arg(short, long, value_name = "FILE", conflicts_with = "set")]
        input: Option<PathBuf>,

        /// Set one input (repeatable); values are parsed as JSON, else taken as text
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,

        /// Generate the calculator's text report
        #[arg(long)]
        report: bool,

        /// Print the run outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run every calculator's examples and lint its schema
    Check {
        /// Print the check report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the markdown catalogue
    Catalogue,
}
