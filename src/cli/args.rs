//! Command-line argument definitions

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use crate::cli::commands::{completions::CompletionsArgs, generate::GenerateArgs, group::GroupArgs};

/// spcgen - synthetic SPC measurement datasets and hierarchical grouping
#[derive(Parser, Debug)]
#[command(name = "spcgen", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a synthetic SPC dataset
    Generate(GenerateArgs),

    /// Group a dataset by one or more fields
    Group(GroupArgs),

    /// Print shell completions
    Completions(CompletionsArgs),
}

/// Options shared by every subcommand
#[derive(clap::Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Config file (overrides ./.spcgen.yaml and the user config)
    #[arg(long, global = true, env = "SPCGEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Seed for reproducible datasets
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Date stamped into lot IDs (YYYY-MM-DD, defaults to today)
    #[arg(long, global = true)]
    pub lot_date: Option<NaiveDate>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pick a format based on the command
    Auto,
    Json,
    Yaml,
    Csv,
    Tsv,
    Table,
    Md,
}
