//! CLI argument definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fixture-gen")]
#[command(about = "Generate seeded fixture object graphs from a type catalog")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Populate objects of a type and write them as JSON lines
    Generate {
        #[command(flatten)]
        args: GenerateArgs,
    },

    /// Show how a type and its fields resolve
    Resolve {
        #[command(flatten)]
        args: ResolveArgs,
    },

    /// Check a catalog and an optional parameters file
    Validate {
        #[command(flatten)]
        args: ValidateArgs,
    },
}

/// Catalog location shared by all commands.
#[derive(Args, Clone, Debug)]
pub struct CatalogArgs {
    /// Path to the type catalog YAML file
    #[arg(long, short = 'c', env = "FIXTURE_CATALOG")]
    pub catalog: PathBuf,
}

/// Arguments of `generate`.
#[derive(Args, Clone, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Type to populate, e.g. `Order` or `Page<Customer>`
    #[arg(long = "type", short = 't')]
    pub type_name: String,

    /// Number of objects to generate
    #[arg(long, short = 'n', default_value = "1")]
    pub count: u64,

    /// Index of the first object (objects are reproducible per index)
    #[arg(long, default_value = "0")]
    pub start_index: u64,

    /// Random seed for deterministic generation (overrides the config file)
    #[arg(long, env = "FIXTURE_SEED")]
    pub seed: Option<u64>,

    /// Maximum population depth (overrides the config file)
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Parameters and producers YAML file
    #[arg(long, value_name = "PATH", env = "FIXTURE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output file (stdout when omitted)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Pretty-print each object instead of one object per line
    #[arg(long)]
    pub pretty: bool,
}

/// Arguments of `resolve`.
#[derive(Args, Clone, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Type to resolve, e.g. `Sub` or `Box<List<String>>`
    #[arg(long = "type", short = 't')]
    pub type_name: String,
}

/// Arguments of `validate`.
#[derive(Args, Clone, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Parameters and producers YAML file
    #[arg(long, value_name = "PATH", env = "FIXTURE_CONFIG")]
    pub config: Option<PathBuf>,
}
