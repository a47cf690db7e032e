//! CLI argument parsing and command definitions

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// Catch duplicate material records before they reach inventory
#[derive(Debug, Parser)]
#[command(
    name = "stockmatch",
    author,
    version,
    about = "Catch duplicate material records before they reach inventory",
    propagate_version = true,
    after_help = "Use 'stockmatch <command> --help' for more information about a command."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,
    #[command(subcommand)]
    pub command: Command,
}

/// Global options available to all commands
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalOpts {
    /// Output format (json, yaml, table, auto)
    #[arg(
        short = 'o',
        long = "output",
        value_enum,
        global = true,
        conflicts_with = "json"
    )]
    pub output_format: Option<OutputFormat>,

    /// Output as JSON (shorthand for -o json)
    #[arg(long, global = true)]
    pub json: bool,

    /// Company whose inventory is used
    #[arg(short = 'c', long, env = "STOCKMATCH_COMPANY", global = true)]
    pub company: Option<String>,

    /// Directory holding inventory files
    #[arg(long, value_name = "DIR", env = "STOCKMATCH_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Override config file path
    #[arg(long, value_name = "PATH", env = "STOCKMATCH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Reduce output to only errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase logging verbosity (stackable: -v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Enable debug logging (equivalent to -vv)
    #[arg(long, global = true)]
    pub debug: bool,

    /// Enable trace logging
    #[arg(long, global = true)]
    pub trace: bool,

    /// Disable colored output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Hide table headers
    #[arg(long, global = true)]
    pub no_headers: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[non_exhaustive]
pub enum OutputFormat {
    Json,
    Yaml,
    Table,
    Auto,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check a material against the inventory for likely duplicates
    Check {
        #[command(flatten)]
        candidate: CandidateArgs,

        /// Show how each field contributed to the score
        #[arg(long)]
        explain: bool,
    },

    /// Add a material, merging into a duplicate when one is chosen
    Add {
        #[command(flatten)]
        candidate: CandidateArgs,

        #[command(flatten)]
        attrs: AttributeArgs,

        /// Merge the quantity into this matching record instead of inserting
        #[arg(long, value_name = "ID", conflicts_with = "new", requires = "quantity")]
        merge: Option<String>,

        /// Insert as a new record even when duplicates were found
        #[arg(long)]
        new: bool,
    },

    /// Add quantity to an existing record
    Merge {
        /// Record ID
        id: String,

        /// Quantity to add
        #[arg(long)]
        quantity: f64,
    },

    /// List inventory records
    List {
        /// Filter by name or category (fuzzy match)
        filter: Option<String>,
    },

    /// Show a single record
    Show {
        /// Record ID
        id: String,
    },

    /// Remove a record
    Remove {
        /// Record ID
        id: String,
    },

    /// Inspect and manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Fields describing a candidate material
#[derive(Debug, Clone, Args)]
pub struct CandidateArgs {
    /// Material name
    #[arg(long, required_unless_present = "data")]
    pub name: Option<String>,

    /// Material category (exact-match key)
    #[arg(long, required_unless_present = "data")]
    pub category: Option<String>,

    /// Material subcategory
    #[arg(long)]
    pub subcategory: Option<String>,

    /// Origin tag (e.g. country or supplier region)
    #[arg(long)]
    pub origin: Option<String>,

    /// Candidate as JSON (inline, @file, or - for stdin)
    #[arg(
        long = "data",
        value_name = "JSON",
        conflicts_with_all = ["name", "category", "subcategory", "origin"]
    )]
    pub data: Option<String>,
}

/// Display attributes stored with a new record
#[derive(Debug, Clone, Args)]
pub struct AttributeArgs {
    /// Quantity on hand
    #[arg(long)]
    pub quantity: Option<f64>,

    /// Unit of measure (e.g. kg, m3)
    #[arg(long)]
    pub unit: Option<String>,

    /// Cost per unit
    #[arg(long)]
    pub cost: Option<f64>,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show effective configuration
    Show,

    /// Print config file path
    Path,

    /// Get a specific configuration value
    Get {
        /// Configuration key (dot-separated path)
        key: Option<String>,
    },

    /// Reset configuration to defaults
    Reset,
}
