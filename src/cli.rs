use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author = clap::crate_authors!(), version, about, long_about = None, help_template = "\
{before-help}{name} {version}
by {author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
")]
#[command(propagate_version = true)]
pub struct Cli {
    #[arg(short, long, default_value_t = ColorChoice::Auto, global = true)]
    /// Control whether color is used in the output
    pub colour: ColorChoice,

    /// Enable debugging output
    ///
    /// Use multiple times to increase verbosity
    /// (e.g., -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to the configuration file
    ///
    /// Defaults to `hl7-bridge.toml` in the current directory, if it exists.
    #[arg(long, global = true, env = "HL7_BRIDGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log output to a file instead of standard error
    ///
    /// Log file will be created if it does not exist and appended to if it does.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Process messages and print the results as JSON
    Process {
        /// Files containing one message each
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Label recorded as the source of each message
        ///
        /// Defaults to the file path.
        #[arg(long)]
        source: Option<String>,

        /// Only print the acknowledgment message
        #[arg(long)]
        ack_only: bool,
    },

    /// Validate messages without mapping them
    Validate {
        /// Files containing one message each
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Process many messages concurrently and summarise the outcomes
    Batch {
        /// Files containing one message each
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Number of worker threads
        #[arg(short, long, default_value_t = 4)]
        workers: usize,
    },

    /// Describe a segment (e.g. `PID`) or a field (e.g. `PID.8`)
    Describe {
        /// The segment or field to describe
        target: String,
    },
}

pub fn cli() -> Cli {
    Cli::parse()
}
