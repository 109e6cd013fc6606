//! Logix CLI
//!
//! Evaluate, merge, and check configuration documents from the shell.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::OutputFormat;

/// Logix - logic evaluation for configuration trees
#[derive(Parser)]
#[command(name = "logix")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file or directory (defaults to ./logix.yaml if present)
    #[arg(short, long)]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a YAML document and print the result
    Eval {
        /// Input file, or `-` for stdin
        input: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,

        /// Emit an indented trace of every evaluation step
        #[arg(long)]
        trace: bool,

        /// Maximum nesting depth
        #[arg(long)]
        max_depth: Option<usize>,
    },

    /// Evaluate several documents and deep-merge them in order
    Merge {
        /// Input files
        #[arg(required = true)]
        files: Vec<String>,

        /// Keep duplicate list items
        #[arg(long)]
        no_dedup: bool,

        /// Only merge top-level keys; do not flatten lists
        #[arg(long)]
        no_recursive: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
    },

    /// Evaluate every YAML file under a path and report failures
    Check {
        /// File or directory to check
        #[arg(default_value = ".")]
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let tracing_requested = matches!(cli.command, Commands::Eval { trace: true, .. });

    // Initialize logging; stdout carries documents, so logs go to stderr
    let filter = if cli.verbose || tracing_requested {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Eval {
            input,
            format,
            trace,
            max_depth,
        } => {
            commands::eval::run(&config, &input, format, trace, max_depth).await?;
        }
        Commands::Merge {
            files,
            no_dedup,
            no_recursive,
            format,
        } => {
            commands::merge::run(&config, &files, no_dedup, no_recursive, format).await?;
        }
        Commands::Check { path } => {
            commands::check::run(&config, &path).await?;
        }
    }

    Ok(())
}
