//! footgen CLI
//!
//! Generates footloose and Cluster API Machine manifests from cluster parameters.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::ParamArgs;

/// footgen - footloose cluster manifest generator
#[derive(Parser)]
#[command(name = "footgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base parameter file path
    #[arg(short, long, default_value = "config.yaml", global = true)]
    config: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter parameter file
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,

        /// Cluster name (defaults to directory name)
        #[arg(short, long)]
        name: Option<String>,

        /// Backend the starter file targets
        #[arg(short, long, default_value = "docker")]
        backend: String,
    },

    /// Generate footloose.yaml and, when machines are known, machines.yaml
    Generate {
        #[command(flatten)]
        params: ParamArgs,

        /// Directory to write documents into
        #[arg(short, long, default_value = ".")]
        output_dir: String,

        /// Print documents to stdout instead of writing files
        #[arg(long)]
        stdout: bool,
    },

    /// Validate parameters without writing anything
    Validate {
        #[command(flatten)]
        params: ParamArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // Logs go to stderr so `generate --stdout` output stays clean.
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Init {
            path,
            name,
            backend,
        } => {
            commands::init::run(&path, name.as_deref(), &backend).await?;
        }
        Commands::Generate {
            params,
            output_dir,
            stdout,
        } => {
            commands::generate::run(&cli.config, &params, &output_dir, stdout).await?;
        }
        Commands::Validate { params } => {
            commands::validate::run(&cli.config, &params).await?;
        }
    }

    Ok(())
}
