//! CLI command implementations

use anyhow::{Context, Result};
use clap::Args;
use footgen_core::{Config, Params};

pub mod generate;
pub mod init;
pub mod validate;

/// Extra parameter sources layered over the base config file
#[derive(Args, Debug, Default)]
pub struct ParamArgs {
    /// Additional parameter file (YAML or JSON), merged in order
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub files: Vec<String>,

    /// Parameter override, e.g. `cluster.workers.nodes=3`
    #[arg(short = 'p', long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,
}

/// Load the base config file, then each `-f` file, then each `-p` override
pub fn load_config(config_path: &str, args: &ParamArgs) -> Result<Config> {
    tracing::info!("Loading parameters from {}", config_path);

    let mut params = Params::new();
    params
        .merge_file(config_path)
        .with_context(|| format!("Failed to load {}", config_path))?;

    for file in &args.files {
        tracing::info!("Merging parameters from {}", file);
        params
            .merge_file(file)
            .with_context(|| format!("Failed to load {}", file))?;
    }

    for arg in &args.params {
        let (key, value) = Params::parse_override(arg)?;
        params.set(key, value)?;
    }

    params.into_config().context("Invalid parameters")
}
