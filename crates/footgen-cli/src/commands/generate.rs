//! Generate manifests and write them to disk

use anyhow::{Context, Result};
use footgen_core::output::to_yaml_stream;
use footgen_core::{OutputDocument, generate};
use std::path::Path;

use super::{ParamArgs, load_config};

/// Run the generate command
pub async fn run(config_path: &str, params: &ParamArgs, output_dir: &str, stdout: bool) -> Result<()> {
    let config = load_config(config_path, params)?;

    tracing::info!(
        "Generating manifests for cluster '{}' ({} backend)",
        config.cluster.name,
        config.backend
    );

    // Everything is derived before anything is written, so a failing machine
    // record never leaves a half-updated output directory.
    let documents = generate(&config).context("Failed to generate manifests")?;

    if stdout {
        print!("{}", to_yaml_stream(&documents)?);
        return Ok(());
    }

    let output_dir = Path::new(output_dir);
    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    for document in &documents {
        write_document(output_dir, document).await?;
    }

    if config.machines.is_none() {
        tracing::info!("No machine records in parameters, machines.yaml not generated");
    }

    tracing::info!("Generated {} documents", documents.len());
    Ok(())
}

async fn write_document(output_dir: &Path, document: &OutputDocument) -> Result<()> {
    let yaml = document.to_yaml()?;
    let hash = document.content_hash()?;
    let path = output_dir.join(&document.path);

    tokio::fs::write(&path, &yaml)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!(
        "✓ {} ({} bytes, hash: {}...)",
        path.display(),
        yaml.len(),
        &hash[..8]
    );
    Ok(())
}
