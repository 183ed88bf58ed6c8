//! Check parameters without writing anything

use anyhow::{Context, Result};
use footgen_core::{Document, generate};

use super::{ParamArgs, load_config};

/// Run the validate command
pub async fn run(config_path: &str, params: &ParamArgs) -> Result<()> {
    tracing::info!("Validating parameters: {}", config_path);

    let config = load_config(config_path, params)?;
    let documents = generate(&config).context("Failed to generate manifests")?;

    tracing::info!("✓ Cluster: {}", config.cluster.name);

    let mut machines = None;
    for doc in &documents {
        match &doc.document {
            Document::Topology(topology) => {
                if let Some(first) = topology.machines.first() {
                    tracing::info!(
                        "✓ Backend: {} (image {})",
                        first.spec.backend,
                        first.spec.image
                    );
                }
                for group in &topology.machines {
                    tracing::info!("✓ {}: {} nodes", group.spec.name, group.count);
                }
            }
            Document::Machines(list) => machines = Some(list.items.len()),
        }
    }

    match (&config.machines, machines) {
        (Some(records), Some(count)) => {
            tracing::info!("✓ Machines: {} records, {} manifests", records.len(), count)
        }
        _ => tracing::info!("✓ Machines: none, only footloose.yaml would be written"),
    }

    tracing::info!("✓ Parameters are valid ({} documents)", documents.len());
    Ok(())
}
