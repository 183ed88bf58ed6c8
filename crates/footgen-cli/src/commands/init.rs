//! Write a starter parameter file

use anyhow::Result;
use footgen_core::Backend;
use std::path::Path;
use tokio::fs;

/// Run the init command
pub async fn run(path: &str, name: Option<&str>, backend: &str) -> Result<()> {
    let backend: Backend = backend.parse()?;
    let project_dir = Path::new(path);

    // Create directory if it doesn't exist
    if !project_dir.exists() {
        fs::create_dir_all(project_dir).await?;
    }

    // Get absolute path for deriving name
    let abs_path = project_dir.canonicalize()?;

    // Derive cluster name from directory name if not provided
    let cluster_name = match name {
        Some(n) => n.to_string(),
        None => abs_path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("Could not determine cluster name from path"))?,
    };

    let config_path = project_dir.join("config.yaml");
    if config_path.exists() {
        anyhow::bail!(
            "Directory '{}' already contains a config.yaml",
            project_dir.display()
        );
    }

    tracing::info!("Creating {} cluster parameters: {}", backend, cluster_name);
    fs::write(&config_path, starter_config(&cluster_name, backend)).await?;

    tracing::info!("✓ Created {}", config_path.display());
    tracing::info!("");
    tracing::info!("Next steps:");
    if path != "." {
        tracing::info!("  cd {}", project_dir.display());
    }
    tracing::info!("  footgen validate     # Check parameters");
    tracing::info!("  footgen generate     # Write footloose.yaml");
    tracing::info!("  footloose create     # Provision machines");
    tracing::info!("  footgen generate -f machines.json   # Add machines.yaml");

    Ok(())
}

fn starter_config(cluster_name: &str, backend: Backend) -> String {
    format!(
        r#"# footgen cluster parameters
backend: {backend}

cluster:
  name: {cluster_name}
  namespace: weavek8sops
  controlPlane:
    nodes: 1
    cpus: 2
    memory: 1GB
    diskSize: 5GB
  workers:
    nodes: 1
    cpus: 2
    memory: 1GB
    diskSize: 5GB

images:
  footloose: quay.io/footloose/centos7:0.6.0
  ignite: weaveworks/ignite-centos:latest
  kernel: weaveworks/ignite-kernel:4.19.47

versions:
  kubelet: "1.14.1"

# Once footloose has created the machines, put their records (ports and
# runtimeNetworks) under `machines:` in a separate file and pass it with -f.
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use footgen_core::{Config, generate};
    use rstest::rstest;

    #[rstest]
    #[case(Backend::Docker)]
    #[case(Backend::Ignite)]
    fn test_starter_config_generates(#[case] backend: Backend) {
        let config: Config = serde_yaml::from_str(&starter_config("demo", backend)).unwrap();
        assert_eq!(config.cluster.name, "demo");
        assert_eq!(config.backend, backend.as_str());

        let documents = generate(&config).unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].path, "footloose.yaml");
    }
}
