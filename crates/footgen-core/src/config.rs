//! Cluster parameters
//!
//! The [`Config`] is the merged parameter object the generator consumes. It is
//! usually built by [`crate::params::Params`] from one or more parameter files
//! plus command-line overrides.
//!
//! # Example
//!
//! ```yaml
//! backend: docker
//! cluster:
//!   name: demo
//!   namespace: weavek8sops
//!   controlPlane:
//!     nodes: 1
//!   workers:
//!     nodes: 2
//! images:
//!   footloose: quay.io/footloose/centos7:0.6.0
//! versions:
//!   kubelet: "1.14.1"
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::params::Params;

/// Root parameter object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend key: `docker` or `ignite`. Resolved by [`crate::backend::Backend`].
    #[serde(deserialize_with = "scalar_string")]
    pub backend: String,

    /// Cluster shape
    pub cluster: ClusterConfig,

    /// Image references
    #[serde(default)]
    pub images: ImagesConfig,

    /// Kubernetes component versions
    #[serde(default)]
    pub versions: VersionsConfig,

    /// Provisioned machines, present once footloose has created the cluster
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machines: Option<Vec<MachineRecord>>,
}

/// Cluster naming and per-role sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterConfig {
    /// Cluster name
    #[serde(deserialize_with = "scalar_string")]
    pub name: String,

    /// Namespace for the generated Machine objects
    #[serde(
        default,
        deserialize_with = "optional_scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub namespace: Option<String>,

    /// Control-plane nodes
    pub control_plane: NodeGroupConfig,

    /// Worker nodes
    pub workers: NodeGroupConfig,
}

/// Node count and VM sizing for one role
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeGroupConfig {
    /// Number of nodes in this role
    pub nodes: usize,

    /// vCPUs per node (ignite only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpus: Option<u32>,

    /// Memory per node, e.g. `1GB` (ignite only)
    #[serde(
        default,
        deserialize_with = "optional_scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub memory: Option<String>,

    /// Disk size per node, e.g. `5GB` (ignite only)
    #[serde(
        default,
        deserialize_with = "optional_scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub disk_size: Option<String>,
}

/// Image references
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImagesConfig {
    /// Container image used by the docker backend
    #[serde(
        default,
        deserialize_with = "optional_scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub footloose: Option<String>,

    /// VM image used by the ignite backend
    #[serde(
        default,
        deserialize_with = "optional_scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub ignite: Option<String>,

    /// Kernel image used by the ignite backend
    #[serde(
        default,
        deserialize_with = "optional_scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub kernel: Option<String>,
}

/// Kubernetes component versions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionsConfig {
    /// Kubelet version recorded on every Machine
    #[serde(
        default,
        deserialize_with = "optional_scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub kubelet: Option<String>,
}

/// A machine as reported by footloose after provisioning
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineRecord {
    /// Machine name, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Guest to host port forwards
    #[serde(default)]
    pub ports: Vec<PortForward>,

    /// Networks attached by the container/VM runtime
    #[serde(default)]
    pub runtime_networks: Vec<RuntimeNetwork>,
}

/// One guest to host port forward on a provisioned machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortForward {
    /// Port inside the machine
    pub guest: u16,
    /// Port on the host
    pub host: u16,
}

/// A runtime network attachment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeNetwork {
    /// Network name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Address on this network
    pub ip: String,

    /// Netmask
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<String>,

    /// Gateway
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
}

/// Role a node plays in the cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Control-plane node
    ControlPlane,
    /// Worker node
    Worker,
}

impl Role {
    /// Both roles, in emission order
    pub const ALL: [Role; 2] = [Role::ControlPlane, Role::Worker];

    /// Dotted parameter path of this role's group
    pub fn param_path(self) -> &'static str {
        match self {
            Role::ControlPlane => "cluster.controlPlane",
            Role::Worker => "cluster.workers",
        }
    }
}

impl Config {
    /// Load parameters from a single YAML or JSON file
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let config = Config::load("./config.yaml")?;
    /// println!("Cluster: {}", config.cluster.name);
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut params = Params::new();
        params.merge_file(path)?;
        params.into_config()
    }

    /// Sizing block for a role
    pub fn group(&self, role: Role) -> &NodeGroupConfig {
        match role {
            Role::ControlPlane => &self.cluster.control_plane,
            Role::Worker => &self.cluster.workers,
        }
    }

    /// Total nodes across both roles
    pub fn node_count(&self) -> Result<usize> {
        let control_plane = self.cluster.control_plane.nodes;
        let workers = self.cluster.workers.nodes;
        control_plane
            .checked_add(workers)
            .ok_or_else(|| Error::ConfigInvalid {
                message: format!(
                    "node count overflow: cluster.controlPlane.nodes ({}) + cluster.workers.nodes ({})",
                    control_plane, workers
                ),
            })
    }
}

/// A YAML scalar read into a string-typed field. Unquoted `1.15` or `2019`
/// are versions and names here, not numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    String(String),
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
}

impl From<Scalar> for String {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::String(s) => s,
            Scalar::Bool(b) => b.to_string(),
            Scalar::Int(i) => i.to_string(),
            Scalar::UInt(u) => u.to_string(),
            Scalar::Float(f) => f.to_string(),
        }
    }
}

fn scalar_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Scalar::deserialize(deserializer).map(String::from)
}

fn optional_scalar_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(String::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let yaml = r#"
backend: docker
cluster:
  name: c1
  controlPlane:
    nodes: 1
  workers:
    nodes: 2
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.cluster.name, "c1");
        assert_eq!(config.node_count().unwrap(), 3);
        assert!(config.machines.is_none());
        assert!(config.cluster.namespace.is_none());
        assert!(config.versions.kubelet.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
backend: ignite
cluster:
  name: c1
  namespace: weavek8sops
  controlPlane:
    nodes: 1
    cpus: 2
    memory: 1GB
    diskSize: 5GB
  workers:
    nodes: 1
    cpus: 1
    memory: 512MB
    diskSize: 3GB
images:
  ignite: weaveworks/ignite-centos:latest
  kernel: weaveworks/ignite-kernel:4.19.47
versions:
  kubelet: "1.14.1"
machines:
  - name: c1-ctrl-0
    ports:
      - guest: 22
        host: 2222
    runtimeNetworks:
      - name: bridge
        ip: 172.17.0.2
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.group(Role::ControlPlane).cpus, Some(2));
        assert_eq!(config.group(Role::Worker).disk_size.as_deref(), Some("3GB"));
        assert_eq!(config.versions.kubelet.as_deref(), Some("1.14.1"));

        let machines = config.machines.unwrap();
        assert_eq!(machines.len(), 1);
        assert_eq!(machines[0].ports[0], PortForward { guest: 22, host: 2222 });
        assert_eq!(machines[0].runtime_networks[0].ip, "172.17.0.2");
    }

    #[test]
    fn test_missing_node_count_is_rejected() {
        let yaml = r#"
backend: docker
cluster:
  name: c1
  controlPlane: {}
  workers:
    nodes: 2
"#;
        let result: std::result::Result<Config, _> = serde_yaml::from_str(yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_unquoted_scalars_in_string_fields() {
        let yaml = r#"
backend: docker
cluster:
  name: 2019
  namespace: 42
  controlPlane:
    nodes: 1
  workers:
    nodes: 1
    memory: 1024
versions:
  kubelet: 1.15
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.cluster.name, "2019");
        assert_eq!(config.cluster.namespace.as_deref(), Some("42"));
        assert_eq!(config.cluster.workers.memory.as_deref(), Some("1024"));
        assert_eq!(config.versions.kubelet.as_deref(), Some("1.15"));
    }

    #[test]
    fn test_null_optional_string_is_none() {
        let yaml = "backend: docker\ncluster: {name: c1, namespace: ~, controlPlane: {nodes: 1}, workers: {nodes: 1}}";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.cluster.namespace.is_none());
    }

    #[test]
    fn test_node_count_overflow_is_an_error() {
        let yaml = format!(
            "backend: docker\ncluster: {{name: c1, controlPlane: {{nodes: {}}}, workers: {{nodes: 1}}}}",
            usize::MAX
        );
        let config: Config = serde_yaml::from_str(&yaml).unwrap();
        let err = config.node_count().unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Configuration);
        assert!(err.to_string().contains("overflow"));
    }

    #[test]
    fn test_machine_record_ignores_unknown_fields() {
        let yaml = r#"
hostname: node0
state: Running
ports:
  - guest: 22
    host: 32768
runtimeNetworks:
  - ip: 10.0.0.5
    gateway: 10.0.0.1
"#;
        let record: MachineRecord = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(record.ports[0].host, 32768);
        assert_eq!(record.runtime_networks[0].gateway.as_deref(), Some("10.0.0.1"));
    }
}
