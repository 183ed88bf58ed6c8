//! footloose cluster topology (`footloose.yaml`)
//!
//! The topology has one machine group per role. Both groups share the
//! backend's image, privilege and volumes and the fixed port-mapping table;
//! they differ in count, name template and (for ignite) VM sizing.

use serde::{Deserialize, Serialize};

use crate::backend::{Backend, BackendProfile, IgniteSpec, Volume};
use crate::config::{Config, Role};

/// Name of the private key footloose generates for the cluster
pub const PRIVATE_KEY: &str = "cluster-key";

/// Guest to host port forwards attached to every machine: ssh, the API
/// server, and the two ingress node ports.
pub const PORT_MAPPINGS: [(u16, u16); 4] = [(22, 2222), (6443, 6443), (30443, 30443), (30080, 30080)];

/// Root of `footloose.yaml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    /// Cluster identity
    pub cluster: ClusterSpec,

    /// Machine groups, control plane first
    pub machines: Vec<MachineGroup>,
}

/// Cluster identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSpec {
    /// Cluster name
    pub name: String,
    /// Private key file name
    pub private_key: String,
}

/// A homogeneous group of machines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineGroup {
    /// Number of machines
    pub count: usize,
    /// Spec shared by all machines in the group
    pub spec: GroupSpec,
}

/// Per-machine spec of a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSpec {
    /// Name template, `%d` is replaced by the machine index
    pub name: String,
    /// Machine image
    pub image: String,
    /// Backend driver
    pub backend: Backend,
    /// VM sizing, ignite only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignite: Option<IgniteSpec>,
    /// Port forwards
    pub port_mappings: Vec<PortMapping>,
    /// Run privileged
    pub privileged: bool,
    /// Mounted volumes
    pub volumes: Vec<Volume>,
}

/// A container to host port forward in footloose.yaml
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortMapping {
    /// Port inside the machine
    pub container_port: u16,
    /// Port on the host
    pub host_port: u16,
}

/// The fixed port-mapping table
pub fn port_mappings() -> Vec<PortMapping> {
    PORT_MAPPINGS
        .iter()
        .map(|&(container_port, host_port)| PortMapping {
            container_port,
            host_port,
        })
        .collect()
}

/// Name template for a role's group
pub fn name_template(role: Role) -> &'static str {
    match role {
        Role::ControlPlane => "ctrl-%d",
        Role::Worker => "work-%d",
    }
}

impl Topology {
    /// Build the topology for an already-resolved backend profile
    pub fn build(config: &Config, profile: &BackendProfile) -> Self {
        let machines = Role::ALL
            .iter()
            .map(|&role| MachineGroup {
                count: config.group(role).nodes,
                spec: GroupSpec {
                    name: name_template(role).to_string(),
                    image: profile.image.clone(),
                    backend: profile.backend,
                    ignite: profile.sizing(role).cloned(),
                    port_mappings: port_mappings(),
                    privileged: profile.privileged,
                    volumes: profile.volumes.clone(),
                },
            })
            .collect();

        Self {
            cluster: ClusterSpec {
                name: config.cluster.name.clone(),
                private_key: PRIVATE_KEY.to_string(),
            },
            machines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docker_config() -> Config {
        serde_yaml::from_str(
            r#"
backend: docker
cluster:
  name: c1
  controlPlane: {nodes: 1}
  workers: {nodes: 2}
images:
  footloose: quay.io/footloose/centos7:0.6.0
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_two_groups_in_role_order() {
        let config = docker_config();
        let profile = BackendProfile::resolve(&config).unwrap();
        let topology = Topology::build(&config, &profile);

        assert_eq!(topology.cluster.name, "c1");
        assert_eq!(topology.cluster.private_key, "cluster-key");
        assert_eq!(topology.machines.len(), 2);
        assert_eq!(topology.machines[0].count, 1);
        assert_eq!(topology.machines[0].spec.name, "ctrl-%d");
        assert_eq!(topology.machines[1].count, 2);
        assert_eq!(topology.machines[1].spec.name, "work-%d");
    }

    #[test]
    fn test_port_mapping_table() {
        let mappings = port_mappings();
        let pairs: Vec<_> = mappings
            .iter()
            .map(|m| (m.container_port, m.host_port))
            .collect();
        assert_eq!(pairs, vec![(22, 2222), (6443, 6443), (30443, 30443), (30080, 30080)]);
    }

    #[test]
    fn test_serialized_shape() {
        let config = docker_config();
        let profile = BackendProfile::resolve(&config).unwrap();
        let yaml = serde_yaml::to_string(&Topology::build(&config, &profile)).unwrap();

        assert!(yaml.contains("privateKey: cluster-key"));
        assert!(yaml.contains("backend: docker"));
        assert!(yaml.contains("containerPort: 6443"));
        assert!(yaml.contains("type: volume"));
        assert!(!yaml.contains("ignite:"));
    }
}
