//! Cluster API `Machine` manifests (`machines.yaml`)
//!
//! Once footloose has provisioned the cluster, each machine record is turned
//! into a `cluster.k8s.io/v1alpha1` `Machine` carrying a
//! `BareMetalMachineProviderSpec`: the public endpoint is the host-side ssh
//! forward on loopback, the private endpoint is the machine's first runtime
//! network address on port 22.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::{Config, MachineRecord, Role};
use crate::error::{Error, Result};

/// apiVersion of Machine objects
pub const MACHINE_API_VERSION: &str = "cluster.k8s.io/v1alpha1";

/// apiVersion of the embedded provider spec
pub const PROVIDER_API_VERSION: &str = "baremetalproviderspec/v1alpha1";

/// Address the host-side port forwards listen on
pub const PUBLIC_ADDRESS: &str = "127.0.0.1";

/// Guest ssh port
pub const SSH_PORT: u16 = 22;

/// A Kubernetes `v1` `List`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct List<T> {
    /// Always `v1`
    pub api_version: String,
    /// Always `List`
    pub kind: String,
    /// Wrapped objects
    pub items: Vec<T>,
}

impl<T> List<T> {
    /// Wrap items in a list
    pub fn new(items: Vec<T>) -> Self {
        Self {
            api_version: "v1".to_string(),
            kind: "List".to_string(),
            items,
        }
    }
}

/// The `machines.yaml` document
pub type MachineList = List<Machine>;

/// A Cluster API Machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    /// `cluster.k8s.io/v1alpha1`
    pub api_version: String,
    /// `Machine`
    pub kind: String,
    /// Object metadata
    pub metadata: ObjectMeta,
    /// Machine spec
    pub spec: MachineSpec,
}

/// Object metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    /// Labels; `set` holds the role
    pub labels: BTreeMap<String, String>,
    /// `<role>-<id>`
    pub name: String,
    /// Namespace, when the cluster has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// Machine spec
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineSpec {
    /// Embedded provider spec
    pub provider_spec: ProviderSpec,
    /// Component versions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versions: Option<MachineVersions>,
}

/// Provider spec wrapper
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSpec {
    /// The provider-specific value
    pub value: BareMetalMachineProviderSpec,
}

/// Bare-metal provider spec: how to reach the machine over ssh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BareMetalMachineProviderSpec {
    /// `baremetalproviderspec/v1alpha1`
    pub api_version: String,
    /// `BareMetalMachineProviderSpec`
    pub kind: String,
    /// Endpoint reachable from the host
    pub public: Endpoint,
    /// Endpoint on the cluster network
    pub private: Endpoint,
}

/// Address and port
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// IP address
    pub address: String,
    /// TCP port
    pub port: u16,
}

/// Kubernetes component versions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineVersions {
    /// Kubelet version
    pub kubelet: String,
}

/// Value of the `set` label for a role
pub fn role_label(role: Role) -> &'static str {
    match role {
        Role::ControlPlane => "master",
        Role::Worker => "worker",
    }
}

impl Machine {
    /// Build the manifest for the `id`-th machine of a role
    pub fn new(config: &Config, role: Role, id: usize, private_ip: &str, ssh_port: u16) -> Self {
        let label = role_label(role);
        Self {
            api_version: MACHINE_API_VERSION.to_string(),
            kind: "Machine".to_string(),
            metadata: ObjectMeta {
                labels: BTreeMap::from([("set".to_string(), label.to_string())]),
                name: format!("{}-{}", label, id),
                namespace: config.cluster.namespace.clone(),
            },
            spec: MachineSpec {
                provider_spec: ProviderSpec {
                    value: BareMetalMachineProviderSpec {
                        api_version: PROVIDER_API_VERSION.to_string(),
                        kind: "BareMetalMachineProviderSpec".to_string(),
                        public: Endpoint {
                            address: PUBLIC_ADDRESS.to_string(),
                            port: ssh_port,
                        },
                        private: Endpoint {
                            address: private_ip.to_string(),
                            port: SSH_PORT,
                        },
                    },
                },
                versions: config
                    .versions
                    .kubelet
                    .as_ref()
                    .map(|kubelet| MachineVersions {
                        kubelet: kubelet.clone(),
                    }),
            },
        }
    }

    #[cfg(test)]
    pub(crate) fn name(&self) -> &str {
        &self.metadata.name
    }

    #[cfg(test)]
    pub(crate) fn role(&self) -> Option<&str> {
        self.metadata.labels.get("set").map(String::as_str)
    }
}

/// Build the machine list from provisioned machine records
///
/// The first `controlPlane.nodes` records are control-plane machines, the next
/// `workers.nodes` are workers. Any failure fails the whole list.
pub fn machine_list(config: &Config, records: &[MachineRecord]) -> Result<MachineList> {
    let control_plane_nodes = config.cluster.control_plane.nodes;
    let worker_nodes = config.cluster.workers.nodes;
    let required = config.node_count()?;

    if records.len() < required {
        return Err(Error::NotEnoughMachines {
            required,
            available: records.len(),
        });
    }
    if records.len() > required {
        tracing::warn!(
            "Ignoring {} machine records beyond the {} the cluster needs",
            records.len() - required,
            required
        );
    }

    let (control_plane, rest) = records.split_at(control_plane_nodes);
    let workers = &rest[..worker_nodes];

    let mut items = Vec::with_capacity(required);
    for (id, record) in control_plane.iter().enumerate() {
        items.push(from_record(config, Role::ControlPlane, id, id, record)?);
    }
    for (id, record) in workers.iter().enumerate() {
        items.push(from_record(
            config,
            Role::Worker,
            id,
            control_plane_nodes + id,
            record,
        )?);
    }

    tracing::debug!("Built {} machine manifests", items.len());
    Ok(List::new(items))
}

fn from_record(
    config: &Config,
    role: Role,
    id: usize,
    index: usize,
    record: &MachineRecord,
) -> Result<Machine> {
    let private_ip = private_address(record, index)?;
    let ssh_port = host_port(record, index, SSH_PORT)?;
    Ok(Machine::new(config, role, id, private_ip, ssh_port))
}

/// Host-side port forwarded to `guest_port` on the machine at `index`
pub fn host_port(record: &MachineRecord, index: usize, guest_port: u16) -> Result<u16> {
    record
        .ports
        .iter()
        .find(|p| p.guest == guest_port)
        .map(|p| p.host)
        .ok_or(Error::PortMappingNotFound { index, guest_port })
}

/// Address on the first runtime network of the machine at `index`
pub fn private_address(record: &MachineRecord, index: usize) -> Result<&str> {
    record
        .runtime_networks
        .first()
        .map(|n| n.ip.as_str())
        .ok_or(Error::NetworkNotFound { index })
}
