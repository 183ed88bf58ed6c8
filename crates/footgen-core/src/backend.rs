//! Backend drivers and their machine profiles
//!
//! footloose can realize a machine either as a docker container or as an
//! ignite micro-VM. Each backend implies a fixed set of spec attributes:
//!
//! | backend | image              | privileged | volumes            | VM sizing |
//! |---------|--------------------|------------|--------------------|-----------|
//! | docker  | `images.footloose` | yes        | `/var/lib/docker`  | no        |
//! | ignite  | `images.ignite`    | no         | none               | per role  |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::{Config, Role};
use crate::error::{Error, Result};

/// Machine backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Containers driven by docker
    Docker,
    /// Firecracker micro-VMs driven by ignite
    Ignite,
}

impl Backend {
    /// Lowercase key as used in parameters and footloose.yaml
    pub fn as_str(self) -> &'static str {
        match self {
            Backend::Docker => "docker",
            Backend::Ignite => "ignite",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "docker" => Ok(Backend::Docker),
            "ignite" => Ok(Backend::Ignite),
            other => Err(Error::UnknownBackend {
                backend: other.to_string(),
            }),
        }
    }
}

/// A volume mounted into every machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    /// Mount type
    #[serde(rename = "type")]
    pub kind: String,

    /// Mount point inside the machine
    pub destination: String,
}

impl Volume {
    /// A named docker volume mounted at `destination`
    pub fn named(destination: impl Into<String>) -> Self {
        Self {
            kind: "volume".to_string(),
            destination: destination.into(),
        }
    }
}

/// ignite VM sizing for one role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IgniteSpec {
    /// vCPUs
    pub cpus: u32,
    /// Memory, e.g. `1GB`
    pub memory: String,
    /// Disk size, e.g. `5GB`
    pub disk_size: String,
    /// Kernel image
    pub kernel: String,
}

/// Attributes every machine spec inherits from its backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendProfile {
    /// Resolved backend
    pub backend: Backend,
    /// Machine image
    pub image: String,
    /// Whether machines run privileged
    pub privileged: bool,
    /// Volumes mounted into every machine
    pub volumes: Vec<Volume>,
    /// Control-plane VM sizing, ignite only
    pub control_plane: Option<IgniteSpec>,
    /// Worker VM sizing, ignite only
    pub workers: Option<IgniteSpec>,
}

impl BackendProfile {
    /// Resolve `config.backend` and build its profile
    ///
    /// Every field the backend needs must be present; nothing is defaulted.
    pub fn resolve(config: &Config) -> Result<Self> {
        let backend: Backend = config.backend.parse()?;
        tracing::debug!("Resolving {} backend profile", backend);

        match backend {
            Backend::Docker => Ok(Self {
                backend,
                image: required(config.images.footloose.as_ref(), "images.footloose")?,
                // dockerd inside the machine needs privileges and its own
                // storage volume.
                privileged: true,
                volumes: vec![Volume::named("/var/lib/docker")],
                control_plane: None,
                workers: None,
            }),
            Backend::Ignite => {
                let kernel = required(config.images.kernel.as_ref(), "images.kernel")?;
                Ok(Self {
                    backend,
                    image: required(config.images.ignite.as_ref(), "images.ignite")?,
                    privileged: false,
                    volumes: Vec::new(),
                    control_plane: Some(ignite_spec(config, Role::ControlPlane, &kernel)?),
                    workers: Some(ignite_spec(config, Role::Worker, &kernel)?),
                })
            }
        }
    }

    /// VM sizing for a role, if the backend carries any
    pub fn sizing(&self, role: Role) -> Option<&IgniteSpec> {
        match role {
            Role::ControlPlane => self.control_plane.as_ref(),
            Role::Worker => self.workers.as_ref(),
        }
    }
}

fn ignite_spec(config: &Config, role: Role, kernel: &str) -> Result<IgniteSpec> {
    let group = config.group(role);
    let path = role.param_path();
    Ok(IgniteSpec {
        cpus: group
            .cpus
            .ok_or_else(|| Error::missing(format!("{}.cpus", path)))?,
        memory: required(group.memory.as_ref(), &format!("{}.memory", path))?,
        disk_size: required(group.disk_size.as_ref(), &format!("{}.diskSize", path))?,
        kernel: kernel.to_string(),
    })
}

fn required(value: Option<&String>, field: &str) -> Result<String> {
    value.cloned().ok_or_else(|| Error::missing(field))
}
