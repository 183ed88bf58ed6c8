//! Output documents
//!
//! The generator hands back named documents; writing them anywhere is up to
//! the caller.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::manifest::MachineList;
use crate::topology::Topology;

/// Logical path of the topology document
pub const FOOTLOOSE_PATH: &str = "footloose.yaml";

/// Logical path of the machine list document
pub const MACHINES_PATH: &str = "machines.yaml";

/// Structured content of an output document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Document {
    /// `footloose.yaml`
    Topology(Topology),
    /// `machines.yaml`
    Machines(MachineList),
}

/// A document together with the path it should be written to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDocument {
    /// Path relative to the output directory
    pub path: String,
    /// Content
    pub document: Document,
}

impl OutputDocument {
    /// The topology document
    pub fn topology(topology: Topology) -> Self {
        Self {
            path: FOOTLOOSE_PATH.to_string(),
            document: Document::Topology(topology),
        }
    }

    /// The machine list document
    pub fn machines(list: MachineList) -> Self {
        Self {
            path: MACHINES_PATH.to_string(),
            document: Document::Machines(list),
        }
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.document)?)
    }

    /// SHA-256 of the YAML rendering, hex encoded
    pub fn content_hash(&self) -> Result<String> {
        let yaml = self.to_yaml()?;
        let mut hasher = Sha256::new();
        hasher.update(yaml.as_bytes());
        Ok(hex::encode(hasher.finalize()))
    }
}

/// Render documents as one multi-document YAML stream
pub fn to_yaml_stream(documents: &[OutputDocument]) -> Result<String> {
    let mut stream = String::new();
    for doc in documents {
        stream.push_str("---\n");
        stream.push_str(&format!("# {}\n", doc.path));
        stream.push_str(&doc.to_yaml()?);
    }
    Ok(stream)
}
