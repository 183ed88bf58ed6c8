//! Manifest generation
//!
//! Turns a [`Config`] into its output documents: `footloose.yaml` always,
//! `machines.yaml` only when the config carries provisioned machine records.
//! Every call recomputes everything from the config.

use crate::backend::BackendProfile;
use crate::config::Config;
use crate::error::Result;
use crate::manifest::machine_list;
use crate::output::OutputDocument;
use crate::topology::Topology;

/// Generate the output documents for a config, in emission order
pub fn generate(config: &Config) -> Result<Vec<OutputDocument>> {
    let profile = BackendProfile::resolve(config)?;

    let mut output = Vec::with_capacity(2);

    let topology = Topology::build(config, &profile);
    tracing::debug!(
        cluster = %config.cluster.name,
        backend = %profile.backend,
        "Built topology with {} machine groups",
        topology.machines.len()
    );
    output.push(OutputDocument::topology(topology));

    if let Some(records) = &config.machines {
        output.push(OutputDocument::machines(machine_list(config, records)?));
    }

    Ok(output)
}
