//! footgen Core Library
//!
//! Generates the configuration a footloose-provisioned Kubernetes cluster
//! needs:
//! - `footloose.yaml`, the cluster topology handed to footloose
//! - `machines.yaml`, Cluster API `Machine` manifests for the machines
//!   footloose reported back
//!
//! # Pipeline
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Params    │────▶│   Backend   │────▶│  Topology   │────▶│   Output    │
//! │ (YAML/JSON) │     │   Profile   │     │ + Machines  │     │  Documents  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use footgen_core::{Params, generate};
//!
//! let mut params = Params::new();
//! params.merge_file("config.yaml")?;
//! params.set("cluster.workers.nodes", "3")?;
//! for doc in generate(&params.into_config()?)? {
//!     println!("{}:\n{}", doc.path, doc.to_yaml()?);
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod config;
pub mod error;
pub mod generator;
pub mod manifest;
pub mod output;
pub mod params;
pub mod topology;

pub use backend::{Backend, BackendProfile};
pub use config::{Config, Role};
pub use error::{Error, ErrorKind, Result};
pub use generator::generate;
pub use output::{Document, OutputDocument};
pub use params::Params;
