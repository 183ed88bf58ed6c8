//! Error types for footgen-core

use thiserror::Error;

/// Result type alias for footgen-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in footgen-core
#[derive(Error, Debug)]
pub enum Error {
    /// Parameter file could not be found
    #[error("parameter file not found: {path}")]
    ConfigNotFound {
        /// Path that was searched
        path: String,
    },

    /// Failed to parse YAML parameters
    #[error("failed to parse parameters: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// Failed to parse JSON parameters
    #[error("failed to parse JSON parameters: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid parameter value or override
    #[error("invalid configuration: {message}")]
    ConfigInvalid {
        /// Description of what's invalid
        message: String,
    },

    /// Backend key is not one of the supported drivers
    #[error("unknown backend '{backend}' (expected one of: docker, ignite)")]
    UnknownBackend {
        /// The backend value as given
        backend: String,
    },

    /// A field required by the selected backend is absent
    #[error("missing required field '{field}'")]
    MissingField {
        /// Dotted path of the missing field
        field: String,
    },

    /// A machine record has no port mapping for the requested guest port
    #[error("machines[{index}]: no port mapping with guest port {guest_port}")]
    PortMappingNotFound {
        /// Position of the machine record in `machines`
        index: usize,
        /// Guest port that was looked up
        guest_port: u16,
    },

    /// A machine record has no runtime network to take a private address from
    #[error("machines[{index}]: no runtime network entries")]
    NetworkNotFound {
        /// Position of the machine record in `machines`
        index: usize,
    },

    /// Fewer machine records than the cluster node counts require
    #[error("expected at least {required} machine records, got {available}")]
    NotEnoughMachines {
        /// controlPlane.nodes + workers.nodes
        required: usize,
        /// Length of the supplied `machines` sequence
        available: usize,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Broad classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad, missing or unparseable parameters
    Configuration,
    /// An expected entry is absent from a machine record
    Lookup,
    /// The machine collection is shorter than required
    Index,
    /// Filesystem failure
    Io,
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ConfigNotFound { .. }
            | Error::ConfigParse(_)
            | Error::Json(_)
            | Error::ConfigInvalid { .. }
            | Error::UnknownBackend { .. }
            | Error::MissingField { .. } => ErrorKind::Configuration,
            Error::PortMappingNotFound { .. } | Error::NetworkNotFound { .. } => ErrorKind::Lookup,
            Error::NotEnoughMachines { .. } => ErrorKind::Index,
            Error::Io(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn missing(field: impl Into<String>) -> Self {
        Error::MissingField {
            field: field.into(),
        }
    }
}
