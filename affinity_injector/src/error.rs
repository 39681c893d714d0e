use thiserror::Error;

use crate::workload::ResourceKind;

/// Errors that can occur while running the webhook server
#[derive(Error, Debug)]
pub enum Error {
    /// Error reading TLS material or other local files
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    /// TLS certificate or key file is not usable PEM
    #[error("TLS Error: {path}: {reason}")]
    Tls { path: String, reason: &'static str },

    /// Error binding the HTTP listener
    #[error("Bind Error: {0}")]
    Bind(#[source] warp::Error),
}

/// Reasons an object is not eligible for mutation
///
/// These are expected outcomes, not faults: they only suppress the patch.
#[derive(Error, Debug)]
pub enum GateError {
    #[error("enabled annotation is not set")]
    NotOptedIn,

    #[error("enabled annotation is {value:?}, not true")]
    NotEnabled { value: String },

    #[error("config annotation is not set")]
    MissingConfig,

    #[error("malformed config annotation: {0}")]
    MalformedConfig(#[source] serde_json::Error),

    #[error("config annotation has no label keys")]
    EmptyConfig,

    #[error("config annotation maps {key:?} to an empty list")]
    EmptyValues { key: String },
}

/// Errors recovering a StatefulSet ordinal from a pod name
#[derive(Error, Debug, PartialEq, Eq)]
pub enum OrdinalError {
    #[error("pod name {name:?} does not end in an ordinal suffix")]
    NoOrdinalSuffix { name: String },
}

/// Errors turning an admission request into a typed workload
#[derive(Error, Debug)]
pub enum ClassificationError {
    #[error("unexpected resource {resource:?}")]
    UnexpectedResourceKind { resource: String },

    #[error("admission request carries no object")]
    MissingObject,

    #[error("failed to decode {kind}: {source}")]
    DecodeError {
        kind: ResourceKind,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors that end the mutation of a single admission request
#[derive(Error, Debug)]
pub enum MutationError {
    #[error("Gate: {0}")]
    Gate(#[from] GateError),

    #[error("Ordinal: {0}")]
    Ordinal(#[from] OrdinalError),

    #[error("Classification: {0}")]
    Classification(#[from] ClassificationError),

    /// Error during JSON serialization of patch values
    #[error("SerializationError: {0}")]
    Serialization(#[source] serde_json::Error),
}

impl MutationError {
    /// True when the object simply did not ask to be mutated
    pub fn is_opt_out(&self) -> bool {
        matches!(
            self,
            Self::Gate(GateError::NotOptedIn | GateError::NotEnabled { .. })
        )
    }
}

/// Result type for server operations
pub type Result<T, E = Error> = std::result::Result<T, E>;
