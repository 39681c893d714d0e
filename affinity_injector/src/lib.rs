//! Mutating admission webhook that spreads StatefulSet replicas across nodes
//!
//! Pods opt in with two annotations: an enable flag and a JSON config mapping
//! node label keys to ordered value lists. Replica `n` is given a required node
//! affinity term selecting `values[n % values.len()]` for every key.
//! StatefulSets carrying the same annotations have them copied onto their pod
//! template, so every replica they create is opted in.
//!
//! Mutation is best effort: requests that are out of scope or misconfigured are
//! logged and admitted unchanged, never denied.

pub mod admission;
pub mod affinity;
pub mod annotations;
pub mod config;
pub mod error;
pub mod ordinal;
pub mod propagation;
pub mod review;
pub mod server;
pub mod workload;

pub use admission::{AnnotationPropagator, MutatingAdmissionHandler, PodAffinityInjector, admit};
pub use annotations::{CONFIG_ANNOTATION, ENABLED_ANNOTATION, MutationConfig, resolve_mutation_config};
pub use config::ServerOptions;
pub use error::{ClassificationError, Error, GateError, MutationError, OrdinalError, Result};
pub use review::AdmissionContext;
pub use workload::{ResourceKind, Workload};
