//! Opt-in annotations and the mutation config they carry.

use std::collections::BTreeMap;

use crate::error::GateError;

/// Gate annotation, a boolean-as-string
pub const ENABLED_ANNOTATION: &str = "statefulset-affinity-injector-webhook.hsiam261.github.io/enabled";

/// JSON object mapping a node label key to the ordered values replicas cycle through
pub const CONFIG_ANNOTATION: &str = "statefulset-affinity-injector-webhook.hsiam261.github.io/config";

/// Label key to ordered, non-empty list of label values
///
/// Keys iterate in sorted order so the same config always yields the same patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationConfig(BTreeMap<String, Vec<String>>);

impl MutationConfig {
    /// Parses the config annotation value, rejecting empty maps and value lists
    ///
    /// A selector term without requirements matches no node, so an empty map
    /// must never reach the patch builder.
    pub fn parse(raw: &str) -> Result<Self, GateError> {
        let entries: BTreeMap<String, Vec<String>> =
            serde_json::from_str(raw).map_err(GateError::MalformedConfig)?;

        if entries.is_empty() {
            return Err(GateError::EmptyConfig);
        }
        if let Some((key, _)) = entries.iter().find(|(_, values)| values.is_empty()) {
            return Err(GateError::EmptyValues { key: key.clone() });
        }

        Ok(Self(entries))
    }

    /// Picks `values[ordinal mod len]` for every key
    pub fn select(&self, ordinal: u64) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(move |(key, values)| {
            // values is never empty, see `parse`
            let idx = (ordinal % values.len() as u64) as usize;
            (key.as_str(), values[idx].as_str())
        })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Resolves the mutation config from an object's annotations
///
/// Fails with a [`GateError`] when the object has not opted in or the config is unusable.
pub fn resolve_mutation_config(
    annotations: &BTreeMap<String, String>,
) -> Result<MutationConfig, GateError> {
    let flag = annotations
        .get(ENABLED_ANNOTATION)
        .ok_or(GateError::NotOptedIn)?;

    if parse_flag(flag) != Some(true) {
        return Err(GateError::NotEnabled {
            value: flag.clone(),
        });
    }

    let raw = annotations
        .get(CONFIG_ANNOTATION)
        .ok_or(GateError::MissingConfig)?;

    MutationConfig::parse(raw)
}

/// Same literal set as Go's `strconv.ParseBool`
fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}
