//! Node affinity patch for StatefulSet pods.
//!
//! A pod with ordinal `n` gets one required node selector term holding an `In`
//! requirement per configured label key, selecting `values[n % values.len()]`.
//! JSON Patch `add` needs the parent of its target to exist, so any missing
//! ancestor of `nodeSelectorTerms` is created first, outermost first.

use json_patch::jsonptr::PointerBuf;
use json_patch::{AddOperation, PatchOperation};
use k8s_openapi::api::core::v1::{NodeSelectorRequirement, NodeSelectorTerm, Pod};
use serde_json::{Value, json};

use crate::annotations::MutationConfig;
use crate::error::MutationError;
use crate::ordinal::extract_ordinal;

const NODE_SELECTOR_TERMS: [&str; 5] = [
    "spec",
    "affinity",
    "nodeAffinity",
    "requiredDuringSchedulingIgnoredDuringExecution",
    "nodeSelectorTerms",
];

/// Pointer to the first `depth` segments of the `nodeSelectorTerms` path
fn ancestor(depth: usize) -> PointerBuf {
    PointerBuf::from_tokens(NODE_SELECTOR_TERMS[..depth].iter().copied())
}

fn add(path: PointerBuf, value: Value) -> PatchOperation {
    PatchOperation::Add(AddOperation { path, value })
}

/// Builds the selector term for a given ordinal
pub fn selector_term(config: &MutationConfig, ordinal: u64) -> NodeSelectorTerm {
    let expressions = config
        .select(ordinal)
        .map(|(key, value)| NodeSelectorRequirement {
            key: key.to_string(),
            operator: "In".to_string(),
            values: Some(vec![value.to_string()]),
        })
        .collect();

    NodeSelectorTerm {
        match_expressions: Some(expressions),
        ..Default::default()
    }
}

/// Builds the ordered patch that appends this pod's selector term
pub fn build_affinity_patch(
    pod: &Pod,
    config: &MutationConfig,
) -> Result<Vec<PatchOperation>, MutationError> {
    let ordinal = extract_ordinal(pod.metadata.name.as_deref().unwrap_or_default())?;
    let term = serde_json::to_value(selector_term(config, ordinal))
        .map_err(MutationError::Serialization)?;

    let affinity = pod.spec.as_ref().and_then(|spec| spec.affinity.as_ref());
    let node_affinity = affinity.and_then(|a| a.node_affinity.as_ref());
    let required = node_affinity
        .and_then(|n| n.required_during_scheduling_ignored_during_execution.as_ref());

    let mut ops = Vec::with_capacity(NODE_SELECTOR_TERMS.len());

    if affinity.is_none() {
        ops.push(add(ancestor(2), json!({})));
    }
    if node_affinity.is_none() {
        ops.push(add(ancestor(3), json!({})));
    }
    if required.is_none() {
        ops.push(add(ancestor(4), json!({})));
    }
    // Adding `[]` over an existing empty list is a no-op.
    if required.is_none_or(|r| r.node_selector_terms.is_empty()) {
        ops.push(add(ancestor(5), json!([])));
    }

    let mut append = ancestor(5);
    append.push_back("-");
    ops.push(add(append, term));

    Ok(ops)
}
