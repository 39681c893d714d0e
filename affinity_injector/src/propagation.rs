//! Copies the opt-in annotations of a StatefulSet onto its pod template, so
//! every pod the controller creates reaches the webhook already opted in.

use json_patch::jsonptr::PointerBuf;
use json_patch::{AddOperation, PatchOperation};
use k8s_openapi::api::apps::v1::StatefulSet;
use kube::core::ResourceExt;
use serde_json::{Value, json};

use crate::annotations::{CONFIG_ANNOTATION, ENABLED_ANNOTATION};
use crate::error::{GateError, MutationError};

const TEMPLATE_METADATA: [&str; 3] = ["spec", "template", "metadata"];

fn template_path(rest: &[&str]) -> PointerBuf {
    PointerBuf::from_tokens(TEMPLATE_METADATA.iter().chain(rest).copied())
}

fn add(path: PointerBuf, value: Value) -> PatchOperation {
    PatchOperation::Add(AddOperation { path, value })
}

/// Builds the patch that sets both annotations on `spec.template.metadata.annotations`
///
/// The StatefulSet is expected to have passed the gate on its own annotations;
/// the config value is copied verbatim and the flag is normalised to `"true"`.
pub fn build_propagation_patch(sts: &StatefulSet) -> Result<Vec<PatchOperation>, MutationError> {
    let config = sts
        .annotations()
        .get(CONFIG_ANNOTATION)
        .ok_or(GateError::MissingConfig)?;

    let metadata = sts
        .spec
        .as_ref()
        .and_then(|spec| spec.template.metadata.as_ref());

    let mut ops = Vec::with_capacity(4);

    if metadata.is_none() {
        ops.push(add(template_path(&[]), json!({})));
    }
    if metadata.and_then(|m| m.annotations.as_ref()).is_none() {
        ops.push(add(template_path(&["annotations"]), json!({})));
    }

    // Pointer tokens escape the `/` in the annotation keys as `~1`.
    ops.push(add(
        template_path(&["annotations", ENABLED_ANNOTATION]),
        json!("true"),
    ));
    ops.push(add(
        template_path(&["annotations", CONFIG_ANNOTATION]),
        Value::String(config.clone()),
    ));

    Ok(ops)
}
