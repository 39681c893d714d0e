//! Per-request admission context: classifies the incoming object and
//! assembles the single response sent back to the API server.

use json_patch::{Patch, PatchOperation};
use kube::core::admission::{AdmissionRequest, AdmissionResponse, Operation};
use kube::core::{DynamicObject, GroupVersionResource};
use tracing::error;

use crate::error::{ClassificationError, MutationError};
use crate::workload::{ResourceKind, Workload};

/// Everything needed to answer one admission request
///
/// Consumed by [`AdmissionContext::respond`], so each request is answered once.
pub struct AdmissionContext {
    uid: String,
    resource: GroupVersionResource,
    operation: Operation,
    namespace: Option<String>,
    object: Option<DynamicObject>,
    base: AdmissionResponse,
}

impl From<AdmissionRequest<DynamicObject>> for AdmissionContext {
    fn from(req: AdmissionRequest<DynamicObject>) -> Self {
        let base = AdmissionResponse::from(&req);
        Self {
            uid: req.uid,
            resource: req.resource,
            operation: req.operation,
            namespace: req.namespace,
            object: req.object,
            base,
        }
    }
}

impl AdmissionContext {
    /// Correlation identifier of the request
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Operation that triggered the request
    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    /// Namespace the request targets, if any
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// `group/resource` as sent by the API server, e.g. `apps/statefulsets`
    pub fn resource(&self) -> String {
        if self.resource.group.is_empty() {
            self.resource.resource.clone()
        } else {
            format!("{}/{}", self.resource.group, self.resource.resource)
        }
    }

    /// Decodes the request object into the typed workload its resource declares
    pub fn classify(&self) -> Result<Workload, ClassificationError> {
        let kind = ResourceKind::from_resource(&self.resource).ok_or_else(|| {
            ClassificationError::UnexpectedResourceKind {
                resource: self.resource(),
            }
        })?;
        let object = self
            .object
            .as_ref()
            .ok_or(ClassificationError::MissingObject)?;

        let decode = |source| ClassificationError::DecodeError { kind, source };
        let raw = serde_json::to_value(object).map_err(decode)?;

        let workload = match kind {
            ResourceKind::Pod => serde_json::from_value(raw).map(Workload::Pod),
            ResourceKind::StatefulSet => serde_json::from_value(raw).map(Workload::StatefulSet),
        };
        workload.map_err(decode)
    }

    /// Assembles the response for this request
    ///
    /// Every outcome is allowed: failures only drop the patch, they never block
    /// the workload. The caller is expected to have logged `Err` outcomes.
    pub fn respond(self, outcome: Result<Vec<PatchOperation>, MutationError>) -> AdmissionResponse {
        let ops = match outcome {
            Ok(ops) if !ops.is_empty() => ops,
            _ => return self.base,
        };

        match self.base.clone().with_patch(Patch(ops)) {
            Ok(res) => res,
            Err(err) => {
                error!(uid = %self.uid, error = %err, "failed to serialize patch, admitting unchanged");
                self.base
            }
        }
    }
}
