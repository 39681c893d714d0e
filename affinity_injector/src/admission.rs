use std::sync::Arc;

use json_patch::PatchOperation;
use kube::core::DynamicObject;
use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview, Operation};
use tracing::{debug, error, info, warn};

use crate::affinity::build_affinity_patch;
use crate::annotations::resolve_mutation_config;
use crate::error::{ClassificationError, MutationError};
use crate::propagation::build_propagation_patch;
use crate::review::AdmissionContext;
use crate::workload::{ResourceKind, Workload};

pub trait MutatingAdmissionHandler: Send + Sync {
    /// Returns the name of this handler for logging purposes
    fn name(&self) -> &'static str;

    /// The kind of object this handler mutates
    fn kind(&self) -> ResourceKind;

    /// Whether requests for `operation` are mutated; others are admitted unchanged
    fn mutates_on(&self, operation: &Operation) -> bool;

    /// Computes the patch for an object of [`Self::kind`]
    ///
    /// Errors are reported and the object is admitted unchanged.
    fn mutate(&self, workload: &Workload) -> Result<Vec<PatchOperation>, MutationError>;
}

/// Pins a StatefulSet pod to nodes selected by its ordinal
pub struct PodAffinityInjector;

impl MutatingAdmissionHandler for PodAffinityInjector {
    fn name(&self) -> &'static str {
        "PodAffinityInjector"
    }

    fn kind(&self) -> ResourceKind {
        ResourceKind::Pod
    }

    // Pod affinity is immutable once created.
    fn mutates_on(&self, operation: &Operation) -> bool {
        matches!(operation, Operation::Create)
    }

    fn mutate(&self, workload: &Workload) -> Result<Vec<PatchOperation>, MutationError> {
        let Workload::Pod(pod) = workload else {
            return Err(unexpected(workload));
        };

        let config = resolve_mutation_config(workload.annotations())?;
        build_affinity_patch(pod, &config)
    }
}

/// Copies the opt-in annotations of a StatefulSet onto its pod template
pub struct AnnotationPropagator;

impl MutatingAdmissionHandler for AnnotationPropagator {
    fn name(&self) -> &'static str {
        "AnnotationPropagator"
    }

    fn kind(&self) -> ResourceKind {
        ResourceKind::StatefulSet
    }

    fn mutates_on(&self, operation: &Operation) -> bool {
        matches!(operation, Operation::Create | Operation::Update)
    }

    fn mutate(&self, workload: &Workload) -> Result<Vec<PatchOperation>, MutationError> {
        let Workload::StatefulSet(sts) = workload else {
            return Err(unexpected(workload));
        };

        // Only StatefulSets that opted in themselves hand it down to their pods.
        resolve_mutation_config(workload.annotations())?;
        build_propagation_patch(sts)
    }
}

fn unexpected(workload: &Workload) -> MutationError {
    ClassificationError::UnexpectedResourceKind {
        resource: workload.kind().to_string(),
    }
    .into()
}

/// Runs the handler registered for the request's kind and assembles the response
pub fn admit(handlers: &[Box<dyn MutatingAdmissionHandler>], ctx: AdmissionContext) -> AdmissionResponse {
    let workload = match ctx.classify() {
        Ok(workload) => workload,
        Err(err) => {
            warn!(uid = %ctx.uid(), resource = %ctx.resource(), error = %err, "unsupported admission request");
            return ctx.respond(Err(err.into()));
        }
    };

    let kind = workload.kind();
    let name = workload.name();
    let namespace = ctx.namespace().unwrap_or_default().to_string();

    let Some(handler) = handlers.iter().find(|h| h.kind() == kind) else {
        warn!(uid = %ctx.uid(), kind = %kind, name = %name, "no handler for resource on this route");
        let err = ClassificationError::UnexpectedResourceKind {
            resource: ctx.resource(),
        };
        return ctx.respond(Err(err.into()));
    };

    if !handler.mutates_on(ctx.operation()) {
        debug!(
            uid = %ctx.uid(),
            handler = handler.name(),
            operation = ?ctx.operation(),
            kind = %kind,
            name = %name,
            "operation not mutated"
        );
        return ctx.respond(Ok(Vec::new()));
    }

    let outcome = handler.mutate(&workload);
    match &outcome {
        Ok(ops) => info!(
            uid = %ctx.uid(),
            handler = handler.name(),
            kind = %kind,
            namespace = %namespace,
            name = %name,
            patch_ops = ops.len(),
            "mutated resource"
        ),
        Err(err) if err.is_opt_out() => debug!(
            uid = %ctx.uid(),
            handler = handler.name(),
            kind = %kind,
            namespace = %namespace,
            name = %name,
            reason = %err,
            "resource not opted in"
        ),
        Err(err) => warn!(
            uid = %ctx.uid(),
            handler = handler.name(),
            kind = %kind,
            namespace = %namespace,
            name = %name,
            error = %err,
            "mutation skipped"
        ),
    }

    ctx.respond(outcome)
}

/// Creates a warp handler answering admission reviews with the given handlers
pub(crate) fn create_mutating_route(
    handlers: Vec<Box<dyn MutatingAdmissionHandler>>,
) -> impl Fn(AdmissionReview<DynamicObject>) -> warp::reply::Json + Clone + Send + Sync + 'static {
    let handlers: Arc<[Box<dyn MutatingAdmissionHandler>]> = handlers.into();
    move |body: AdmissionReview<DynamicObject>| {
        let req: AdmissionRequest<_> = match body.try_into() {
            Ok(req) => req,
            Err(err) => {
                error!("invalid admission request: {}", err);
                return warp::reply::json(&AdmissionResponse::invalid(err.to_string()).into_review());
            }
        };

        warp::reply::json(&admit(&handlers, AdmissionContext::from(req)).into_review())
    }
}
