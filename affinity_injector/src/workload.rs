//! Typed view of the objects this webhook mutates.

use std::collections::BTreeMap;
use std::fmt;

use k8s_openapi::api::apps::v1::StatefulSet;
use k8s_openapi::api::core::v1::Pod;
use kube::core::{GroupVersionResource, ResourceExt};

/// Resources the webhook knows how to mutate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Pod,
    StatefulSet,
}

impl ResourceKind {
    /// Maps an admission request's resource descriptor to a supported kind
    pub fn from_resource(gvr: &GroupVersionResource) -> Option<Self> {
        match (gvr.group.as_str(), gvr.resource.as_str()) {
            ("", "pods") => Some(Self::Pod),
            ("apps", "statefulsets") => Some(Self::StatefulSet),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pod => f.write_str("Pod"),
            Self::StatefulSet => f.write_str("StatefulSet"),
        }
    }
}

/// A decoded admission object
#[derive(Debug, Clone)]
pub enum Workload {
    Pod(Pod),
    StatefulSet(StatefulSet),
}

impl Workload {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Pod(_) => ResourceKind::Pod,
            Self::StatefulSet(_) => ResourceKind::StatefulSet,
        }
    }

    /// Object name; pods created by a StatefulSet controller always have one
    pub fn name(&self) -> String {
        match self {
            Self::Pod(pod) => pod.name_any(),
            Self::StatefulSet(sts) => sts.name_any(),
        }
    }

    pub fn namespace(&self) -> Option<String> {
        match self {
            Self::Pod(pod) => pod.namespace(),
            Self::StatefulSet(sts) => sts.namespace(),
        }
    }

    pub fn annotations(&self) -> &BTreeMap<String, String> {
        match self {
            Self::Pod(pod) => pod.annotations(),
            Self::StatefulSet(sts) => sts.annotations(),
        }
    }
}
