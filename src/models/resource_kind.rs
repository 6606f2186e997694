//! Built-in resource kind definitions
//!
//! This module provides a centralized enum for the resource kinds that have a
//! dedicated row converter. It carries the data the rest of the pipeline needs
//! about each kind: the API version its converter expects, the plural used in
//! request paths and messages, the short aliases accepted on the command line,
//! and the legacy API versions that can be normalized into the current one.

use k8s_openapi::Resource as _;
use std::fmt;
use std::str::FromStr;

/// Enumeration of all kinds with a registered converter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    // Core resources
    Pod,
    Service,
    ConfigMap,
    Secret,
    Namespace,
    Node,
    ServiceAccount,
    PersistentVolumeClaim,
    // Workloads
    Deployment,
    ReplicaSet,
    StatefulSet,
    DaemonSet,
    Job,
    CronJob,
    // Networking
    Ingress,
    // Flux resources
    GitRepository,
    Kustomization,
    HelmRelease,
}

impl ResourceKind {
    /// Get the kind name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Pod => "Pod",
            ResourceKind::Service => "Service",
            ResourceKind::ConfigMap => "ConfigMap",
            ResourceKind::Secret => "Secret",
            ResourceKind::Namespace => "Namespace",
            ResourceKind::Node => "Node",
            ResourceKind::ServiceAccount => "ServiceAccount",
            ResourceKind::PersistentVolumeClaim => "PersistentVolumeClaim",
            ResourceKind::Deployment => "Deployment",
            ResourceKind::ReplicaSet => "ReplicaSet",
            ResourceKind::StatefulSet => "StatefulSet",
            ResourceKind::DaemonSet => "DaemonSet",
            ResourceKind::Job => "Job",
            ResourceKind::CronJob => "CronJob",
            ResourceKind::Ingress => "Ingress",
            ResourceKind::GitRepository => "GitRepository",
            ResourceKind::Kustomization => "Kustomization",
            ResourceKind::HelmRelease => "HelmRelease",
        }
    }

    /// API version (`group/version`, or `version` for the core group) the
    /// converter for this kind decodes.
    ///
    /// Typed kinds take it from the k8s-openapi type so it cannot drift from
    /// the struct the converter deserializes into.
    pub fn api_version(&self) -> &'static str {
        use k8s_openapi::api::{apps, batch, core, networking};

        match self {
            ResourceKind::Pod => core::v1::Pod::API_VERSION,
            ResourceKind::Service => core::v1::Service::API_VERSION,
            ResourceKind::ConfigMap => core::v1::ConfigMap::API_VERSION,
            ResourceKind::Secret => core::v1::Secret::API_VERSION,
            ResourceKind::Namespace => core::v1::Namespace::API_VERSION,
            ResourceKind::Node => core::v1::Node::API_VERSION,
            ResourceKind::ServiceAccount => core::v1::ServiceAccount::API_VERSION,
            ResourceKind::PersistentVolumeClaim => core::v1::PersistentVolumeClaim::API_VERSION,
            ResourceKind::Deployment => apps::v1::Deployment::API_VERSION,
            ResourceKind::ReplicaSet => apps::v1::ReplicaSet::API_VERSION,
            ResourceKind::StatefulSet => apps::v1::StatefulSet::API_VERSION,
            ResourceKind::DaemonSet => apps::v1::DaemonSet::API_VERSION,
            ResourceKind::Job => batch::v1::Job::API_VERSION,
            ResourceKind::CronJob => batch::v1::CronJob::API_VERSION,
            ResourceKind::Ingress => networking::v1::Ingress::API_VERSION,
            ResourceKind::GitRepository => "source.toolkit.fluxcd.io/v1",
            ResourceKind::Kustomization => "kustomize.toolkit.fluxcd.io/v1",
            ResourceKind::HelmRelease => "helm.toolkit.fluxcd.io/v2",
        }
    }

    /// Older API versions whose objects can be normalized into `api_version()`
    pub fn legacy_api_versions(&self) -> &'static [&'static str] {
        match self {
            ResourceKind::Deployment | ResourceKind::DaemonSet | ResourceKind::ReplicaSet => &[
                "extensions/v1beta1",
                "apps/v1beta1",
                "apps/v1beta2",
            ],
            ResourceKind::StatefulSet => &["apps/v1beta1", "apps/v1beta2"],
            ResourceKind::CronJob => &["batch/v1beta1"],
            ResourceKind::Ingress => &["extensions/v1beta1", "networking.k8s.io/v1beta1"],
            ResourceKind::GitRepository => &["source.toolkit.fluxcd.io/v1beta2"],
            ResourceKind::Kustomization => &["kustomize.toolkit.fluxcd.io/v1beta2"],
            ResourceKind::HelmRelease => {
                &["helm.toolkit.fluxcd.io/v2beta1", "helm.toolkit.fluxcd.io/v2beta2"]
            }
            _ => &[],
        }
    }

    /// Lowercase plural used in request paths and error messages
    pub fn plural(&self) -> &'static str {
        match self {
            ResourceKind::Pod => "pods",
            ResourceKind::Service => "services",
            ResourceKind::ConfigMap => "configmaps",
            ResourceKind::Secret => "secrets",
            ResourceKind::Namespace => "namespaces",
            ResourceKind::Node => "nodes",
            ResourceKind::ServiceAccount => "serviceaccounts",
            ResourceKind::PersistentVolumeClaim => "persistentvolumeclaims",
            ResourceKind::Deployment => "deployments",
            ResourceKind::ReplicaSet => "replicasets",
            ResourceKind::StatefulSet => "statefulsets",
            ResourceKind::DaemonSet => "daemonsets",
            ResourceKind::Job => "jobs",
            ResourceKind::CronJob => "cronjobs",
            ResourceKind::Ingress => "ingresses",
            ResourceKind::GitRepository => "gitrepositories",
            ResourceKind::Kustomization => "kustomizations",
            ResourceKind::HelmRelease => "helmreleases",
        }
    }

    /// Whether objects of this kind live in a namespace
    pub fn is_namespaced(&self) -> bool {
        !matches!(self, ResourceKind::Namespace | ResourceKind::Node)
    }

    /// Try to parse a kind name, returning None if it has no converter
    pub fn parse_optional(s: &str) -> Option<Self> {
        s.parse().ok()
    }

    /// Get all registered kinds
    pub fn all() -> &'static [Self] {
        &[
            ResourceKind::Pod,
            ResourceKind::Service,
            ResourceKind::ConfigMap,
            ResourceKind::Secret,
            ResourceKind::Namespace,
            ResourceKind::Node,
            ResourceKind::ServiceAccount,
            ResourceKind::PersistentVolumeClaim,
            ResourceKind::Deployment,
            ResourceKind::ReplicaSet,
            ResourceKind::StatefulSet,
            ResourceKind::DaemonSet,
            ResourceKind::Job,
            ResourceKind::CronJob,
            ResourceKind::Ingress,
            ResourceKind::GitRepository,
            ResourceKind::Kustomization,
            ResourceKind::HelmRelease,
        ]
    }

    /// Resolve a command-line resource token (kind, plural or short alias)
    pub fn from_str_case_insensitive(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pod" | "pods" | "po" => Some(ResourceKind::Pod),
            "service" | "services" | "svc" => Some(ResourceKind::Service),
            "configmap" | "configmaps" | "cm" => Some(ResourceKind::ConfigMap),
            "secret" | "secrets" => Some(ResourceKind::Secret),
            "namespace" | "namespaces" | "ns" => Some(ResourceKind::Namespace),
            "node" | "nodes" | "no" => Some(ResourceKind::Node),
            "serviceaccount" | "serviceaccounts" | "sa" => Some(ResourceKind::ServiceAccount),
            "persistentvolumeclaim" | "persistentvolumeclaims" | "pvc" => {
                Some(ResourceKind::PersistentVolumeClaim)
            }
            "deployment" | "deployments" | "deploy" => Some(ResourceKind::Deployment),
            "replicaset" | "replicasets" | "rs" => Some(ResourceKind::ReplicaSet),
            "statefulset" | "statefulsets" | "sts" => Some(ResourceKind::StatefulSet),
            "daemonset" | "daemonsets" | "ds" => Some(ResourceKind::DaemonSet),
            "job" | "jobs" => Some(ResourceKind::Job),
            "cronjob" | "cronjobs" | "cj" => Some(ResourceKind::CronJob),
            "ingress" | "ingresses" | "ing" => Some(ResourceKind::Ingress),
            "gitrepository" | "gitrepositories" | "gitrepo" => Some(ResourceKind::GitRepository),
            "kustomization" | "kustomizations" | "ks" => Some(ResourceKind::Kustomization),
            "helmrelease" | "helmreleases" | "hr" => Some(ResourceKind::HelmRelease),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown resource kind: {}", s))
    }
}
