//! Tenant resource derivation
//!
//! Turns validated tenants into the complete, dependency-ordered set of objects an apply engine
//! must converge the cluster to. Nothing here performs I/O: the output is plain data.
//!
//! Each tenant yields a bundle rooted at its namespace. The mesh installation is derived once,
//! and each tenant's traffic permission hangs off both the installation and the tenant's
//! namespace:
//!
//! ```text
//!                  [ Namespace ] ------------------------------.
//!          .-------.---+---------.------------.                |
//!          v       v             v            v                |
//!     [ Quota ] [ Limits ] [ NetworkPolicy ] [ ClusterRole ]   |
//!                                             |                |
//!                                             v                |
//!                                      [ RoleBinding ] <-------'
//!
//! [ mesh Namespace ] -> [ HelmRelease ] -> [ MeshTrafficPermission ] <- [ Namespace ]
//! ```
//!
//! Edges are explicit: every [`PlannedResource`] names its predecessors, and [`plan()`] sorts the
//! whole set topologically before returning it.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod bundle;
mod cluster_policy;
mod graph;
mod limits;
pub mod mesh;
mod namespace;
mod network_policy;
mod plan;
mod quota;
mod rbac;
mod resource;


pub use self::{
    bundle::{BundleDeriver, ResourceBundle},
    cluster_policy::{ClusterPolicy, ComputeResources, ContainerLimits, MeshPolicy, NetworkRules},
    graph::DependencyGraph,
    mesh::{Autoscaling, MeshAttachment, MeshInstallation},
    plan::{plan, Error, Plan},
    resource::{Kind, PlannedResource, Resource, ResourceId},
};
pub use tenancy_provisioner_core as core;
pub use tenancy_provisioner_k8s_api as k8s;

use tenancy_provisioner_k8s_api::network::CidrParseError;

/// Raised when the cluster-wide constants cannot produce a consistent plan.
///
/// Tenant data never causes these: validation has already vetted it.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DerivationError {
    #[error("cluster policy: {0}")]
    InvalidCidr(#[from] CidrParseError),

    #[error("cluster policy: egress exception {except} is not within {cidr}")]
    ExceptionOutsideRange { cidr: k8s::Cidr, except: k8s::Cidr },

    #[error("cluster policy: {0} lists port 0")]
    ZeroPort(&'static str),

    #[error("resource {0} is derived more than once")]
    DuplicateResource(ResourceId),

    #[error("{resource} depends on {dependency}, which is not part of the plan")]
    UnknownDependency {
        resource: ResourceId,
        dependency: ResourceId,
    },

    #[error("dependency cycle among: {}", join_ids(.0))]
    Cycle(Vec<ResourceId>),
}

fn join_ids(ids: &[ResourceId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
