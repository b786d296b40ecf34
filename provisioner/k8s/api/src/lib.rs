#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

//! Kubernetes API types produced by the tenancy provisioner.
//!
//! Built-in kinds are re-exported from `k8s-openapi`; the mesh's
//! `MeshTrafficPermission` is declared here as a custom resource, and the
//! control-plane chart installation is described by a [`HelmRelease`].

pub mod helm;
pub mod labels;
pub mod mesh;
pub mod network;

pub use self::{
    helm::HelmRelease,
    mesh::{MeshTrafficPermission, MeshTrafficPermissionSpec},
    network::Cidr,
};
pub use k8s_openapi::{
    api::{
        self,
        core::v1::{
            LimitRange, LimitRangeItem, LimitRangeSpec, Namespace, ResourceQuota,
            ResourceQuotaSpec,
        },
        networking::v1::{
            IPBlock, NetworkPolicy, NetworkPolicyEgressRule, NetworkPolicyIngressRule,
            NetworkPolicyPeer, NetworkPolicyPort, NetworkPolicySpec,
        },
        rbac::v1::{ClusterRole, PolicyRule, RoleBinding, RoleRef, Subject},
    },
    apimachinery::pkg::{
        api::resource::Quantity,
        apis::meta::v1::{LabelSelector, ObjectMeta},
        util::intstr::IntOrString,
    },
};
pub use kube::{Resource, ResourceExt};
