#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod credentials;
mod provider;
mod tenant;
pub mod validation;

use tenancy_provisioner_k8s_api::labels;

pub use self::{
    credentials::{ClusterAccess, ExportedCredentials, Kubeconfig},
    provider::{ConfigurationError, Provider},
    tenant::{NameError, RawQuotas, RawTenant, ResourceQuotas, TenantDescriptor, TenantName},
    validation::{validate, validate_reserving, ValidationError},
};

/// The namespace where the mesh control plane is installed.
pub const MESH_SYSTEM_NAMESPACE: &str = "kuma-system";

/// Marks the mesh system namespace. Tenant NetworkPolicies admit every namespace carrying it.
pub const MESH_SYSTEM_LABEL: &str = "kuma.io/system";

/// Namespace label keys that tenants may never declare.
pub const RESERVED_LABELS: &[&str] = &[MESH_SYSTEM_LABEL, labels::NAMESPACE_NAME];

/// Kubernetes reserves namespaces with this prefix for its own components.
pub const RESERVED_PREFIX: &str = "kube-";

/// Namespaces that tenants may never claim, in addition to any with [`RESERVED_PREFIX`].
pub const RESERVED_NAMESPACES: &[&str] = &[
    "default",
    "kube-node-lease",
    "kube-public",
    "kube-system",
    MESH_SYSTEM_NAMESPACE,
];
