use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Authorizes mesh traffic into the targeted part of the mesh.
#[derive(Clone, Debug, PartialEq, Eq, CustomResource, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "kuma.io",
    version = "v1alpha1",
    kind = "MeshTrafficPermission",
    namespaced,
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct MeshTrafficPermissionSpec {
    pub target_ref: TargetRef,
    pub from: Vec<FromRule>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct TargetRef {
    pub kind: TargetKind,
    pub name: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub enum TargetKind {
    Mesh,
    MeshSubset,
    MeshService,
    MeshServiceSubset,
}

/// Applies `default` to traffic originating from `target_ref`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FromRule {
    pub target_ref: TargetRef,
    pub default: Conf,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct Conf {
    pub action: Action,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    #[default]
    Allow,
    Deny,
    AllowWithShadowDeny,
}

// === impl TargetRef ===

impl TargetRef {
    pub const ANY: &'static str = "*";

    pub fn mesh(name: impl Into<String>) -> Self {
        Self {
            kind: TargetKind::Mesh,
            name: name.into(),
        }
    }

    /// Refers to every service in the mesh.
    pub fn any_service() -> Self {
        Self {
            kind: TargetKind::MeshService,
            name: Self::ANY.to_string(),
        }
    }
}

// === impl Action ===

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => "ALLOW".fmt(f),
            Self::Deny => "DENY".fmt(f),
            Self::AllowWithShadowDeny => "ALLOW_WITH_SHADOW_DENY".fmt(f),
        }
    }
}
