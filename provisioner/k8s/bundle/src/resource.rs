use serde::{Serialize, Serializer};
use std::fmt;
use tenancy_provisioner_k8s_api::{
    ClusterRole, HelmRelease, LimitRange, MeshTrafficPermission, Namespace, NetworkPolicy,
    ResourceExt, ResourceQuota, RoleBinding,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Namespace,
    ResourceQuota,
    LimitRange,
    ClusterRole,
    RoleBinding,
    NetworkPolicy,
    HelmRelease,
    MeshTrafficPermission,
}

/// Identifies a resource within a plan. Dependency edges are expressed in terms of these.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId {
    pub kind: Kind,
    pub namespace: Option<String>,
    pub name: String,
}

/// A desired object, as handed to the apply engine.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Resource {
    Namespace(Namespace),
    ResourceQuota(ResourceQuota),
    LimitRange(LimitRange),
    ClusterRole(ClusterRole),
    RoleBinding(RoleBinding),
    NetworkPolicy(NetworkPolicy),
    HelmRelease(HelmRelease),
    MeshTrafficPermission(MeshTrafficPermission),
}

/// A resource together with the resources that must exist before it.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedResource {
    pub id: ResourceId,
    pub depends_on: Vec<ResourceId>,
    pub resource: Resource,
}

// === impl Kind ===

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Namespace => "Namespace",
            Self::ResourceQuota => "ResourceQuota",
            Self::LimitRange => "LimitRange",
            Self::ClusterRole => "ClusterRole",
            Self::RoleBinding => "RoleBinding",
            Self::NetworkPolicy => "NetworkPolicy",
            Self::HelmRelease => HelmRelease::KIND,
            Self::MeshTrafficPermission => "MeshTrafficPermission",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

// === impl ResourceId ===

impl ResourceId {
    pub fn cluster(kind: Kind, name: impl Into<String>) -> Self {
        Self {
            kind,
            namespace: None,
            name: name.into(),
        }
    }

    pub fn namespaced(kind: Kind, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }

    fn of<K: ResourceExt>(kind: Kind, obj: &K) -> Self {
        Self {
            kind,
            namespace: obj.namespace(),
            name: obj.name_any(),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}/{}/{}", self.kind, ns, self.name),
            None => write!(f, "{}/{}", self.kind, self.name),
        }
    }
}

impl Serialize for ResourceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// === impl Resource ===

impl Resource {
    pub fn kind(&self) -> Kind {
        match self {
            Self::Namespace(_) => Kind::Namespace,
            Self::ResourceQuota(_) => Kind::ResourceQuota,
            Self::LimitRange(_) => Kind::LimitRange,
            Self::ClusterRole(_) => Kind::ClusterRole,
            Self::RoleBinding(_) => Kind::RoleBinding,
            Self::NetworkPolicy(_) => Kind::NetworkPolicy,
            Self::HelmRelease(_) => Kind::HelmRelease,
            Self::MeshTrafficPermission(_) => Kind::MeshTrafficPermission,
        }
    }

    pub fn id(&self) -> ResourceId {
        let kind = self.kind();
        match self {
            Self::Namespace(r) => ResourceId::of(kind, r),
            Self::ResourceQuota(r) => ResourceId::of(kind, r),
            Self::LimitRange(r) => ResourceId::of(kind, r),
            Self::ClusterRole(r) => ResourceId::of(kind, r),
            Self::RoleBinding(r) => ResourceId::of(kind, r),
            Self::NetworkPolicy(r) => ResourceId::of(kind, r),
            Self::HelmRelease(r) => ResourceId::namespaced(kind, &r.namespace, &r.name),
            Self::MeshTrafficPermission(r) => ResourceId::of(kind, r),
        }
    }
}

macro_rules! impl_from {
    ($($kind:ident),+ $(,)?) => {
        $(
            impl From<$kind> for Resource {
                fn from(r: $kind) -> Self {
                    Self::$kind(r)
                }
            }
        )+
    };
}

impl_from!(
    Namespace,
    ResourceQuota,
    LimitRange,
    ClusterRole,
    RoleBinding,
    NetworkPolicy,
    HelmRelease,
    MeshTrafficPermission,
);

// === impl PlannedResource ===

impl PlannedResource {
    pub fn new(resource: impl Into<Resource>, depends_on: Vec<ResourceId>) -> Self {
        let resource = resource.into();
        Self {
            id: resource.id(),
            depends_on,
            resource,
        }
    }

    /// A resource with no predecessors.
    pub fn root(resource: impl Into<Resource>) -> Self {
        Self::new(resource, Vec::new())
    }
}
