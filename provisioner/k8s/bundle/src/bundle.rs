use crate::{
    limits, namespace, network_policy, quota, rbac, ClusterPolicy, DerivationError, Kind,
    PlannedResource, ResourceId,
};
use tenancy_provisioner_core::TenantDescriptor;
use tenancy_provisioner_k8s_api::LimitRangeItem;
use tracing::debug;

/// Derives tenant bundles against a fixed cluster policy.
///
/// All of the policy's fallible parsing happens in [`BundleDeriver::new`], so deriving a bundle
/// for an already validated tenant cannot fail.
#[derive(Clone, Debug)]
pub struct BundleDeriver {
    limits: LimitRangeItem,
    network: network_policy::Template,
}

/// Everything a single tenant owns, with intra-bundle dependencies filled in.
#[derive(Clone, Debug, PartialEq)]
pub struct ResourceBundle {
    tenant: TenantDescriptor,
    resources: Vec<PlannedResource>,
}

// === impl BundleDeriver ===

impl BundleDeriver {
    pub fn new(policy: &ClusterPolicy) -> Result<Self, DerivationError> {
        Ok(Self {
            limits: limits::item(&policy.container_limits),
            network: network_policy::Template::new(&policy.network, &policy.mesh)?,
        })
    }

    pub fn derive(&self, tenant: &TenantDescriptor) -> ResourceBundle {
        let ns = PlannedResource::root(namespace::tenant(tenant));
        let ns_id = ns.id.clone();
        let in_ns = || vec![ns_id.clone()];

        let role = PlannedResource::new(rbac::cluster_role(tenant), in_ns());
        let binding = PlannedResource::new(
            rbac::role_binding(tenant),
            vec![ns_id.clone(), role.id.clone()],
        );

        let resources = vec![
            PlannedResource::new(quota::quota(tenant), in_ns()),
            PlannedResource::new(limits::limit_range(tenant, &self.limits), in_ns()),
            role,
            binding,
            PlannedResource::new(self.network.for_tenant(tenant), in_ns()),
        ];

        debug!(tenant = %tenant.name, resources = resources.len() + 1, "derived bundle");
        ResourceBundle {
            tenant: tenant.clone(),
            resources: std::iter::once(ns).chain(resources).collect(),
        }
    }
}

// === impl ResourceBundle ===

impl ResourceBundle {
    pub fn tenant(&self) -> &TenantDescriptor {
        &self.tenant
    }

    pub fn namespace_id(&self) -> ResourceId {
        ResourceId::cluster(Kind::Namespace, self.tenant.name.as_str())
    }

    /// The bundle's resources, namespace first.
    pub fn resources(&self) -> &[PlannedResource] {
        &self.resources
    }

    pub fn into_resources(self) -> Vec<PlannedResource> {
        self.resources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bundle(name: &str) -> ResourceBundle {
        BundleDeriver::new(&ClusterPolicy::default())
            .unwrap()
            .derive(&TenantDescriptor::new(name.parse().unwrap()))
    }

    #[test]
    fn namespace_first() {
        let b = bundle("tenant-a");
        assert_eq!(b.resources()[0].id, b.namespace_id());
        assert!(b.resources()[0].depends_on.is_empty());
        for r in &b.resources()[1..] {
            assert!(r.depends_on.contains(&b.namespace_id()), "{}", r.id);
        }
    }

    #[test]
    fn identities() {
        let ids = bundle("tenant-a")
            .into_resources()
            .into_iter()
            .map(|r| r.id.to_string())
            .collect::<Vec<_>>();
        assert_eq!(
            ids,
            [
                "Namespace/tenant-a",
                "ResourceQuota/tenant-a/tenant-a-quota",
                "LimitRange/tenant-a/tenant-a-limits",
                "ClusterRole/tenant-a-role",
                "RoleBinding/tenant-a/tenant-a-rolebinding",
                "NetworkPolicy/tenant-a/tenant-a-netpol",
            ]
        );
    }

    #[test]
    fn binding_follows_role() {
        let b = bundle("tenant-a");
        let binding = b
            .resources()
            .iter()
            .find(|r| r.id.kind == Kind::RoleBinding)
            .unwrap();
        assert_eq!(
            binding.depends_on,
            vec![
                b.namespace_id(),
                ResourceId::cluster(Kind::ClusterRole, "tenant-a-role"),
            ]
        );
    }

    #[test]
    fn deterministic() {
        let a = serde_json::to_vec(bundle("tenant-a").resources()).unwrap();
        let b = serde_json::to_vec(bundle("tenant-a").resources()).unwrap();
        assert_eq!(a, b);
    }
}
