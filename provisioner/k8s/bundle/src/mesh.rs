//! Mesh control-plane installation and per-tenant traffic permissions.

use crate::{namespace, MeshPolicy, PlannedResource, ResourceBundle, ResourceId};
use serde_json::json;
use tenancy_provisioner_core::Provider;
use tenancy_provisioner_k8s_api::{
    labels,
    mesh::{Action, Conf, FromRule, TargetRef},
    HelmRelease, MeshTrafficPermission, MeshTrafficPermissionSpec,
};
use tracing::debug;

/// Control-plane replica bounds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Autoscaling {
    pub enabled: bool,
    pub min_replicas: u32,
    pub max_replicas: u32,
}

/// The singleton mesh install: its namespace and its chart release.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshInstallation {
    pub namespace: PlannedResource,
    pub release: PlannedResource,
    pub autoscaling: Autoscaling,
    mesh_name: String,
}

/// The mesh installation plus one traffic permission per tenant, in tenant order.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshAttachment {
    pub installation: MeshInstallation,
    pub permissions: Vec<PlannedResource>,
}

/// Installs the mesh for `provider` and attaches every tenant bundle to it.
///
/// The installation is complete before any permission is derived, and each permission depends
/// on both the release and its tenant's namespace.
pub fn attach<'a>(
    bundles: impl IntoIterator<Item = &'a ResourceBundle>,
    provider: Provider,
    policy: &MeshPolicy,
) -> MeshAttachment {
    let installation = MeshInstallation::new(provider, policy);
    let permissions = bundles
        .into_iter()
        .map(|b| installation.traffic_permission(b, policy.default_action))
        .collect::<Vec<_>>();
    debug!(%provider, permissions = permissions.len(), "attached tenants to mesh");
    MeshAttachment {
        installation,
        permissions,
    }
}

// === impl Autoscaling ===

impl Autoscaling {
    /// Managed clusters run a scalable control plane; local clusters a single replica.
    pub fn for_provider(provider: Provider) -> Self {
        match provider {
            Provider::Linode => Self {
                enabled: true,
                min_replicas: 2,
                max_replicas: 5,
            },
            Provider::Minikube => Self {
                enabled: false,
                min_replicas: 1,
                max_replicas: 1,
            },
        }
    }
}

// === impl MeshInstallation ===

impl MeshInstallation {
    pub fn new(provider: Provider, policy: &MeshPolicy) -> Self {
        let autoscaling = Autoscaling::for_provider(provider);

        let (key, value) = &policy.system_label;
        let ns = namespace::labeled(
            &policy.namespace,
            labels::Map::from([(key.clone(), value.clone())]),
        );
        let namespace = PlannedResource::root(ns);

        let release = HelmRelease {
            name: policy.release_name.clone(),
            namespace: policy.namespace.clone(),
            chart: policy.chart.clone(),
            repository: policy.repository.clone(),
            version: policy.version.clone(),
            values: json!({
                "controlPlane": {
                    "autoscaling": {
                        "enabled": autoscaling.enabled,
                        "minReplicas": autoscaling.min_replicas,
                        "maxReplicas": autoscaling.max_replicas,
                    },
                    "resources": {
                        "requests": {
                            "cpu": policy.control_plane_requests.cpu,
                            "memory": policy.control_plane_requests.memory,
                        },
                        "limits": {
                            "cpu": policy.control_plane_limits.cpu,
                            "memory": policy.control_plane_limits.memory,
                        },
                    },
                    "tls": {
                        "enabled": true,
                        "autoGenerated": true,
                    },
                },
                "multizone": {
                    "global": { "enabled": true },
                },
                "ingress": { "enabled": true },
            }),
        };
        let release = PlannedResource::new(release, vec![namespace.id.clone()]);

        Self {
            namespace,
            release,
            autoscaling,
            mesh_name: policy.mesh_name.clone(),
        }
    }

    pub fn namespace_id(&self) -> &ResourceId {
        &self.namespace.id
    }

    pub fn release_id(&self) -> &ResourceId {
        &self.release.id
    }

    /// Grants `action` to traffic from any mesh service into the bundle's tenant.
    pub fn traffic_permission(&self, bundle: &ResourceBundle, action: Action) -> PlannedResource {
        let tenant = &bundle.tenant().name;
        let mut mtp = MeshTrafficPermission::new(
            &format!("{tenant}-traffic-permission"),
            MeshTrafficPermissionSpec {
                target_ref: TargetRef::mesh(&self.mesh_name),
                from: vec![FromRule {
                    target_ref: TargetRef::any_service(),
                    default: Conf { action },
                }],
            },
        );
        mtp.metadata.namespace = Some(tenant.to_string());

        PlannedResource::new(
            mtp,
            vec![bundle.namespace_id(), self.release_id().clone()],
        )
    }

    pub fn into_resources(self) -> [PlannedResource; 2] {
        [self.namespace, self.release]
    }
}

// === impl MeshAttachment ===

impl MeshAttachment {
    pub fn into_resources(self) -> impl Iterator<Item = PlannedResource> {
        self.installation
            .into_resources()
            .into_iter()
            .chain(self.permissions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BundleDeriver, ClusterPolicy, Kind};
    use pretty_assertions::assert_eq;
    use tenancy_provisioner_core::TenantDescriptor;

    fn bundles(names: &[&str]) -> Vec<ResourceBundle> {
        let deriver = BundleDeriver::new(&ClusterPolicy::default()).unwrap();
        names
            .iter()
            .map(|n| deriver.derive(&TenantDescriptor::new(n.parse().unwrap())))
            .collect()
    }

    fn values(install: &MeshInstallation) -> serde_json::Value {
        serde_json::to_value(&install.release.resource).unwrap()["values"].clone()
    }

    #[test]
    fn linode_autoscales() {
        let install = MeshInstallation::new(Provider::Linode, &MeshPolicy::default());
        assert_eq!(
            values(&install)["controlPlane"]["autoscaling"],
            json!({ "enabled": true, "minReplicas": 2, "maxReplicas": 5 })
        );
    }

    #[test]
    fn minikube_runs_one_replica() {
        let install = MeshInstallation::new(Provider::Minikube, &MeshPolicy::default());
        assert_eq!(
            install.autoscaling,
            Autoscaling {
                enabled: false,
                min_replicas: 1,
                max_replicas: 1,
            }
        );
        assert_eq!(
            values(&install)["controlPlane"]["autoscaling"],
            json!({ "enabled": false, "minReplicas": 1, "maxReplicas": 1 })
        );
    }

    #[test]
    fn release_values() {
        let install = MeshInstallation::new(Provider::Linode, &MeshPolicy::default());
        let v = values(&install);
        assert_eq!(
            v["controlPlane"]["resources"],
            json!({
                "requests": { "cpu": "500m", "memory": "512Mi" },
                "limits": { "cpu": "2", "memory": "1Gi" },
            })
        );
        assert_eq!(
            v["controlPlane"]["tls"],
            json!({ "enabled": true, "autoGenerated": true })
        );
        assert_eq!(v["multizone"]["global"]["enabled"], true);
        assert_eq!(v["ingress"]["enabled"], true);
    }

    #[test]
    fn installation_identities() {
        let install = MeshInstallation::new(Provider::Minikube, &MeshPolicy::default());
        assert_eq!(
            install.namespace_id(),
            &ResourceId::cluster(Kind::Namespace, "kuma-system")
        );
        assert_eq!(
            install.release_id(),
            &ResourceId::namespaced(Kind::HelmRelease, "kuma-system", "kuma")
        );
        assert_eq!(install.release.depends_on, vec![install.namespace_id().clone()]);

        let ns = serde_json::to_value(&install.namespace.resource).unwrap();
        assert_eq!(ns["metadata"]["labels"], json!({ "kuma.io/system": "true" }));
    }

    #[test]
    fn one_permission_per_tenant() {
        let bundles = bundles(&["tenant-a", "tenant-b"]);
        let attachment = attach(&bundles, Provider::Linode, &MeshPolicy::default());
        assert_eq!(attachment.permissions.len(), 2);

        for (p, b) in attachment.permissions.iter().zip(&bundles) {
            assert_eq!(
                p.id,
                ResourceId::namespaced(
                    Kind::MeshTrafficPermission,
                    b.tenant().name.as_str(),
                    format!("{}-traffic-permission", b.tenant().name),
                )
            );
            assert_eq!(
                p.depends_on,
                vec![
                    b.namespace_id(),
                    attachment.installation.release_id().clone()
                ]
            );
        }
    }

    #[test]
    fn configurable_default_action() {
        let bundles = bundles(&["tenant-a"]);
        let policy = MeshPolicy {
            default_action: Action::Deny,
            ..Default::default()
        };
        let attachment = attach(&bundles, Provider::Minikube, &policy);
        let json = serde_json::to_value(&attachment.permissions[0].resource).unwrap();
        assert_eq!(json["spec"]["from"][0]["default"]["action"], "DENY");
        assert_eq!(
            json["spec"]["targetRef"],
            json!({ "kind": "Mesh", "name": "default" })
        );
    }
}
