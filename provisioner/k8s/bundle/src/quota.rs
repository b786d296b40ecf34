use tenancy_provisioner_core::TenantDescriptor;
use tenancy_provisioner_k8s_api::{ObjectMeta, Quantity, ResourceQuota, ResourceQuotaSpec};

/// Caps the tenant namespace's aggregate container limits and pod count.
///
/// Quantities are copied verbatim; the API server is the authority on their syntax.
pub(crate) fn quota(tenant: &TenantDescriptor) -> ResourceQuota {
    let q = &tenant.resource_quotas;
    let hard = [
        ("limits.cpu", &q.cpu),
        ("limits.memory", &q.memory),
        ("pods", &q.pods),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), Quantity(v.clone())))
    .collect();

    ResourceQuota {
        metadata: ObjectMeta {
            name: Some(format!("{}-quota", tenant.name)),
            namespace: Some(tenant.name.to_string()),
            ..Default::default()
        },
        spec: Some(ResourceQuotaSpec {
            hard: Some(hard),
            ..Default::default()
        }),
        ..Default::default()
    }
}
