use tenancy_provisioner_core::TenantDescriptor;
use tenancy_provisioner_k8s_api::{labels, Namespace, ObjectMeta};

pub(crate) fn tenant(tenant: &TenantDescriptor) -> Namespace {
    labeled(tenant.name.as_str(), tenant.namespace_labels.clone())
}

pub(crate) fn labeled(name: &str, labels: labels::Map) -> Namespace {
    Namespace {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            labels: Some(labels).filter(|l| !l.is_empty()),
            ..Default::default()
        },
        ..Default::default()
    }
}
