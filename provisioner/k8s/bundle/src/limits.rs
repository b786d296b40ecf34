use crate::{ComputeResources, ContainerLimits};
use std::collections::BTreeMap;
use tenancy_provisioner_core::TenantDescriptor;
use tenancy_provisioner_k8s_api::{
    LimitRange, LimitRangeItem, LimitRangeSpec, ObjectMeta, Quantity,
};

pub(crate) fn item(limits: &ContainerLimits) -> LimitRangeItem {
    LimitRangeItem {
        type_: "Container".to_string(),
        default: Some(quantities(&limits.default)),
        default_request: Some(quantities(&limits.default_request)),
        min: Some(quantities(&limits.min)),
        max: Some(quantities(&limits.max)),
        ..Default::default()
    }
}

pub(crate) fn limit_range(tenant: &TenantDescriptor, item: &LimitRangeItem) -> LimitRange {
    LimitRange {
        metadata: ObjectMeta {
            name: Some(format!("{}-limits", tenant.name)),
            namespace: Some(tenant.name.to_string()),
            ..Default::default()
        },
        spec: Some(LimitRangeSpec {
            limits: vec![item.clone()],
        }),
        ..Default::default()
    }
}

fn quantities(r: &ComputeResources) -> BTreeMap<String, Quantity> {
    let mut map = BTreeMap::new();
    map.insert("cpu".to_string(), Quantity(r.cpu.clone()));
    map.insert("memory".to_string(), Quantity(r.memory.clone()));
    map
}
