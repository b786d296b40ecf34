use tenancy_provisioner_core::TenantDescriptor;
use tenancy_provisioner_k8s_api::{
    ClusterRole, ObjectMeta, PolicyRule, RoleBinding, RoleRef, Subject,
};

const RBAC_GROUP: &str = "rbac.authorization.k8s.io";

const READ_WRITE: &[&str] = &["get", "list", "watch", "create", "update", "delete"];
const READ_ONLY: &[&str] = &["get", "list", "watch"];

struct Rule {
    group: &'static str,
    resources: &'static [&'static str],
    verbs: &'static [&'static str],
}

const RULES: &[Rule] = &[
    Rule {
        group: "",
        resources: &[
            "pods",
            "services",
            "configmaps",
            "secrets",
            "persistentvolumeclaims",
            "serviceaccounts",
        ],
        verbs: READ_WRITE,
    },
    Rule {
        group: "apps",
        resources: &["deployments", "statefulsets"],
        verbs: READ_WRITE,
    },
    Rule {
        group: "networking.k8s.io",
        resources: &["ingresses"],
        verbs: READ_WRITE,
    },
    Rule {
        group: "storage.k8s.io",
        resources: &["storageclasses"],
        verbs: READ_ONLY,
    },
];

pub(crate) fn role_name(tenant: &TenantDescriptor) -> String {
    format!("{}-role", tenant.name)
}

pub(crate) fn cluster_role(tenant: &TenantDescriptor) -> ClusterRole {
    let rules = RULES
        .iter()
        .map(|r| PolicyRule {
            api_groups: Some(vec![r.group.to_string()]),
            resources: Some(strings(r.resources)),
            verbs: strings(r.verbs),
            ..Default::default()
        })
        .collect();

    ClusterRole {
        metadata: ObjectMeta {
            name: Some(role_name(tenant)),
            ..Default::default()
        },
        rules: Some(rules),
        ..Default::default()
    }
}

/// Grants the tenant's user group its role, within the tenant namespace only.
pub(crate) fn role_binding(tenant: &TenantDescriptor) -> RoleBinding {
    RoleBinding {
        metadata: ObjectMeta {
            name: Some(format!("{}-rolebinding", tenant.name)),
            namespace: Some(tenant.name.to_string()),
            ..Default::default()
        },
        role_ref: RoleRef {
            api_group: RBAC_GROUP.to_string(),
            kind: "ClusterRole".to_string(),
            name: role_name(tenant),
        },
        subjects: Some(vec![Subject {
            api_group: Some(RBAC_GROUP.to_string()),
            kind: "Group".to_string(),
            name: format!("{}-users", tenant.name),
            ..Default::default()
        }]),
        ..Default::default()
    }
}

fn strings(s: &[&str]) -> Vec<String> {
    s.iter().map(|s| s.to_string()).collect()
}
