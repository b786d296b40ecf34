use tenancy_provisioner_core::{MESH_SYSTEM_LABEL, MESH_SYSTEM_NAMESPACE};
use tenancy_provisioner_k8s_api::mesh::Action;

/// Cluster-wide constants shared by every tenant.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClusterPolicy {
    /// Per-container limits imposed on every tenant namespace.
    pub container_limits: ContainerLimits,

    /// The fixed parts of each tenant's NetworkPolicy.
    pub network: NetworkRules,

    /// The mesh control plane and how tenants attach to it.
    pub mesh: MeshPolicy,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComputeResources {
    pub cpu: String,
    pub memory: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerLimits {
    /// Limits given to containers that declare none.
    pub default: ComputeResources,

    /// Requests given to containers that declare none.
    pub default_request: ComputeResources,

    pub min: ComputeResources,
    pub max: ComputeResources,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkRules {
    /// TCP ports on which the mesh system namespace may reach tenant pods.
    pub mesh_ingress_ports: Vec<u16>,

    /// DNS is resolved through the mesh system namespace, over both UDP and TCP.
    pub dns_port: u16,

    /// The range tenants may reach outside the cluster...
    pub external_cidr: String,

    /// ...minus these ranges, which must lie inside it.
    pub external_except: Vec<String>,

    /// TCP ports allowed towards `external_cidr`.
    pub external_ports: Vec<u16>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MeshPolicy {
    /// The namespace the control plane is installed into.
    pub namespace: String,

    /// Marks the mesh system namespace so that tenant NetworkPolicies can select it. Tenants may
    /// not declare this key.
    pub system_label: (String, String),

    pub release_name: String,
    pub chart: String,
    pub repository: String,
    pub version: String,

    pub control_plane_requests: ComputeResources,
    pub control_plane_limits: ComputeResources,

    /// The mesh that tenant traffic permissions target.
    pub mesh_name: String,

    /// The action granted to traffic from any mesh service into each tenant.
    pub default_action: Action,
}

// === impl ComputeResources ===

impl ComputeResources {
    pub fn new(cpu: &str, memory: &str) -> Self {
        Self {
            cpu: cpu.to_string(),
            memory: memory.to_string(),
        }
    }
}

// === impl Defaults ===

impl Default for ContainerLimits {
    fn default() -> Self {
        Self {
            default: ComputeResources::new("500m", "512Mi"),
            default_request: ComputeResources::new("250m", "256Mi"),
            min: ComputeResources::new("100m", "64Mi"),
            max: ComputeResources::new("2", "2Gi"),
        }
    }
}

impl Default for NetworkRules {
    fn default() -> Self {
        Self {
            mesh_ingress_ports: vec![80, 443],
            dns_port: 53,
            external_cidr: "0.0.0.0/0".to_string(),
            external_except: vec![
                "10.0.0.0/8".to_string(),
                "172.16.0.0/12".to_string(),
                "192.168.0.0/16".to_string(),
            ],
            external_ports: vec![80, 443],
        }
    }
}

impl Default for MeshPolicy {
    fn default() -> Self {
        Self {
            namespace: MESH_SYSTEM_NAMESPACE.to_string(),
            system_label: (MESH_SYSTEM_LABEL.to_string(), "true".to_string()),
            release_name: "kuma".to_string(),
            chart: "kuma".to_string(),
            repository: "https://kumahq.github.io/charts".to_string(),
            version: "2.5.0".to_string(),
            control_plane_requests: ComputeResources::new("500m", "512Mi"),
            control_plane_limits: ComputeResources::new("2", "1Gi"),
            mesh_name: "default".to_string(),
            // TODO: tighten once tenant-to-tenant mesh policy is decided; until then the
            // NetworkPolicy is the isolation boundary.
            default_action: Action::Allow,
        }
    }
}
