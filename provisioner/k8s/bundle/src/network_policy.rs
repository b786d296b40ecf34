use crate::{DerivationError, MeshPolicy, NetworkRules};
use tenancy_provisioner_core::TenantDescriptor;
use tenancy_provisioner_k8s_api::{
    labels, Cidr, IPBlock, IntOrString, LabelSelector, NetworkPolicy, NetworkPolicyEgressRule,
    NetworkPolicyIngressRule, NetworkPolicyPeer, NetworkPolicyPort, NetworkPolicySpec, ObjectMeta,
};

/// The tenant-independent parts of every tenant NetworkPolicy, checked and built once.
#[derive(Clone, Debug)]
pub(crate) struct Template {
    mesh_ingress: NetworkPolicyIngressRule,
    mesh_dns: NetworkPolicyEgressRule,
    external: NetworkPolicyEgressRule,
}

// === impl Template ===

impl Template {
    pub(crate) fn new(rules: &NetworkRules, mesh: &MeshPolicy) -> Result<Self, DerivationError> {
        let cidr = rules.external_cidr.parse::<Cidr>()?;
        let except = rules
            .external_except
            .iter()
            .map(|s| {
                let except = s.parse::<Cidr>()?;
                if !cidr.contains(&except) {
                    return Err(DerivationError::ExceptionOutsideRange { cidr, except });
                }
                Ok(except.to_string())
            })
            .collect::<Result<Vec<_>, DerivationError>>()?;

        let mesh_ingress_ports = nonzero("meshIngressPorts", &rules.mesh_ingress_ports)?;
        let dns_port = nonzero("dnsPort", &[rules.dns_port])?[0];
        let external_ports = nonzero("externalPorts", &rules.external_ports)?;

        let (key, value) = &mesh.system_label;
        let mesh_peer = NetworkPolicyPeer {
            namespace_selector: Some(labels::match_static([(key.as_str(), value.as_str())])),
            ..Default::default()
        };

        Ok(Self {
            mesh_ingress: NetworkPolicyIngressRule {
                from: Some(vec![mesh_peer.clone()]),
                ports: Some(tcp(&mesh_ingress_ports)),
            },
            mesh_dns: NetworkPolicyEgressRule {
                to: Some(vec![mesh_peer]),
                ports: Some(vec![port("UDP", dns_port), port("TCP", dns_port)]),
            },
            external: NetworkPolicyEgressRule {
                to: Some(vec![NetworkPolicyPeer {
                    ip_block: Some(IPBlock {
                        cidr: cidr.to_string(),
                        except: Some(except).filter(|e| !e.is_empty()),
                    }),
                    ..Default::default()
                }]),
                ports: Some(tcp(&external_ports)),
            },
        })
    }

    /// Admits traffic between namespaces that share the tenant's labels and from the mesh, and
    /// lets the tenant reach the same namespaces, mesh DNS, and the permitted external range.
    /// Anything else is denied by omission.
    pub(crate) fn for_tenant(&self, tenant: &TenantDescriptor) -> NetworkPolicy {
        let peers = NetworkPolicyPeer {
            namespace_selector: Some(same_tenant(tenant)),
            ..Default::default()
        };

        NetworkPolicy {
            metadata: ObjectMeta {
                name: Some(format!("{}-netpol", tenant.name)),
                namespace: Some(tenant.name.to_string()),
                ..Default::default()
            },
            spec: Some(NetworkPolicySpec {
                pod_selector: LabelSelector::default().into(),
                policy_types: Some(vec!["Ingress".to_string(), "Egress".to_string()]),
                ingress: Some(vec![
                    NetworkPolicyIngressRule {
                        from: Some(vec![peers.clone()]),
                        ports: None,
                    },
                    self.mesh_ingress.clone(),
                ]),
                egress: Some(vec![
                    NetworkPolicyEgressRule {
                        to: Some(vec![peers]),
                        ports: None,
                    },
                    self.mesh_dns.clone(),
                    self.external.clone(),
                ]),
            }),
            ..Default::default()
        }
    }
}

/// Selects the namespaces that carry all of the tenant's labels.
///
/// A tenant without labels is matched by the name label the API server stamps on every
/// namespace; an empty selector would match every namespace in the cluster.
fn same_tenant(tenant: &TenantDescriptor) -> LabelSelector {
    if tenant.namespace_labels.is_empty() {
        return labels::match_static([(labels::NAMESPACE_NAME, tenant.name.as_str())]);
    }
    labels::match_labels(&tenant.namespace_labels)
}

fn nonzero(field: &'static str, ports: &[u16]) -> Result<Vec<u16>, DerivationError> {
    if ports.contains(&0) {
        return Err(DerivationError::ZeroPort(field));
    }
    Ok(ports.to_vec())
}

fn tcp(ports: &[u16]) -> Vec<NetworkPolicyPort> {
    ports.iter().map(|&p| port("TCP", p)).collect()
}

fn port(protocol: &str, port: u16) -> NetworkPolicyPort {
    NetworkPolicyPort {
        protocol: Some(protocol.to_string()),
        port: Some(IntOrString::Int(port.into())),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClusterPolicy;
    use maplit::btreemap;
    use pretty_assertions::assert_eq;

    fn template() -> Template {
        let policy = ClusterPolicy::default();
        Template::new(&policy.network, &policy.mesh).unwrap()
    }

    #[test]
    fn default_policy() {
        let mut t = TenantDescriptor::new("tenant-a".parse().unwrap());
        t.namespace_labels = btreemap! {
            "tenant".to_string() => "a".to_string(),
        };
        let np = template().for_tenant(&t);
        assert_eq!(np.metadata.name.as_deref(), Some("tenant-a-netpol"));
        assert_eq!(np.metadata.namespace.as_deref(), Some("tenant-a"));
        assert_eq!(
            serde_json::to_value(&np).unwrap()["spec"],
            serde_json::json!({
                "podSelector": {},
                "policyTypes": ["Ingress", "Egress"],
                "ingress": [
                    { "from": [{ "namespaceSelector": { "matchLabels": { "tenant": "a" } } }] },
                    {
                        "from": [{
                            "namespaceSelector": { "matchLabels": { "kuma.io/system": "true" } },
                        }],
                        "ports": [
                            { "protocol": "TCP", "port": 80 },
                            { "protocol": "TCP", "port": 443 },
                        ],
                    },
                ],
                "egress": [
                    { "to": [{ "namespaceSelector": { "matchLabels": { "tenant": "a" } } }] },
                    {
                        "to": [{
                            "namespaceSelector": { "matchLabels": { "kuma.io/system": "true" } },
                        }],
                        "ports": [
                            { "protocol": "UDP", "port": 53 },
                            { "protocol": "TCP", "port": 53 },
                        ],
                    },
                    {
                        "to": [{
                            "ipBlock": {
                                "cidr": "0.0.0.0/0",
                                "except": ["10.0.0.0/8", "172.16.0.0/12", "192.168.0.0/16"],
                            },
                        }],
                        "ports": [
                            { "protocol": "TCP", "port": 80 },
                            { "protocol": "TCP", "port": 443 },
                        ],
                    },
                ],
            })
        );
    }

    #[test]
    fn unlabeled_tenant_selects_own_namespace() {
        let t = TenantDescriptor::new("tenant-b".parse().unwrap());
        assert_eq!(
            same_tenant(&t).match_labels,
            Some(btreemap! {
                "kubernetes.io/metadata.name".to_string() => "tenant-b".to_string(),
            })
        );
    }

    #[test]
    fn rejects_malformed_cidr() {
        let mut rules = NetworkRules::default();
        rules.external_cidr = "0.0.0.0/33".to_string();
        assert!(matches!(
            Template::new(&rules, &MeshPolicy::default()),
            Err(DerivationError::InvalidCidr(_))
        ));
    }

    #[test]
    fn rejects_exception_outside_range() {
        let mut rules = NetworkRules::default();
        rules.external_cidr = "10.0.0.0/8".to_string();
        rules.external_except = vec!["192.168.0.0/16".to_string()];
        assert_eq!(
            Template::new(&rules, &MeshPolicy::default()).unwrap_err(),
            DerivationError::ExceptionOutsideRange {
                cidr: "10.0.0.0/8".parse().unwrap(),
                except: "192.168.0.0/16".parse().unwrap(),
            }
        );
    }

    #[test]
    fn rejects_zero_ports() {
        let mut rules = NetworkRules::default();
        rules.dns_port = 0;
        assert_eq!(
            Template::new(&rules, &MeshPolicy::default()).unwrap_err(),
            DerivationError::ZeroPort("dnsPort")
        );
    }
}
