use crate::{
    mesh, BundleDeriver, ClusterPolicy, DependencyGraph, DerivationError, Kind, PlannedResource,
    ResourceId,
};
use tenancy_provisioner_core::{
    validate_reserving, ClusterAccess, ConfigurationError, ExportedCredentials, Provider,
    RawTenant, ValidationError, RESERVED_LABELS,
};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Derivation(#[from] DerivationError),
}

/// The complete, ordered set of resources for a run.
#[derive(Clone, Debug, PartialEq)]
pub struct Plan {
    pub provider: Provider,

    /// Every resource follows all of its dependencies.
    pub resources: Vec<PlannedResource>,

    pub credentials: ExportedCredentials,
}

/// Computes the full plan for a set of tenants.
///
/// Nothing is returned unless every step succeeds: the provider and credentials are checked
/// first, then the cluster policy, then every tenant, and only then are resources derived.
pub fn plan(
    provider: &str,
    access: ClusterAccess,
    tenants: impl IntoIterator<Item = RawTenant>,
    policy: &ClusterPolicy,
) -> Result<Plan, Error> {
    let provider = provider.parse::<Provider>()?;
    let credentials = ExportedCredentials::for_provider(provider, access)?;
    let deriver = BundleDeriver::new(policy)?;
    let mut reserved_labels = RESERVED_LABELS.to_vec();
    reserved_labels.push(policy.mesh.system_label.0.as_str());
    let tenants = validate_reserving(tenants, &reserved_labels)?;
    debug!(%provider, tenants = tenants.len(), "validated tenants");

    let bundles = tenants
        .iter()
        .map(|t| deriver.derive(t))
        .collect::<Vec<_>>();
    let attachment = mesh::attach(&bundles, provider, &policy.mesh);

    let mut graph = DependencyGraph::new();
    for bundle in bundles {
        graph.extend(bundle.into_resources())?;
    }
    graph.extend(attachment.into_resources())?;
    let resources = graph.into_sorted()?;

    info!(
        %provider,
        tenants = tenants.len(),
        resources = resources.len(),
        "planned"
    );
    Ok(Plan {
        provider,
        resources,
        credentials,
    })
}

// === impl Plan ===

impl Plan {
    pub fn get(&self, id: &ResourceId) -> Option<&PlannedResource> {
        self.resources.iter().find(|r| r.id == *id)
    }

    /// The resource's index in apply order.
    pub fn position(&self, id: &ResourceId) -> Option<usize> {
        self.resources.iter().position(|r| r.id == *id)
    }

    pub fn of_kind(&self, kind: Kind) -> impl Iterator<Item = &PlannedResource> + '_ {
        self.resources.iter().filter(move |r| r.id.kind == kind)
    }
}
