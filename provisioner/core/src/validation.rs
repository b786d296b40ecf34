//! Normalizes raw tenant declarations into [`TenantDescriptor`]s.
//!
//! Validation is all-or-nothing: the first malformed tenant aborts the run, so derivation only
//! ever sees a complete, well-formed tenant set.

use crate::{
    tenant::NameError, RawTenant, ResourceQuotas, TenantDescriptor, TenantName,
    RESERVED_LABELS, RESERVED_NAMESPACES, RESERVED_PREFIX,
};
use ahash::AHashMap as HashMap;
use tenancy_provisioner_k8s_api::labels::{self, LabelError};
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("tenant #{index} ({name:?}): name {source}")]
    InvalidName {
        index: usize,
        name: String,
        #[source]
        source: NameError,
    },

    #[error(
        "tenant {name:?}: name must be unique, but entries #{first} and #{second} both declare it"
    )]
    DuplicateName {
        name: String,
        first: usize,
        second: usize,
    },

    #[error(
        "tenant {name:?}: name is reserved for a system namespace (as is any name beginning \
         with \"kube-\")"
    )]
    ReservedName { name: String },

    #[error("tenant {name:?}: namespaceLabels key {key:?} is reserved for system namespaces")]
    ReservedLabel { name: String, key: String },

    #[error("tenant {name:?}: namespaceLabels entry {key:?}: {source}")]
    InvalidLabel {
        name: String,
        key: String,
        #[source]
        source: LabelError,
    },
}

/// Validates every tenant, returning normalized descriptors in input order.
pub fn validate(
    tenants: impl IntoIterator<Item = RawTenant>,
) -> Result<Vec<TenantDescriptor>, ValidationError> {
    validate_reserving(tenants, RESERVED_LABELS)
}

/// Like [`validate`], but with `reserved_labels` in place of [`RESERVED_LABELS`].
///
/// Needed when the mesh system namespace is marked by something other than
/// [`MESH_SYSTEM_LABEL`](crate::MESH_SYSTEM_LABEL): a tenant carrying the marker would be admitted
/// into every other tenant.
pub fn validate_reserving(
    tenants: impl IntoIterator<Item = RawTenant>,
    reserved_labels: &[&str],
) -> Result<Vec<TenantDescriptor>, ValidationError> {
    let mut seen = HashMap::<TenantName, usize>::new();
    let mut validated = Vec::new();

    for (index, raw) in tenants.into_iter().enumerate() {
        let tenant = validate_one(index, raw, reserved_labels)?;

        if let Some(first) = seen.insert(tenant.name.clone(), index) {
            return Err(ValidationError::DuplicateName {
                name: tenant.name.to_string(),
                first,
                second: index,
            });
        }

        debug!(tenant = %tenant.name, "validated");
        validated.push(tenant);
    }

    Ok(validated)
}

fn validate_one(
    index: usize,
    raw: RawTenant,
    reserved_labels: &[&str],
) -> Result<TenantDescriptor, ValidationError> {
    let RawTenant {
        name,
        namespace_labels,
        resource_quotas,
    } = raw;

    let name = name.unwrap_or_default();
    let name = name
        .parse::<TenantName>()
        .map_err(|source| ValidationError::InvalidName {
            index,
            name: name.clone(),
            source,
        })?;

    if RESERVED_NAMESPACES.contains(&name.as_str())
        || name.as_str().starts_with(RESERVED_PREFIX)
    {
        return Err(ValidationError::ReservedName {
            name: name.to_string(),
        });
    }

    let namespace_labels = namespace_labels.unwrap_or_default();
    for (key, value) in &namespace_labels {
        if reserved_labels.contains(&key.as_str()) {
            return Err(ValidationError::ReservedLabel {
                name: name.to_string(),
                key: key.clone(),
            });
        }
        labels::validate_key(key)
            .and_then(|()| labels::validate_value(value))
            .map_err(|source| ValidationError::InvalidLabel {
                name: name.to_string(),
                key: key.clone(),
                source,
            })?;
    }

    Ok(TenantDescriptor {
        name,
        namespace_labels,
        resource_quotas: ResourceQuotas::normalize(resource_quotas),
    })
}

// === impl ValidationError ===

impl ValidationError {
    /// The offending tenant, as declared.
    pub fn tenant(&self) -> &str {
        match self {
            Self::InvalidName { name, .. }
            | Self::DuplicateName { name, .. }
            | Self::ReservedName { name }
            | Self::InvalidLabel { name, .. }
            | Self::ReservedLabel { name, .. } => name,
        }
    }

    /// The offending field of the tenant declaration.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidName { .. } | Self::DuplicateName { .. } | Self::ReservedName { .. } => {
                "name"
            }
            Self::InvalidLabel { .. } | Self::ReservedLabel { .. } => "namespaceLabels",
        }
    }
}
