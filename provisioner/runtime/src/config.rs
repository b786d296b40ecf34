use anyhow::{Context, Result};
use serde::{de, Deserialize, Deserializer};
use std::{fs, path::Path};
use tenancy_provisioner_core::RawTenant;
use tenancy_provisioner_k8s_api::mesh::Action;
use tenancy_provisioner_k8s_bundle::ClusterPolicy;

/// The tenant configuration file.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    /// Overridden by `--provider`.
    #[serde(default)]
    pub provider: Option<String>,

    #[serde(default)]
    pub mesh: MeshConfig,

    #[serde(default, deserialize_with = "tenants")]
    pub tenants: Vec<RawTenant>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MeshConfig {
    /// Replaces the cluster policy's default traffic action.
    #[serde(default)]
    pub default_action: Option<Action>,
}

// === impl Config ===

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_yaml(&yaml).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// The default cluster policy with this file's overrides applied.
    pub fn cluster_policy(&self) -> ClusterPolicy {
        let mut policy = ClusterPolicy::default();
        if let Some(action) = self.mesh.default_action {
            policy.mesh.default_action = action;
        }
        policy
    }
}

/// Parses each tenant separately so that a malformed entry is reported with its position and name.
fn tenants<'de, D>(deserializer: D) -> Result<Vec<RawTenant>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<serde_yaml::Value>::deserialize(deserializer)?
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            let name = value
                .get("name")
                .and_then(serde_yaml::Value::as_str)
                .map(str::to_string);
            serde_yaml::from_value::<RawTenant>(value).map_err(|e| match name {
                Some(name) => <D::Error as de::Error>::custom(format_args!(
                    "tenant #{index} ({name:?}): {e}"
                )),
                None => <D::Error as de::Error>::custom(format_args!("tenant #{index}: {e}")),
            })
        })
        .collect()
}
