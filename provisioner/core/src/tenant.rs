use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, sync::LazyLock};
use tenancy_provisioner_k8s_api::labels;

/// A tenant as declared by the caller, before validation.
///
/// Every field is optional so that malformed declarations are reported by validation, with the
/// offending tenant named, rather than by the deserializer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTenant {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub namespace_labels: Option<labels::Map>,

    #[serde(default)]
    pub resource_quotas: Option<RawQuotas>,
}

/// Quota fields as declared. Bare YAML numbers (`pods: 20`) are accepted as quantities.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RawQuotas {
    #[serde(default, deserialize_with = "quantity::cpu")]
    pub cpu: Option<String>,

    #[serde(default, deserialize_with = "quantity::memory")]
    pub memory: Option<String>,

    #[serde(default, deserialize_with = "quantity::pods")]
    pub pods: Option<String>,
}

/// A validated tenant: a legal namespace name, checked labels, and fully populated quotas.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TenantDescriptor {
    pub name: TenantName,
    pub namespace_labels: labels::Map,
    pub resource_quotas: ResourceQuotas,
}

/// Hard limits for a tenant namespace. Quantities are passed through verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResourceQuotas {
    pub cpu: String,
    pub memory: String,
    pub pods: String,
}

/// A tenant name, which doubles as the tenant's namespace name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TenantName(String);

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("must not be empty")]
    Empty,

    #[error("must be at most 63 characters (got {0})")]
    TooLong(usize),

    #[error(
        "must consist of lowercase alphanumeric characters or '-', and must start and end with \
         an alphanumeric character"
    )]
    Invalid,
}

const NAME_REGEX: &str = r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$";

static NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(NAME_REGEX).expect("should compile"));

/// Quota fields accept strings and bare numbers; anything else is rejected naming the field.
mod quantity {
    use serde::{de, Deserializer};
    use std::fmt;

    pub(super) fn cpu<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        d.deserialize_option(Visitor("cpu"))
    }

    pub(super) fn memory<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        d.deserialize_option(Visitor("memory"))
    }

    pub(super) fn pods<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        d.deserialize_option(Visitor("pods"))
    }

    struct Visitor(&'static str);

    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Option<String>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "a quantity string or number for `{}`", self.0)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
            d.deserialize_any(self)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }
    }
}

// === impl TenantDescriptor ===

impl TenantDescriptor {
    /// A tenant with no labels and default (zero) quotas.
    pub fn new(name: TenantName) -> Self {
        Self {
            name,
            namespace_labels: labels::Map::default(),
            resource_quotas: ResourceQuotas::default(),
        }
    }
}

// === impl ResourceQuotas ===

impl ResourceQuotas {
    /// Substituted for every quota field the tenant leaves out.
    pub const DEFAULT_QUANTITY: &'static str = "0";

    pub(crate) fn normalize(raw: Option<RawQuotas>) -> Self {
        let RawQuotas { cpu, memory, pods } = raw.unwrap_or_default();
        let or_default =
            |q: Option<String>| q.unwrap_or_else(|| Self::DEFAULT_QUANTITY.to_string());
        Self {
            cpu: or_default(cpu),
            memory: or_default(memory),
            pods: or_default(pods),
        }
    }
}

impl Default for ResourceQuotas {
    fn default() -> Self {
        Self::normalize(None)
    }
}

// === impl TenantName ===

impl TenantName {
    pub const MAX_LEN: usize = 63;

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TenantName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(NameError::Empty);
        }
        if s.len() > Self::MAX_LEN {
            return Err(NameError::TooLong(s.len()));
        }
        if !NAME.is_match(s) {
            return Err(NameError::Invalid);
        }
        Ok(Self(s.to_string()))
    }
}

impl AsRef<str> for TenantName {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("tenant-a")]
    #[case("a")]
    #[case("0team")]
    #[case("team-42-dev")]
    fn valid_names(#[case] name: &str) {
        assert_eq!(name.parse::<TenantName>().unwrap().as_str(), name);
    }

    #[rstest]
    #[case("", NameError::Empty)]
    #[case("Tenant-A", NameError::Invalid)]
    #[case("-tenant", NameError::Invalid)]
    #[case("tenant-", NameError::Invalid)]
    #[case("tenant_a", NameError::Invalid)]
    #[case("tenant.a", NameError::Invalid)]
    #[case("tenant a", NameError::Invalid)]
    fn invalid_names(#[case] name: &str, #[case] expected: NameError) {
        assert_eq!(name.parse::<TenantName>(), Err(expected));
    }

    #[test]
    fn name_length_limit() {
        assert!("a".repeat(63).parse::<TenantName>().is_ok());
        assert_eq!(
            "a".repeat(64).parse::<TenantName>(),
            Err(NameError::TooLong(64))
        );
    }

    #[test]
    fn quotas_default_to_zero() {
        assert_eq!(
            ResourceQuotas::normalize(None),
            ResourceQuotas {
                cpu: "0".to_string(),
                memory: "0".to_string(),
                pods: "0".to_string(),
            }
        );
        assert_eq!(
            ResourceQuotas::normalize(Some(RawQuotas {
                memory: Some("8Gi".to_string()),
                ..Default::default()
            })),
            ResourceQuotas {
                cpu: "0".to_string(),
                memory: "8Gi".to_string(),
                pods: "0".to_string(),
            }
        );
    }

    #[test]
    fn raw_tenant_from_yaml() {
        let raw: RawTenant = serde_yaml::from_str(
            r#"
name: tenant-a
namespaceLabels:
  tenant: a
resourceQuotas:
  cpu: "4"
  memory: null
"#,
        )
        .unwrap();
        assert_eq!(
            raw,
            RawTenant {
                name: Some("tenant-a".to_string()),
                namespace_labels: Some(maplit::btreemap! {
                    "tenant".to_string() => "a".to_string(),
                }),
                resource_quotas: Some(RawQuotas {
                    cpu: Some("4".to_string()),
                    memory: None,
                    pods: None,
                }),
            }
        );
    }

    #[test]
    fn numeric_quantities() {
        let raw: RawQuotas = serde_yaml::from_str("{ cpu: 4, memory: 8Gi, pods: 20 }").unwrap();
        assert_eq!(
            raw,
            RawQuotas {
                cpu: Some("4".to_string()),
                memory: Some("8Gi".to_string()),
                pods: Some("20".to_string()),
            }
        );
    }

    #[rstest]
    #[case("{ pods: true }", "boolean `true`", "pods")]
    #[case("{ cpu: [1, 2] }", "sequence", "cpu")]
    #[case("{ memory: { size: 8Gi } }", "map", "memory")]
    fn non_scalar_quantities(#[case] yaml: &str, #[case] got: &str, #[case] field: &str) {
        let err = serde_yaml::from_str::<RawQuotas>(yaml).unwrap_err().to_string();
        assert!(err.contains(got), "{err}");
        assert!(
            err.contains(&format!("expected a quantity string or number for `{field}`")),
            "{err}"
        );
    }
}
