use anyhow::{bail, Error, Result};
use std::io::Write;
use tenancy_provisioner_k8s_bundle::{Kind, Plan, PlannedResource, ResourceId};

/// How `render` writes manifests.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Format {
    /// One YAML document per resource, in apply order. Chart releases are descriptors for the
    /// apply engine's chart installer and carry no `apiVersion`.
    #[default]
    Yaml,

    /// A single JSON array of planned resources, including their identities and dependencies.
    Json,
}

const CHART_RELEASE_NOTE: &str = "# chart release: install with a chart-aware engine, not kubectl";

/// Writes one line per resource, in apply order, naming its predecessors.
pub(crate) fn write_listing(out: &mut impl Write, plan: &Plan) -> Result<()> {
    for (i, r) in plan.resources.iter().enumerate() {
        write!(out, "{:>3}  {}", i + 1, r.id)?;
        if !r.depends_on.is_empty() {
            write!(out, " (after {})", join(&r.depends_on))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub(crate) fn write_manifests(
    out: &mut impl Write,
    resources: &[PlannedResource],
    format: Format,
) -> Result<()> {
    match format {
        Format::Yaml => {
            for r in resources {
                writeln!(out, "---")?;
                writeln!(out, "# {}", r.id)?;
                if !r.depends_on.is_empty() {
                    writeln!(out, "# after: {}", join(&r.depends_on))?;
                }
                if r.id.kind == Kind::HelmRelease {
                    writeln!(out, "{CHART_RELEASE_NOTE}")?;
                }
                out.write_all(serde_yaml::to_string(&r.resource)?.as_bytes())?;
            }
        }
        Format::Json => {
            serde_json::to_writer_pretty(&mut *out, resources)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn join(ids: &[ResourceId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

// === impl Format ===

impl std::str::FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "yaml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            s => bail!("invalid output format: {s} (expected yaml or json)"),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Yaml => "yaml".fmt(f),
            Self::Json => "json".fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use tenancy_provisioner_core::{ClusterAccess, RawTenant};
    use tenancy_provisioner_k8s_bundle::{plan, ClusterPolicy};

    fn minikube(names: &[&str]) -> Plan {
        let tenants = names.iter().map(|n| RawTenant {
            name: Some(n.to_string()),
            ..Default::default()
        });
        plan(
            "minikube",
            ClusterAccess::Ambient,
            tenants,
            &ClusterPolicy::default(),
        )
        .unwrap()
    }

    fn render(plan: &Plan, format: Format) -> String {
        let mut out = Vec::new();
        write_manifests(&mut out, &plan.resources, format).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_displayed() {
        for f in [Format::Yaml, Format::Json] {
            assert_eq!(
                f.to_string().parse::<Format>().unwrap(),
                f,
                "failed to parse displayed {f:?}"
            );
        }
        assert!("toml".parse::<Format>().is_err());
    }

    #[test]
    fn yaml_documents() {
        let plan = minikube(&["tenant-a"]);
        let yaml = render(&plan, Format::Yaml);
        assert!(
            yaml.starts_with("---\n# Namespace/tenant-a\napiVersion: v1\n"),
            "{yaml}"
        );
        assert!(yaml.contains(
            "# RoleBinding/tenant-a/tenant-a-rolebinding\n\
             # after: Namespace/tenant-a, ClusterRole/tenant-a-role\n"
        ));

        let kinds = serde_yaml::Deserializer::from_str(&yaml)
            .map(|doc| {
                let value = serde_yaml::Value::deserialize(doc).unwrap();
                value["kind"].as_str().unwrap().to_string()
            })
            .collect::<Vec<_>>();
        let expected = plan
            .resources
            .iter()
            .map(|r| r.id.kind.to_string())
            .collect::<Vec<_>>();
        assert_eq!(kinds, expected);
    }

    #[test]
    fn yaml_marks_chart_releases() {
        let yaml = render(&minikube(&["tenant-a"]), Format::Yaml);
        assert_eq!(yaml.matches(CHART_RELEASE_NOTE).count(), 1, "{yaml}");
        assert!(
            yaml.contains(&format!(
                "# HelmRelease/kuma-system/kuma\n\
                 # after: Namespace/kuma-system\n\
                 {CHART_RELEASE_NOTE}\n\
                 kind: HelmRelease\n"
            )),
            "{yaml}"
        );
    }

    #[test]
    fn json_array() {
        let plan = minikube(&["tenant-a", "tenant-b"]);
        let json = serde_json::from_str::<serde_json::Value>(&render(&plan, Format::Json)).unwrap();
        let items = json.as_array().unwrap();
        assert_eq!(items.len(), plan.resources.len());
        assert_eq!(items[0]["id"], "Namespace/tenant-a");
        assert_eq!(items[0]["dependsOn"], serde_json::json!([]));
        assert_eq!(items[0]["resource"]["metadata"]["name"], "tenant-a");
    }

    #[test]
    fn listing() {
        let plan = minikube(&["tenant-a"]);
        let mut out = Vec::new();
        write_listing(&mut out, &plan).unwrap();
        let listing = String::from_utf8(out).unwrap();
        let lines = listing.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), plan.resources.len());
        assert_eq!(lines[0], "  1  Namespace/tenant-a");
        assert_eq!(
            lines[1],
            "  2  ResourceQuota/tenant-a/tenant-a-quota (after Namespace/tenant-a)"
        );
        assert_eq!(
            lines[lines.len() - 1],
            "  9  MeshTrafficPermission/tenant-a/tenant-a-traffic-permission \
             (after Namespace/tenant-a, HelmRelease/kuma-system/kuma)"
        );
    }
}
