use serde::Serialize;

/// Describes a chart installation to be performed by the chart engine.
///
/// This is not a Kubernetes object; it renders with `kind: HelmRelease` so that it can sit in
/// the same manifest stream as the objects that depend on it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub struct HelmRelease {
    pub name: String,
    pub namespace: String,
    pub chart: String,
    pub repository: String,
    pub version: String,
    pub values: serde_json::Value,
}

impl HelmRelease {
    pub const KIND: &'static str = "HelmRelease";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_with_kind() {
        let release = HelmRelease {
            name: "kuma".to_string(),
            namespace: "kuma-system".to_string(),
            chart: "kuma".to_string(),
            repository: "https://kumahq.github.io/charts".to_string(),
            version: "2.5.0".to_string(),
            values: serde_json::json!({ "ingress": { "enabled": true } }),
        };
        let json = serde_json::to_value(&release).unwrap();
        assert_eq!(json["kind"], HelmRelease::KIND);
        assert_eq!(json["namespace"], "kuma-system");
        assert_eq!(json["values"]["ingress"]["enabled"], true);
    }
}
