//! Wire shapes of the discovery endpoints and their conversion into registry entries
use kubesys_core::{discovery::group_from_prefix, gvk::GroupVersion, ApiResource};
use serde::Deserialize;

use crate::error::DiscoveryError;

/// Response of `GET /`
#[derive(Deserialize, Debug, Default)]
pub(crate) struct RootPaths {
    #[serde(default)]
    pub(crate) paths: Vec<String>,
}

/// Response of `GET /api/v1` or `GET /apis/<group>/<version>`
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResourceList {
    pub(crate) group_version: String,
    #[serde(default)]
    pub(crate) resources: Vec<ResourceEntry>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct ResourceEntry {
    pub(crate) name: String,
    pub(crate) kind: String,
    #[serde(default)]
    pub(crate) namespaced: bool,
    #[serde(default)]
    pub(crate) verbs: Vec<String>,
}

/// Minimal view of a `CustomResourceDefinitionList`
#[derive(Deserialize, Debug)]
pub(crate) struct CrdList {
    #[serde(default)]
    pub(crate) items: Vec<Crd>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct Crd {
    pub(crate) spec: CrdSpec,
}

#[derive(Deserialize, Debug)]
pub(crate) struct CrdSpec {
    pub(crate) group: String,
    #[serde(default)]
    pub(crate) versions: Vec<CrdVersion>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct CrdVersion {
    pub(crate) name: String,
    #[serde(default = "served_default")]
    pub(crate) served: bool,
}

fn served_default() -> bool {
    true
}

impl CrdList {
    /// Group version paths served by the listed definitions, in listing order
    pub(crate) fn served_paths(&self) -> Vec<String> {
        let mut paths = vec![];
        for crd in &self.items {
            for version in crd.spec.versions.iter().filter(|v| v.served) {
                let path = GroupVersion::gv(&crd.spec.group, &version.name).url_prefix();
                if !paths.contains(&path) {
                    paths.push(path);
                }
            }
        }
        paths
    }
}

/// Whether a root path lists resources of a single group version
///
/// `/api/v1` and `/apis/<group>/<version>` qualify. Group-only paths like
/// `/apis/apps` and non-API paths like `/healthz` do not.
pub(crate) fn is_resource_path(path: &str) -> bool {
    path.starts_with("/api") && (path.split('/').count() == 4 || path == "/api/v1")
}

/// Registry entries of a resource listing served at `path`, keyed by full kind
///
/// Subresources (`pods/status`) are skipped.
pub(crate) fn resources_from_list(
    path: &str,
    list: ResourceList,
) -> Result<Vec<(String, ApiResource)>, DiscoveryError> {
    let gv: GroupVersion = list
        .group_version
        .parse()
        .map_err(|_| DiscoveryError::InvalidGroupVersion {
            path: path.to_string(),
            group_version: list.group_version.clone(),
        })?;
    let group = group_from_prefix(path).to_string();

    let entries = list
        .resources
        .into_iter()
        .filter(|res| !res.name.contains('/'))
        .map(|res| {
            let full_kind = gv.full_kind(&res.kind);
            let resource = ApiResource {
                url_prefix: path.to_string(),
                group: group.clone(),
                version: gv.version.clone(),
                api_version: list.group_version.clone(),
                kind: res.kind,
                plural: res.name,
                namespaced: res.namespaced,
                verbs: res.verbs,
            };
            (full_kind, resource)
        })
        .collect();
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keeps_only_group_version_paths() {
        let paths = [
            "/api",
            "/api/v1",
            "/apis",
            "/apis/apps",
            "/apis/apps/v1",
            "/apis/batch/v1",
            "/healthz",
            "/healthz/etcd",
            "/openapi/v2",
            "/version",
        ];
        let kept: Vec<_> = paths.into_iter().filter(|p| is_resource_path(p)).collect();
        assert_eq!(kept, vec!["/api/v1", "/apis/apps/v1", "/apis/batch/v1"]);
    }

    #[test]
    fn converts_resource_lists() {
        let list: ResourceList = serde_json::from_value(json!({
            "kind": "APIResourceList",
            "groupVersion": "apps/v1",
            "resources": [
                {"name": "deployments", "kind": "Deployment", "namespaced": true, "verbs": ["create", "get", "list", "watch"]},
                {"name": "deployments/status", "kind": "Deployment", "namespaced": true, "verbs": ["get", "update"]},
                {"name": "deployments/scale", "kind": "Scale", "namespaced": true, "verbs": ["get"]}
            ]
        }))
        .unwrap();
        let entries = resources_from_list("/apis/apps/v1", list).unwrap();
        assert_eq!(entries.len(), 1);
        let (full_kind, ar) = &entries[0];
        assert_eq!(full_kind, "apps.Deployment");
        assert_eq!(ar.url_prefix, "/apis/apps/v1");
        assert_eq!(ar.group, "apps");
        assert_eq!(ar.version, "v1");
        assert_eq!(ar.api_version, "apps/v1");
        assert_eq!(ar.plural, "deployments");
        assert!(ar.namespaced);
        assert!(ar.supports_operation("watch"));
    }

    #[test]
    fn core_group_kinds_are_bare() {
        let list: ResourceList = serde_json::from_value(json!({
            "groupVersion": "v1",
            "resources": [{"name": "nodes", "kind": "Node", "namespaced": false, "verbs": ["get"]}]
        }))
        .unwrap();
        let entries = resources_from_list("/api/v1", list).unwrap();
        assert_eq!(entries[0].0, "Node");
        assert_eq!(entries[0].1.group, "");
        assert!(!entries[0].1.namespaced);
    }

    #[test]
    fn rejects_empty_group_version() {
        let list: ResourceList = serde_json::from_value(json!({"groupVersion": "", "resources": []})).unwrap();
        assert!(matches!(
            resources_from_list("/apis/x/v1", list),
            Err(DiscoveryError::InvalidGroupVersion { .. })
        ));
    }

    #[test]
    fn crd_paths_skip_unserved_versions() {
        let crds: CrdList = serde_json::from_value(json!({
            "items": [
                {"spec": {"group": "example.io", "versions": [
                    {"name": "v1", "served": true},
                    {"name": "v1beta1", "served": false}
                ]}},
                {"spec": {"group": "example.io", "versions": [{"name": "v1"}]}},
                {"spec": {"group": "stable.example.com", "versions": [{"name": "v2"}]}}
            ]
        }))
        .unwrap();
        assert_eq!(crds.served_paths(), vec![
            "/apis/example.io/v1",
            "/apis/stable.example.com/v2"
        ]);
    }
}
