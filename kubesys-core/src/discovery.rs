//! Type information structs for API discovery
use serde::{Deserialize, Serialize};

/// Information about a Kubernetes API resource as learned from discovery
///
/// This is the value stored per full kind in a [`KindRegistry`](crate::KindRegistry),
/// and it carries everything needed to synthesize request urls for the kind.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResource {
    /// REST path prefix, e.g. `/api/v1` or `/apis/apps/v1`
    pub url_prefix: String,
    /// Resource group, empty for core group.
    pub group: String,
    /// group version
    pub version: String,
    /// apiVersion of the resource (v1 for core group,
    /// groupName/groupVersions for other).
    pub api_version: String,
    /// Singular PascalCase name of the resource
    pub kind: String,
    /// Plural name of the resource
    pub plural: String,
    /// Whether objects of this resource live in a namespace
    pub namespaced: bool,
    /// Verbs the server accepts for this resource
    pub verbs: Vec<String>,
}

impl ApiResource {
    /// Scope of the resource
    pub fn scope(&self) -> Scope {
        if self.namespaced {
            Scope::Namespaced
        } else {
            Scope::Cluster
        }
    }

    /// Checks that given verb is supported on this resource.
    pub fn supports_operation(&self, operation: &str) -> bool {
        self.verbs.iter().any(|op| op == operation)
    }
}

/// The API group served under a REST path prefix
///
/// `/api/v1` is the core group and maps to the empty string.
/// Everywhere else the group is the segment before the version.
pub fn group_from_prefix(prefix: &str) -> &str {
    let mut segments = prefix.trim_end_matches('/').rsplit('/');
    let _version = segments.next();
    match segments.next() {
        Some("api") | None => "",
        Some(group) => group,
    }
}

/// Resource scope
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum Scope {
    /// Objects are global
    Cluster,
    /// Each object lives in namespace.
    Namespaced,
}

/// Rbac verbs for [`ApiResource::supports_operation`]
pub mod verbs {
    /// Create a resource
    pub const CREATE: &str = "create";
    /// Get single resource
    pub const GET: &str = "get";
    /// List objects
    pub const LIST: &str = "list";
    /// Watch for objects changes
    pub const WATCH: &str = "watch";
    /// Delete single object
    pub const DELETE: &str = "delete";
    /// Delete multiple objects at once
    pub const DELETE_COLLECTION: &str = "deletecollection";
    /// Update an object
    pub const UPDATE: &str = "update";
    /// Patch an object
    pub const PATCH: &str = "patch";
}
