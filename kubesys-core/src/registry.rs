//! The kind registry populated by discovery
//!
//! A [`KindRegistry`] maps full kinds (`apps.Deployment`, `Pod`) to the [`ApiResource`]
//! learned from the API server, and indexes short kinds so callers can say `Deployment`
//! as long as only one group serves that kind.
use std::collections::BTreeMap;

use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::{discovery::ApiResource, gvk};

/// Failures resolving a kind against a [`KindRegistry`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No resource with this kind was discovered
    #[error("unknown kind {0}, it was not served by the cluster during discovery")]
    UnknownKind(String),

    /// Several groups serve this short kind
    #[error("ambiguous kind {kind}, use one of the full kinds: {}", .candidates.join(", "))]
    AmbiguousKind {
        /// The short kind that was asked for
        kind: String,
        /// Every full kind sharing that short kind
        candidates: Vec<String>,
    },
}

/// Full kind → resource mapping plus a short kind index
///
/// The registry is written by one discovery pass and only read afterwards.
/// Inserting is first write wins, so running discovery into an already filled
/// registry leaves it unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KindRegistry {
    resources: BTreeMap<String, ApiResource>,
    // short kind -> full kinds, in insertion order
    full_kinds: BTreeMap<String, Vec<String>>,
}

impl KindRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `resource` under `full_kind` unless that full kind is already known
    ///
    /// Returns whether the entry was inserted.
    pub fn insert(&mut self, full_kind: impl Into<String>, resource: ApiResource) -> bool {
        let full_kind = full_kind.into();
        if self.resources.contains_key(&full_kind) {
            return false;
        }
        self.full_kinds
            .entry(gvk::short_kind(&full_kind).to_string())
            .or_default()
            .push(full_kind.clone());
        self.resources.insert(full_kind, resource);
        true
    }

    /// Resolve a short or full kind into a full kind
    ///
    /// Kinds that are already group qualified are returned unchanged, even when they
    /// were never discovered. [`KindRegistry::url_for`] rejects those later.
    pub fn resolve(&self, kind: &str) -> Result<String, Error> {
        if gvk::is_full_kind(kind) {
            return Ok(kind.to_string());
        }
        match self.full_kinds.get(kind).map(Vec::as_slice) {
            None | Some([]) => Err(Error::UnknownKind(kind.to_string())),
            Some([only]) => Ok(only.clone()),
            Some(candidates) => Err(Error::AmbiguousKind {
                kind: kind.to_string(),
                candidates: candidates.to_vec(),
            }),
        }
    }

    /// The resource registered for a full kind
    pub fn get(&self, full_kind: &str) -> Option<&ApiResource> {
        self.resources.get(full_kind)
    }

    /// Resolve `kind` and return its resource
    pub fn lookup(&self, kind: &str) -> Result<&ApiResource, Error> {
        let full_kind = self.resolve(kind)?;
        self.get(&full_kind).ok_or(Error::UnknownKind(full_kind))
    }

    /// Collection url of `full_kind`, e.g. `/api/v1/namespaces/default/pods`
    ///
    /// The namespace segment is only emitted for namespaced kinds with a non-empty namespace.
    pub fn url_for(&self, full_kind: &str, namespace: &str) -> Result<String, Error> {
        self.collection_path(full_kind, namespace, false)
    }

    /// Watch url of `full_kind`, e.g. `/api/v1/watch/namespaces/default/pods`
    pub fn watch_url_for(&self, full_kind: &str, namespace: &str) -> Result<String, Error> {
        self.collection_path(full_kind, namespace, true)
    }

    fn collection_path(&self, full_kind: &str, namespace: &str, watch: bool) -> Result<String, Error> {
        let resource = self
            .get(full_kind)
            .ok_or_else(|| Error::UnknownKind(full_kind.to_string()))?;
        let mut path = resource.url_prefix.trim_end_matches('/').to_string();
        path.push('/');
        if watch {
            path.push_str("watch/");
        }
        if resource.namespaced && !namespace.is_empty() {
            path.push_str("namespaces/");
            path.push_str(namespace);
            path.push('/');
        }
        path.push_str(&resource.plural);
        Ok(path)
    }

    /// Short kinds known to the registry, sorted
    pub fn kinds(&self) -> Vec<String> {
        self.full_kinds.keys().cloned().collect()
    }

    /// Full kinds known to the registry, sorted
    pub fn full_kinds(&self) -> Vec<String> {
        self.resources.keys().cloned().collect()
    }

    /// A JSON description of every registered kind
    ///
    /// Maps each full kind to its `apiVersion`, `kind`, `plural`, `namespaced` and `verbs`.
    pub fn describe(&self) -> Value {
        let desc = self
            .resources
            .iter()
            .map(|(full_kind, ar)| {
                let entry = json!({
                    "apiVersion": ar.api_version,
                    "kind": ar.kind,
                    "plural": ar.plural,
                    "namespaced": ar.namespaced,
                    "verbs": ar.verbs,
                });
                (full_kind.clone(), entry)
            })
            .collect::<Map<_, _>>();
        Value::Object(desc)
    }

    /// Number of registered full kinds
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether nothing was registered
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Iterate over full kinds and their resources
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ApiResource)> {
        self.resources.iter().map(|(k, v)| (k.as_str(), v))
    }
}
