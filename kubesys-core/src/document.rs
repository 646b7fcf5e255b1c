//! Typed access into schemaless JSON documents
//!
//! Resources are handled as plain [`serde_json::Value`] trees. [`DocumentExt`] adds
//! accessors that fail with a descriptive [`Error`] instead of panicking or silently
//! returning `Null` when a key is absent or has an unexpected type.
use serde_json::{Map, Value};
use thiserror::Error;

use crate::gvk::{self, GroupVersion};

/// Failures reading a field of a document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The key is absent
    #[error("key {0} does not exist")]
    KeyNotFound(String),

    /// The key exists but holds another JSON type
    #[error("key {key} is not of type {expected}")]
    TypeMismatch {
        /// Dotted path of the offending key
        key: String,
        /// JSON type the caller asked for
        expected: &'static str,
    },
}

/// Typed field accessors for JSON documents
pub trait DocumentExt {
    /// The value at a dotted path such as `metadata.name`
    fn field(&self, path: &str) -> Result<&Value, Error>;

    /// A string field
    fn str_field(&self, path: &str) -> Result<&str, Error> {
        self.field(path)?.as_str().ok_or_else(|| mismatch(path, "string"))
    }

    /// A boolean field
    fn bool_field(&self, path: &str) -> Result<bool, Error> {
        self.field(path)?.as_bool().ok_or_else(|| mismatch(path, "boolean"))
    }

    /// An integer field
    fn i64_field(&self, path: &str) -> Result<i64, Error> {
        self.field(path)?.as_i64().ok_or_else(|| mismatch(path, "integer"))
    }

    /// A floating point field
    fn f64_field(&self, path: &str) -> Result<f64, Error> {
        self.field(path)?.as_f64().ok_or_else(|| mismatch(path, "number"))
    }

    /// An object field
    fn object_field(&self, path: &str) -> Result<&Map<String, Value>, Error> {
        self.field(path)?.as_object().ok_or_else(|| mismatch(path, "object"))
    }

    /// An array field
    fn array_field(&self, path: &str) -> Result<&Vec<Value>, Error> {
        self.field(path)?.as_array().ok_or_else(|| mismatch(path, "array"))
    }

    /// The `kind` of the document
    fn kind(&self) -> Result<&str, Error> {
        self.str_field("kind")
    }

    /// The `apiVersion` of the document
    fn api_version(&self) -> Result<&str, Error> {
        self.str_field("apiVersion")
    }

    /// `metadata.name`
    fn name(&self) -> Result<&str, Error> {
        self.str_field("metadata.name")
    }

    /// `metadata.namespace`, or the empty string when the document has none
    fn namespace(&self) -> &str {
        self.str_field("metadata.namespace").unwrap_or_default()
    }

    /// The group qualified kind derived from `apiVersion` and `kind`
    fn full_kind(&self) -> Result<String, Error> {
        let kind = self.kind()?;
        let api_version = self.api_version()?;
        let gv: GroupVersion = api_version.parse().map_err(|_| mismatch("apiVersion", "group/version"))?;
        Ok(gvk::full_kind(&gv.group, kind))
    }
}

fn mismatch(key: &str, expected: &'static str) -> Error {
    Error::TypeMismatch {
        key: key.to_string(),
        expected,
    }
}

impl DocumentExt for Value {
    fn field(&self, path: &str) -> Result<&Value, Error> {
        let mut current = self;
        for key in path.split('.') {
            current = current
                .as_object()
                .and_then(|obj| obj.get(key))
                .ok_or_else(|| Error::KeyNotFound(path.to_string()))?;
        }
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn deployment() -> Value {
        json!({
            "apiVersion": "apps/v1",
            "kind": "Deployment",
            "metadata": {"name": "web", "namespace": "prod", "labels": {"app": "web"}},
            "spec": {
                "replicas": 3,
                "paused": false,
                "template": {"spec": {"containers": [{"name": "nginx", "image": "nginx:1.25"}]}}
            }
        })
    }

    #[test]
    fn typed_getters() {
        let doc = deployment();
        assert_eq!(doc.name().unwrap(), "web");
        assert_eq!(doc.namespace(), "prod");
        assert_eq!(doc.i64_field("spec.replicas").unwrap(), 3);
        assert!(!doc.bool_field("spec.paused").unwrap());
        assert_eq!(doc.object_field("metadata.labels").unwrap()["app"], "web");
        let containers = doc.array_field("spec.template.spec.containers").unwrap();
        assert_eq!(containers[0].str_field("image").unwrap(), "nginx:1.25");
        assert_eq!(doc.full_kind().unwrap(), "apps.Deployment");
    }

    #[test]
    fn missing_and_mistyped_keys() {
        let doc = deployment();
        assert_eq!(
            doc.str_field("spec.strategy").unwrap_err(),
            Error::KeyNotFound("spec.strategy".into())
        );
        assert_eq!(doc.str_field("spec.replicas").unwrap_err(), Error::TypeMismatch {
            key: "spec.replicas".into(),
            expected: "string"
        });
        // walking through a scalar is a missing key, not a panic
        assert!(matches!(
            doc.field("spec.replicas.value"),
            Err(Error::KeyNotFound(_))
        ));
    }

    #[test]
    fn core_kinds_and_missing_namespace() {
        let pod = json!({"apiVersion": "v1", "kind": "Pod", "metadata": {"name": "p"}});
        assert_eq!(pod.full_kind().unwrap(), "Pod");
        assert_eq!(pod.namespace(), "");
        assert!(matches!(json!({"kind": "Pod"}).full_kind(), Err(Error::KeyNotFound(_))));
    }

    #[test]
    fn nested_documents_round_trip() {
        let docs = [
            deployment(),
            json!({
                "apiVersion": "v1",
                "kind": "ConfigMap",
                "metadata": {"name": "mixed", "labels": {}, "finalizers": []},
                "data": {
                    "nothing": null,
                    "ratio": -1.5,
                    "count": -7,
                    "big": 18446744073709551615u64,
                    "enabled": false,
                    "quoted": "ü\"\n\t\\",
                    "emoji": "\u{1F600}",
                },
                "items": [
                    {"ports": [{"port": 80, "tls": true}, {"port": 443, "tls": null}]},
                    [[], [{}], [1, "two", 3.25, null]],
                    {},
                ],
            }),
            json!([]),
            json!({}),
            json!(null),
            json!("ü\"\n"),
            json!(0.25),
            json!([{"a": [{"b": [{"c": null}]}]}]),
        ];
        for doc in docs {
            let text = serde_json::to_string(&doc).unwrap();
            let back: Value = serde_json::from_str(&text).unwrap();
            assert_eq!(doc, back, "{text}");
            let bytes = serde_json::to_vec(&doc).unwrap();
            assert_eq!(serde_json::from_slice::<Value>(&bytes).unwrap(), doc);
        }
    }
}
