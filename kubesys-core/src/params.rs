//! Query parameters for list and watch calls
use std::{collections::BTreeMap, fmt};

/// Default `timeoutSeconds` for watches: ten years, so the server never closes the stream on its own.
pub const DEFAULT_WATCH_TIMEOUT_SECONDS: u64 = 315_360_000;

/// Equality terms for a label or field selector
///
/// Renders as `key%3Dvalue` terms joined by `,`, with keys and values form-urlencoded.
/// Terms are kept in key order so the rendered query is stable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selector(BTreeMap<String, String>);

impl Selector {
    /// Add a `key=value` term
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Whether the selector has no terms
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The url-encoded query value
    pub fn to_query_value(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| {
                let key: String = form_urlencoded::byte_serialize(k.as_bytes()).collect();
                let value: String = form_urlencoded::byte_serialize(v.as_bytes()).collect();
                format!("{key}%3D{value}")
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms = self.0.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>();
        write!(f, "{}", terms.join(","))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Selector {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<BTreeMap<String, String>> for Selector {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

/// Common query parameters used in list calls
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListParams {
    /// A selector to restrict the list of returned objects by their labels.
    pub label_selector: Option<Selector>,

    /// A selector to restrict the list of returned objects by their fields.
    pub field_selector: Option<Selector>,
}

impl ListParams {
    /// Configure the label selector from `key=value` pairs
    #[must_use]
    pub fn labels<K, V>(mut self, labels: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.label_selector = Some(labels.into_iter().collect());
        self
    }

    /// Configure the field selector from `key=value` pairs
    #[must_use]
    pub fn fields<K, V>(mut self, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.field_selector = Some(fields.into_iter().collect());
        self
    }

    // Appends the selector terms to a query that already has a `?`
    pub(crate) fn populate_qp(&self, query: &mut Vec<String>) {
        if let Some(labels) = self.label_selector.as_ref().filter(|s| !s.is_empty()) {
            query.push(format!("labelSelector={}", labels.to_query_value()));
        }
        if let Some(fields) = self.field_selector.as_ref().filter(|s| !s.is_empty()) {
            query.push(format!("fieldSelector={}", fields.to_query_value()));
        }
    }
}

/// Parameters for watch calls
#[derive(Clone, Debug, PartialEq)]
pub struct WatchParams {
    /// Server side timeout for the watch, in seconds.
    pub timeout_seconds: u64,

    /// Selectors narrowing the watched objects
    pub list: ListParams,
}

impl Default for WatchParams {
    fn default() -> Self {
        Self {
            timeout_seconds: DEFAULT_WATCH_TIMEOUT_SECONDS,
            list: ListParams::default(),
        }
    }
}

impl WatchParams {
    /// Override the server side timeout
    #[must_use]
    pub fn timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Only watch objects matching these labels
    #[must_use]
    pub fn labels<K, V>(mut self, labels: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.list = self.list.labels(labels);
        self
    }

    /// Only watch objects matching these fields
    #[must_use]
    pub fn fields<K, V>(mut self, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.list = self.list.fields(fields);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_encodes_equals_and_special_characters() {
        let sel: Selector = [("app", "nginx"), ("tier", "a b")].into_iter().collect();
        assert_eq!(sel.to_query_value(), "app%3Dnginx,tier%3Da+b");
        assert_eq!(sel.to_string(), "app=nginx,tier=a b");

        let sel: Selector = [("app.kubernetes.io/name", "web")].into_iter().collect();
        assert_eq!(sel.to_query_value(), "app.kubernetes.io%2Fname%3Dweb");
    }

    #[test]
    fn selector_terms_are_sorted_by_key() {
        let sel: Selector = [("z", "1"), ("a", "2")].into_iter().collect();
        assert_eq!(sel.to_query_value(), "a%3D2,z%3D1");
    }

    #[test]
    fn empty_selectors_add_no_query() {
        let lp = ListParams::default().labels(Vec::<(String, String)>::new());
        let mut qp = vec![];
        lp.populate_qp(&mut qp);
        assert!(qp.is_empty());
    }

    #[test]
    fn watch_defaults_to_ten_year_timeout() {
        assert_eq!(WatchParams::default().timeout_seconds, 315360000);
        assert_eq!(WatchParams::default().timeout(30).timeout_seconds, 30);
    }
}
