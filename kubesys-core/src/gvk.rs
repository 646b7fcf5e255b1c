//! Group, version and full kind helpers.
//!
//! A *full kind* qualifies a kind with its API group (`apps.Deployment`).
//! Kinds of the core group have no qualifier (`Pod`).
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Separator between the group and the kind in a full kind
pub const FULL_KIND_SEPARATOR: char = '.';

#[derive(Debug, Error)]
#[error("failed to parse group version: {0}")]
/// Failed to parse group version.
pub struct ParseGroupVersionError(pub String);

/// A family of API resources served under one REST prefix
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupVersion {
    /// API group, empty for the core group
    pub group: String,
    /// Version
    pub version: String,
}

impl GroupVersion {
    /// Construct from explicit group and version
    pub fn gv(group: &str, version: &str) -> Self {
        Self {
            group: group.to_string(),
            version: version.to_string(),
        }
    }

    /// Generate the apiVersion string used in a document
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// The REST path prefix serving this group version
    pub fn url_prefix(&self) -> String {
        if self.group.is_empty() {
            format!("/api/{}", self.version)
        } else {
            format!("/apis/{}/{}", self.group, self.version)
        }
    }

    /// Qualify a kind with this group
    pub fn full_kind(&self, kind: &str) -> String {
        full_kind(&self.group, kind)
    }
}

impl FromStr for GroupVersion {
    type Err = ParseGroupVersionError;

    fn from_str(gv: &str) -> Result<Self, Self::Err> {
        let gvsplit = gv.splitn(2, '/').collect::<Vec<_>>();
        let (group, version) = match *gvsplit.as_slice() {
            [g, v] if !g.is_empty() && !v.is_empty() => (g.to_string(), v.to_string()),
            [v] if !v.is_empty() => (String::new(), v.to_string()),
            _ => return Err(ParseGroupVersionError(gv.into())),
        };
        Ok(Self { group, version })
    }
}

/// Qualify `kind` with `group`, leaving core group kinds bare
pub fn full_kind(group: &str, kind: &str) -> String {
    if group.is_empty() {
        kind.to_string()
    } else {
        format!("{group}{FULL_KIND_SEPARATOR}{kind}")
    }
}

/// The short kind of a full kind, i.e. everything after the last separator
pub fn short_kind(full_kind: &str) -> &str {
    full_kind
        .rsplit_once(FULL_KIND_SEPARATOR)
        .map_or(full_kind, |(_, kind)| kind)
}

/// Whether `kind` is already group qualified
pub fn is_full_kind(kind: &str) -> bool {
    kind.contains(FULL_KIND_SEPARATOR)
}
