//! Runtime API discovery
//!
//! [`Discovery`] crawls the API server's self-describing endpoints and fills a
//! [`KindRegistry`] with every kind served by the cluster.
use std::collections::BTreeSet;

use kubesys_core::KindRegistry;
use serde::de::DeserializeOwned;

use crate::{error::DiscoveryError, Client, Error, Result};
pub use kubesys_core::discovery::{verbs, ApiResource, Scope};

mod parse;

/// Full kind of the definitions that custom resource scanning lists
const CRD_FULL_KIND: &str = "apiextensions.k8s.io.CustomResourceDefinition";

/// A discovery pass against one API server
///
/// A pass costs `N+1` requests where `N` is the number of group versions served,
/// plus `M+1` more when custom resource scanning finds `M` group versions that the
/// root listing did not advertise.
///
/// ```no_run
/// use kubesys_client::{Client, Discovery};
/// # async fn wrapper() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::try_default()?;
/// let registry = Discovery::new(client).run().await?;
/// for full_kind in registry.full_kinds() {
///     println!("{full_kind}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Discovery {
    client: Client,
    custom_resources: bool,
}

impl Discovery {
    /// Construct a discovery pass using `client`
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            client,
            custom_resources: false,
        }
    }

    /// Also crawl the group versions of every `CustomResourceDefinition`
    ///
    /// Custom resources served by aggregated or slow-to-register groups may be
    /// missing from the root path listing.
    #[must_use]
    pub fn custom_resources(mut self, enabled: bool) -> Self {
        self.custom_resources = enabled;
        self
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }

    /// Run discovery into a fresh registry
    pub async fn run(&self) -> Result<KindRegistry> {
        let mut registry = KindRegistry::new();
        self.run_into(&mut registry).await?;
        Ok(registry)
    }

    /// Run discovery into an existing registry
    ///
    /// Kinds already present keep their entry, so running twice against the same
    /// server leaves the registry as a single run would.
    pub async fn run_into(&self, registry: &mut KindRegistry) -> Result<()> {
        let root: parse::RootPaths = self.get("/").await?;
        let paths: Vec<_> = root
            .paths
            .into_iter()
            .filter(|p| parse::is_resource_path(p))
            .collect();
        if paths.is_empty() {
            return Err(Error::Discovery(DiscoveryError::MissingPaths));
        }

        let mut crawled = BTreeSet::new();
        for path in paths {
            self.crawl(&path, registry).await?;
            crawled.insert(path);
        }

        if self.custom_resources {
            self.crawl_custom_resources(registry, &mut crawled).await?;
        }
        tracing::info!(
            "discovered {} kinds across {} group versions",
            registry.len(),
            crawled.len()
        );
        Ok(())
    }

    /// Register the resources listed at one group version path
    async fn crawl(&self, path: &str, registry: &mut KindRegistry) -> Result<usize> {
        let list: parse::ResourceList = self.get(path).await?;
        let entries = parse::resources_from_list(path, list).map_err(Error::Discovery)?;
        let mut inserted = 0;
        for (full_kind, resource) in entries {
            if registry.insert(full_kind, resource) {
                inserted += 1;
            }
        }
        tracing::debug!("crawled {}: {} new kinds", path, inserted);
        Ok(inserted)
    }

    async fn crawl_custom_resources(
        &self,
        registry: &mut KindRegistry,
        crawled: &mut BTreeSet<String>,
    ) -> Result<()> {
        let Ok(url) = registry.url_for(CRD_FULL_KIND, "") else {
            tracing::debug!("{} is not served, skipping custom resources", CRD_FULL_KIND);
            return Ok(());
        };
        let crds: parse::CrdList = self.get(&url).await?;
        for path in crds.served_paths() {
            if crawled.contains(&path) {
                continue;
            }
            self.crawl(&path, registry).await?;
            crawled.insert(path);
        }
        Ok(())
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let req = http::Request::get(path).body(vec![]).map_err(Error::HttpError)?;
        let text = self.client.request_text(req).await.map_err(|e| {
            Error::Discovery(DiscoveryError::Request {
                path: path.to_string(),
                source: Box::new(e),
            })
        })?;
        serde_json::from_str(&text).map_err(|source| {
            Error::Discovery(DiscoveryError::Decode {
                path: path.to_string(),
                source,
            })
        })
    }
}
