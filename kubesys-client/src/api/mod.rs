//! Resource operations for any kind served by the cluster
//!
//! [`Api`] resolves short or full kinds against the registry built by [`Discovery`]
//! and performs requests with schemaless [`serde_json::Value`] documents.
use std::sync::Arc;

use tokio::sync::OnceCell;

mod core_methods;
mod watch;

pub use kubesys_core::{
    params::{ListParams, Selector, WatchParams},
    request::Request,
    watch::WatchEvent,
    ApiResource, DocumentExt, KindRegistry,
};
pub use watch::{WatchState, Watcher};

use crate::{Client, Discovery, Result};

/// The dynamic Api abstraction
///
/// Every operation takes the kind as a short kind (`Deployment`) or a full kind
/// (`apps.Deployment`). The registry is filled by the first operation, or by
/// [`Api::init`], and shared by every clone of the `Api`. Concurrent first calls
/// wait on the same discovery pass.
#[derive(Clone)]
pub struct Api {
    client: Client,
    discovery: Discovery,
    registry: Arc<OnceCell<KindRegistry>>,
}

impl Api {
    /// An `Api` that runs a default [`Discovery`] on first use
    pub fn new(client: Client) -> Self {
        Self::from_discovery(Discovery::new(client))
    }

    /// An `Api` that runs the given [`Discovery`] on first use
    ///
    /// ```no_run
    /// use kubesys_client::{Api, Client, Discovery};
    /// # async fn wrapper() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = Client::try_default()?;
    /// let api = Api::from_discovery(Discovery::new(client).custom_resources(true));
    /// api.init().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_discovery(discovery: Discovery) -> Self {
        Self {
            client: discovery.client().clone(),
            discovery,
            registry: Arc::new(OnceCell::new()),
        }
    }

    /// An `Api` over an already populated registry
    ///
    /// No discovery is performed.
    pub fn with_registry(client: Client, registry: KindRegistry) -> Self {
        Self {
            discovery: Discovery::new(client.clone()),
            client,
            registry: Arc::new(OnceCell::from(registry)),
        }
    }

    /// Run discovery unless it already completed, and return the registry
    ///
    /// A failed discovery is returned to every waiting caller and leaves the
    /// registry unset, so the next call tries again.
    pub async fn init(&self) -> Result<&KindRegistry> {
        self.registry
            .get_or_try_init(|| async {
                tracing::debug!("running discovery");
                self.discovery.run().await
            })
            .await
    }

    /// The underlying [`Client`]
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Short kinds served by the cluster
    pub async fn kinds(&self) -> Result<Vec<String>> {
        Ok(self.init().await?.kinds())
    }

    /// Full kinds served by the cluster
    pub async fn full_kinds(&self) -> Result<Vec<String>> {
        Ok(self.init().await?.full_kinds())
    }

    /// JSON description of every kind, see [`KindRegistry::describe`]
    pub async fn kind_desc(&self) -> Result<serde_json::Value> {
        Ok(self.init().await?.describe())
    }

    /// Resolve a short or full kind into a full kind
    pub async fn resolve(&self, kind: &str) -> Result<String> {
        Ok(self.init().await?.resolve(kind)?)
    }
}
