//! Long-lived watches over a kind
use futures::{pin_mut, Stream, StreamExt};
use kubesys_core::{WatchEvent, WatchParams};

use crate::{api::Api, Result};

/// Watch stream constructors
impl Api {
    /// Watch every object of a kind in a namespace
    ///
    /// Resolves once the server has accepted the watch. The stream ends when the
    /// server closes the connection; dropping it closes the connection early.
    ///
    /// ```no_run
    /// use futures::{pin_mut, TryStreamExt};
    /// use kubesys_client::{api::{WatchEvent, WatchParams}, Api, Client};
    /// # async fn wrapper() -> Result<(), Box<dyn std::error::Error>> {
    /// let api = Api::new(Client::try_default()?);
    /// let stream = api.watch("Pod", "default", &WatchParams::default()).await?;
    /// pin_mut!(stream);
    /// while let Some(event) = stream.try_next().await? {
    ///     match event {
    ///         WatchEvent::Added(pod) => println!("added {}", pod["metadata"]["name"]),
    ///         WatchEvent::Modified(pod) => println!("modified {}", pod["metadata"]["name"]),
    ///         WatchEvent::Deleted(pod) => println!("deleted {}", pod["metadata"]["name"]),
    ///     }
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn watch(
        &self,
        kind: &str,
        namespace: &str,
        wp: &WatchParams,
    ) -> Result<impl Stream<Item = Result<WatchEvent>>> {
        self.open_watch(kind, namespace, None, wp).await
    }

    /// Watch a single named object
    pub async fn watch_named(
        &self,
        kind: &str,
        namespace: &str,
        name: &str,
        wp: &WatchParams,
    ) -> Result<impl Stream<Item = Result<WatchEvent>>> {
        self.open_watch(kind, namespace, Some(name), wp).await
    }

    /// Watch a kind and hand every event to `handler`, in stream order
    ///
    /// Returns when the server closes the watch. See [`Watcher::run`].
    pub async fn watch_with<F>(&self, kind: &str, namespace: &str, wp: &WatchParams, handler: F) -> Result<()>
    where
        F: FnMut(WatchEvent),
    {
        Watcher::new(self.clone(), kind, namespace)
            .params(wp.clone())
            .run(handler)
            .await
    }

    async fn open_watch(
        &self,
        kind: &str,
        namespace: &str,
        name: Option<&str>,
        wp: &WatchParams,
    ) -> Result<impl Stream<Item = Result<WatchEvent>>> {
        let registry = self.init().await?;
        let full_kind = registry.resolve(kind)?;
        let request = kubesys_core::Request::new(registry.watch_url_for(&full_kind, namespace)?);
        let req = match name {
            Some(name) => request.watch_object(name, wp)?,
            None => request.watch(wp)?,
        };
        tracing::debug!("watching {}", req.uri());
        self.client.request_events(req).await
    }
}

/// Where a [`Watcher`] is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    /// Not started
    Idle,
    /// The server answered with response headers
    Connected,
    /// At least one event was delivered
    Streaming,
    /// The server ended the stream
    Closed,
    /// The watch could not be opened, or broke
    Failed,
}

/// A watch over one kind that dispatches events to a callback
///
/// There is no reconnect. Once [`Watcher::run`] returns, the caller decides whether
/// to run it again.
///
/// ```no_run
/// use kubesys_client::{api::{WatchEvent, Watcher}, Api, Client};
/// # async fn wrapper() -> Result<(), Box<dyn std::error::Error>> {
/// let api = Api::new(Client::try_default()?);
/// let mut watcher = Watcher::new(api, "apps.Deployment", "default");
/// watcher
///     .run(|event| match event {
///         WatchEvent::Added(d) => println!("added {}", d["metadata"]["name"]),
///         WatchEvent::Modified(d) => println!("modified {}", d["metadata"]["name"]),
///         WatchEvent::Deleted(d) => println!("deleted {}", d["metadata"]["name"]),
///     })
///     .await?;
/// println!("watch ended: {:?}", watcher.state());
/// # Ok(())
/// # }
/// ```
pub struct Watcher {
    api: Api,
    kind: String,
    namespace: String,
    name: Option<String>,
    params: WatchParams,
    state: WatchState,
}

impl Watcher {
    /// Watch `kind` in `namespace`, where an empty namespace means all namespaces
    pub fn new(api: Api, kind: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            api,
            kind: kind.into(),
            namespace: namespace.into(),
            name: None,
            params: WatchParams::default(),
            state: WatchState::Idle,
        }
    }

    /// Only watch the object called `name`
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Use custom [`WatchParams`]
    #[must_use]
    pub fn params(mut self, wp: WatchParams) -> Self {
        self.params = wp;
        self
    }

    /// The current state
    pub fn state(&self) -> WatchState {
        self.state
    }

    /// Open the watch and call `handler` for each event until the stream ends
    ///
    /// Events are delivered one at a time in the order the server sent them.
    /// Malformed lines are skipped. An `ERROR` event from the server, or a broken
    /// connection, ends the watch with an error and leaves it [`WatchState::Failed`].
    /// A clean end of stream leaves it [`WatchState::Closed`].
    pub async fn run<F>(&mut self, mut handler: F) -> Result<()>
    where
        F: FnMut(WatchEvent),
    {
        self.state = WatchState::Idle;
        let api = self.api.clone();
        let params = self.params.clone();
        let opened = api
            .open_watch(&self.kind, &self.namespace, self.name.as_deref(), &params)
            .await;
        let stream = match opened {
            Ok(stream) => stream,
            Err(err) => {
                self.state = WatchState::Failed;
                return Err(err);
            }
        };
        self.state = WatchState::Connected;
        pin_mut!(stream);

        while let Some(item) = stream.next().await {
            match item {
                Ok(event) => {
                    self.state = WatchState::Streaming;
                    handler(event);
                }
                Err(err) => {
                    tracing::debug!("watch of {} ended: {}", self.kind, err);
                    self.state = WatchState::Failed;
                    return Err(err);
                }
            }
        }
        self.state = WatchState::Closed;
        Ok(())
    }
}
