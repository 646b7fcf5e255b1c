//! Crate for interacting with a Kubernetes compatible API without compiled schemas
//!
//! Every resource type is learned at runtime: [`Discovery`] crawls the API server's
//! self-describing endpoints into a [`KindRegistry`](kubesys_core::KindRegistry), and
//! [`Api`] synthesizes request urls for any kind from that registry. Documents are plain
//! [`serde_json::Value`] trees.
//!
//! # Example
//!
//! ```rust,no_run
//! use kubesys_client::{Api, Client, Config};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::try_from(Config::infer()?)?;
//!     let api = Api::new(client);
//!
//!     let pod = json!({
//!         "apiVersion": "v1",
//!         "kind": "Pod",
//!         "metadata": {"name": "busybox", "namespace": "default"},
//!         "spec": {"containers": [{"name": "busybox", "image": "busybox"}]}
//!     });
//!     api.create(&pod).await?;
//!
//!     let pods = api.list("Pod", "default").await?;
//!     println!("{}", pods["items"]);
//!     Ok(())
//! }
//! ```
//!
//! For more details, see:
//!
//! - [`Client`](crate::client) for the transport and its middleware
//! - [`Config`](crate::config) for loading credentials
//! - [`Discovery`](crate::discovery) for building the kind registry
//! - [`Api`](crate::api) for resource operations and watches
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod api;
pub mod client;
pub mod config;
pub mod discovery;
pub mod error;

#[cfg(test)] mod test_server;

#[doc(inline)] pub use api::Api;
#[doc(inline)] pub use client::Client;
#[doc(inline)] pub use config::Config;
#[doc(inline)] pub use discovery::Discovery;
#[doc(inline)] pub use error::Error;

pub use kubesys_core as core;

/// Convient alias for `Result<T, Error>`
pub type Result<T, E = Error> = std::result::Result<T, E>;
