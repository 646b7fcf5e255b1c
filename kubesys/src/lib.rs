//! Kubesys is an umbrella-crate for talking to a Kubernetes compatible control plane
//! without compiled resource schemas.
//!
//! # Overview
//!
//! Every resource type is learned at runtime. On first use the client crawls the API
//! server's discovery endpoints into a registry mapping short kinds (`Pod`) and full
//! kinds (`apps.Deployment`) to their REST paths, and synthesizes every request url
//! from that registry. Documents are plain [`serde_json::Value`] trees.
//!
//! The main modules are:
//!
//! - [`client`](crate::client) with the [`Client`](crate::Client) transport and its layers
//! - [`config`](crate::config) for cluster [`Config`](crate::Config)
//! - [`discovery`](crate::discovery) with the [`Discovery`](crate::Discovery) crawler
//! - [`api`](crate::api) with the dynamic [`Api`](crate::Api) and [`Watcher`](crate::api::Watcher)
//! - [`core`](crate::core) with the client-less registry, request and document types
//!
//! # Using the Client
//! ```no_run
//! use kubesys::{Api, Client, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Infer the runtime environment and try to create a Client
//!     let client = Client::try_from(Config::infer()?)?;
//!     let api = Api::new(client);
//!
//!     // Short kinds resolve as long as only one API group serves them
//!     let deploys = api.list("Deployment", "default").await?;
//!     for d in deploys["items"].as_array().into_iter().flatten() {
//!         println!("found deployment {}", d["metadata"]["name"]);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Watching
//! ```no_run
//! use kubesys::{api::{WatchEvent, Watcher}, Api, Client};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = Api::new(Client::try_default()?);
//!     Watcher::new(api, "Pod", "kube-system")
//!         .run(|event| {
//!             if let WatchEvent::Added(pod) = event {
//!                 println!("new pod {}", pod["metadata"]["name"]);
//!             }
//!         })
//!         .await?;
//!     Ok(())
//! }
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use kubesys_client::{api, client, config, discovery, error};

#[doc(inline)] pub use kubesys_client::{Api, Client, Config, Discovery, Error, Result};

pub use kubesys_core as core;
#[doc(inline)] pub use kubesys_core::{DocumentExt, KindRegistry};
