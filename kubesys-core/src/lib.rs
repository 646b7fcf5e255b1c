//! Crate with the client-less types of kubesys
//!
//! This crate holds everything that can be computed without talking to a cluster:
//! the kind registry built by discovery, request builders, list and watch parameters,
//! watch events and typed accessors for schemaless JSON documents.
//! The same information is re-exported from `kubesys` under `kubesys::core`.
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod discovery;
pub use discovery::{ApiResource, Scope};

pub mod document;
pub use document::DocumentExt;

pub mod gvk;
pub use gvk::GroupVersion;

pub mod params;
pub use params::{ListParams, Selector, WatchParams};

pub mod registry;
pub use registry::KindRegistry;

pub mod request;
pub use request::Request;

pub mod watch;
pub use watch::{WatchEvent, WatchLine};

mod error;
pub use error::ErrorResponse;
