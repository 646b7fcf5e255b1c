//! Error handling in [`kubesys`][crate]
use std::path::PathBuf;

use thiserror::Error;

pub use kubesys_core::ErrorResponse;

/// Possible errors when working with [`kubesys`][crate]
#[derive(Error, Debug)]
pub enum Error {
    /// ApiError for when things fail
    ///
    /// Returned for every non-success status, and for `ERROR` events on a watch.
    #[error("ApiError: {0}")]
    Api(#[source] ErrorResponse),

    /// Hyper error
    #[error("HyperError: {0}")]
    HyperError(#[source] hyper::Error),

    /// Service error
    #[error("ServiceError: {0}")]
    Service(#[source] tower::BoxError),

    /// UTF-8 Error
    #[error("UTF-8 Error: {0}")]
    FromUtf8(#[source] std::string::FromUtf8Error),

    /// Returned when failed to find a newline character within max length.
    /// Only returned by `Client::request_events` and this should never happen as
    /// the max is `usize::MAX`.
    #[error("Error finding newline character")]
    MaxLineLengthExceeded,

    /// Returned on `std::io::Error` when reading event stream.
    #[error("Error reading events stream: {0}")]
    ReadEvents(#[source] std::io::Error),

    /// Http based error
    #[error("HttpError: {0}")]
    HttpError(#[source] http::Error),

    /// Common error case when decoding responses
    #[error("Error deserializing response: {0}")]
    SerdeError(#[source] serde_json::Error),

    /// Failed to build request
    #[error("Failed to build request: {0}")]
    BuildRequest(#[source] kubesys_core::request::Error),

    /// Configuration error
    #[error("Error loading kubeconfig: {0}")]
    Kubeconfig(#[source] ConfigError),

    /// Discovery errors
    #[error("Error from discovery: {0}")]
    Discovery(#[source] DiscoveryError),

    /// The kind could not be resolved against the discovered registry
    #[error("Error resolving kind: {0}")]
    Kind(#[source] kubesys_core::registry::Error),

    /// A document lacked a field the operation needs
    #[error("Invalid document: {0}")]
    Document(#[source] kubesys_core::document::Error),

    /// Errors from the rustls stack
    #[cfg(feature = "rustls-tls")]
    #[cfg_attr(docsrs, doc(cfg(feature = "rustls-tls")))]
    #[error("rustls tls error: {0}")]
    RustlsTls(#[source] crate::client::RustlsTlsError),

    /// Missing TLS stacks when TLS is required
    #[error("TLS required but no TLS stack selected")]
    TlsRequired,
}

impl From<kubesys_core::registry::Error> for Error {
    fn from(e: kubesys_core::registry::Error) -> Self {
        Error::Kind(e)
    }
}

impl From<kubesys_core::document::Error> for Error {
    fn from(e: kubesys_core::document::Error) -> Self {
        Error::Document(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Kubeconfig(e)
    }
}

impl From<kubesys_core::request::Error> for Error {
    fn from(e: kubesys_core::request::Error) -> Self {
        Error::BuildRequest(e)
    }
}

#[derive(Error, Debug)]
// Redundant with the error messages and machine names
#[allow(missing_docs)]
/// Possible errors when loading config
pub enum ConfigError {
    #[error("Failed to infer config.. cluster env: ({cluster_env}), kubeconfig: ({kubeconfig})")]
    ConfigInferenceExhausted {
        cluster_env: Box<Error>,
        // We can only pick one source, but the kubeconfig failure is more likely to be a user error
        #[source]
        kubeconfig: Box<Error>,
    },

    #[error("Unable to load in cluster config, {hostenv} and {portenv} must be defined")]
    /// One or more required in-cluster config options are missing
    MissingInClusterVariables {
        hostenv: &'static str,
        portenv: &'static str,
    },

    #[error("Unable to find path of kubeconfig")]
    NoKubeconfigPath,

    #[error("Kubeconfig is missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Failed to decode base64: {0}")]
    Base64Decode(#[source] base64::DecodeError),

    #[error("Failed to parse PEM certificates: {0}")]
    ParseCertificates(#[source] pem::PemError),

    #[error("Failed to read '{path:?}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse Kubeconfig YAML: {0}")]
    ParseYaml(#[source] serde_yaml::Error),

    #[error("Invalid cluster url '{url}': {source}")]
    InvalidUri {
        url: String,
        #[source]
        source: http::uri::InvalidUri,
    },

    #[error("Unsupported cluster url scheme in '{0}', only https is accepted")]
    UnsupportedScheme(String),

    #[error("Invalid bearer token: {0}")]
    InvalidBearerToken(String),
}

#[derive(Error, Debug)]
// Redundant with the error messages and machine names
#[allow(missing_docs)]
/// Possible errors when using API discovery
pub enum DiscoveryError {
    #[error("Discovery request to {path} failed: {source}")]
    Request {
        path: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Malformed discovery response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid GroupVersion {group_version} served at {path}")]
    InvalidGroupVersion { path: String, group_version: String },

    #[error("The API server root lists no resource paths")]
    MissingPaths,
}
