//! Cluster connection configuration
//!
//! A [`Config`] can be loaded from a kubeconfig file, from the in-cluster service
//! account, from a bare server url and bearer token, or inferred from whichever of
//! those the environment offers.
mod file_config;
mod incluster_config;
mod utils;

use std::{path::PathBuf, time::Duration};

use http::{uri::Scheme, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

pub use file_config::{AuthInfo, Cluster, Context, Kubeconfig, NamedAuthInfo, NamedCluster, NamedContext};

use crate::error::ConfigError;

/// Connect timeout for new connections, covering the TLS handshake
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Kubeconfig written by kubeadm on control plane nodes
const ADMIN_KUBECONFIG: &str = "/etc/kubernetes/admin.conf";

/// Configuration object detailing things like cluster URL, default namespace, root certificates, and timeouts.
#[derive(Debug, Clone)]
pub struct Config {
    /// The configured cluster url
    pub cluster_url: http::Uri,
    /// The configured default namespace
    pub default_namespace: String,
    /// The configured root certificates, DER encoded
    pub root_cert: Option<Vec<Vec<u8>>>,
    /// Timeout for establishing a connection, including the TLS handshake.
    ///
    /// No read timeout is applied, watches stay open until the server closes them.
    /// A value of `None` means no timeout.
    pub connect_timeout: Option<Duration>,
    /// Whether to accept invalid certificates
    pub accept_invalid_certs: bool,
    /// Client private key and certificate in PEM.
    pub identity_pem: Option<Vec<u8>>,
    /// Bearer token sent in the `Authorization` header
    pub token: Option<SecretString>,
}

impl Config {
    /// Construct a new config where only the `cluster_url` is set by the user.
    /// and everything else receives a default value.
    ///
    /// Most likely you want to use [`Config::infer`] to infer the config from
    /// the environment.
    pub fn new(cluster_url: http::Uri) -> Self {
        Self {
            cluster_url,
            default_namespace: String::from("default"),
            root_cert: None,
            connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT),
            accept_invalid_certs: false,
            identity_pem: None,
            token: None,
        }
    }

    /// A development config that authenticates with a bearer token and trusts any server certificate
    ///
    /// The url must use `https`. The token must be non-empty and usable as a header value.
    pub fn insecure_with_token(server: &str, token: &str) -> Result<Self, ConfigError> {
        let mut config = Self::new(parse_cluster_url(server)?);
        config.token = Some(validate_token(token)?);
        config.accept_invalid_certs = true;
        Ok(config)
    }

    /// Attach a bearer token to an existing config
    pub fn with_token(mut self, token: &str) -> Result<Self, ConfigError> {
        self.token = Some(validate_token(token)?);
        Ok(self)
    }

    /// Infer the configuration from the environment
    ///
    /// Done by attempting to load in-cluster environment variables first, and
    /// then if that fails, trying the local kubeconfig: `$KUBECONFIG`, then
    /// `~/.kube/config`, then `/etc/kubernetes/admin.conf`.
    ///
    /// Fails if inference from both sources fails
    pub fn infer() -> Result<Self, ConfigError> {
        match Self::from_cluster_env() {
            Err(cluster_env_err) => {
                tracing::trace!("No in-cluster config found: {}", cluster_env_err);
                tracing::trace!("Falling back to local kubeconfig");
                let path = kubeconfig_path().ok_or(ConfigError::NoKubeconfigPath);
                path.and_then(Self::from_kubeconfig::<PathBuf>)
                    .map_err(|kubeconfig_err| ConfigError::ConfigInferenceExhausted {
                        cluster_env: Box::new(cluster_env_err.into()),
                        kubeconfig: Box::new(kubeconfig_err.into()),
                    })
            }
            success => success,
        }
    }

    /// Create configuration from the cluster's environment variables
    ///
    /// This follows the standard [API Access from a Pod](https://kubernetes.io/docs/tasks/access-application-cluster/access-cluster/#accessing-the-api-from-a-pod)
    /// and relies on you having the service account's token mounted,
    /// as well as having given the service account rbac access to do what you need.
    pub fn from_cluster_env() -> Result<Self, ConfigError> {
        let cluster_url = parse_cluster_url(&incluster_config::kube_server()?)?;
        let token = validate_token(&incluster_config::load_token()?)?;
        let root_cert = incluster_config::load_cert()?;
        let default_namespace = incluster_config::load_default_ns()?;

        Ok(Self {
            default_namespace,
            root_cert: Some(root_cert),
            token: Some(token),
            ..Self::new(cluster_url)
        })
    }

    /// Create configuration from a kubeconfig file
    ///
    /// The selected cluster and user must provide the server address, client certificate,
    /// client key and certificate authority. A user token and context namespace are
    /// picked up when present.
    pub fn from_kubeconfig<P: Into<PathBuf>>(path: P) -> Result<Self, ConfigError> {
        let path = path.into();
        tracing::debug!("Loading kubeconfig from {}", path.display());
        Self::from_custom_kubeconfig(&Kubeconfig::read_from(&path)?)
    }

    /// Create configuration from an already parsed [`Kubeconfig`]
    pub fn from_custom_kubeconfig(kubeconfig: &Kubeconfig) -> Result<Self, ConfigError> {
        let creds = kubeconfig.credentials()?;
        let cluster_url = parse_cluster_url(&creds.server)?;
        let token = creds.token.map(|t| validate_token(t.expose_secret())).transpose()?;

        Ok(Self {
            default_namespace: creds.namespace.unwrap_or_else(|| String::from("default")),
            root_cert: Some(utils::certs(&creds.ca_pem)?),
            accept_invalid_certs: creds.insecure,
            identity_pem: Some(creds.identity_pem),
            token,
            ..Self::new(cluster_url)
        })
    }
}

fn kubeconfig_path() -> Option<PathBuf> {
    std::env::var_os("KUBECONFIG")
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            home::home_dir()
                .map(|h| h.join(".kube").join("config"))
                .filter(|p| p.exists())
        })
        .or_else(|| Some(PathBuf::from(ADMIN_KUBECONFIG)).filter(|p| p.exists()))
}

/// Parse a server address, accepting only `https`
fn parse_cluster_url(server: &str) -> Result<http::Uri, ConfigError> {
    let url = server.parse::<http::Uri>().map_err(|source| ConfigError::InvalidUri {
        url: server.to_string(),
        source,
    })?;
    if url.scheme() != Some(&Scheme::HTTPS) || url.authority().is_none() {
        return Err(ConfigError::UnsupportedScheme(server.to_string()));
    }
    Ok(url)
}

fn validate_token(token: &str) -> Result<SecretString, ConfigError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(ConfigError::InvalidBearerToken("token is empty".into()));
    }
    HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|e| ConfigError::InvalidBearerToken(e.to_string()))?;
    Ok(SecretString::from(token.to_string()))
}
