use std::path::Path;

use secrecy::SecretString;
use serde::Deserialize;

use super::utils;
use crate::error::ConfigError;

/// The subset of a kubeconfig file this client reads
///
/// Only the fields needed to reach one cluster with client certificates are modelled.
/// Unknown fields are ignored.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case")]
pub struct Kubeconfig {
    /// Referencable names to cluster configs
    #[serde(default)]
    pub clusters: Vec<NamedCluster>,
    /// Referencable names to user configs
    #[serde(default, rename = "users")]
    pub auth_infos: Vec<NamedAuthInfo>,
    /// Referencable names to context configs
    #[serde(default)]
    pub contexts: Vec<NamedContext>,
    /// The name of the context that you would like to use by default
    pub current_context: Option<String>,
}

/// NamedCluster associates name with cluster.
#[derive(Deserialize, Debug, Default)]
pub struct NamedCluster {
    /// Name of cluster
    pub name: String,
    /// Information about how to communicate with a kubernetes cluster
    pub cluster: Option<Cluster>,
}

/// Cluster stores information to connect Kubernetes cluster.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case")]
pub struct Cluster {
    /// The address of the kubernetes cluster (https://hostname:port).
    pub server: Option<String>,
    /// Skips the validity check for the server's certificate.
    pub insecure_skip_tls_verify: Option<bool>,
    /// PEM-encoded certificate authority certificates, base64 encoded
    pub certificate_authority_data: Option<String>,
}

/// NamedAuthInfo associates name with authentication.
#[derive(Deserialize, Debug, Default)]
pub struct NamedAuthInfo {
    /// Name of the user
    pub name: String,
    /// Information that describes identity of the user
    pub user: Option<AuthInfo>,
}

/// AuthInfo stores information to tell cluster who you are.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case")]
pub struct AuthInfo {
    /// PEM-encoded data from a client cert file for TLS, base64 encoded
    pub client_certificate_data: Option<String>,
    /// PEM-encoded data from a client key file for TLS, base64 encoded
    pub client_key_data: Option<String>,
    /// The bearer token for authentication to the kubernetes cluster.
    pub token: Option<SecretString>,
}

/// NamedContext associates name with context.
#[derive(Deserialize, Debug, Default)]
pub struct NamedContext {
    /// Name of the context
    pub name: String,
    /// Associations for the context
    pub context: Option<Context>,
}

/// Context stores tuple of cluster and user information.
#[derive(Deserialize, Debug, Default)]
pub struct Context {
    /// Name of the cluster for this context
    pub cluster: String,
    /// Name of the `AuthInfo` for this context
    pub user: String,
    /// The default namespace to use on unspecified requests
    pub namespace: Option<String>,
}

/// The four values a kubeconfig must provide, decoded from base64
#[derive(Debug)]
pub(crate) struct Credentials {
    pub server: String,
    pub ca_pem: Vec<u8>,
    pub identity_pem: Vec<u8>,
    pub insecure: bool,
    pub token: Option<SecretString>,
    pub namespace: Option<String>,
}

impl Kubeconfig {
    /// Read a kubeconfig from an arbitrary location
    pub fn read_from<P: AsRef<Path>>(path: P) -> Result<Kubeconfig, ConfigError> {
        let data = utils::read_file_to_string(&path)?;
        Self::from_yaml(&data)
    }

    /// Parse a kubeconfig from a YAML string
    pub fn from_yaml(text: &str) -> Result<Kubeconfig, ConfigError> {
        serde_yaml::from_str(text).map_err(ConfigError::ParseYaml)
    }

    // The current context when set and resolvable, else the first cluster and user
    fn selected(&self) -> (Option<&Cluster>, Option<&AuthInfo>, Option<&Context>) {
        let context = self
            .current_context
            .as_deref()
            .and_then(|name| self.contexts.iter().find(|c| c.name == name))
            .and_then(|c| c.context.as_ref());

        let cluster = match context {
            Some(ctx) => self.clusters.iter().find(|c| c.name == ctx.cluster),
            None => self.clusters.first(),
        }
        .and_then(|c| c.cluster.as_ref());
        let user = match context {
            Some(ctx) => self.auth_infos.iter().find(|u| u.name == ctx.user),
            None => self.auth_infos.first(),
        }
        .and_then(|u| u.user.as_ref());
        (cluster, user, context)
    }

    /// Extract the server address and certificate material
    ///
    /// All of `server`, `client-certificate-data`, `client-key-data` and
    /// `certificate-authority-data` are required; the error names the absent ones.
    pub(crate) fn credentials(&self) -> Result<Credentials, ConfigError> {
        let (cluster, user, context) = self.selected();
        let server = cluster.and_then(|c| c.server.as_deref());
        let ca = cluster.and_then(|c| c.certificate_authority_data.as_deref());
        let cert = user.and_then(|u| u.client_certificate_data.as_deref());
        let key = user.and_then(|u| u.client_key_data.as_deref());

        let (Some(server), Some(cert), Some(key), Some(ca)) = (server, cert, key, ca) else {
            let missing = [
                ("server", server),
                ("client-certificate-data", cert),
                ("client-key-data", key),
                ("certificate-authority-data", ca),
            ]
            .into_iter()
            .filter_map(|(field, value)| value.is_none().then_some(field))
            .collect();
            return Err(ConfigError::MissingFields(missing));
        };

        let mut identity_pem = utils::decode_base64_pem(key)?;
        identity_pem.extend(utils::decode_base64_pem(cert)?);
        Ok(Credentials {
            server: server.to_string(),
            ca_pem: utils::decode_base64_pem(ca)?,
            identity_pem,
            insecure: cluster.and_then(|c| c.insecure_skip_tls_verify).unwrap_or(false),
            token: user.and_then(|u| u.token.clone()),
            namespace: context.and_then(|c| c.namespace.clone()),
        })
    }
}
