use std::env;

use crate::error::ConfigError;

pub const SERVICE_HOSTENV: &str = "KUBERNETES_SERVICE_HOST";
pub const SERVICE_PORTENV: &str = "KUBERNETES_SERVICE_PORT";

// Mounted credential files
const SERVICE_TOKENFILE: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";
const SERVICE_CERTFILE: &str = "/var/run/secrets/kubernetes.io/serviceaccount/ca.crt";
const SERVICE_DEFAULT_NS: &str = "/var/run/secrets/kubernetes.io/serviceaccount/namespace";

/// The API server address advertised to pods through the environment
pub fn kube_server() -> Result<String, ConfigError> {
    let missing = || ConfigError::MissingInClusterVariables {
        hostenv: SERVICE_HOSTENV,
        portenv: SERVICE_PORTENV,
    };
    let host = env::var(SERVICE_HOSTENV).map_err(|_| missing())?;
    let port = env::var(SERVICE_PORTENV).map_err(|_| missing())?;
    Ok(server_url(&host, &port))
}

fn server_url(host: &str, port: &str) -> String {
    // ipv6 hosts need brackets
    if host.contains(':') {
        format!("https://[{host}]:{port}")
    } else {
        format!("https://{host}:{port}")
    }
}

/// Returns the service account token mounted into the pod
pub fn load_token() -> Result<String, ConfigError> {
    super::utils::read_file_to_string(SERVICE_TOKENFILE).map(|t| t.trim().to_string())
}

/// Returns certification from specified path in cluster.
pub fn load_cert() -> Result<Vec<Vec<u8>>, ConfigError> {
    let certs = super::utils::read_file(SERVICE_CERTFILE)?;
    super::utils::certs(&certs)
}

/// Returns the default namespace from specified path in cluster.
pub fn load_default_ns() -> Result<String, ConfigError> {
    super::utils::read_file_to_string(SERVICE_DEFAULT_NS).map(|ns| ns.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::server_url;

    #[test]
    fn server_urls() {
        assert_eq!(server_url("10.96.0.1", "443"), "https://10.96.0.1:443");
        assert_eq!(server_url("fd00::1", "6443"), "https://[fd00::1]:6443");
    }
}
