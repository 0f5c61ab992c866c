//! Kubeconfig resolution
//!
//! Turns a kubeconfig blob (as downloaded for a cluster) into the
//! connection settings of its current context. Anything that makes the
//! blob unusable fails fast with [`CoreError::InvalidCredential`], before
//! any remote call is attempted.

use crate::error::{CoreError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use tracing::debug;

/// Raw kubeconfig document. Only the fields needed to reach the API
/// server are read; everything else is ignored.
#[derive(Debug, Deserialize)]
struct Kubeconfig {
    #[serde(default)]
    clusters: Vec<Named<ClusterEntry>>,
    #[serde(default)]
    contexts: Vec<Named<ContextEntry>>,
    #[serde(default)]
    users: Vec<Named<UserEntry>>,
    #[serde(default, rename = "current-context")]
    current_context: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Named<T> {
    name: String,
    #[serde(alias = "cluster", alias = "context", alias = "user")]
    value: T,
}

#[derive(Debug, Deserialize)]
struct ClusterEntry {
    server: Option<String>,
    #[serde(rename = "certificate-authority-data")]
    certificate_authority_data: Option<String>,
    #[serde(default, rename = "insecure-skip-tls-verify")]
    insecure_skip_tls_verify: bool,
}

#[derive(Debug, Deserialize)]
struct ContextEntry {
    cluster: String,
    user: String,
    namespace: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct UserEntry {
    token: Option<String>,
    #[serde(rename = "client-certificate-data")]
    client_certificate_data: Option<String>,
    #[serde(rename = "client-key-data")]
    client_key_data: Option<String>,
    exec: Option<ExecEntry>,
}

#[derive(Debug, Deserialize)]
struct ExecEntry {
    command: String,
    #[serde(default)]
    args: Vec<String>,
}

/// How the client authenticates to the API server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterAuth {
    /// Static bearer token
    Token(String),
    /// PEM client certificate and key
    ClientCertificate { certificate: Vec<u8>, key: Vec<u8> },
    /// Token produced by running a command (e.g. a cloud CLI)
    Exec { command: String, args: Vec<String> },
    /// No credentials in the kubeconfig
    None,
}

/// Connection settings for a Kubernetes API server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterClientConfig {
    pub context: String,
    pub server: String,
    /// PEM-encoded CA bundle, when the kubeconfig pins one
    pub certificate_authority: Option<Vec<u8>>,
    pub insecure_skip_tls_verify: bool,
    pub namespace: Option<String>,
    pub auth: ClusterAuth,
}

fn invalid(message: impl Into<String>) -> CoreError {
    CoreError::InvalidCredential(message.into())
}

fn decode(field: &str, value: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(value.trim())
        .map_err(|e| invalid(format!("{field} is not valid base64: {e}")))
}

impl ClusterClientConfig {
    /// Resolve the current context of a kubeconfig
    ///
    /// Falls back to the only context when `current-context` is unset.
    pub fn from_kubeconfig(blob: &[u8]) -> Result<Self> {
        if blob.iter().all(u8::is_ascii_whitespace) {
            return Err(invalid("kubeconfig is empty"));
        }

        let config: Kubeconfig = serde_yaml::from_slice(blob)
            .map_err(|e| invalid(format!("kubeconfig is not valid YAML: {e}")))?;

        let context_name = match (&config.current_context, config.contexts.as_slice()) {
            (Some(name), _) if !name.is_empty() => name.clone(),
            (_, [only]) => only.name.clone(),
            (_, []) => return Err(invalid("kubeconfig has no contexts")),
            _ => return Err(invalid("kubeconfig has several contexts and no current-context")),
        };

        let context = config
            .contexts
            .iter()
            .find(|c| c.name == context_name)
            .map(|c| &c.value)
            .ok_or_else(|| invalid(format!("context '{context_name}' is not defined")))?;

        let cluster = config
            .clusters
            .iter()
            .find(|c| c.name == context.cluster)
            .map(|c| &c.value)
            .ok_or_else(|| invalid(format!("cluster '{}' is not defined", context.cluster)))?;

        let server = cluster
            .server
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| invalid(format!("cluster '{}' has no server", context.cluster)))?
            .to_string();

        let certificate_authority = cluster
            .certificate_authority_data
            .as_deref()
            .map(|data| decode("certificate-authority-data", data))
            .transpose()?;

        let user = config
            .users
            .iter()
            .find(|u| u.name == context.user)
            .map(|u| &u.value)
            .ok_or_else(|| invalid(format!("user '{}' is not defined", context.user)))?;

        let auth = if let Some(token) = &user.token {
            ClusterAuth::Token(token.clone())
        } else if let (Some(cert), Some(key)) =
            (&user.client_certificate_data, &user.client_key_data)
        {
            ClusterAuth::ClientCertificate {
                certificate: decode("client-certificate-data", cert)?,
                key: decode("client-key-data", key)?,
            }
        } else if let Some(exec) = &user.exec {
            ClusterAuth::Exec {
                command: exec.command.clone(),
                args: exec.args.clone(),
            }
        } else {
            ClusterAuth::None
        };

        debug!("Using kubeconfig context {} ({})", context_name, server);

        Ok(Self {
            context: context_name,
            server,
            certificate_authority,
            insecure_skip_tls_verify: cluster.insecure_skip_tls_verify,
            namespace: context.namespace.clone(),
            auth,
        })
    }
}
