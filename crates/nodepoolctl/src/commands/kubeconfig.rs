//! Kubeconfig inspection

use nodepoolctl_core::{ClusterAuth, ClusterClientConfig};
use serde_json::json;

use crate::cli::{KubeconfigCommands, OutputFormat};
use crate::connection::ConnectionManager;
use crate::error::{NodepoolCtlError, Result as CliResult};
use crate::output::{self, print_rows};

pub async fn handle_kubeconfig_command(
    cmd: &KubeconfigCommands,
    conn_mgr: &ConnectionManager,
    profile_name: Option<&str>,
    output_format: OutputFormat,
) -> CliResult<()> {
    match cmd {
        KubeconfigCommands::Inspect { file } => {
            let path = match file {
                Some(file) => file.clone(),
                None => {
                    let name = conn_mgr.config.resolve_profile(profile_name)?;
                    conn_mgr
                        .config
                        .profile(&name)?
                        .kubeconfig
                        .clone()
                        .ok_or_else(|| NodepoolCtlError::InvalidInput {
                            message: format!(
                                "profile '{}' has no kubeconfig; pass a file or set --kubeconfig on the profile",
                                name
                            ),
                        })?
                }
            };
            inspect(&path, output_format)
        }
    }
}

fn auth_kind(auth: &ClusterAuth) -> String {
    match auth {
        ClusterAuth::Token(_) => "token".to_string(),
        ClusterAuth::ClientCertificate { .. } => "client certificate".to_string(),
        ClusterAuth::Exec { command, .. } => format!("exec ({})", command),
        ClusterAuth::None => "none".to_string(),
    }
}

/// Summary of a kubeconfig without any secret material
fn summarize(config: &ClusterClientConfig) -> serde_json::Value {
    json!({
        "context": config.context,
        "server": config.server,
        "namespace": config.namespace,
        "auth": auth_kind(&config.auth),
        "certificate_authority": config.certificate_authority.is_some(),
        "insecure_skip_tls_verify": config.insecure_skip_tls_verify,
    })
}

fn inspect(path: &str, output_format: OutputFormat) -> CliResult<()> {
    let expanded = shellexpand::tilde(path);
    let blob = std::fs::read(expanded.as_ref()).map_err(|e| NodepoolCtlError::FileError {
        path: path.to_string(),
        message: e.to_string(),
    })?;

    let config = ClusterClientConfig::from_kubeconfig(&blob)?;
    let summary = summarize(&config);

    let format = output::OutputFormat::resolve(output_format, false);
    if !format.is_table() {
        output::print_output(summary, format)?;
        return Ok(());
    }

    let rows = [
        ("Context", config.context.clone()),
        ("Server", config.server.clone()),
        (
            "Namespace",
            config.namespace.clone().unwrap_or_else(|| "default".to_string()),
        ),
        ("Auth", auth_kind(&config.auth)),
        (
            "CA bundle",
            if config.certificate_authority.is_some() { "yes" } else { "no" }.to_string(),
        ),
        (
            "Skip TLS verify",
            config.insecure_skip_tls_verify.to_string(),
        ),
    ]
    .into_iter()
    .map(|(field, value)| vec![field.to_string(), value])
    .collect();
    print_rows(&["FIELD", "VALUE"], rows);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_hides_token() {
        let config = ClusterClientConfig {
            context: "ctx".to_string(),
            server: "https://10.0.0.1:6443".to_string(),
            certificate_authority: Some(b"pem".to_vec()),
            insecure_skip_tls_verify: false,
            namespace: None,
            auth: ClusterAuth::Token("very-secret".to_string()),
        };
        let summary = summarize(&config);
        assert_eq!(summary["auth"], "token");
        assert_eq!(summary["certificate_authority"], true);
        assert!(!summary.to_string().contains("very-secret"));
    }

    #[test]
    fn test_auth_kind_exec() {
        let auth = ClusterAuth::Exec {
            command: "oci".to_string(),
            args: vec!["ce".to_string()],
        };
        assert_eq!(auth_kind(&auth), "exec (oci)");
    }
}
