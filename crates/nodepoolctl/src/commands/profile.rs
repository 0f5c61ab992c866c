//! Profile management command implementations

use crate::cli::{OutputFormat, ProfileCommands};
use crate::connection::ConnectionManager;
use crate::error::{NodepoolCtlError, Result as CliResult};
use crate::output::{self, print_rows};
use anyhow::Context;
use colored::Colorize;
use nodepoolctl_core::config::CredentialStore;
use nodepoolctl_core::{PollingConfig, Profile};
use serde_json::json;
use std::io::{self, Write};
use tracing::{debug, info, trace};

/// Handle profile management commands
pub async fn handle_profile_command(
    profile_cmd: &ProfileCommands,
    conn_mgr: &mut ConnectionManager,
    profile_name: Option<&str>,
    output_format: OutputFormat,
) -> CliResult<()> {
    use ProfileCommands::*;

    match profile_cmd {
        List => handle_list(conn_mgr, output_format),
        Path => handle_path(conn_mgr, output_format),
        Show { name } => handle_show(conn_mgr, name.as_deref().or(profile_name), output_format),
        Set {
            name,
            region,
            endpoint,
            compartment_id,
            auth_token,
            prompt_token,
            kubeconfig,
            poll_interval,
            poll_timeout,
            page_size,
            #[cfg(feature = "secure-storage")]
            use_keyring,
        } => {
            #[cfg(not(feature = "secure-storage"))]
            let use_keyring = &false;

            let token = match (auth_token, prompt_token) {
                (Some(token), _) => Some(token.clone()),
                (None, true) => Some(
                    rpassword::prompt_password("Auth token: ").context("Failed to read token")?,
                ),
                (None, false) => None,
            };

            let settings = ProfileSettings {
                region: region.clone(),
                endpoint: endpoint.clone(),
                compartment_id: compartment_id.clone(),
                token,
                kubeconfig: kubeconfig.clone(),
                poll_interval: *poll_interval,
                poll_timeout: *poll_timeout,
                page_size: *page_size,
                use_keyring: *use_keyring,
            };
            handle_set(conn_mgr, name, settings)
        }
        Remove { name, force } => handle_remove(conn_mgr, name, *force),
        Default { name } => handle_default(conn_mgr, name),
    }
}

/// Values given to `profile set`
struct ProfileSettings {
    region: Option<String>,
    endpoint: Option<String>,
    compartment_id: String,
    token: Option<String>,
    kubeconfig: Option<String>,
    poll_interval: Option<u64>,
    poll_timeout: Option<u64>,
    page_size: Option<u32>,
    use_keyring: bool,
}

fn handle_list(conn_mgr: &ConnectionManager, output_format: OutputFormat) -> CliResult<()> {
    debug!("Listing all configured profiles");
    let profiles = conn_mgr.config.list_profiles();
    trace!("Found {} profiles", profiles.len());

    let default = conn_mgr.config.default_profile.as_deref();
    let format = output::OutputFormat::resolve(output_format, true);

    if !format.is_table() {
        let config_path = conn_mgr
            .config_file()
            .ok()
            .map(|p| p.to_string_lossy().to_string());
        let list: Vec<_> = profiles
            .iter()
            .map(|(name, profile)| {
                json!({
                    "name": name,
                    "is_default": default == Some(name.as_str()),
                    "region": profile.region,
                    "endpoint": profile.endpoint,
                    "compartment_id": profile.compartment_id,
                    "token_configured": profile.has_auth_token(),
                })
            })
            .collect();
        output::print_output(
            json!({
                "config_path": config_path,
                "profiles": list,
                "count": profiles.len(),
            }),
            format,
        )?;
        return Ok(());
    }

    if let Ok(path) = conn_mgr.config_file() {
        println!("Configuration file: {}", path.display());
        println!();
    }

    if profiles.is_empty() {
        info!("No profiles configured");
        println!("No profiles configured.");
        println!("Use 'nodepoolctl profile set' to create a profile.");
        return Ok(());
    }

    let rows = profiles
        .iter()
        .map(|(name, profile)| {
            let name = if default == Some(name.as_str()) {
                format!("{} (default)", name)
            } else {
                name.to_string()
            };
            vec![
                name,
                location(profile),
                profile.compartment_id.clone(),
                if profile.has_auth_token() { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect();
    print_rows(&["NAME", "REGION / ENDPOINT", "COMPARTMENT", "TOKEN"], rows);
    Ok(())
}

fn location(profile: &Profile) -> String {
    profile
        .endpoint
        .clone()
        .or_else(|| profile.region.clone())
        .unwrap_or_else(|| "-".to_string())
}

fn handle_path(conn_mgr: &ConnectionManager, output_format: OutputFormat) -> CliResult<()> {
    let config_path = conn_mgr.config_file()?;

    match output_format {
        OutputFormat::Json | OutputFormat::Yaml => {
            let format = output::OutputFormat::resolve(output_format, false);
            output::print_output(json!({ "config_path": config_path }), format)?;
        }
        _ => println!("{}", config_path.display()),
    }
    Ok(())
}

/// Show at most the first four characters of a token
fn mask_token(token: &str) -> String {
    if CredentialStore::is_keyring_reference(token) {
        return token.to_string();
    }
    let preview: String = token.chars().take(4).collect();
    format!("{}...", preview)
}

fn handle_show(
    conn_mgr: &ConnectionManager,
    name: Option<&str>,
    output_format: OutputFormat,
) -> CliResult<()> {
    let name = conn_mgr.config.resolve_profile(name)?;
    let profile = conn_mgr.config.profile(&name)?;
    let is_default = conn_mgr.config.default_profile.as_deref() == Some(name.as_str());
    let polling = profile.polling();
    let token_preview = profile.auth_token.as_deref().map(mask_token);

    match output_format {
        OutputFormat::Json | OutputFormat::Yaml => {
            let format = output::OutputFormat::resolve(output_format, false);
            output::print_output(
                json!({
                    "name": name,
                    "is_default": is_default,
                    "region": profile.region,
                    "endpoint": profile.endpoint,
                    "compartment_id": profile.compartment_id,
                    "auth_token_preview": token_preview,
                    "kubeconfig": profile.kubeconfig,
                    "polling": polling,
                }),
                format,
            )?;
        }
        _ => {
            let title = if is_default {
                format!("{} {}", name.bold().cyan(), "(default)".green())
            } else {
                name.bold().cyan().to_string()
            };
            println!("Profile: {}", title);
            if let Some(region) = &profile.region {
                println!("Region: {}", region);
            }
            if let Some(endpoint) = &profile.endpoint {
                println!("Endpoint: {}", endpoint);
            }
            println!("Compartment: {}", profile.compartment_id);
            println!(
                "Auth token: {}",
                token_preview.unwrap_or_else(|| "(not set)".to_string())
            );
            if let Some(kubeconfig) = &profile.kubeconfig {
                println!("Kubeconfig: {}", kubeconfig);
            }
            println!(
                "Polling: every {}s, timeout {}s, page size {}",
                polling.interval_secs, polling.timeout_secs, polling.page_size
            );
        }
    }
    Ok(())
}

fn handle_set(
    conn_mgr: &mut ConnectionManager,
    name: &str,
    settings: ProfileSettings,
) -> CliResult<()> {
    debug!("Setting profile: {}", name);

    if settings.compartment_id.trim().is_empty() {
        return Err(NodepoolCtlError::InvalidInput {
            message: "--compartment-id must not be empty".to_string(),
        });
    }

    let existing = conn_mgr.config.profiles.get(name).cloned();
    let is_new = existing.is_none();
    let mut profile = existing.unwrap_or_default();

    if settings.endpoint.is_some() || settings.region.is_some() {
        profile.region = settings.region;
        profile.endpoint = settings.endpoint;
    }
    profile.compartment_id = settings.compartment_id;
    if let Some(kubeconfig) = settings.kubeconfig {
        profile.kubeconfig = Some(kubeconfig);
    }

    if settings.poll_interval.is_some()
        || settings.poll_timeout.is_some()
        || settings.page_size.is_some()
    {
        let mut polling: PollingConfig = profile.polling();
        if let Some(interval) = settings.poll_interval {
            polling.interval_secs = interval;
        }
        if let Some(timeout) = settings.poll_timeout {
            polling.timeout_secs = timeout;
        }
        if let Some(page_size) = settings.page_size {
            polling.page_size = page_size;
        }
        polling.wait_options()?;
        if polling.page_size == 0 {
            return Err(NodepoolCtlError::InvalidInput {
                message: "--page-size must be greater than zero".to_string(),
            });
        }
        profile.polling = Some(polling);
    }

    if let Some(token) = settings.token {
        if token.trim().is_empty() {
            return Err(NodepoolCtlError::InvalidInput {
                message: "auth token must not be empty".to_string(),
            });
        }
        profile.auth_token = Some(store_token(name, &token, settings.use_keyring)?);
    }

    let config = &mut conn_mgr.config;
    if config.profiles.is_empty() && config.default_profile.is_none() {
        config.default_profile = Some(name.to_string());
    }
    config.set_profile(name.to_string(), profile);
    conn_mgr.save_config()?;

    if is_new {
        println!("Profile '{}' created successfully.", name);
    } else {
        println!("Profile '{}' updated successfully.", name);
    }
    if conn_mgr.config.default_profile.as_deref() == Some(name) {
        println!("Profile '{}' is the default profile.", name);
    }
    Ok(())
}

#[cfg(feature = "secure-storage")]
fn store_token(name: &str, token: &str, use_keyring: bool) -> CliResult<String> {
    if !use_keyring {
        return Ok(token.to_string());
    }
    let reference = CredentialStore::keyring()
        .store_credential(&format!("{}-auth-token", name), token)
        .context("Failed to store token in keyring")?;
    println!("Token stored securely in OS keyring");
    Ok(reference)
}

#[cfg(not(feature = "secure-storage"))]
fn store_token(_name: &str, token: &str, _use_keyring: bool) -> CliResult<String> {
    Ok(token.to_string())
}

fn confirm(prompt: &str) -> CliResult<bool> {
    print!("{} (y/N): ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}

fn handle_remove(conn_mgr: &mut ConnectionManager, name: &str, force: bool) -> CliResult<()> {
    debug!("Removing profile: {}", name);

    if !conn_mgr.config.profiles.contains_key(name) {
        return Err(NodepoolCtlError::ProfileNotFound { name: name.into() });
    }

    let is_default = conn_mgr.config.default_profile.as_deref() == Some(name);
    if is_default {
        println!("Warning: '{}' is the default profile.", name);
    }

    if !force && !confirm(&format!("Are you sure you want to remove profile '{}'?", name))? {
        println!("Profile removal cancelled.");
        return Ok(());
    }

    if let Some(removed) = conn_mgr.config.remove_profile(name)
        && let Some(token) = removed.auth_token
    {
        CredentialStore::new()
            .delete_credential(&token)
            .context("Failed to remove token from keyring")?;
    }
    conn_mgr.save_config()?;

    if is_default {
        println!("Default profile cleared.");
    }
    println!("Profile '{}' removed successfully.", name);
    Ok(())
}

fn handle_default(conn_mgr: &mut ConnectionManager, name: &str) -> CliResult<()> {
    if !conn_mgr.config.profiles.contains_key(name) {
        return Err(NodepoolCtlError::ProfileNotFound { name: name.into() });
    }

    conn_mgr.config.default_profile = Some(name.to_string());
    conn_mgr.save_config()?;
    println!("Default profile set to '{}'.", name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodepoolctl_core::Config;

    fn manager(dir: &tempfile::TempDir) -> ConnectionManager {
        ConnectionManager::with_config_path(
            Config::default(),
            Some(dir.path().join("config.toml")),
        )
    }

    fn settings(compartment: &str) -> ProfileSettings {
        ProfileSettings {
            region: Some("us-ashburn-1".to_string()),
            endpoint: None,
            compartment_id: compartment.to_string(),
            token: None,
            kubeconfig: None,
            poll_interval: None,
            poll_timeout: None,
            page_size: None,
            use_keyring: false,
        }
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("secret-token"), "secr...");
        assert_eq!(mask_token("ab"), "ab...");
        assert_eq!(mask_token("keyring:prod-auth-token"), "keyring:prod-auth-token");
    }

    #[test]
    fn test_first_profile_becomes_default() {
        let dir = tempfile::tempdir().unwrap();
        let mut mgr = manager(&dir);

        handle_set(&mut mgr, "prod", settings("ocid1.compartment.oc1..a")).unwrap();
        handle_set(&mut mgr, "dev", settings("ocid1.compartment.oc1..b")).unwrap();

        assert_eq!(mgr.config.default_profile.as_deref(), Some("prod"));
        let saved = Config::load_from_path(&dir.path().join("config.toml")).unwrap();
        assert_eq!(saved.profiles.len(), 2);
    }

    #[test]
    fn test_set_keeps_existing_token_and_polling() {
        let dir = tempfile::tempdir().unwrap();
        let mut mgr = manager(&dir);

        let mut first = settings("ocid1.compartment.oc1..a");
        first.token = Some("secret".to_string());
        first.poll_interval = Some(5);
        handle_set(&mut mgr, "prod", first).unwrap();

        handle_set(&mut mgr, "prod", settings("ocid1.compartment.oc1..c")).unwrap();

        let profile = mgr.config.profile("prod").unwrap();
        assert_eq!(profile.compartment_id, "ocid1.compartment.oc1..c");
        assert_eq!(profile.auth_token.as_deref(), Some("secret"));
        assert_eq!(profile.polling().interval_secs, 5);
    }

    #[test]
    fn test_set_rejects_zero_interval() {
        let dir = tempfile::tempdir().unwrap();
        let mut mgr = manager(&dir);

        let mut bad = settings("ocid1.compartment.oc1..a");
        bad.poll_interval = Some(0);
        assert!(handle_set(&mut mgr, "prod", bad).is_err());
        assert!(mgr.config.profiles.is_empty());
    }

    #[test]
    fn test_remove_with_force_clears_default() {
        let dir = tempfile::tempdir().unwrap();
        let mut mgr = manager(&dir);
        handle_set(&mut mgr, "prod", settings("ocid1.compartment.oc1..a")).unwrap();

        handle_remove(&mut mgr, "prod", true).unwrap();
        assert!(mgr.config.profiles.is_empty());
        assert_eq!(mgr.config.default_profile, None);
    }

    #[test]
    fn test_default_requires_existing_profile() {
        let dir = tempfile::tempdir().unwrap();
        let mut mgr = manager(&dir);
        assert!(matches!(
            handle_default(&mut mgr, "missing").unwrap_err(),
            NodepoolCtlError::ProfileNotFound { .. }
        ));
    }
}
