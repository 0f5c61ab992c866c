//! Connection management for Container Engine clients

use crate::error::{NodepoolCtlError, Result as CliResult};
use anyhow::Context;
use nodepoolctl_core::{Config, ContainerEngineClient, NodePoolEngine, Profile};
use std::path::PathBuf;
use tracing::{debug, info, trace};

/// Endpoint override, wins over the profile's region and endpoint
pub const ENDPOINT_ENV: &str = "NODEPOOLCTL_ENDPOINT";
/// Region used when no profile is configured
pub const REGION_ENV: &str = "NODEPOOLCTL_REGION";
/// Compartment override
pub const COMPARTMENT_ENV: &str = "NODEPOOLCTL_COMPARTMENT_ID";

/// Connection manager for creating authenticated clients
#[derive(Clone)]
pub struct ConnectionManager {
    pub config: Config,
    pub config_path: Option<PathBuf>,
}

impl ConnectionManager {
    /// Create a new connection manager with a custom config path
    pub fn with_config_path(config: Config, config_path: Option<PathBuf>) -> Self {
        Self {
            config,
            config_path,
        }
    }

    /// Environment overrides only apply without an explicit `--config-file`
    fn use_env_vars(&self) -> bool {
        self.config_path.is_none()
    }

    fn env(&self, name: &str) -> Option<String> {
        if !self.use_env_vars() {
            return None;
        }
        std::env::var(name).ok().filter(|v| !v.trim().is_empty())
    }

    /// Save the configuration to the appropriate location
    pub fn save_config(&self) -> CliResult<()> {
        if let Some(ref path) = self.config_path {
            self.config
                .save_to_path(path)
                .context("Failed to save configuration")?;
        } else {
            self.config.save().context("Failed to save configuration")?;
        }
        Ok(())
    }

    /// Path of the configuration file in use
    pub fn config_file(&self) -> CliResult<PathBuf> {
        match &self.config_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Config::config_path()?),
        }
    }

    /// Resolve the profile for this invocation, with environment overrides applied
    ///
    /// With no profile configured, `NODEPOOLCTL_REGION` (or
    /// `NODEPOOLCTL_ENDPOINT`) plus `NODEPOOLCTL_COMPARTMENT_ID` are enough
    /// to run.
    pub fn profile(&self, profile_name: Option<&str>) -> CliResult<(String, Profile)> {
        let env_endpoint = self.env(ENDPOINT_ENV);
        let env_region = self.env(REGION_ENV);
        let env_compartment = self.env(COMPARTMENT_ENV);

        let (name, mut profile) = match self.config.resolve_profile(profile_name) {
            Ok(name) => {
                let profile = self.config.profile(&name)?.clone();
                (name, profile)
            }
            Err(e) if profile_name.is_none() && env_compartment.is_some() => {
                debug!("No profile configured ({}), using environment only", e);
                ("<environment>".to_string(), Profile::default())
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(endpoint) = env_endpoint {
            debug!("Found {} environment variable", ENDPOINT_ENV);
            profile.endpoint = Some(endpoint);
        }
        if let Some(region) = env_region {
            debug!("Found {} environment variable", REGION_ENV);
            profile.region = Some(region);
        }
        if let Some(compartment) = env_compartment {
            debug!("Found {} environment variable", COMPARTMENT_ENV);
            profile.compartment_id = compartment;
        }

        if profile.compartment_id.trim().is_empty() {
            return Err(NodepoolCtlError::Configuration(format!(
                "profile '{}' has no compartment_id",
                name
            )));
        }

        Ok((name, profile))
    }

    fn client_for(&self, name: &str, profile: &Profile) -> CliResult<ContainerEngineClient> {
        debug!("Creating Container Engine client");
        trace!("Config path: {:?}", self.config_path);

        if !self.use_env_vars() {
            info!("--config-file specified explicitly, ignoring environment variables");
        }

        info!("Using profile: {}", name);

        let mut builder = ContainerEngineClient::builder();
        if let Some(endpoint) = &profile.endpoint {
            builder = builder.endpoint(endpoint);
        } else if let Some(region) = &profile.region {
            builder = builder.region(region);
        }

        match profile.resolve_auth_token(self.use_env_vars())? {
            Some(token) => builder = builder.token(token),
            None => debug!("No auth token configured, sending unauthenticated requests"),
        }

        Ok(builder.build()?)
    }

    /// Create a node pool engine with the profile's polling settings
    pub fn create_engine(
        &self,
        profile_name: Option<&str>,
    ) -> CliResult<NodePoolEngine<ContainerEngineClient>> {
        let (name, profile) = self.profile(profile_name)?;
        let client = self.client_for(&name, &profile)?;
        let polling = profile.polling();

        Ok(NodePoolEngine::new(client, profile.compartment_id.clone())
            .with_wait_options(polling.wait_options()?)
            .with_page_size(polling.page_size))
    }
}
