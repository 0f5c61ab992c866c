//! Polling and paging configuration
//!
//! Stored per profile; controls how work requests are waited on and how
//! many items list calls request per page.

use crate::error::Result;
use crate::progress::WaitOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Polling configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Seconds between work request status queries
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Maximum seconds to wait for a work request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Items requested per page by list calls
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            timeout_secs: default_timeout_secs(),
            page_size: default_page_size(),
        }
    }
}

impl PollingConfig {
    /// Validated wait options for the poller
    pub fn wait_options(&self) -> Result<WaitOptions> {
        WaitOptions::new(
            Duration::from_secs(self.interval_secs),
            Duration::from_secs(self.timeout_secs),
        )
    }
}

// Default value functions for serde
fn default_interval_secs() -> u64 {
    1
}

fn default_timeout_secs() -> u64 {
    600
}

fn default_page_size() -> u32 {
    20
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PollingConfig::default();
        assert_eq!(config.interval_secs, 1);
        assert_eq!(config.timeout_secs, 600);
        assert_eq!(config.page_size, 20);
    }

    #[test]
    fn test_partial_table_uses_defaults() {
        let config: PollingConfig = toml::from_str("timeout_secs = 30").unwrap();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.interval_secs, 1);
    }

    #[test]
    fn test_wait_options_validated() {
        let config = PollingConfig {
            interval_secs: 0,
            ..Default::default()
        };
        assert!(config.wait_options().is_err());

        let options = PollingConfig::default().wait_options().unwrap();
        assert_eq!(options.timeout, Duration::from_secs(600));
    }
}
