//! Configuration and profile management for nodepoolctl
//!
// Allow nested config module - this is intentional for the config subsystem

#![allow(clippy::module_inception)]
//!
//! Profiles name a region (or endpoint), a compartment and a token, plus
//! polling settings used when waiting on work requests.
//!
//! # Features
//!
//! - Multiple named profiles
//! - Secure token storage using OS keyring (optional)
//! - Environment variable expansion in config files
//! - Platform-specific config file locations

pub mod config;
pub mod credential;
pub mod error;
pub mod polling;

// Re-export main types for convenience
pub use config::{AUTH_TOKEN_ENV, Config, Profile};
pub use credential::{CredentialStorage, CredentialStore};
pub use error::{ConfigError, Result};
pub use polling::PollingConfig;
