//! Error types for nodepoolctl
//!
//! Defines structured error types using thiserror for better error handling and user experience.

use colored::Colorize;
use nodepoolctl_core::{ApiError, ConfigError, CoreError};
use thiserror::Error;

/// Cargo-style diagnostic formatter for CLI errors.
///
/// Produces structured output like:
/// ```text
/// error: profile 'prod' not found
///
///   tip: list available profiles:
///       nodepoolctl profile list
/// ```
pub struct CliDiagnostic {
    message: String,
    detail: Option<String>,
    tips: Vec<(String, Vec<String>)>,
}

impl CliDiagnostic {
    /// Start a new error diagnostic with the given message.
    pub fn error(message: &str) -> Self {
        Self {
            message: message.to_string(),
            detail: None,
            tips: Vec::new(),
        }
    }

    /// Add a detail line below the error message.
    pub fn detail(mut self, text: &str) -> Self {
        self.detail = Some(text.to_string());
        self
    }

    /// Add a tip with optional example commands.
    pub fn tip(mut self, description: &str, commands: &[&str]) -> Self {
        self.tips.push((
            description.to_string(),
            commands.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    /// Print the diagnostic to stderr with colored formatting.
    pub fn print(&self) {
        eprint!("{}{}", "error".red().bold(), ": ".bold());
        eprintln!("{}", self.message);

        if let Some(detail) = &self.detail {
            eprintln!("  {}", detail);
        }

        for (description, commands) in &self.tips {
            eprintln!();
            eprint!("  {}{}", "tip".yellow().bold(), ": ".bold());
            eprintln!("{}", description);
            for cmd in commands {
                eprintln!("      {}", cmd);
            }
        }
    }
}

/// Main error type for the nodepoolctl application
#[derive(Error, Debug)]
pub enum NodepoolCtlError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("No profile configured. Use 'nodepoolctl profile set' to configure a profile.")]
    NoProfileConfigured,

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("{kind} '{id}' not found")]
    NotFound { kind: String, id: String },

    #[error("API error: {message}")]
    ApiError {
        message: String,
        request_id: Option<String>,
    },

    #[error("Work request {status}: {detail}")]
    WorkRequestFailed { status: String, detail: String },

    #[error("Timed out after {seconds} seconds waiting for the work request")]
    Timeout { seconds: u64 },

    #[error("Cancelled")]
    Cancelled,

    #[error("Node pool '{id}' is not ready")]
    NotReady { id: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("File error for '{path}': {message}")]
    FileError { path: String, message: String },

    #[error("Connection error: {message}")]
    ConnectionError { message: String },

    #[error("Output formatting error: {message}")]
    OutputError { message: String },
}

/// Result type for nodepoolctl operations
pub type Result<T> = std::result::Result<T, NodepoolCtlError>;

impl NodepoolCtlError {
    /// Get helpful suggestions for resolving this error
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            NodepoolCtlError::ProfileNotFound { name } => vec![
                "List available profiles: nodepoolctl profile list".to_string(),
                format!(
                    "Create profile '{}': nodepoolctl profile set {} --region <region> --compartment-id <ocid>",
                    name, name
                ),
            ],
            NodepoolCtlError::NoProfileConfigured => vec![
                "Create a profile: nodepoolctl profile set <name> --region <region> --compartment-id <ocid> --prompt-token".to_string(),
                "Or set NODEPOOLCTL_REGION and NODEPOOLCTL_COMPARTMENT_ID".to_string(),
            ],
            NodepoolCtlError::AuthenticationFailed { .. } => vec![
                "Check your token: nodepoolctl profile show".to_string(),
                "Refresh it: nodepoolctl profile set <name> ... --prompt-token".to_string(),
            ],
            NodepoolCtlError::ConnectionError { .. } => vec![
                "Check network connectivity".to_string(),
                "Verify the region or endpoint: nodepoolctl profile show".to_string(),
            ],
            NodepoolCtlError::NotFound { .. } => vec![
                "Verify the id or name is correct".to_string(),
                "Check that you're using the correct profile and compartment".to_string(),
            ],
            NodepoolCtlError::Timeout { .. } => vec![
                "The work request is still running; wait again with: nodepoolctl work-request wait <id>".to_string(),
                "Raise the limit with --wait-timeout or polling.timeout_secs".to_string(),
            ],
            NodepoolCtlError::WorkRequestFailed { .. } => vec![
                "Show the service's error details: nodepoolctl work-request errors <id>".to_string(),
            ],
            NodepoolCtlError::InvalidInput { .. } => vec![
                "Check the command syntax: nodepoolctl <command> --help".to_string(),
            ],
            NodepoolCtlError::FileError { path, .. } => vec![
                format!("Check that file exists: {}", path),
                "Verify file permissions are correct".to_string(),
            ],
            _ => vec![],
        }
    }

    /// Print a cargo-style diagnostic to stderr using colored formatting.
    pub fn print_diagnostic(&self) {
        let mut diag = CliDiagnostic::error(&self.to_string());

        if let NodepoolCtlError::ApiError {
            request_id: Some(request_id),
            ..
        } = self
        {
            diag = diag.detail(&format!("opc-request-id: {}", request_id));
        }

        for suggestion in self.suggestions() {
            diag = diag.tip(&suggestion, &[]);
        }

        diag.print();
    }
}

impl From<ApiError> for NodepoolCtlError {
    fn from(err: ApiError) -> Self {
        if err.is_unauthorized() {
            return NodepoolCtlError::AuthenticationFailed {
                message: err.to_string(),
            };
        }

        let message = err.to_string();
        match err {
            ApiError::Request(e) if e.is_connect() || e.is_timeout() => {
                NodepoolCtlError::ConnectionError { message }
            }
            ApiError::InvalidConfig(reason) => NodepoolCtlError::Configuration(reason),
            ApiError::Service { request_id, .. } => NodepoolCtlError::ApiError {
                message,
                request_id,
            },
            _ => NodepoolCtlError::ApiError {
                message,
                request_id: None,
            },
        }
    }
}

impl From<CoreError> for NodepoolCtlError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Transport(e) => NodepoolCtlError::from(e),
            CoreError::OperationTimedOut(elapsed) => NodepoolCtlError::Timeout {
                seconds: elapsed.as_secs(),
            },
            CoreError::OperationFailed { status, detail } => NodepoolCtlError::WorkRequestFailed {
                status: status.to_string(),
                detail,
            },
            CoreError::EntityNotFound { kind, id } => NodepoolCtlError::NotFound { kind, id },
            CoreError::Cancelled => NodepoolCtlError::Cancelled,
            CoreError::Validation(message) => NodepoolCtlError::InvalidInput { message },
            CoreError::Config(e) => NodepoolCtlError::from(e),
            other => NodepoolCtlError::ApiError {
                message: other.to_string(),
                request_id: None,
            },
        }
    }
}

impl From<ConfigError> for NodepoolCtlError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ProfileNotFound { name } => NodepoolCtlError::ProfileNotFound { name },
            ConfigError::NoProfiles { .. } => NodepoolCtlError::NoProfileConfigured,
            other => NodepoolCtlError::Configuration(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for NodepoolCtlError {
    fn from(err: serde_json::Error) -> Self {
        NodepoolCtlError::OutputError {
            message: format!("JSON error: {}", err),
        }
    }
}

impl From<std::io::Error> for NodepoolCtlError {
    fn from(err: std::io::Error) -> Self {
        NodepoolCtlError::OutputError {
            message: format!("IO error: {}", err),
        }
    }
}

impl From<anyhow::Error> for NodepoolCtlError {
    fn from(err: anyhow::Error) -> Self {
        NodepoolCtlError::Configuration(format!("{:#}", err))
    }
}
