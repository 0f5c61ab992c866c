//! CLI structure and command definitions
//!
//! Defines the command-line interface using clap:
//! 1. Node pool operations (`node-pool` commands)
//! 2. Work request tracking (`work-request` commands)
//! 3. Local setup (`profile`, `kubeconfig`, `completions`)

use clap::{Args, Parser, Subcommand};

pub mod node_pool;

pub use node_pool::*;

/// Container Engine node pool CLI
#[derive(Parser, Debug)]
#[command(name = "nodepoolctl")]
#[command(version, about = "Node pool management CLI for Container Engine clusters")]
#[command(long_about = "
Node pool management CLI for Container Engine clusters

Mutating commands return a work request id right away. Add --wait to
block until the work request finishes.

EXAMPLES:
    # Set up a profile
    nodepoolctl profile set prod --region us-ashburn-1 --compartment-id ocid1.compartment.oc1..xxx --prompt-token

    # List node pools in a cluster
    nodepoolctl node-pool list --cluster-id ocid1.cluster.oc1..xxx

    # Create a node pool and wait for it
    nodepoolctl node-pool create --data @pool.json --wait

    # Check whether every node of a pool is ACTIVE
    nodepoolctl node-pool ready ocid1.nodepool.oc1..xxx

    # Wait on a work request started elsewhere
    nodepoolctl work-request wait ocid1.clustersworkrequest.oc1..xxx --timeout 900

For more help on a specific command, run:
    nodepoolctl <command> --help
")]
pub struct Cli {
    /// Profile to use for this command
    #[arg(long, short, global = true, env = "NODEPOOLCTL_PROFILE")]
    pub profile: Option<String>,

    /// Path to alternate configuration file
    #[arg(long, global = true, env = "NODEPOOLCTL_CONFIG_FILE")]
    pub config_file: Option<String>,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value = "auto")]
    pub output: OutputFormat,

    /// Enable verbose logging
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Tables for lists, JSON for single resources
    Auto,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Human-readable table format
    Table,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Node pool operations
    #[command(subcommand, name = "node-pool", visible_alias = "np")]
    NodePool(NodePoolCommands),

    /// Work request tracking
    #[command(subcommand, name = "work-request", visible_alias = "wr")]
    WorkRequest(WorkRequestCommands),

    /// Profile management
    #[command(subcommand, visible_alias = "prof")]
    #[command(after_help = "EXAMPLES:
    # Create a profile, prompting for the token
    nodepoolctl profile set prod --region us-ashburn-1 --compartment-id ocid1.compartment.oc1..xxx --prompt-token

    # Point a profile at a non-default endpoint
    nodepoolctl profile set dev --endpoint https://ce.internal.example --compartment-id ocid1.compartment.oc1..yyy

    # List all profiles
    nodepoolctl profile list

    # Set the default profile
    nodepoolctl profile default prod
")]
    Profile(ProfileCommands),

    /// Kubeconfig helpers
    #[command(subcommand)]
    Kubeconfig(KubeconfigCommands),

    /// Version information
    #[command(visible_alias = "ver")]
    Version,

    /// Generate shell completions
    #[command(visible_alias = "comp")]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion generation
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell", alias = "power-shell")]
    PowerShell,
    Elvish,
}

/// Common CLI arguments for commands that start a work request
#[derive(Args, Debug, Clone)]
pub struct WaitArgs {
    /// Wait for the work request to finish
    #[arg(long)]
    pub wait: bool,

    /// Maximum time to wait in seconds (defaults to the profile's polling.timeout_secs)
    #[arg(long, requires = "wait")]
    pub wait_timeout: Option<u64>,

    /// Polling interval in seconds (defaults to the profile's polling.interval_secs)
    #[arg(long, requires = "wait")]
    pub wait_interval: Option<u64>,
}

/// Work request commands
#[derive(Subcommand, Debug)]
pub enum WorkRequestCommands {
    /// Show the current status of a work request
    Get {
        /// Work request id
        id: String,
    },

    /// List the errors reported against a work request
    Errors {
        /// Work request id
        id: String,
    },

    /// Poll a work request until it finishes
    #[command(after_help = "EXAMPLES:
    # Wait with the profile's polling settings
    nodepoolctl work-request wait ocid1.clustersworkrequest.oc1..xxx

    # Wait up to 15 minutes, polling every 10 seconds
    nodepoolctl work-request wait ocid1.clustersworkrequest.oc1..xxx --timeout 900 --interval 10

Press Ctrl-C to stop waiting; the work request itself keeps running.
")]
    Wait {
        /// Work request id
        id: String,

        /// Maximum time to wait in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Polling interval in seconds
        #[arg(long)]
        interval: Option<u64>,
    },
}

/// Profile management commands
#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// List all configured profiles
    #[command(visible_alias = "ls")]
    List,

    /// Show the path to the configuration file
    Path,

    /// Show details of a profile
    #[command(visible_alias = "get")]
    Show {
        /// Profile name (defaults to the active profile)
        name: Option<String>,
    },

    /// Set or create a profile
    #[command(visible_alias = "add")]
    Set {
        /// Profile name
        name: String,

        /// Region, e.g. us-ashburn-1
        #[arg(long, required_unless_present = "endpoint")]
        region: Option<String>,

        /// Explicit Container Engine endpoint (overrides the region-derived one)
        #[arg(long)]
        endpoint: Option<String>,

        /// Compartment node pools live in
        #[arg(long)]
        compartment_id: String,

        /// Bearer token
        #[arg(long, conflicts_with = "prompt_token")]
        auth_token: Option<String>,

        /// Prompt for the bearer token instead of passing it on the command line
        #[arg(long)]
        prompt_token: bool,

        /// Path to the cluster kubeconfig
        #[arg(long)]
        kubeconfig: Option<String>,

        /// Seconds between work request polls
        #[arg(long)]
        poll_interval: Option<u64>,

        /// Maximum seconds to wait for a work request
        #[arg(long)]
        poll_timeout: Option<u64>,

        /// Items per page for list calls
        #[arg(long)]
        page_size: Option<u32>,

        /// Store the token in the OS keyring instead of the config file
        #[cfg(feature = "secure-storage")]
        #[arg(long)]
        use_keyring: bool,
    },

    /// Remove a profile
    #[command(visible_alias = "rm")]
    Remove {
        /// Profile name to remove
        name: String,

        /// Don't ask for confirmation
        #[arg(long, short)]
        force: bool,
    },

    /// Set the default profile
    Default {
        /// Profile name
        name: String,
    },
}

/// Kubeconfig commands
#[derive(Subcommand, Debug)]
pub enum KubeconfigCommands {
    /// Show the connection settings a kubeconfig resolves to
    Inspect {
        /// Kubeconfig file (defaults to the profile's kubeconfig)
        file: Option<String>,
    },
}
