use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{generate, shells};
use nodepoolctl_core::Config;
use tracing::{debug, error, info, trace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod connection;
mod error;
mod output;

use cli::{Cli, Commands};
use connection::ConnectionManager;
use error::NodepoolCtlError;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let conn_mgr = match load_config(&cli) {
        Ok(conn_mgr) => conn_mgr,
        Err(e) => {
            e.print_diagnostic();
            std::process::exit(1);
        }
    };

    if let Err(e) = execute_command(&cli, conn_mgr).await {
        e.print_diagnostic();
        std::process::exit(1);
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<ConnectionManager, NodepoolCtlError> {
    let (config, config_path) = if let Some(config_file) = &cli.config_file {
        let path = std::path::PathBuf::from(shellexpand::tilde(config_file).as_ref());
        debug!("Loading config from explicit path: {:?}", path);
        let config = Config::load_from_path(&path)?;
        (config, Some(path))
    } else {
        debug!("Loading config from default location");
        (Config::load()?, None)
    };
    debug!(
        "Creating ConnectionManager with config_path: {:?}",
        config_path
    );
    Ok(ConnectionManager::with_config_path(config, config_path))
}

fn init_tracing(verbose: u8) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "nodepoolctl=warn,nodepoolctl_core=warn",
            1 => "nodepoolctl=info,nodepoolctl_core=info",
            2 => "nodepoolctl=debug,nodepoolctl_core=debug",
            _ => "nodepoolctl=trace,nodepoolctl_core=trace",
        };
        tracing_subscriber::EnvFilter::new(level)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact(),
        )
        .init();

    debug!("Tracing initialized with verbosity level: {}", verbose);
}

async fn execute_command(cli: &Cli, mut conn_mgr: ConnectionManager) -> Result<(), NodepoolCtlError> {
    trace!("Executing command: {:?}", cli.command);
    info!("Command: {}", format_command(&cli.command));

    let profile = cli.profile.as_deref();
    let start = std::time::Instant::now();
    let result = match &cli.command {
        Commands::Version => {
            debug!("Showing version information");
            match cli.output {
                cli::OutputFormat::Json | cli::OutputFormat::Yaml => {
                    let output_data = serde_json::json!({
                        "version": env!("CARGO_PKG_VERSION"),
                        "name": env!("CARGO_PKG_NAME"),
                    });
                    let fmt = output::OutputFormat::resolve(cli.output, false);
                    output::print_output(&output_data, fmt).map_err(NodepoolCtlError::from)
                }
                _ => {
                    println!("nodepoolctl {}", env!("CARGO_PKG_VERSION"));
                    Ok(())
                }
            }
        }
        Commands::Completions { shell } => {
            debug!("Generating completions for {:?}", shell);
            generate_completions(*shell);
            Ok(())
        }
        Commands::Profile(cmd) => {
            commands::profile::handle_profile_command(cmd, &mut conn_mgr, profile, cli.output)
                .await
        }
        Commands::NodePool(cmd) => {
            commands::node_pool::handle_node_pool_command(cmd, &conn_mgr, profile, cli.output)
                .await
        }
        Commands::WorkRequest(cmd) => {
            commands::work_request::handle_work_request_command(
                cmd, &conn_mgr, profile, cli.output,
            )
            .await
        }
        Commands::Kubeconfig(cmd) => {
            commands::kubeconfig::handle_kubeconfig_command(cmd, &conn_mgr, profile, cli.output)
                .await
        }
    };

    let duration = start.elapsed();
    match &result {
        Ok(_) => info!("Command completed successfully in {:?}", duration),
        Err(e) => error!("Command failed after {:?}: {}", duration, e),
    }

    result
}

fn generate_completions(shell: cli::Shell) {
    let mut cmd = cli::Cli::command();
    let name = cmd.get_name().to_string();

    match shell {
        cli::Shell::Bash => generate(shells::Bash, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::Zsh => generate(shells::Zsh, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::Fish => generate(shells::Fish, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::PowerShell => {
            generate(shells::PowerShell, &mut cmd, name, &mut std::io::stdout())
        }
        cli::Shell::Elvish => generate(shells::Elvish, &mut cmd, name, &mut std::io::stdout()),
    }
}

/// One-line description of a command for logs, with secrets left out
fn format_command(command: &Commands) -> String {
    match command {
        Commands::Version => "version".to_string(),
        Commands::Completions { shell } => format!("completions {:?}", shell),
        Commands::Profile(cmd) => {
            use cli::ProfileCommands::*;
            match cmd {
                List => "profile list".to_string(),
                Path => "profile path".to_string(),
                Show { name } => format!("profile show {}", name.as_deref().unwrap_or("")),
                Set { name, .. } => format!("profile set {} [credentials redacted]", name),
                Remove { name, .. } => format!("profile remove {}", name),
                Default { name } => format!("profile default {}", name),
            }
        }
        Commands::NodePool(cmd) => {
            use cli::NodePoolCommands::*;
            match cmd {
                List { cluster_id, .. } => format!("node-pool list --cluster-id {}", cluster_id),
                Get { id, name, .. } => format!(
                    "node-pool get {}",
                    id.as_deref().or(name.as_deref()).unwrap_or("")
                ),
                Create { wait, .. } => format!("node-pool create [data redacted] wait={}", wait.wait),
                Update { id, wait, .. } => {
                    format!("node-pool update {} [data redacted] wait={}", id, wait.wait)
                }
                Delete { id, name, wait, .. } => format!(
                    "node-pool delete {} wait={}",
                    id.as_deref().or(name.as_deref()).unwrap_or(""),
                    wait.wait
                ),
                Ready { id } => format!("node-pool ready {}", id),
                Options { cluster_id } => format!(
                    "node-pool options {}",
                    cluster_id.as_deref().unwrap_or("all")
                ),
            }
        }
        Commands::WorkRequest(cmd) => format!("work-request {:?}", cmd),
        Commands::Kubeconfig(cmd) => format!("kubeconfig {:?}", cmd),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_format_command_redacts_profile_secrets() {
        let cli = Cli::try_parse_from([
            "nodepoolctl",
            "profile",
            "set",
            "prod",
            "--region",
            "us-ashburn-1",
            "--compartment-id",
            "ocid1.compartment.oc1..a",
            "--auth-token",
            "super-secret",
        ])
        .unwrap();
        let line = format_command(&cli.command);
        assert!(line.contains("prod"));
        assert!(!line.contains("super-secret"));
    }

    #[test]
    fn test_get_requires_id_or_name() {
        assert!(Cli::try_parse_from(["nodepoolctl", "node-pool", "get"]).is_err());
        assert!(
            Cli::try_parse_from(["nodepoolctl", "node-pool", "get", "--name", "workers"]).is_err()
        );
        assert!(
            Cli::try_parse_from([
                "nodepoolctl",
                "node-pool",
                "get",
                "--cluster-id",
                "c1",
                "--name",
                "workers"
            ])
            .is_ok()
        );
    }

    #[test]
    fn test_wait_timeout_requires_wait() {
        assert!(
            Cli::try_parse_from([
                "nodepoolctl",
                "np",
                "delete",
                "pool-1",
                "--wait-timeout",
                "30"
            ])
            .is_err()
        );
    }
}
