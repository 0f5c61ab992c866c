//! Node pool command implementations

use futures::TryStreamExt;
use nodepoolctl_core::api::{CreateNodePoolDetails, UpdateNodePoolDetails};
use nodepoolctl_core::{
    ContainerEngineApi, ContainerEngineClient, NodePool, NodePoolEngine, NodePoolFilter,
    NodePoolSummary, WorkRequestId, paginate,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, info};

use super::work_request::{cancel_on_ctrl_c, spinner, wait_options_from_args};
use crate::cli::{self, NodePoolCommands, WaitArgs};
use crate::connection::ConnectionManager;
use crate::error::{NodepoolCtlError, Result as CliResult};
use crate::output::{OutputFormat, print_output, print_rows};

type Engine = NodePoolEngine<ContainerEngineClient>;

pub async fn handle_node_pool_command(
    cmd: &NodePoolCommands,
    conn_mgr: &ConnectionManager,
    profile_name: Option<&str>,
    output: cli::OutputFormat,
) -> CliResult<()> {
    let engine = conn_mgr.create_engine(profile_name)?;

    match cmd {
        NodePoolCommands::List { cluster_id, name } => {
            list(&engine, cluster_id, name.as_deref(), output).await
        }
        NodePoolCommands::Get {
            id,
            cluster_id,
            name,
        } => match (id, cluster_id, name) {
            (Some(id), _, _) => {
                let pool = engine.get_node_pool(id).await?;
                print_node_pool(&pool, OutputFormat::resolve(output, false))
            }
            (None, Some(cluster_id), Some(name)) => {
                let pool = engine.get_node_pool_by_name(cluster_id, name).await?;
                print_output(&pool, OutputFormat::resolve(output, false))?;
                Ok(())
            }
            _ => Err(missing_target()),
        },
        NodePoolCommands::Create { data, wait } => create(engine, data, wait, output).await,
        NodePoolCommands::Update { id, data, wait } => {
            update(engine, id, data, wait, output).await
        }
        NodePoolCommands::Delete {
            id,
            cluster_id,
            name,
            wait,
        } => match (id, cluster_id, name) {
            (Some(id), _, _) => delete_by_id(engine, id, wait, output).await,
            (None, Some(cluster_id), Some(name)) => {
                delete_by_name(engine, cluster_id, name, wait, output).await
            }
            _ => Err(missing_target()),
        },
        NodePoolCommands::Ready { id } => {
            let ready = engine.is_node_pool_active(id).await;
            let format = OutputFormat::resolve(output, false);
            if format.is_table() || matches!(output, cli::OutputFormat::Auto) {
                println!(
                    "Node pool {} is {}",
                    id,
                    if ready { "ready" } else { "not ready" }
                );
            } else {
                print_output(json!({ "id": id, "ready": ready }), format)?;
            }
            if ready {
                Ok(())
            } else {
                Err(NodepoolCtlError::NotReady { id: id.clone() })
            }
        }
        NodePoolCommands::Options { cluster_id } => {
            let options = match cluster_id {
                Some(cluster_id) => engine.node_pool_options(cluster_id).await?,
                None => engine.default_node_pool_options().await?,
            };
            let format = OutputFormat::resolve(output, false);
            if format.is_table() {
                let rows = [
                    ("Kubernetes versions", &options.kubernetes_versions),
                    ("Images", &options.images),
                    ("Shapes", &options.shapes),
                ]
                .into_iter()
                .map(|(label, values)| vec![label.to_string(), values.join("\n")])
                .collect();
                print_rows(&["OPTION", "VALUES"], rows);
            } else {
                print_output(&options, format)?;
            }
            Ok(())
        }
    }
}

fn missing_target() -> NodepoolCtlError {
    NodepoolCtlError::InvalidInput {
        message: "either a node pool id or --cluster-id with --name is required".to_string(),
    }
}

async fn list(
    engine: &Engine,
    cluster_id: &str,
    name: Option<&str>,
    output: cli::OutputFormat,
) -> CliResult<()> {
    let pools: Vec<NodePoolSummary> = match name {
        Some(name) => {
            let filter = NodePoolFilter::new(engine.compartment_id())
                .cluster_id(cluster_id)
                .name(name);
            paginate::list_node_pools(engine.api(), filter, engine.page_size())
                .try_collect()
                .await?
        }
        None => engine.all_node_pools(cluster_id).await?,
    };
    debug!("Listed {} node pools in cluster {}", pools.len(), cluster_id);

    let format = OutputFormat::resolve(output, true);
    if !format.is_table() {
        print_output(&pools, format)?;
        return Ok(());
    }

    if pools.is_empty() {
        println!("No node pools found in cluster {}", cluster_id);
        return Ok(());
    }

    let rows = pools
        .iter()
        .map(|p| {
            vec![
                p.id.clone(),
                p.name.clone(),
                p.kubernetes_version.clone().unwrap_or_default(),
                p.node_shape.clone().unwrap_or_default(),
                p.lifecycle_state
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
            ]
        })
        .collect();
    print_rows(&["ID", "NAME", "VERSION", "SHAPE", "STATE"], rows);
    Ok(())
}

fn print_node_pool(pool: &NodePool, format: OutputFormat) -> CliResult<()> {
    if !format.is_table() {
        print_output(pool, format)?;
        return Ok(());
    }

    print_rows(
        &["FIELD", "VALUE"],
        vec![
            vec!["ID".to_string(), pool.id.clone()],
            vec!["Name".to_string(), pool.name.clone()],
            vec![
                "Version".to_string(),
                pool.kubernetes_version.clone().unwrap_or_default(),
            ],
            vec![
                "State".to_string(),
                pool.lifecycle_state
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
            ],
            vec![
                "Nodes".to_string(),
                format!(
                    "{} of {}",
                    pool.nodes.len(),
                    pool.expected_node_count()
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| "?".to_string())
                ),
            ],
        ],
    );

    if !pool.nodes.is_empty() {
        let rows = pool
            .nodes
            .iter()
            .map(|n| {
                vec![
                    n.id.clone(),
                    n.name.clone().unwrap_or_default(),
                    n.private_ip.clone().unwrap_or_default(),
                    n.lifecycle_state.to_string(),
                ]
            })
            .collect();
        print_rows(&["NODE", "NAME", "PRIVATE IP", "STATE"], rows);
    }
    Ok(())
}

async fn create(
    engine: Engine,
    data: &str,
    wait: &WaitArgs,
    output: cli::OutputFormat,
) -> CliResult<()> {
    let mut details: CreateNodePoolDetails = read_json_data(data)?;
    if details.compartment_id.trim().is_empty() {
        details.compartment_id = engine.compartment_id().to_string();
    }

    if !wait.wait {
        let work_request_id = engine.api().create_node_pool(&details).await?;
        return print_started("Node pool creation started", &work_request_id, output);
    }

    let wait = wait_options_from_args(engine.wait_options(), wait)?;
    let engine = engine.with_wait_options(wait);
    let cancel = cancel_on_ctrl_c();
    let (progress, pb) = spinner_for("create");
    let result = engine
        .create_node_pool_and_wait(&details, &cancel, Some(progress))
        .await;
    pb.finish_and_clear();

    let node_pool_id = result?;
    info!("Created node pool {}", node_pool_id);
    print_done(
        &format!("Node pool created: {}", node_pool_id),
        json!({ "id": node_pool_id }),
        output,
    )
}

async fn update(
    engine: Engine,
    id: &str,
    data: &str,
    wait: &WaitArgs,
    output: cli::OutputFormat,
) -> CliResult<()> {
    let details: UpdateNodePoolDetails = read_json_data(data)?;

    if !wait.wait {
        let work_request_id = engine.api().update_node_pool(id, &details).await?;
        return print_started("Node pool update started", &work_request_id, output);
    }

    let wait = wait_options_from_args(engine.wait_options(), wait)?;
    let engine = engine.with_wait_options(wait);
    let cancel = cancel_on_ctrl_c();
    let (progress, pb) = spinner_for("update");
    let result = engine
        .update_node_pool_and_wait(id, &details, &cancel, Some(progress))
        .await;
    pb.finish_and_clear();

    let node_pool_id = result?;
    print_done(
        &format!("Node pool updated: {}", node_pool_id),
        json!({ "id": node_pool_id }),
        output,
    )
}

async fn delete_by_id(
    engine: Engine,
    id: &str,
    wait: &WaitArgs,
    output: cli::OutputFormat,
) -> CliResult<()> {
    if !wait.wait {
        let work_request_id = engine.api().delete_node_pool(id).await?;
        return print_started("Node pool deletion started", &work_request_id, output);
    }

    let wait = wait_options_from_args(engine.wait_options(), wait)?;
    let engine = engine.with_wait_options(wait);
    let cancel = cancel_on_ctrl_c();
    let (progress, pb) = spinner_for("delete");
    let result = engine
        .delete_node_pool_and_wait(id, &cancel, Some(progress))
        .await;
    pb.finish_and_clear();

    result?;
    print_done(
        &format!("Node pool deleted: {}", id),
        json!({ "id": id, "deleted": true }),
        output,
    )
}

async fn delete_by_name(
    engine: Engine,
    cluster_id: &str,
    name: &str,
    wait: &WaitArgs,
    output: cli::OutputFormat,
) -> CliResult<()> {
    if !wait.wait {
        let pool = match engine.get_node_pool_by_name(cluster_id, name).await {
            Ok(pool) => pool,
            Err(e) if e.is_not_found() => {
                return print_done(
                    &format!("No node pool named '{}' in cluster {}", name, cluster_id),
                    json!({ "name": name, "deleted": false }),
                    output,
                );
            }
            Err(e) => return Err(e.into()),
        };
        let work_request_id = engine.api().delete_node_pool(&pool.id).await?;
        return print_started("Node pool deletion started", &work_request_id, output);
    }

    let wait = wait_options_from_args(engine.wait_options(), wait)?;
    let engine = engine.with_wait_options(wait);
    let cancel = cancel_on_ctrl_c();
    let (progress, pb) = spinner_for("delete");
    let result = engine
        .delete_node_pool_by_name(cluster_id, name, &cancel, Some(progress))
        .await;
    pb.finish_and_clear();

    let deleted = result?;
    let message = if deleted {
        format!("Node pool deleted: {}", name)
    } else {
        format!("No node pool named '{}' in cluster {}", name, cluster_id)
    };
    print_done(&message, json!({ "name": name, "deleted": deleted }), output)
}

/// Spinner before the work request id is known
fn spinner_for(operation: &str) -> (nodepoolctl_core::ProgressCallback, indicatif::ProgressBar) {
    spinner(&format!("Starting node pool {}", operation))
}

fn print_started(
    message: &str,
    work_request_id: &WorkRequestId,
    output: cli::OutputFormat,
) -> CliResult<()> {
    let format = OutputFormat::resolve(output, false);
    if matches!(output, cli::OutputFormat::Auto | cli::OutputFormat::Table) {
        println!("{}", message);
        println!("Work request ID: {}", work_request_id);
        println!(
            "To wait for completion, run: nodepoolctl work-request wait {}",
            work_request_id
        );
    } else {
        print_output(json!({ "workRequestId": work_request_id }), format)?;
    }
    Ok(())
}

fn print_done(message: &str, data: serde_json::Value, output: cli::OutputFormat) -> CliResult<()> {
    if matches!(output, cli::OutputFormat::Auto | cli::OutputFormat::Table) {
        println!("{}", message);
    } else {
        print_output(data, OutputFormat::resolve(output, false))?;
    }
    Ok(())
}

/// Parse a JSON request body given inline or as `@path`
pub fn read_json_data<T: DeserializeOwned>(data: &str) -> CliResult<T> {
    let json_str = if let Some(file_path) = data.strip_prefix('@') {
        let expanded = shellexpand::tilde(file_path);
        std::fs::read_to_string(expanded.as_ref()).map_err(|e| NodepoolCtlError::FileError {
            path: file_path.to_string(),
            message: e.to_string(),
        })?
    } else {
        data.to_string()
    };

    serde_json::from_str(&json_str).map_err(|e| NodepoolCtlError::InvalidInput {
        message: format!("Invalid JSON data: {}", e),
    })
}
