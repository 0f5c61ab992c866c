//! Work request commands and the shared `--wait` machinery
//!
//! Mutating node pool commands hand back a work request id. Waiting on it
//! wraps the core poller with a spinner on stderr and cancels cleanly on
//! Ctrl-C; the work request itself keeps running on the service side.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use nodepoolctl_core::{
    ContainerEngineApi, ProgressCallback, ProgressEvent, WaitOptions, WorkRequest, WorkRequestId,
    WorkRequestStatus,
};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cli::{self, WaitArgs, WorkRequestCommands};
use crate::connection::ConnectionManager;
use crate::error::{NodepoolCtlError, Result as CliResult};
use crate::output::{OutputFormat, print_output, print_rows};

pub async fn handle_work_request_command(
    cmd: &WorkRequestCommands,
    conn_mgr: &ConnectionManager,
    profile_name: Option<&str>,
    output: cli::OutputFormat,
) -> CliResult<()> {
    let engine = conn_mgr.create_engine(profile_name)?;

    match cmd {
        WorkRequestCommands::Get { id } => {
            let id = parse_id(id)?;
            let work_request = engine.api().get_work_request(&id).await?;
            print_work_request(&work_request, OutputFormat::resolve(output, false))
        }
        WorkRequestCommands::Errors { id } => {
            let id = parse_id(id)?;
            let errors = engine.api().list_work_request_errors(&id).await?;
            let format = OutputFormat::resolve(output, true);
            if format.is_table() {
                if errors.is_empty() {
                    println!("No errors reported for work request {}", id);
                    return Ok(());
                }
                let rows = errors
                    .iter()
                    .map(|e| {
                        vec![
                            e.code.clone(),
                            e.message.clone(),
                            e.timestamp.map(|t| t.to_rfc3339()).unwrap_or_default(),
                        ]
                    })
                    .collect();
                print_rows(&["CODE", "MESSAGE", "TIMESTAMP"], rows);
                Ok(())
            } else {
                Ok(print_output(&errors, format)?)
            }
        }
        WorkRequestCommands::Wait {
            id,
            timeout,
            interval,
        } => {
            let id = parse_id(id)?;
            let wait = wait_options(engine.wait_options(), *timeout, *interval)?;
            let engine = engine.with_wait_options(wait);

            let cancel = cancel_on_ctrl_c();
            let (progress, spinner) = spinner(&format!("Waiting for work request {}", id));
            let result = engine
                .wait_for_work_request(&id, &cancel, Some(progress))
                .await;
            spinner.finish_and_clear();

            let work_request = result?;
            print_work_request(&work_request, OutputFormat::resolve(output, false))
        }
    }
}

pub fn parse_id(id: &str) -> CliResult<WorkRequestId> {
    WorkRequestId::new(id).ok_or_else(|| NodepoolCtlError::InvalidInput {
        message: "work request id must not be empty".to_string(),
    })
}

/// Resolve wait settings, command-line values over the profile's
pub fn wait_options(
    defaults: &WaitOptions,
    timeout_secs: Option<u64>,
    interval_secs: Option<u64>,
) -> CliResult<WaitOptions> {
    let timeout = timeout_secs.map_or(defaults.timeout, Duration::from_secs);
    let interval = interval_secs.map_or(defaults.interval, Duration::from_secs);
    Ok(WaitOptions::new(interval, timeout)?)
}

/// Wait settings for a mutating command's `--wait` flags
pub fn wait_options_from_args(defaults: &WaitOptions, args: &WaitArgs) -> CliResult<WaitOptions> {
    wait_options(defaults, args.wait_timeout, args.wait_interval)
}

/// A token cancelled by the first Ctrl-C
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let cancel = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Ctrl-C received, cancelling wait");
            cancel.cancel();
        }
    });
    token
}

/// Spinner on stderr, driven by the poller's progress events
pub fn spinner(message: &str) -> (ProgressCallback, ProgressBar) {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(message.to_string());

    let pb_clone = pb.clone();
    let callback: ProgressCallback = Box::new(move |event| match event {
        ProgressEvent::Started { work_request_id } => {
            pb_clone.set_message(format!("Work request {} accepted", work_request_id));
        }
        ProgressEvent::Polling {
            work_request_id,
            status,
            ..
        } => {
            pb_clone.set_message(format!(
                "Work request {}: {}",
                work_request_id,
                format_status(&status)
            ));
        }
        ProgressEvent::Completed {
            work_request_id, ..
        } => {
            pb_clone.set_message(format!(
                "Work request {}: {}",
                work_request_id,
                format_status(&WorkRequestStatus::Succeeded)
            ));
        }
        ProgressEvent::Failed {
            work_request_id,
            error,
        } => {
            pb_clone.set_message(format!("Work request {} failed: {}", work_request_id, error));
        }
    });

    (callback, pb)
}

/// Status with a leading icon
pub fn format_status(status: &WorkRequestStatus) -> String {
    match status {
        WorkRequestStatus::Succeeded => format!("\u{2713} {}", status),
        WorkRequestStatus::Failed => format!("\u{2717} {}", status),
        WorkRequestStatus::Canceled | WorkRequestStatus::Canceling => {
            format!("\u{2298} {}", status)
        }
        WorkRequestStatus::InProgress | WorkRequestStatus::Accepted => {
            format!("\u{21bb} {}", status)
        }
        other => other.to_string(),
    }
}

pub fn print_work_request(work_request: &WorkRequest, format: OutputFormat) -> CliResult<()> {
    if !format.is_table() {
        return Ok(print_output(work_request, format)?);
    }

    let accepted = work_request.time_accepted.map(|t| t.to_rfc3339());
    let finished = work_request.time_finished.map(|t| t.to_rfc3339());

    print_rows(
        &["FIELD", "VALUE"],
        vec![
            vec!["ID".to_string(), work_request.id.clone()],
            vec![
                "Operation".to_string(),
                work_request.operation_type.clone().unwrap_or_default(),
            ],
            vec!["Status".to_string(), format_status(&work_request.status)],
            vec!["Accepted".to_string(), accepted.unwrap_or_else(|| "-".to_string())],
            vec!["Finished".to_string(), finished.unwrap_or_else(|| "-".to_string())],
        ],
    );

    if !work_request.resources.is_empty() {
        let rows = work_request
            .resources
            .iter()
            .map(|r| {
                vec![
                    r.entity_type.clone(),
                    r.action_type.to_string(),
                    r.identifier.clone(),
                ]
            })
            .collect();
        print_rows(&["ENTITY", "ACTION", "IDENTIFIER"], rows);
    }

    Ok(())
}
