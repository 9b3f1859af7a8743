//! Execution command handlers
//!
//! Listing, triggering and restarting executions, plus following a
//! triggered execution until its results are in.

use anyhow::{Result, bail};
use colored::*;
use jobdeck_core::domain::execution::ExecutionId;
use jobdeck_engine::{Session, WatchEvent};
use tokio::sync::mpsc;

use crate::display::{print_execution_details, print_execution_summary, print_test_cases};
use crate::params::parse_params;

pub async fn list_recent(session: &Session) -> Result<()> {
    let executions = session.list_recent().await?;

    if executions.is_empty() {
        println!("{}", "No recent executions.".yellow());
        return Ok(());
    }

    println!(
        "{}",
        format!("Found {} recent execution(s):", executions.len()).bold()
    );
    println!();
    for execution in &executions {
        print_execution_summary(execution);
    }

    Ok(())
}

/// Trigger a job, filling unspecified parameters with their defaults
pub async fn trigger(session: &Session, job: &str, args: &[String], watch: bool) -> Result<()> {
    let overrides = parse_params(args)?;
    let execution = session.trigger_with_defaults(job, &overrides).await?;

    println!(
        "{} Triggered {} (queue #{})",
        "✓".green(),
        execution.job_name.bold(),
        execution.build_number
    );
    println!();
    print_execution_details(&execution);

    if watch {
        follow(session, execution.id).await?;
    }
    Ok(())
}

pub async fn restart(session: &Session, id: i64, watch: bool) -> Result<()> {
    // Executions from earlier runs are only known through the recent listing
    session.list_recent().await?;

    let execution = session.restart(ExecutionId(id)).await?;

    println!(
        "{} Restarted execution {} as {}",
        "✓".green(),
        id,
        execution.id.to_string().cyan()
    );
    println!();
    print_execution_details(&execution);

    if watch {
        follow(session, execution.id).await?;
    }
    Ok(())
}

/// Wait for a tracked execution to finish, or for Ctrl-C
async fn follow(session: &Session, id: ExecutionId) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    session.watch(id, move |event| {
        let _ = tx.send(event);
    })?;

    println!();
    println!(
        "{}",
        format!(
            "Waiting for results, polling every {}s (Ctrl-C to stop)...",
            session.config().poll_interval.as_secs()
        )
        .dimmed()
    );

    tokio::select! {
        event = rx.recv() => match event {
            Some(WatchEvent::Finished { execution, test_cases }) => {
                println!();
                print_execution_details(&execution);
                print_test_cases(&test_cases);
                Ok(())
            }
            Some(WatchEvent::Failed { error, .. }) => {
                let tracked = session.tracker().get(id).ok().filter(|_| error.is_retryable());
                if let Some(execution) = tracked {
                    println!(
                        "{}",
                        format!(
                            "The CI engine may be briefly unavailable; check again with `jobdeck results {} {}`.",
                            execution.job_name, execution.build_number
                        )
                        .yellow()
                    );
                }
                Err(error.into())
            }
            None => bail!("Watch of execution {} ended without a result", id),
        },
        _ = tokio::signal::ctrl_c() => {
            session.unwatch(id);
            println!("{}", "Stopped watching.".yellow());
            Ok(())
        }
    }
}
