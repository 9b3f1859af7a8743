//! Build results command handler

use anyhow::{Result, bail};
use colored::*;
use jobdeck_core::domain::result::JobResult;
use jobdeck_engine::{PollUpdate, Session};
use tokio::sync::mpsc;

use crate::display::{colorize_status, print_test_cases};

pub async fn show_results(session: &Session, job: &str, build: &str, watch: bool) -> Result<()> {
    if watch {
        return watch_results(session, job, build).await;
    }

    let result = session.check_results(job, build).await?;
    if result.is_finished() {
        print_result(job, build, &result);
    } else {
        let status = if result.data.status.is_empty() {
            "unknown"
        } else {
            result.data.status.as_str()
        };
        println!(
            "{}",
            format!("{} #{} has not finished yet (engine status: {}).", job, build, status)
                .yellow()
        );
    }
    Ok(())
}

async fn watch_results(session: &Session, job: &str, build: &str) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = session.poller().watch(job, build, move |update| {
        let _ = tx.send(update);
    });

    println!(
        "{}",
        format!(
            "Waiting for {} #{}, polling every {}s (Ctrl-C to stop)...",
            job,
            build,
            session.poller().interval().as_secs()
        )
        .dimmed()
    );

    tokio::select! {
        update = rx.recv() => match update {
            Some(PollUpdate::Finished { result, .. }) => {
                print_result(job, build, &result);
                Ok(())
            }
            Some(PollUpdate::Failed(error)) => {
                if error.is_retryable() {
                    println!(
                        "{}",
                        format!("The CI engine may be briefly unavailable; run `jobdeck results {} {}` again later.", job, build).yellow()
                    );
                }
                Err(error.into())
            }
            None => bail!("Watch of {} #{} ended without a result", job, build),
        },
        _ = tokio::signal::ctrl_c() => {
            handle.cancel();
            println!("{}", "Stopped watching.".yellow());
            Ok(())
        }
    }
}

fn print_result(job: &str, build: &str, result: &JobResult) {
    println!(
        "{} #{}  {}",
        job.bold(),
        build,
        colorize_status(result.outcome())
    );
    print_test_cases(&result.data.test_cases);
}
