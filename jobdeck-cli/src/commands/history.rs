//! Job history command handler

use anyhow::Result;
use colored::*;
use jobdeck_core::domain::execution::ExecutionStatus;
use jobdeck_core::domain::history::{ExecutionSummary, JobHistorySummary};
use jobdeck_engine::Session;

use crate::display::{colorize_status, format_seconds, format_time};

pub async fn show_history(
    session: &Session,
    job: &str,
    days: Option<u32>,
    failures: bool,
) -> Result<()> {
    let days = days.unwrap_or(session.config().history_days);
    let history = session.history(job, days).await?;

    print_statistics(job, days, &history);
    if history.executions.is_empty() {
        return Ok(());
    }

    println!();
    for execution in &history.executions {
        print_summary_line(execution);
    }

    if failures {
        print_failures(session, &history).await?;
    }
    Ok(())
}

fn print_statistics(job: &str, days: u32, history: &JobHistorySummary) {
    println!(
        "{}",
        format!("History of {} over the last {} day(s):", job, days).bold()
    );

    if history.is_empty() {
        println!("  {}", "No runs in this window.".yellow());
        return;
    }

    let rate = match history.success_rate {
        Some(rate) if rate >= 90.0 => format!("{:.1}%", rate).green(),
        Some(rate) if rate >= 50.0 => format!("{:.1}%", rate).yellow(),
        Some(rate) => format!("{:.1}%", rate).red(),
        None => "n/a".dimmed(),
    };
    let average = history
        .avg_execution_time_seconds
        .map(format_seconds)
        .unwrap_or_else(|| "n/a".to_string());

    println!("  Runs:         {}", history.total_runs);
    println!("  Success rate: {}", rate);
    println!("  Average time: {}", average);
}

fn print_summary_line(execution: &ExecutionSummary) {
    println!(
        "  {} #{:<6} {:<8} {}  {} passed, {} failed",
        "▸".cyan(),
        execution.build_number,
        colorize_status(execution.status),
        format_time(&execution.start_time).dimmed(),
        execution.passed.to_string().green(),
        execution.failed.to_string().red()
    );
}

/// Fetch and print the failing test cases of each failed run
async fn print_failures(session: &Session, history: &JobHistorySummary) -> Result<()> {
    let failed = history
        .executions
        .iter()
        .filter(|execution| execution.status == ExecutionStatus::Failed);

    for execution in failed {
        println!();
        println!(
            "{}",
            format!("Failures in #{}:", execution.build_number).bold()
        );

        match session.results_for(execution).await {
            Ok(result) => {
                for case in result.data.test_cases.iter().filter(|case| !case.passed()) {
                    println!("  {} {}", "✗".red(), case.name);
                    if let Some(details) = &case.error_details {
                        println!("      {}", details.red());
                    }
                }
            }
            Err(e) => println!("  {}", format!("Could not load results: {}", e).yellow()),
        }
    }
    Ok(())
}
