//! Terminal rendering shared by the command handlers

use chrono::{DateTime, Local, Utc};
use colored::*;
use jobdeck_core::domain::execution::{Execution, ExecutionStatus};
use jobdeck_core::domain::job::Parameters;
use jobdeck_core::domain::result::TestCase;

/// Colorize an execution status for display
pub fn colorize_status(status: ExecutionStatus) -> ColoredString {
    let status_str = status.as_str();
    match status {
        ExecutionStatus::Queued => status_str.yellow(),
        ExecutionStatus::Running => status_str.cyan(),
        ExecutionStatus::Passed => status_str.green(),
        ExecutionStatus::Failed => status_str.red(),
        ExecutionStatus::Aborted => status_str.dimmed(),
    }
}

pub fn format_time(time: &DateTime<Utc>) -> String {
    time.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Render seconds as `1h 2m 3s`, `2m 3s` or `3.4s`
pub fn format_seconds(seconds: f64) -> String {
    if seconds < 60.0 {
        return format!("{:.1}s", seconds);
    }

    let total = seconds.round() as u64;
    let (hours, minutes, secs) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else {
        format!("{}m {}s", minutes, secs)
    }
}

/// One-line-per-field summary used in listings
pub fn print_execution_summary(execution: &Execution) {
    let build = if execution.build_number.is_empty() {
        "-".to_string()
    } else {
        format!("#{}", execution.build_number)
    };

    println!(
        "  {} {} {}  {}",
        "▸".cyan(),
        execution.job_name.bold(),
        build,
        colorize_status(execution.status)
    );
    println!("    ID:      {}", execution.id.to_string().dimmed());
    println!(
        "    Started: {}",
        format_time(&execution.start_time).dimmed()
    );
    if let Some(duration) = execution.duration() {
        println!(
            "    Took:    {}",
            format_seconds(duration.num_milliseconds() as f64 / 1000.0)
        );
    }
    println!();
}

pub fn print_execution_details(execution: &Execution) {
    println!("{}", "Execution Details:".bold());
    println!("  ID:        {}", execution.id.to_string().cyan());
    println!("  Job:       {}", execution.job_name);
    println!("  Build:     {}", execution.build_number);
    println!("  Status:    {}", colorize_status(execution.status));
    println!("  Started:   {}", format_time(&execution.start_time));

    if let Some(end) = &execution.end_time {
        println!("  Ended:     {}", format_time(end));
    }

    print_parameters(&execution.parameters);
}

pub fn print_parameters(parameters: &Parameters) {
    if parameters.is_empty() {
        return;
    }

    println!("\n{}", "Parameters:".bold());
    for (key, value) in parameters {
        println!("  {} = {}", key.cyan(), value);
    }
}

/// Print test cases followed by a pass/fail tally
pub fn print_test_cases(test_cases: &[TestCase]) {
    if test_cases.is_empty() {
        println!("{}", "No test cases reported.".yellow());
        return;
    }

    println!("\n{}", "Test Cases:".bold());
    println!("{}", "─".repeat(80).dimmed());
    for case in test_cases {
        let mark = if case.passed() {
            "✓".green()
        } else {
            "✗".red()
        };
        println!(
            "  {} {} {}",
            mark,
            case.name,
            format!("({})", format_seconds(case.duration_seconds)).dimmed()
        );

        if let Some(details) = &case.error_details {
            println!("      {}", details.red());
        }
        if let Some(trace) = &case.error_stack_trace {
            for line in trace.lines().take(10) {
                println!("      {}", line.dimmed());
            }
        }
    }
    println!("{}", "─".repeat(80).dimmed());

    let passed = test_cases.iter().filter(|case| case.passed()).count();
    let failed = test_cases.len() - passed;
    println!(
        "  {} passed, {} failed",
        passed.to_string().green(),
        if failed > 0 {
            failed.to_string().red()
        } else {
            failed.to_string().normal()
        }
    );
}
