//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod catalog;
mod execution;
mod history;
mod results;

use anyhow::Result;
use clap::Subcommand;
use jobdeck_engine::Session;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// List triggerable jobs and their parameters
    Jobs,
    /// List clusters available to cluster parameters
    Clusters,
    /// List recent executions
    Recent,
    /// Trigger a job
    Trigger {
        /// Job name, as listed by `jobs`
        job: String,

        /// Parameter override, repeatable (key=value)
        #[arg(short, long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,

        /// Wait for the results
        #[arg(short, long)]
        watch: bool,
    },
    /// Trigger a new run of a recent execution with the same parameters
    Restart {
        /// Execution ID, as listed by `recent`
        id: i64,

        /// Wait for the results
        #[arg(short, long)]
        watch: bool,
    },
    /// Show the test results of a build
    Results {
        /// Job name
        job: String,

        /// Build number
        build: String,

        /// Keep polling until the build finishes
        #[arg(short, long)]
        watch: bool,
    },
    /// Show run statistics for a job
    History {
        /// Job name
        job: String,

        /// Window size in days [default: JOBDECK_HISTORY_DAYS or 7]
        #[arg(short, long)]
        days: Option<u32>,

        /// Also show the failing test cases of failed runs
        #[arg(long)]
        failures: bool,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, session: &Session) -> Result<()> {
    match command {
        Commands::Jobs => catalog::list_jobs(session).await,
        Commands::Clusters => catalog::list_clusters(session).await,
        Commands::Recent => execution::list_recent(session).await,
        Commands::Trigger { job, params, watch } => {
            execution::trigger(session, &job, &params, watch).await
        }
        Commands::Restart { id, watch } => execution::restart(session, id, watch).await,
        Commands::Results { job, build, watch } => {
            results::show_results(session, &job, &build, watch).await
        }
        Commands::History {
            job,
            days,
            failures,
        } => history::show_history(session, &job, days, failures).await,
    }
}
