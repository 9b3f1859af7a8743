//! Job history domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::execution::{ExecutionId, ExecutionStatus};
use crate::domain::job::Parameters;
use crate::serde_ext::{null_as_default, skip_invalid_rows, string_or_number_or_empty};

/// One execution inside a history window, with its test counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionSummary {
    pub id: ExecutionId,
    #[serde(default)]
    pub job_name: String,
    #[serde(default, deserialize_with = "string_or_number_or_empty")]
    pub build_number: String,
    pub status: ExecutionStatus,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub parameters: Parameters,
    #[serde(default)]
    pub total_tests: u32,
    #[serde(default)]
    pub passed: u32,
    #[serde(default)]
    pub failed: u32,
}

/// Aggregated statistics for one job over a trailing window of days
///
/// `success_rate` and `avg_execution_time_seconds` are `None` when there
/// were no runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobHistorySummary {
    pub total_runs: u32,
    #[serde(default)]
    pub success_rate: Option<f64>,
    #[serde(
        default,
        rename = "avgExecutionTime",
        alias = "avgExecutionTimeSeconds"
    )]
    pub avg_execution_time_seconds: Option<f64>,
    /// Per-run breakdown; rows that do not decode are left out
    #[serde(default, deserialize_with = "skip_invalid_rows")]
    pub executions: Vec<ExecutionSummary>,
}

impl JobHistorySummary {
    /// The valid result for a window with no runs
    pub fn empty() -> Self {
        Self {
            total_runs: 0,
            success_rate: None,
            avg_execution_time_seconds: None,
            executions: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_runs == 0
    }
}
