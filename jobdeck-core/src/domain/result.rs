//! Test result domain types

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::execution::ExecutionStatus;
use crate::serde_ext::null_as_default;

/// Outcome of a single test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestStatus {
    Passed,
    Failed,
}

impl<'de> Deserialize<'de> for TestStatus {
    /// Anything other than `PASSED` counts as a failure
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.eq_ignore_ascii_case("passed") {
            Ok(Self::Passed)
        } else {
            Ok(Self::Failed)
        }
    }
}

/// A single test case reported by a finished build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub name: String,
    pub status: TestStatus,
    #[serde(rename = "duration", alias = "durationSeconds", default)]
    pub duration_seconds: f64,
    #[serde(
        default,
        alias = "error_details",
        skip_serializing_if = "Option::is_none"
    )]
    pub error_details: Option<String>,
    #[serde(
        default,
        alias = "error_stack_trace",
        skip_serializing_if = "Option::is_none"
    )]
    pub error_stack_trace: Option<String>,
}

impl TestCase {
    pub fn passed(&self) -> bool {
        self.status == TestStatus::Passed
    }
}

/// Payload of a job results response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobResultData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, alias = "testCases", deserialize_with = "null_as_default")]
    pub test_cases: Vec<TestCase>,
}

/// Decoded response of the job results endpoint
///
/// `success == false` is an application-level failure, distinct from a
/// build that is still running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: JobResultData,
}

impl JobResult {
    /// Remote status, when it is one we recognize
    pub fn remote_status(&self) -> Option<ExecutionStatus> {
        self.data.status.parse().ok()
    }

    /// Whether the build has finished
    ///
    /// Any reported test case means the build is done, whatever the status
    /// string says.
    pub fn is_finished(&self) -> bool {
        !self.data.test_cases.is_empty()
            || self.remote_status().is_some_and(ExecutionStatus::is_terminal)
    }

    /// Terminal status implied by a finished result
    pub fn outcome(&self) -> ExecutionStatus {
        let remote = self.remote_status();
        if remote == Some(ExecutionStatus::Aborted) {
            return ExecutionStatus::Aborted;
        }
        if remote == Some(ExecutionStatus::Failed) || self.failed_count() > 0 {
            return ExecutionStatus::Failed;
        }
        ExecutionStatus::Passed
    }

    /// Human-readable failure reason for `success == false`
    pub fn failure_message(&self) -> String {
        self.message
            .clone()
            .filter(|m| !m.is_empty())
            .or_else(|| Some(self.data.status.clone()).filter(|s| !s.is_empty()))
            .unwrap_or_else(|| "Failed to fetch test results".to_string())
    }

    pub fn passed_count(&self) -> usize {
        self.data.test_cases.iter().filter(|c| c.passed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.data.test_cases.len() - self.passed_count()
    }
}
