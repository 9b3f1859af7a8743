//! Execution domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::job::Parameters;
use crate::serde_ext::{null_as_default, string_or_number_or_empty};

/// Client-side identifier of an execution
///
/// Distinct from the build number, which the CI engine assigns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionId(pub i64);

impl fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ExecutionId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(ExecutionId)
    }
}

/// Execution lifecycle status
///
/// `Queued` and `Running` are non-terminal; the rest are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ExecutionStatus {
    Queued,
    Running,
    Passed,
    Failed,
    Aborted,
}

impl ExecutionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Passed | Self::Failed | Self::Aborted)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "QUEUED",
            Self::Running => "RUNNING",
            Self::Passed => "PASSED",
            Self::Failed => "FAILED",
            Self::Aborted => "ABORTED",
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for a status string the engine is not known to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown execution status: {:?}", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for ExecutionStatus {
    type Err = UnknownStatus;

    /// Parse a status, accepting the engine's native spellings as well
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "QUEUED" | "PENDING" => Ok(Self::Queued),
            "RUNNING" | "IN_PROGRESS" | "BUILDING" => Ok(Self::Running),
            "PASSED" | "SUCCESS" => Ok(Self::Passed),
            "FAILED" | "FAILURE" | "UNSTABLE" => Ok(Self::Failed),
            "ABORTED" | "CANCELLED" | "NOT_BUILT" => Ok(Self::Aborted),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

impl TryFrom<String> for ExecutionStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ExecutionStatus> for String {
    fn from(status: ExecutionStatus) -> Self {
        status.as_str().to_string()
    }
}

/// One tracked run of a job, from trigger to terminal result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    pub id: ExecutionId,
    pub job_name: String,
    #[serde(default, deserialize_with = "string_or_number_or_empty")]
    pub build_number: String,
    pub status: ExecutionStatus,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub parameters: Parameters,
}

impl Execution {
    /// A freshly triggered execution waiting in the engine's queue
    pub fn queued(
        id: ExecutionId,
        job_name: impl Into<String>,
        build_number: impl Into<String>,
        parameters: Parameters,
        start_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            job_name: job_name.into(),
            build_number: build_number.into(),
            status: ExecutionStatus::Queued,
            start_time,
            end_time: None,
            parameters,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Whether this execution is the run `build_number` of `job_name`
    pub fn is_build(&self, job_name: &str, build_number: &str) -> bool {
        self.job_name == job_name && self.build_number == build_number
    }

    /// Wall-clock duration, once the execution has ended
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.end_time.map(|end| end - self.start_time)
    }
}
