//! Indexer run status types.
//!
//! The status endpoint of an indexer reports its overall state and the result
//! of the most recent run (`lastResult`). A run is the "job" the poller waits on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a single indexer run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum JobStatus {
    /// No run has been recorded yet (`lastResult` is null).
    NotStarted,
    InProgress,
    Success,
    TransientFailure,
    PersistentFailure,
    Error,
    Reset,
    /// A status string this client does not know about.
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    /// Returns true once the run can no longer change state.
    ///
    /// Only `NotStarted` and `InProgress` are non-terminal; anything else,
    /// including unknown statuses, ends the poll loop.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::NotStarted | JobStatus::InProgress)
    }

    /// Returns true if the run completed successfully.
    pub fn is_success(&self) -> bool {
        matches!(self, JobStatus::Success)
    }

    /// The wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::NotStarted => "notStarted",
            JobStatus::InProgress => "inProgress",
            JobStatus::Success => "success",
            JobStatus::TransientFailure => "transientFailure",
            JobStatus::PersistentFailure => "persistentFailure",
            JobStatus::Error => "error",
            JobStatus::Reset => "reset",
            JobStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one indexer execution as reported by the service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IndexerExecution {
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub items_processed: i64,
    #[serde(default)]
    pub items_failed: i64,
}

impl IndexerExecution {
    /// Create an execution record with only a status.
    pub fn with_status(status: JobStatus) -> Self {
        Self {
            status,
            error_message: None,
            start_time: None,
            end_time: None,
            items_processed: 0,
            items_failed: 0,
        }
    }
}

/// Body of `GET indexers/{name}/status`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IndexerStatusResponse {
    /// Overall indexer state (`running`, `error`, `unknown`).
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub last_result: Option<IndexerExecution>,
    #[serde(default)]
    pub execution_history: Vec<IndexerExecution>,
}

impl IndexerStatusResponse {
    /// Status of the most recent run, or `NotStarted` when none is recorded.
    pub fn job_status(&self) -> JobStatus {
        self.last_result
            .as_ref()
            .map(|r| r.status)
            .unwrap_or(JobStatus::NotStarted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!JobStatus::NotStarted.is_terminal());
        assert!(!JobStatus::InProgress.is_terminal());
        assert!(JobStatus::Success.is_terminal());
        assert!(JobStatus::Error.is_terminal());
        assert!(JobStatus::TransientFailure.is_terminal());
        assert!(JobStatus::Unknown.is_terminal());
        assert!(JobStatus::Success.is_success());
        assert!(!JobStatus::Error.is_success());
    }

    #[test]
    fn test_parse_status_response() {
        let body = r#"{
            "status": "running",
            "lastResult": {
                "status": "inProgress",
                "errorMessage": null,
                "startTime": "2021-03-01T10:00:00.000Z",
                "endTime": null,
                "itemsProcessed": 120,
                "itemsFailed": 0
            },
            "executionHistory": []
        }"#;

        let response: IndexerStatusResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.status, "running");
        assert_eq!(response.job_status(), JobStatus::InProgress);

        let last = response.last_result.unwrap();
        assert_eq!(last.items_processed, 120);
        assert!(last.start_time.is_some());
        assert!(last.end_time.is_none());
    }

    #[test]
    fn test_missing_last_result_is_not_started() {
        let response: IndexerStatusResponse =
            serde_json::from_str(r#"{"status": "running", "lastResult": null}"#).unwrap();
        assert_eq!(response.job_status(), JobStatus::NotStarted);
    }

    #[test]
    fn test_unknown_status_string() {
        let execution: IndexerExecution =
            serde_json::from_str(r#"{"status": "somethingNew"}"#).unwrap();
        assert_eq!(execution.status, JobStatus::Unknown);
        assert!(execution.status.is_terminal());
    }
}
