//! Lifecycle types for a single workflow run.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ApplicationStatus;

/// Position of a run in its linear state machine.
///
/// `Start → Registered → Authenticated → ApplicationCreated → Polling →
/// Completed → Confirmed`; any stage may move to the terminal `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStage {
    Start,
    Registered,
    Authenticated,
    ApplicationCreated,
    Polling,
    Completed,
    Confirmed,
    Failed,
}

impl WorkflowStage {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowStage::Start => "START",
            WorkflowStage::Registered => "REGISTERED",
            WorkflowStage::Authenticated => "AUTHENTICATED",
            WorkflowStage::ApplicationCreated => "APPLICATION_CREATED",
            WorkflowStage::Polling => "POLLING",
            WorkflowStage::Completed => "COMPLETED",
            WorkflowStage::Confirmed => "CONFIRMED",
            WorkflowStage::Failed => "FAILED",
        }
    }
}

impl fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress notifications emitted while a run executes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunEvent {
    /// The run moved into a new stage.
    StageEntered { stage: WorkflowStage, at: DateTime<Utc> },
    /// A poll request finished. `status` is `None` when the body could not be
    /// parsed or carried no status.
    PollAttempted {
        attempt: u32,
        status: Option<ApplicationStatus>,
    },
    /// The run stopped. `stage` is the last stage reached before failing.
    RunFailed { stage: WorkflowStage, message: String },
}

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub poll_url: String,
    pub confirmation_url: String,
    /// Number of poll requests issued, including the completing one.
    pub poll_attempts: u32,
    /// Wall-clock time from start until the confirmation was accepted.
    pub elapsed_ms: u64,
    pub finished_at: DateTime<Utc>,
}
