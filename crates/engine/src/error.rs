//! Terminal failures of a workflow run.

use std::time::Duration;

use jobapp_api::ApiError;
use jobapp_types::{ApplicationStatus, WorkflowStage};
use jobapp_util::http::{JsonParseError, RESPONSE_PREVIEW_LIMIT, status_error_message, truncate_response_preview};
use jobapp_util::redact_sensitive;
use thiserror::Error;

/// Why a run stopped. Every variant is terminal; nothing is retried except
/// the polling loop itself.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("registration failed: HTTP {status}: {body}")]
    Registration { status: u16, body: String },

    #[error("login failed: HTTP {status}: {body}")]
    Login { status: u16, body: String },

    #[error("login response did not contain a token")]
    MissingToken,

    #[error("application creation failed: HTTP {status}: {body}")]
    ApplicationCreation { status: u16, body: String },

    #[error("application creation response did not contain a poll url: {body}")]
    MissingPollUrl { body: String },

    #[error("poll attempt {attempt} failed: HTTP {status}: {body}")]
    PollRequest { attempt: u32, status: u16, body: String },

    #[error(
        "application did not reach COMPLETED with a confirmation url after {attempts} poll attempt(s) (last status: {})",
        describe_status(.last_status)
    )]
    PollTimeout {
        attempts: u32,
        last_status: Option<ApplicationStatus>,
    },

    #[error(
        "confirmation too late: {}ms elapsed, budget is {}ms",
        .elapsed.as_millis(),
        .budget.as_millis()
    )]
    ConfirmationTooLate { elapsed: Duration, budget: Duration },

    #[error("confirmation failed: HTTP {status}: {body}")]
    Confirmation { status: u16, body: String },

    #[error("malformed response after {stage}: {source}")]
    MalformedResponse {
        stage: WorkflowStage,
        #[source]
        source: ResponseDecodeError,
    },

    #[error("request failed after {stage}: {source}")]
    Transport {
        stage: WorkflowStage,
        #[source]
        source: ApiError,
    },
}

impl WorkflowError {
    /// Last stage the run reached before this failure.
    pub fn stage(&self) -> WorkflowStage {
        match self {
            WorkflowError::Registration { .. } => WorkflowStage::Start,
            WorkflowError::Login { .. } | WorkflowError::MissingToken => WorkflowStage::Registered,
            WorkflowError::ApplicationCreation { .. } | WorkflowError::MissingPollUrl { .. } => {
                WorkflowStage::Authenticated
            }
            WorkflowError::PollRequest { .. } | WorkflowError::PollTimeout { .. } => WorkflowStage::Polling,
            WorkflowError::ConfirmationTooLate { .. } | WorkflowError::Confirmation { .. } => WorkflowStage::Completed,
            WorkflowError::MalformedResponse { stage, .. } | WorkflowError::Transport { stage, .. } => *stage,
        }
    }

    /// HTTP status carried by the failure, if it came from a response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            WorkflowError::Registration { status, .. }
            | WorkflowError::Login { status, .. }
            | WorkflowError::ApplicationCreation { status, .. }
            | WorkflowError::PollRequest { status, .. }
            | WorkflowError::Confirmation { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Operator hint for well-known HTTP statuses.
    pub fn hint(&self) -> Option<String> {
        self.status_code().and_then(status_error_message)
    }
}

/// A 2xx response whose body could not be read as the expected payload.
#[derive(Debug, Error)]
pub enum ResponseDecodeError {
    #[error(transparent)]
    Json(#[from] JsonParseError),

    #[error("unexpected response shape: {source}. body preview: {body_preview}")]
    Shape {
        #[source]
        source: serde_json::Error,
        body_preview: String,
    },
}

/// Redacted, whitespace-collapsed excerpt of a response body for error
/// messages and logs.
pub fn body_preview(body: &str) -> String {
    truncate_response_preview(&redact_sensitive(body), RESPONSE_PREVIEW_LIMIT)
}

fn describe_status(status: &Option<ApplicationStatus>) -> String {
    status
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "unknown".to_string())
}
