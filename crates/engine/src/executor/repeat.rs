//! Polling of the application resource.
//!
//! The loop issues at most `max_poll_attempts` GET requests separated by a
//! constant `poll_interval`, and stops as soon as the application reports
//! `COMPLETED`. Unreadable bodies do not end the loop; a non-2xx status does.

use jobapp_types::{ApplicationSnapshot, ApplicationStatus, Session, WorkflowStage};
use tokio::time::sleep;
use tracing::{info, warn};

use super::{ApplicationApi, decode_reply};
use crate::{
    config::RunTiming,
    error::{WorkflowError, body_preview},
};

/// Result of a poll loop that observed `COMPLETED` with a confirmation URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOutcome {
    pub confirmation_url: String,
    /// Requests issued, including the completing one.
    pub attempts: u32,
}

/// Poll `poll_url` until the application is completed.
///
/// `observer` is called after every attempt with the attempt number and the
/// status read from the body (`None` when the body was unreadable).
///
/// # Errors
/// - [`WorkflowError::PollRequest`] on the first non-2xx reply
/// - [`WorkflowError::PollTimeout`] when attempts run out, or when the
///   completed application carries no confirmation URL
/// - [`WorkflowError::Transport`] when a request cannot be sent
pub async fn poll_until_completed<A, F>(
    api: &A,
    session: &Session,
    poll_url: &str,
    timing: &RunTiming,
    mut observer: F,
) -> Result<PollOutcome, WorkflowError>
where
    A: ApplicationApi + ?Sized,
    F: FnMut(u32, Option<&ApplicationStatus>),
{
    let max_attempts = timing.max_poll_attempts.max(1);
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        let reply = api
            .fetch_application(session, poll_url)
            .await
            .map_err(|source| WorkflowError::Transport {
                stage: WorkflowStage::Polling,
                source,
            })?;

        if !reply.is_success() {
            warn!(attempt = attempts, status = %reply.status, "poll request rejected");
            return Err(WorkflowError::PollRequest {
                attempt: attempts,
                status: reply.status.as_u16(),
                body: body_preview(&reply.body),
            });
        }

        let snapshot = match decode_reply::<ApplicationSnapshot>(&reply) {
            Ok(snapshot) => Some(snapshot),
            Err(error) => {
                warn!(attempt = attempts, error = %error, "poll response unreadable; will retry");
                None
            }
        };
        let status = snapshot.as_ref().and_then(|snapshot| snapshot.status.clone());
        info!(
            attempt = attempts,
            status = status.as_ref().map(ApplicationStatus::as_str).unwrap_or("unknown"),
            "poll attempt"
        );
        observer(attempts, status.as_ref());

        if let Some(snapshot) = snapshot
            && snapshot.is_completed()
        {
            return match snapshot.confirmation_url() {
                Some(confirmation_url) => Ok(PollOutcome {
                    confirmation_url: confirmation_url.to_string(),
                    attempts,
                }),
                None => {
                    warn!(attempt = attempts, "application completed without a confirmation url");
                    Err(WorkflowError::PollTimeout {
                        attempts,
                        last_status: status,
                    })
                }
            };
        }

        if attempts >= max_attempts {
            warn!(attempts, "poll guard tripped");
            return Err(WorkflowError::PollTimeout {
                attempts,
                last_status: status,
            });
        }

        sleep(timing.poll_interval).await;
    }
}
