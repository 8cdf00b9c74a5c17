//! Sequential job-application workflow.
//!
//! A run walks `START → REGISTERED → AUTHENTICATED → APPLICATION_CREATED →
//! POLLING → COMPLETED → CONFIRMED`. Each step awaits the previous one and
//! any failure ends the run with a [`WorkflowError`].

use chrono::Utc;
use jobapp_types::{
    ApplicationCreated, ConfirmationRequest, Credentials, LoginResponse, RunEvent, RunReport, Session, WorkflowStage,
};
use tokio::time::Instant;
use tracing::{info, warn};

use crate::{
    config::WorkflowConfig,
    error::{WorkflowError, body_preview},
    executor::{ApplicationApi, decode_reply, poll_until_completed},
};

/// Drives one run of the workflow against an [`ApplicationApi`].
///
/// The runner owns the session for the duration of a run; nothing survives
/// between runs.
pub struct WorkflowRunner<A> {
    api: A,
    config: WorkflowConfig,
}

impl<A: ApplicationApi> WorkflowRunner<A> {
    pub fn new(api: A, config: WorkflowConfig) -> Self {
        Self { api, config }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Execute the workflow to completion.
    pub async fn run(&self) -> Result<RunReport, WorkflowError> {
        self.run_with_observer(|_| {}).await
    }

    /// Execute the workflow and report every stage transition and poll
    /// attempt to `observer`.
    ///
    /// On failure the observer receives [`RunEvent::RunFailed`] naming the
    /// last stage reached, followed by a transition to `FAILED`.
    pub async fn run_with_observer<F>(&self, mut observer: F) -> Result<RunReport, WorkflowError>
    where
        F: FnMut(&RunEvent) + Send,
    {
        let started_at = Instant::now();
        info!(email = %self.config.credentials.email, "workflow run started");
        enter_stage(&mut observer, WorkflowStage::Start);

        let result = self.drive(started_at, &mut observer).await;
        match &result {
            Ok(report) => info!(
                poll_attempts = report.poll_attempts,
                elapsed_ms = report.elapsed_ms,
                "workflow run succeeded"
            ),
            Err(error) => {
                let stage = error.stage();
                warn!(%stage, error = %error, "workflow run failed");
                observer(&RunEvent::RunFailed {
                    stage,
                    message: error.to_string(),
                });
                enter_stage(&mut observer, WorkflowStage::Failed);
            }
        }
        result
    }

    async fn drive<F>(&self, started_at: Instant, observer: &mut F) -> Result<RunReport, WorkflowError>
    where
        F: FnMut(&RunEvent) + Send,
    {
        let credentials = &self.config.credentials;

        self.register(credentials).await?;
        enter_stage(observer, WorkflowStage::Registered);

        let session = self.login(credentials).await?;
        enter_stage(observer, WorkflowStage::Authenticated);

        let poll_url = self.create_application(&session, credentials).await?;
        enter_stage(observer, WorkflowStage::ApplicationCreated);

        enter_stage(observer, WorkflowStage::Polling);
        info!(%poll_url, "polling application status");
        let outcome = poll_until_completed(&self.api, &session, &poll_url, &self.config.timing, |attempt, status| {
            observer(&RunEvent::PollAttempted {
                attempt,
                status: status.cloned(),
            })
        })
        .await?;
        enter_stage(observer, WorkflowStage::Completed);

        self.confirm(&session, &outcome.confirmation_url, started_at).await?;
        enter_stage(observer, WorkflowStage::Confirmed);

        Ok(RunReport {
            poll_url,
            confirmation_url: outcome.confirmation_url,
            poll_attempts: outcome.attempts,
            elapsed_ms: started_at.elapsed().as_millis().try_into().unwrap_or(u64::MAX),
            finished_at: Utc::now(),
        })
    }

    async fn register(&self, credentials: &Credentials) -> Result<(), WorkflowError> {
        info!("registering applicant");
        let reply = self
            .api
            .register(&credentials.register_request())
            .await
            .map_err(|source| WorkflowError::Transport {
                stage: WorkflowStage::Start,
                source,
            })?;

        if !reply.is_success() {
            return Err(WorkflowError::Registration {
                status: reply.status.as_u16(),
                body: body_preview(&reply.body),
            });
        }
        info!(status = %reply.status, "registration accepted");
        Ok(())
    }

    async fn login(&self, credentials: &Credentials) -> Result<Session, WorkflowError> {
        info!("logging in");
        let reply = self
            .api
            .login(&credentials.login_request())
            .await
            .map_err(|source| WorkflowError::Transport {
                stage: WorkflowStage::Registered,
                source,
            })?;

        if !reply.is_success() {
            return Err(WorkflowError::Login {
                status: reply.status.as_u16(),
                body: body_preview(&reply.body),
            });
        }

        let response: LoginResponse = decode_reply(&reply).map_err(|source| WorkflowError::MalformedResponse {
            stage: WorkflowStage::Registered,
            source,
        })?;
        let token = response.token().ok_or(WorkflowError::MissingToken)?;
        info!("login succeeded, token acquired");
        Ok(Session::from_token(token))
    }

    async fn create_application(&self, session: &Session, credentials: &Credentials) -> Result<String, WorkflowError> {
        info!("creating application");
        let reply = self
            .api
            .create_application(session, &credentials.application_request())
            .await
            .map_err(|source| WorkflowError::Transport {
                stage: WorkflowStage::Authenticated,
                source,
            })?;

        if !reply.is_success() {
            return Err(WorkflowError::ApplicationCreation {
                status: reply.status.as_u16(),
                body: body_preview(&reply.body),
            });
        }

        let created: ApplicationCreated = decode_reply(&reply).map_err(|source| WorkflowError::MalformedResponse {
            stage: WorkflowStage::Authenticated,
            source,
        })?;
        let poll_url = created.poll_url().ok_or_else(|| WorkflowError::MissingPollUrl {
            body: body_preview(&reply.body),
        })?;
        info!("application created, poll url received");
        Ok(poll_url.to_string())
    }

    /// Send the confirmation, unless the run already used up its budget.
    async fn confirm(&self, session: &Session, confirmation_url: &str, started_at: Instant) -> Result<(), WorkflowError> {
        let elapsed = started_at.elapsed();
        let budget = self.config.timing.confirmation_budget;
        if elapsed > budget {
            return Err(WorkflowError::ConfirmationTooLate { elapsed, budget });
        }

        info!(elapsed_ms = elapsed.as_millis(), "sending confirmation");
        let reply = self
            .api
            .confirm_application(session, confirmation_url, &ConfirmationRequest::default())
            .await
            .map_err(|source| WorkflowError::Transport {
                stage: WorkflowStage::Completed,
                source,
            })?;

        if !reply.is_success() {
            return Err(WorkflowError::Confirmation {
                status: reply.status.as_u16(),
                body: body_preview(&reply.body),
            });
        }
        info!(status = %reply.status, "confirmation accepted");
        Ok(())
    }
}

fn enter_stage<F>(observer: &mut F, stage: WorkflowStage)
where
    F: FnMut(&RunEvent),
{
    info!(%stage, "stage entered");
    observer(&RunEvent::StageEntered { stage, at: Utc::now() });
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use jobapp_types::ApplicationStatus;
    use reqwest::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::config::RunTiming;
    use crate::testing::{Call, ScriptedApi, completed, incomplete};

    fn config() -> WorkflowConfig {
        WorkflowConfig::new(Credentials::new("ada@example.com", "s3cret", "Ada", "Lovelace"))
    }

    fn stages(events: &[RunEvent]) -> Vec<WorkflowStage> {
        events
            .iter()
            .filter_map(|event| match event {
                RunEvent::StageEntered { stage, .. } => Some(*stage),
                _ => None,
            })
            .collect()
    }

    fn confirm_calls(api: &ScriptedApi) -> usize {
        api.calls().iter().filter(|call| matches!(call, Call::Confirm { .. })).count()
    }

    #[tokio::test(start_paused = true)]
    async fn completes_when_every_step_succeeds() {
        let api = ScriptedApi::default().with_polls([incomplete(), incomplete(), completed("https://svc.test/confirm/1")]);
        let runner = WorkflowRunner::new(api, config());
        let mut events = Vec::new();

        let report = runner.run_with_observer(|event| events.push(event.clone())).await.unwrap();

        assert_eq!(report.poll_url, "https://svc.test/app/1");
        assert_eq!(report.confirmation_url, "https://svc.test/confirm/1");
        assert_eq!(report.poll_attempts, 3);
        assert_eq!(
            stages(&events),
            vec![
                WorkflowStage::Start,
                WorkflowStage::Registered,
                WorkflowStage::Authenticated,
                WorkflowStage::ApplicationCreated,
                WorkflowStage::Polling,
                WorkflowStage::Completed,
                WorkflowStage::Confirmed,
            ]
        );

        let calls = runner.api().calls();
        assert_eq!(
            calls[0],
            Call::Register {
                body: json!({ "email": "ada@example.com", "password1": "s3cret", "password2": "s3cret" })
            }
        );
        assert_eq!(
            calls[1],
            Call::Login {
                body: json!({ "email": "ada@example.com", "password": "s3cret" })
            }
        );
        assert_eq!(
            calls[2],
            Call::CreateApplication {
                authorization: "Token abc123".into(),
                body: json!({ "email": "ada@example.com", "first_name": "Ada", "last_name": "Lovelace" }),
            }
        );
        assert_eq!(
            calls.last(),
            Some(&Call::Confirm {
                url: "https://svc.test/confirm/1".into(),
                authorization: "Token abc123".into(),
                body: json!({ "confirmed": true }),
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn missing_token_stops_before_authenticated_calls() {
        let api = ScriptedApi::default().with_login(StatusCode::OK, r#"{"detail": "welcome"}"#);
        let runner = WorkflowRunner::new(api, config());

        let error = runner.run().await.unwrap_err();

        assert!(matches!(error, WorkflowError::MissingToken), "{error}");
        assert_eq!(error.stage(), WorkflowStage::Registered);
        let calls = runner.api().calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(calls[0], Call::Register { .. }));
        assert!(matches!(calls[1], Call::Login { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn login_rejection_is_distinct_from_missing_token() {
        let api = ScriptedApi::default().with_login(StatusCode::BAD_REQUEST, r#"{"non_field_errors": ["bad credentials"]}"#);
        let runner = WorkflowRunner::new(api, config());

        let error = runner.run().await.unwrap_err();

        assert!(matches!(error, WorkflowError::Login { status: 400, .. }), "{error}");
        assert!(error.to_string().contains("bad credentials"));
    }

    #[tokio::test(start_paused = true)]
    async fn login_body_that_is_not_json_is_malformed() {
        let api = ScriptedApi::default().with_login(StatusCode::OK, "<html>maintenance</html>");
        let runner = WorkflowRunner::new(api, config());

        let error = runner.run().await.unwrap_err();

        assert!(
            matches!(
                error,
                WorkflowError::MalformedResponse {
                    stage: WorkflowStage::Registered,
                    ..
                }
            ),
            "{error}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn poll_timeout_after_thirty_spaced_attempts() {
        let api = ScriptedApi::default().with_polls([incomplete()]);
        let runner = WorkflowRunner::new(api, config());

        let error = runner.run().await.unwrap_err();

        assert!(
            matches!(
                error,
                WorkflowError::PollTimeout {
                    attempts: 30,
                    last_status: Some(ApplicationStatus::Incomplete)
                }
            ),
            "{error}"
        );
        let instants = runner.api().poll_instants();
        assert_eq!(instants.len(), 30);
        assert!(instants.windows(2).all(|pair| pair[1] - pair[0] >= Duration::from_secs(1)));
        assert_eq!(confirm_calls(runner.api()), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn confirmation_is_not_sent_after_budget() {
        let api = ScriptedApi::default()
            .with_polls([completed("https://svc.test/confirm/1")])
            .with_poll_delay(Duration::from_secs(31));
        let runner = WorkflowRunner::new(api, config());
        let mut events = Vec::new();

        let error = runner.run_with_observer(|event| events.push(event.clone())).await.unwrap_err();

        match &error {
            WorkflowError::ConfirmationTooLate { elapsed, budget } => {
                assert!(*elapsed > Duration::from_secs(30), "{elapsed:?}");
                assert_eq!(*budget, Duration::from_secs(30));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(confirm_calls(runner.api()), 0);
        assert!(events.iter().any(|event| matches!(
            event,
            RunEvent::RunFailed {
                stage: WorkflowStage::Completed,
                ..
            }
        )));
        assert_eq!(stages(&events).last(), Some(&WorkflowStage::Failed));
    }

    #[tokio::test(start_paused = true)]
    async fn budget_is_configurable() {
        let api = ScriptedApi::default().with_poll_delay(Duration::from_secs(3));
        let timing = RunTiming {
            confirmation_budget: Duration::from_secs(2),
            ..RunTiming::default()
        };
        let runner = WorkflowRunner::new(api, config().with_timing(timing));

        let error = runner.run().await.unwrap_err();

        assert!(matches!(error, WorkflowError::ConfirmationTooLate { .. }), "{error}");
    }

    #[tokio::test(start_paused = true)]
    async fn confirmation_at_exactly_the_budget_is_sent() {
        let api = ScriptedApi::default().with_poll_delay(Duration::from_secs(30));
        let runner = WorkflowRunner::new(api, config());

        let report = runner.run().await.unwrap();

        assert_eq!(report.elapsed_ms, 30_000);
        assert_eq!(confirm_calls(runner.api()), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn confirmation_one_millisecond_past_budget_is_refused() {
        let api = ScriptedApi::default().with_poll_delay(Duration::from_millis(30_001));
        let runner = WorkflowRunner::new(api, config());

        let error = runner.run().await.unwrap_err();

        match error {
            WorkflowError::ConfirmationTooLate { elapsed, budget } => {
                assert!(elapsed >= Duration::from_millis(30_001), "{elapsed:?}");
                assert!(elapsed < Duration::from_millis(30_100), "{elapsed:?}");
                assert_eq!(budget, Duration::from_secs(30));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(confirm_calls(runner.api()), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn unparsable_poll_body_is_retried() {
        let api = ScriptedApi::default().with_polls([
            (StatusCode::OK, "Internal hiccup".to_string()),
            completed("https://svc.test/confirm/1"),
        ]);
        let runner = WorkflowRunner::new(api, config());
        let mut events = Vec::new();

        let report = runner.run_with_observer(|event| events.push(event.clone())).await.unwrap();

        assert_eq!(report.poll_attempts, 2);
        assert!(events.contains(&RunEvent::PollAttempted {
            attempt: 1,
            status: None
        }));
    }

    #[tokio::test(start_paused = true)]
    async fn non_success_register_aborts_with_status_and_body() {
        let api = ScriptedApi::default().with_register(StatusCode::BAD_REQUEST, r#"{"email": ["already registered"]}"#);
        let runner = WorkflowRunner::new(api, config());

        let error = runner.run().await.unwrap_err();

        assert!(matches!(error, WorkflowError::Registration { status: 400, .. }), "{error}");
        assert!(error.to_string().contains("already registered"));
        assert_eq!(runner.api().calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn non_success_create_aborts_before_polling() {
        let api = ScriptedApi::default().with_create(StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded");
        let runner = WorkflowRunner::new(api, config());

        let error = runner.run().await.unwrap_err();

        assert!(matches!(error, WorkflowError::ApplicationCreation { status: 500, .. }), "{error}");
        assert!(error.to_string().contains("upstream exploded"));
        assert!(runner.api().poll_instants().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn create_without_url_is_an_application_error() {
        let api = ScriptedApi::default().with_create(StatusCode::CREATED, r#"{"id": 42}"#);
        let runner = WorkflowRunner::new(api, config());

        let error = runner.run().await.unwrap_err();

        match &error {
            WorkflowError::MissingPollUrl { body } => assert_eq!(body, r#"{"id": 42}"#),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(error.stage(), WorkflowStage::Authenticated);
    }

    #[tokio::test(start_paused = true)]
    async fn non_success_confirm_is_a_confirmation_error() {
        let api = ScriptedApi::default().with_confirm(StatusCode::CONFLICT, r#"{"detail": "already confirmed"}"#);
        let runner = WorkflowRunner::new(api, config());

        let error = runner.run().await.unwrap_err();

        assert!(matches!(error, WorkflowError::Confirmation { status: 409, .. }), "{error}");
        assert!(error.to_string().contains("already confirmed"));
        assert_eq!(confirm_calls(runner.api()), 1);
    }
}
