//! Scripted [`ApplicationApi`] used by the engine's unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use jobapp_api::{ApiError, ApiReply};
use jobapp_types::{ApplicationRequest, ConfirmationRequest, LoginRequest, RegisterRequest, Session};
use reqwest::StatusCode;
use serde_json::{Value, json};
use tokio::time::Instant;

use crate::executor::ApplicationApi;

pub(crate) type Reply = (StatusCode, String);

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Register { body: Value },
    Login { body: Value },
    CreateApplication { authorization: String, body: Value },
    Poll { url: String, authorization: String, at: Instant },
    Confirm { url: String, authorization: String, body: Value },
}

pub(crate) fn incomplete() -> Reply {
    (StatusCode::OK, json!({ "status": "INCOMPLETE" }).to_string())
}

pub(crate) fn completed(confirmation_url: &str) -> Reply {
    (
        StatusCode::OK,
        json!({ "status": "COMPLETED", "confirmation_url": confirmation_url }).to_string(),
    )
}

/// Replies with fixed payloads per endpoint and records every call.
///
/// Poll replies are consumed in order; the last one repeats forever.
pub(crate) struct ScriptedApi {
    register: Reply,
    login: Reply,
    create: Reply,
    polls: Mutex<VecDeque<Reply>>,
    confirm: Reply,
    poll_delay: Duration,
    calls: Mutex<Vec<Call>>,
}

impl Default for ScriptedApi {
    fn default() -> Self {
        Self {
            register: (StatusCode::CREATED, json!({ "email": "ada@example.com" }).to_string()),
            login: (StatusCode::OK, json!({ "token": "abc123" }).to_string()),
            create: (StatusCode::CREATED, json!({ "url": "https://svc.test/app/1" }).to_string()),
            polls: Mutex::new(VecDeque::from([completed("https://svc.test/confirm/1")])),
            confirm: (StatusCode::OK, json!({ "confirmed": true }).to_string()),
            poll_delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedApi {
    pub(crate) fn with_register(mut self, status: StatusCode, body: &str) -> Self {
        self.register = (status, body.to_string());
        self
    }

    pub(crate) fn with_login(mut self, status: StatusCode, body: &str) -> Self {
        self.login = (status, body.to_string());
        self
    }

    pub(crate) fn with_create(mut self, status: StatusCode, body: &str) -> Self {
        self.create = (status, body.to_string());
        self
    }

    pub(crate) fn with_confirm(mut self, status: StatusCode, body: &str) -> Self {
        self.confirm = (status, body.to_string());
        self
    }

    pub(crate) fn with_polls(self, replies: impl IntoIterator<Item = Reply>) -> Self {
        *self.polls.lock().unwrap() = replies.into_iter().collect();
        self
    }

    /// Make every poll request take `delay` on the (paused) clock.
    pub(crate) fn with_poll_delay(mut self, delay: Duration) -> Self {
        self.poll_delay = delay;
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn poll_instants(&self) -> Vec<Instant> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Poll { at, .. } => Some(at),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn next_poll(&self) -> Reply {
        let mut polls = self.polls.lock().unwrap();
        if polls.len() > 1 {
            polls.pop_front().unwrap()
        } else {
            polls.front().cloned().unwrap_or_else(incomplete)
        }
    }
}

fn reply((status, body): &Reply) -> Result<ApiReply, ApiError> {
    Ok(ApiReply::new(*status, body.clone()))
}

#[async_trait]
impl ApplicationApi for ScriptedApi {
    async fn register(&self, request: &RegisterRequest) -> Result<ApiReply, ApiError> {
        self.record(Call::Register {
            body: serde_json::to_value(request).unwrap(),
        });
        reply(&self.register)
    }

    async fn login(&self, request: &LoginRequest) -> Result<ApiReply, ApiError> {
        self.record(Call::Login {
            body: serde_json::to_value(request).unwrap(),
        });
        reply(&self.login)
    }

    async fn create_application(&self, session: &Session, request: &ApplicationRequest) -> Result<ApiReply, ApiError> {
        self.record(Call::CreateApplication {
            authorization: session.authorization().to_string(),
            body: serde_json::to_value(request).unwrap(),
        });
        reply(&self.create)
    }

    async fn fetch_application(&self, session: &Session, poll_url: &str) -> Result<ApiReply, ApiError> {
        self.record(Call::Poll {
            url: poll_url.to_string(),
            authorization: session.authorization().to_string(),
            at: Instant::now(),
        });
        if !self.poll_delay.is_zero() {
            tokio::time::sleep(self.poll_delay).await;
        }
        reply(&self.next_poll())
    }

    async fn confirm_application(
        &self,
        session: &Session,
        confirmation_url: &str,
        request: &ConfirmationRequest,
    ) -> Result<ApiReply, ApiError> {
        self.record(Call::Confirm {
            url: confirmation_url.to_string(),
            authorization: session.authorization().to_string(),
            body: serde_json::to_value(request).unwrap(),
        });
        reply(&self.confirm)
    }
}
