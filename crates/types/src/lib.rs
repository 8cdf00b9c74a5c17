//! Shared data model for the job-application workflow.
//!
//! The types here are split into two groups:
//!
//! - applicant and session state ([`Credentials`], [`Session`]) owned by the
//!   runner for the lifetime of a single run
//! - wire payloads exchanged with the job-application service, plus the
//!   [`ApplicationStatus`] reported while the application is processed
//!
//! Run lifecycle types (stages, events, reports) live in [`workflow`].

pub mod workflow;

pub use workflow::*;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Applicant identity and login secret used for every step of a run.
///
/// Values are sourced from external configuration once at start and never
/// mutated afterwards. The `Debug` output never includes the password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl Credentials {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// Registration payload: the password is sent twice as confirmation.
    pub fn register_request(&self) -> RegisterRequest {
        RegisterRequest {
            email: self.email.clone(),
            password1: self.password.clone(),
            password2: self.password.clone(),
        }
    }

    pub fn login_request(&self) -> LoginRequest {
        LoginRequest {
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }

    pub fn application_request(&self) -> ApplicationRequest {
        ApplicationRequest {
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish()
    }
}

/// Authenticated session acquired at login.
///
/// Holds the `Authorization` header value in its rendered `Token <value>`
/// form. Every authenticated client call takes a `&Session`, so no such call
/// can be issued before login succeeded.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    authorization: String,
}

impl Session {
    /// Build a session from the raw token returned by the login endpoint.
    pub fn from_token(token: &str) -> Self {
        Self {
            authorization: format!("Token {}", token.trim()),
        }
    }

    /// Value for the `Authorization` header.
    pub fn authorization(&self) -> &str {
        &self.authorization
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("authorization", &"Token <redacted>")
            .finish()
    }
}

/// Body of `POST /api/v1.1/auth/register/`.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterRequest {
    pub email: String,
    pub password1: String,
    pub password2: String,
}

/// Body of `POST /api/v1.1/auth/login/`.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login payload. The token is optional on the wire so that its
/// absence can be reported separately from a malformed body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
}

impl LoginResponse {
    /// The token, when present and not blank.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().map(str::trim).filter(|token| !token.is_empty())
    }
}

/// Body of `POST /api/v1.1/job-application-request/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApplicationRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Payload returned when an application is created.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApplicationCreated {
    /// Resource URL re-fetched to observe processing status.
    #[serde(default)]
    pub url: Option<String>,
}

impl ApplicationCreated {
    pub fn poll_url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|url| !url.is_empty())
    }
}

/// One observation of the application resource while polling.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApplicationSnapshot {
    #[serde(default)]
    pub status: Option<ApplicationStatus>,
    /// Present once processing completed.
    #[serde(default)]
    pub confirmation_url: Option<String>,
}

impl ApplicationSnapshot {
    pub fn is_completed(&self) -> bool {
        matches!(self.status, Some(ApplicationStatus::Completed))
    }

    pub fn confirmation_url(&self) -> Option<&str> {
        self.confirmation_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// Body of the confirmation `PATCH`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfirmationRequest {
    pub confirmed: bool,
}

impl Default for ConfirmationRequest {
    fn default() -> Self {
        Self { confirmed: true }
    }
}

/// Processing status reported by the application resource.
///
/// Only `INCOMPLETE` and `COMPLETED` carry meaning for the workflow; any other
/// value is preserved verbatim in [`ApplicationStatus::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ApplicationStatus {
    Incomplete,
    Completed,
    Other(String),
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ApplicationStatus::Incomplete => "INCOMPLETE",
            ApplicationStatus::Completed => "COMPLETED",
            ApplicationStatus::Other(value) => value.as_str(),
        }
    }
}

impl From<String> for ApplicationStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "INCOMPLETE" => ApplicationStatus::Incomplete,
            "COMPLETED" => ApplicationStatus::Completed,
            _ => ApplicationStatus::Other(value),
        }
    }
}

impl From<&str> for ApplicationStatus {
    fn from(value: &str) -> Self {
        ApplicationStatus::from(value.to_string())
    }
}

impl From<ApplicationStatus> for String {
    fn from(status: ApplicationStatus) -> Self {
        match status {
            ApplicationStatus::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
