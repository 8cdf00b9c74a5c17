//! Job-application API client.
//!
//! This crate provides a thin client over `reqwest` for the job-application
//! service. It focuses on:
//!
//! - Validating the configured base URL
//! - Sending every request with JSON `Content-Type`/`Accept` headers and a
//!   consistent User-Agent
//! - Attaching the session's `Authorization: Token <value>` header on
//!   authenticated calls
//! - Resolving server-provided poll and confirmation URLs
//!
//! Every call returns an [`ApiReply`] for any HTTP status. Only transport
//! failures and unusable URLs are errors; deciding what a status means is
//! left to the caller.
//!
//! # Example
//!
//! ```ignore
//! use jobapp_api::JobAppClient;
//! use jobapp_types::Credentials;
//!
//! let client = JobAppClient::new("https://jobs.example.com")?;
//! let credentials = Credentials::new("ada@example.com", "s3cret", "Ada", "Lovelace");
//! let reply = client.register(&credentials.register_request()).await?;
//! println!("status: {}", reply.status);
//! ```

use std::env;
use std::time::{Duration, Instant};

use jobapp_types::{ApplicationRequest, ConfirmationRequest, LoginRequest, RegisterRequest, Session};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url, header};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

pub const REGISTER_PATH: &str = "/api/v1.1/auth/register/";
pub const LOGIN_PATH: &str = "/api/v1.1/auth/login/";
pub const APPLICATION_PATH: &str = "/api/v1.1/job-application-request/";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised before a response could be obtained.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid BASE_URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("invalid request URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("{method} {url} failed: {source}")]
    Transport {
        method: Method,
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Status and raw body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiReply {
    pub status: StatusCode,
    pub body: String,
}

impl ApiReply {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Thin wrapper around a configured `reqwest::Client` for the job-application
/// service.
#[derive(Debug, Clone)]
pub struct JobAppClient {
    base_url: String,
    http: Client,
    user_agent: String,
}

impl JobAppClient {
    /// Construct a client against `base_url`.
    ///
    /// The URL must use `http` or `https` and include a host. A trailing `/`
    /// is dropped so endpoint paths can be appended directly.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url = validate_base_url(base_url)?;

        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::CONTENT_TYPE, header::HeaderValue::from_static("application/json"));
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ApiError::ClientBuild)?;

        Ok(Self {
            base_url,
            http,
            user_agent: format!("jobapp/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /api/v1.1/auth/register/`
    pub async fn register(&self, request: &RegisterRequest) -> Result<ApiReply, ApiError> {
        self.send(Method::POST, REGISTER_PATH, None, Some(request)).await
    }

    /// `POST /api/v1.1/auth/login/`
    pub async fn login(&self, request: &LoginRequest) -> Result<ApiReply, ApiError> {
        self.send(Method::POST, LOGIN_PATH, None, Some(request)).await
    }

    /// `POST /api/v1.1/job-application-request/`, authenticated.
    pub async fn create_application(&self, session: &Session, request: &ApplicationRequest) -> Result<ApiReply, ApiError> {
        self.send(Method::POST, APPLICATION_PATH, Some(session), Some(request)).await
    }

    /// `GET <poll url>`, authenticated.
    pub async fn fetch_application(&self, session: &Session, poll_url: &str) -> Result<ApiReply, ApiError> {
        self.send(Method::GET, poll_url, Some(session), None::<&()>).await
    }

    /// `PATCH <confirmation url>` with `{"confirmed": true}`, authenticated.
    pub async fn confirm_application(
        &self,
        session: &Session,
        confirmation_url: &str,
        request: &ConfirmationRequest,
    ) -> Result<ApiReply, ApiError> {
        self.send(Method::PATCH, confirmation_url, Some(session), Some(request)).await
    }

    /// Resolve an endpoint path or a server-provided absolute URL.
    ///
    /// Paths are appended to the base URL; absolute URLs are used as given.
    /// Either way the result must be `http` or `https`.
    pub fn resolve_url(&self, target: &str) -> Result<Url, ApiError> {
        let invalid = |reason: String| ApiError::InvalidUrl {
            url: target.to_string(),
            reason,
        };

        let url = if target.starts_with('/') {
            Url::parse(&format!("{}{}", self.base_url, target))
        } else {
            Url::parse(target)
        }
        .map_err(|error| invalid(error.to_string()))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        Ok(url)
    }

    /// Build a request with the User-Agent and, when a session is given, the
    /// `Authorization` header.
    pub fn request(&self, method: Method, target: &str, session: Option<&Session>) -> Result<RequestBuilder, ApiError> {
        let url = self.resolve_url(target)?;
        debug!(%method, %url, authenticated = session.is_some(), "building request");

        let mut builder = self
            .http
            .request(method, url)
            .header(header::USER_AGENT, &self.user_agent);
        if let Some(session) = session {
            builder = builder.header(header::AUTHORIZATION, session.authorization());
        }
        Ok(builder)
    }

    async fn send<T>(&self, method: Method, target: &str, session: Option<&Session>, body: Option<&T>) -> Result<ApiReply, ApiError>
    where
        T: Serialize + ?Sized,
    {
        let start = Instant::now();
        let mut builder = self.request(method.clone(), target, session)?;
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let transport = |source: reqwest::Error| ApiError::Transport {
            method: method.clone(),
            url: target.to_string(),
            source,
        };
        let response = builder.send().await.map_err(&transport)?;
        let status = response.status();
        let body = response.text().await.map_err(&transport)?;

        debug!(
            %method,
            url = %target,
            %status,
            body_len = body.len(),
            duration_ms = start.elapsed().as_millis(),
            "http request completed"
        );
        Ok(ApiReply { status, body })
    }
}

/// Validate that a base URL is acceptable for use by the client and return it
/// without a trailing `/`.
///
/// Rules:
/// - must parse as an absolute URL
/// - scheme must be `http` or `https`
/// - a host is required
fn validate_base_url(base: &str) -> Result<String, ApiError> {
    let trimmed = base.trim().trim_end_matches('/');
    let invalid = |reason: String| ApiError::InvalidBaseUrl {
        url: base.to_string(),
        reason,
    };

    let parsed_base_url = Url::parse(trimmed).map_err(|error| invalid(error.to_string()))?;

    if !matches!(parsed_base_url.scheme(), "http" | "https") {
        return Err(invalid(format!(
            "scheme must be http or https; got '{}://'",
            parsed_base_url.scheme()
        )));
    }

    if parsed_base_url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("URL must include a host".to_string()));
    }

    Ok(trimmed.to_string())
}
