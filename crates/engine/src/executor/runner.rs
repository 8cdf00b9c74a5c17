use async_trait::async_trait;
use jobapp_api::{ApiError, ApiReply, JobAppClient};
use jobapp_types::{ApplicationRequest, ConfirmationRequest, LoginRequest, RegisterRequest, Session};

/// The five calls a run makes against the job-application service.
///
/// [`JobAppClient`] is the HTTP implementation; tests provide scripted
/// implementations. Implementations return the reply for any HTTP status and
/// reserve `Err` for transport failures, so status handling stays in the
/// runner.
#[async_trait]
pub trait ApplicationApi: Send + Sync {
    async fn register(&self, request: &RegisterRequest) -> Result<ApiReply, ApiError>;

    async fn login(&self, request: &LoginRequest) -> Result<ApiReply, ApiError>;

    async fn create_application(&self, session: &Session, request: &ApplicationRequest) -> Result<ApiReply, ApiError>;

    async fn fetch_application(&self, session: &Session, poll_url: &str) -> Result<ApiReply, ApiError>;

    async fn confirm_application(
        &self,
        session: &Session,
        confirmation_url: &str,
        request: &ConfirmationRequest,
    ) -> Result<ApiReply, ApiError>;
}

#[async_trait]
impl ApplicationApi for JobAppClient {
    async fn register(&self, request: &RegisterRequest) -> Result<ApiReply, ApiError> {
        JobAppClient::register(self, request).await
    }

    async fn login(&self, request: &LoginRequest) -> Result<ApiReply, ApiError> {
        JobAppClient::login(self, request).await
    }

    async fn create_application(&self, session: &Session, request: &ApplicationRequest) -> Result<ApiReply, ApiError> {
        JobAppClient::create_application(self, session, request).await
    }

    async fn fetch_application(&self, session: &Session, poll_url: &str) -> Result<ApiReply, ApiError> {
        JobAppClient::fetch_application(self, session, poll_url).await
    }

    async fn confirm_application(
        &self,
        session: &Session,
        confirmation_url: &str,
        request: &ConfirmationRequest,
    ) -> Result<ApiReply, ApiError> {
        JobAppClient::confirm_application(self, session, confirmation_url, request).await
    }
}
