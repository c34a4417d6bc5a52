//! Typed REST client for the job-board backend.
//!
//! ERROR HANDLING
//! ==============
//! Every failure leaves here as a [`ClientError`]: transport errors pass
//! through, non-2xx statuses take the server's `error` text (else
//! `HTTP <status>: <reason>`), and `success:false` envelopes take the
//! envelope `error` (else the operation's fallback text). Callers decide what
//! to show; this module never touches session state.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::sync::{Arc, PoisonError, RwLock};

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use urlencoding::encode;

use super::transport::{ApiRequest, HttpTransport, RawResponse, Transport};
use super::types::{
    Application, ApplicationDraft, ApplicationStatus, AuthPayload, Credentials, Envelope, Job, JobDraft,
    JobQuery, JobUpdate, Page, PageQuery, PagedEnvelope, ProfileUpdate, RegisterRequest, StatusChange, User,
    UserPayload,
};
use crate::config::ClientConfig;
use crate::error::ClientError;

// =============================================================================
// ENVELOPE UNWRAPPING
// =============================================================================

impl<T> Envelope<T> {
    /// Require `success` and a `data` payload.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Rejected`] with the envelope error or `fallback`.
    pub fn into_data(self, fallback: &str) -> Result<T, ClientError> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(rejected(self.error, fallback)),
        }
    }

    /// Require `success`; `data` is optional.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Rejected`] with the envelope error or `fallback`.
    pub fn into_ack(self, fallback: &str) -> Result<Option<T>, ClientError> {
        if self.success { Ok(self.data) } else { Err(rejected(self.error, fallback)) }
    }
}

impl<T> PagedEnvelope<T> {
    /// Require `success` and a `data` list.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Rejected`] with the envelope error or `fallback`.
    pub fn into_page(self, fallback: &str) -> Result<Page<T>, ClientError> {
        match (self.success, self.data) {
            (true, Some(items)) => Ok(Page { items, pagination: self.pagination }),
            _ => Err(rejected(self.error, fallback)),
        }
    }
}

/// Acknowledge a mutation, keeping `data` only if it decodes as `T`.
fn lenient_ack<T: DeserializeOwned>(env: Envelope<Value>, fallback: &str) -> Result<Option<T>, ClientError> {
    Ok(env.into_ack(fallback)?.and_then(|data| serde_json::from_value(data).ok()))
}

fn rejected(error: Option<String>, fallback: &str) -> ClientError {
    ClientError::Rejected(error.filter(|e| !e.is_empty()).unwrap_or_else(|| fallback.to_owned()))
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn status_fallback_message(status: u16) -> String {
    match StatusCode::from_u16(status).ok().and_then(|s| s.canonical_reason()) {
        Some(reason) => format!("HTTP {status}: {reason}"),
        None => format!("HTTP {status}"),
    }
}

fn status_error(response: &RawResponse) -> ClientError {
    let message = serde_json::from_str::<ErrorBody>(&response.body)
        .ok()
        .and_then(|body| body.error.or(body.message))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| status_fallback_message(response.status));
    ClientError::Status { status: response.status, message }
}

fn encode_body(body: &impl Serialize) -> Result<Value, ClientError> {
    serde_json::to_value(body).map_err(|e| ClientError::Config(format!("request body not serializable: {e}")))
}

// =============================================================================
// CLIENT
// =============================================================================

/// REST client holding the bearer token attached to every request.
///
/// The token is set by the session store; the client never decides on its
/// own when to clear it.
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    token: RwLock<Option<String>>,
}

impl ApiClient {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport, token: RwLock::new(None) }
    }

    /// Build a client backed by [`HttpTransport`].
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the transport cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Ok(Self::new(Arc::new(HttpTransport::new(config)?)))
    }

    pub fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Send one request and decode a 2xx JSON body as `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`], [`ClientError::Status`] for
    /// non-2xx answers, or [`ClientError::Decode`] for unexpected bodies.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: Vec<(String, String)>,
        body: Option<Value>,
    ) -> Result<T, ClientError> {
        let request = ApiRequest { method: method.clone(), path: path.to_owned(), query, bearer: self.token(), body };
        tracing::debug!(%method, path, authenticated = request.bearer.is_some(), "api request");

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(%method, path, error = %e, "api transport failed");
                return Err(e);
            }
        };
        if !response.is_success() {
            let err = status_error(&response);
            tracing::warn!(%method, path, status = response.status, error = %err, "api request rejected");
            return Err(err);
        }
        serde_json::from_str(&response.body).map_err(|e| {
            tracing::warn!(%method, path, error = %e, "api response undecodable");
            ClientError::Decode(e.to_string())
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: Vec<(String, String)>) -> Result<T, ClientError> {
        self.request(Method::GET, path, query, None).await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ClientError> {
        let body = encode_body(body)?;
        self.request(method, path, Vec::new(), Some(body)).await
    }

    // -------------------------------------------------------------------------
    // auth
    // -------------------------------------------------------------------------

    /// `POST /auth/register`.
    ///
    /// # Errors
    ///
    /// Any normalized request failure.
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthPayload, ClientError> {
        let env: Envelope<AuthPayload> = self.send_json(Method::POST, "/auth/register", request).await?;
        env.into_data("Registration failed")
    }

    /// `POST /auth/login`.
    ///
    /// # Errors
    ///
    /// Any normalized request failure.
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthPayload, ClientError> {
        let env: Envelope<AuthPayload> = self.send_json(Method::POST, "/auth/login", credentials).await?;
        env.into_data("Login failed")
    }

    /// `GET /auth/me`: validates the current token.
    ///
    /// # Errors
    ///
    /// Any normalized request failure.
    pub async fn me(&self) -> Result<User, ClientError> {
        let env: Envelope<UserPayload> = self.get("/auth/me", Vec::new()).await?;
        env.into_data("Session validation failed").map(|p| p.user)
    }

    /// `PUT /auth/me`: partial profile update.
    ///
    /// # Errors
    ///
    /// Any normalized request failure.
    pub async fn update_me(&self, update: &ProfileUpdate) -> Result<User, ClientError> {
        let env: Envelope<UserPayload> = self.send_json(Method::PUT, "/auth/me", update).await?;
        env.into_data("Failed to update profile").map(|p| p.user)
    }

    /// `POST /auth/logout`.
    ///
    /// # Errors
    ///
    /// Any normalized request failure.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let env: Envelope<Value> = self.request(Method::POST, "/auth/logout", Vec::new(), None).await?;
        env.into_ack("Logout failed").map(|_| ())
    }

    // -------------------------------------------------------------------------
    // jobs
    // -------------------------------------------------------------------------

    /// `GET /jobs?page&limit&search&location`.
    ///
    /// # Errors
    ///
    /// Any normalized request failure.
    pub async fn list_jobs(&self, query: &JobQuery) -> Result<Page<Job>, ClientError> {
        let env: PagedEnvelope<Job> = self.get("/jobs", query.to_pairs()).await?;
        env.into_page("Failed to fetch jobs")
    }

    /// `GET /jobs/:id`.
    ///
    /// # Errors
    ///
    /// Any normalized request failure.
    pub async fn get_job(&self, id: &str) -> Result<Job, ClientError> {
        let env: Envelope<Job> = self.get(&format!("/jobs/{}", encode(id)), Vec::new()).await?;
        env.into_data("Failed to fetch job")
    }

    /// `POST /jobs`. Returns the created job when the server echoes one.
    ///
    /// # Errors
    ///
    /// Any normalized request failure.
    pub async fn create_job(&self, draft: &JobDraft) -> Result<Option<Job>, ClientError> {
        let env: Envelope<Value> = self.send_json(Method::POST, "/jobs", draft).await?;
        lenient_ack(env, "Failed to create job")
    }

    /// `PUT /jobs/:id`.
    ///
    /// # Errors
    ///
    /// Any normalized request failure.
    pub async fn update_job(&self, id: &str, update: &JobUpdate) -> Result<Option<Job>, ClientError> {
        let env: Envelope<Value> = self.send_json(Method::PUT, &format!("/jobs/{}", encode(id)), update).await?;
        lenient_ack(env, "Failed to update job")
    }

    /// `DELETE /jobs/:id`.
    ///
    /// # Errors
    ///
    /// Any normalized request failure.
    pub async fn delete_job(&self, id: &str) -> Result<(), ClientError> {
        let env: Envelope<Value> =
            self.request(Method::DELETE, &format!("/jobs/{}", encode(id)), Vec::new(), None).await?;
        env.into_ack("Failed to delete job").map(|_| ())
    }

    /// `GET /jobs/employer/my-jobs?page&limit`.
    ///
    /// # Errors
    ///
    /// Any normalized request failure.
    pub async fn my_jobs(&self, query: PageQuery) -> Result<Page<Job>, ClientError> {
        let env: PagedEnvelope<Job> = self.get("/jobs/employer/my-jobs", query.to_pairs()).await?;
        env.into_page("Failed to fetch your jobs")
    }

    // -------------------------------------------------------------------------
    // applications
    // -------------------------------------------------------------------------

    /// `POST /applications`.
    ///
    /// # Errors
    ///
    /// Any normalized request failure.
    pub async fn create_application(&self, draft: &ApplicationDraft) -> Result<Option<Application>, ClientError> {
        let env: Envelope<Value> = self.send_json(Method::POST, "/applications", draft).await?;
        lenient_ack(env, "Failed to submit application")
    }

    /// `GET /applications/my-applications`.
    ///
    /// # Errors
    ///
    /// Any normalized request failure.
    pub async fn my_applications(&self) -> Result<Vec<Application>, ClientError> {
        let env: Envelope<Vec<Application>> = self.get("/applications/my-applications", Vec::new()).await?;
        env.into_data("Failed to fetch applications")
    }

    /// `GET /applications/job/:jobId`.
    ///
    /// # Errors
    ///
    /// Any normalized request failure.
    pub async fn job_applications(&self, job_id: &str) -> Result<Vec<Application>, ClientError> {
        let env: Envelope<Vec<Application>> =
            self.get(&format!("/applications/job/{}", encode(job_id)), Vec::new()).await?;
        env.into_data("Failed to fetch applications")
    }

    /// `PUT /applications/:id/status`.
    ///
    /// # Errors
    ///
    /// Any normalized request failure.
    pub async fn update_application_status(
        &self,
        id: &str,
        status: ApplicationStatus,
    ) -> Result<Option<Application>, ClientError> {
        let path = format!("/applications/{}/status", encode(id));
        let env: Envelope<Value> = self.send_json(Method::PUT, &path, &StatusChange { status }).await?;
        lenient_ack(env, "Failed to update application status")
    }

    /// `GET /applications/:id`.
    ///
    /// # Errors
    ///
    /// Any normalized request failure.
    pub async fn get_application(&self, id: &str) -> Result<Application, ClientError> {
        let env: Envelope<Application> = self.get(&format!("/applications/{}", encode(id)), Vec::new()).await?;
        env.into_data("Failed to fetch application")
    }
}
