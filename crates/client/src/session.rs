// ============================
// crates/client/src/session.rs
// ============================
//! Session state and the operations that change it.
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use accounts_common::{
    AuthResponse, ErrorBody, LoginRequest, MessageResponse, RegisterRequest, UserProfile,
};
use chrono::NaiveDate;
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use crate::{ClientError, Notice, Route};

/// Per-request timeout used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const NOTICE_CAPACITY: usize = 16;

/// Connection settings of a [`SessionClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server origin, e.g. `http://127.0.0.1:5000`
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

/// What the client knows about the current user. Anonymous by default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub current_user: Option<UserProfile>,
    pub token: Option<String>,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Clears the in-flight flag when a submission finishes, however it ends.
struct SubmissionGuard<'a>(&'a AtomicBool);

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Client-side session manager.
///
/// Holds the session in memory for the lifetime of the instance. Create
/// one per user agent and pass it to whatever needs the session.
pub struct SessionClient {
    http: reqwest::Client,
    base_url: String,
    state: RwLock<SessionState>,
    submitting: AtomicBool,
    notices: broadcast::Sender<Notice>,
}

impl SessionClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            state: RwLock::new(SessionState::default()),
            submitting: AtomicBool::new(false),
            notices,
        })
    }

    /// Receive a [`Notice`] for every login/register outcome
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    /// Snapshot of the session
    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn current_user(&self) -> Option<UserProfile> {
        self.state.read().await.current_user.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated()
    }

    /// Whether a login or register call is outstanding. UIs disable their
    /// submit buttons while this is true.
    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// Log in; on success the session holds the new token and profile.
    /// On failure the session is left as it was.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, ClientError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let result = self.authenticate("/api/login", &body).await;
        self.report(result, "Login successful! Redirecting...")
    }

    /// Register a new account and start a session for it.
    ///
    /// A missing date of birth fails before anything is sent.
    pub async fn register(
        &self,
        name: &str,
        dob: Option<NaiveDate>,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, ClientError> {
        let result = match dob {
            None => Err(ClientError::Validation("Date of birth is required".to_string())),
            Some(dob) => {
                let body = RegisterRequest {
                    name: name.to_string(),
                    dob: dob.format("%Y-%m-%d").to_string(),
                    email: email.to_string(),
                    password: password.to_string(),
                };
                self.authenticate("/api/register", &body).await
            },
        };
        self.report(result, "Registration successful! Redirecting...")
    }

    /// Forget the session. Tokens are stateless, so the server is not told.
    pub async fn logout(&self) {
        let mut state = self.state.write().await;
        if state.is_authenticated() {
            info!("session cleared");
        }
        *state = SessionState::default();
    }

    /// The view to actually show when `requested` is asked for
    pub async fn resolve(&self, requested: Route) -> Route {
        if requested.is_protected() && !self.is_authenticated().await {
            debug!(path = requested.path(), "no session, redirecting to login");
            return Route::Login;
        }
        requested
    }

    /// Call the protected probe endpoint with the session token.
    ///
    /// Without a token no request is made. A 401 means the token is no
    /// longer accepted, so the session is dropped.
    pub async fn fetch_protected(&self) -> Result<MessageResponse, ClientError> {
        let Some(token) = self.state.read().await.token.clone() else {
            return Err(ClientError::LoginRequired);
        };

        let response = self
            .http
            .get(self.url("/api/protected"))
            .bearer_auth(&token)
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            let mut state = self.state.write().await;
            // Only drop the session the rejected token belonged to.
            if state.token.as_deref() == Some(token.as_str()) {
                warn!("session token rejected, clearing session");
                *state = SessionState::default();
            }
            return Err(ClientError::LoginRequired);
        }

        read_json(response).await
    }

    async fn authenticate<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<UserProfile, ClientError> {
        let _guard = self.begin_submission()?;

        let response = self.http.post(self.url(path)).json(body).send().await?;
        let auth: AuthResponse = read_json(response).await?;

        let mut state = self.state.write().await;
        state.token = Some(auth.token);
        state.current_user = Some(auth.user.clone());
        info!(user_id = %auth.user.id, "session started");
        Ok(auth.user)
    }

    fn begin_submission(&self) -> Result<SubmissionGuard<'_>, ClientError> {
        self.submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| SubmissionGuard(&self.submitting))
            .map_err(|_| ClientError::SubmissionInFlight)
    }

    fn report<T>(&self, result: Result<T, ClientError>, success: &str) -> Result<T, ClientError> {
        let notice = match &result {
            Ok(_) => Notice::success(success),
            Err(e) => Notice::error(e.to_string()),
        };
        // No subscribers is fine; the result is still returned.
        let _ = self.notices.send(notice);
        result
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.message,
        Err(_) => status.canonical_reason().unwrap_or("Request failed").to_string(),
    };
    Err(ClientError::Server {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NoticeLevel;

    // Nothing listens here; tests using it must not reach the network.
    fn offline_client() -> SessionClient {
        SessionClient::new(ClientConfig::new("http://127.0.0.1:9")).unwrap()
    }

    #[tokio::test]
    async fn starts_anonymous() {
        let client = offline_client();
        assert_eq!(client.state().await, SessionState::default());
        assert!(!client.is_authenticated().await);
        assert!(!client.is_submitting());
    }

    #[tokio::test]
    async fn logout_is_idempotent() {
        let client = offline_client();
        client.logout().await;
        client.logout().await;
        assert_eq!(client.state().await, SessionState::default());
    }

    #[tokio::test]
    async fn protected_routes_redirect_without_session() {
        let client = offline_client();
        assert_eq!(client.resolve(Route::Dashboard).await, Route::Login);
        assert_eq!(client.resolve(Route::Register).await, Route::Register);
        assert_eq!(client.fetch_protected().await, Err(ClientError::LoginRequired));
    }

    #[tokio::test]
    async fn register_without_dob_fails_fast() {
        let client = offline_client();
        let mut notices = client.subscribe();

        let err = client
            .register("Ann", None, "ann@x.com", "hunter2")
            .await
            .unwrap_err();
        assert_eq!(err, ClientError::Validation("Date of birth is required".to_string()));

        let notice = notices.recv().await.unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "Date of birth is required");
        assert!(!client.is_authenticated().await);
    }

    #[tokio::test]
    async fn unreachable_server_reports_network_error() {
        let client = offline_client();
        let err = client.login("ann@x.com", "hunter2").await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_) | ClientError::NetworkTimeout));
        assert!(!client.is_submitting());
        assert!(!client.is_authenticated().await);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = SessionClient::new(ClientConfig::new("http://localhost:5000/")).unwrap();
        assert_eq!(client.url("/api/login"), "http://localhost:5000/api/login");
    }
}
