//! Session store: who is logged in.
//!
//! ```text
//! Anonymous --login/register--> Authenticating --identity ok--> Authenticated
//!     ^                               |                              |
//!     +------- identity failed -------+---- logout / 401 / 403 ------+
//! ```

use crate::payload::reported_failure;
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::RwLock;
use tripsnap_core::endpoints;
use tripsnap_core::model::SessionUser;
use tripsnap_core::{
    ApiRequest, ApiTransport, ClientConfig, Result, TripsnapError, request_json,
    request_json_or_absent,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Anonymous,
    Authenticating,
    Authenticated,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SessionState {
    pub user: Option<SessionUser>,
    pub status: SessionStatus,
    pub loading: bool,
    /// Inline message for the login/register form or the identity check.
    pub error: Option<String>,
}

/// Holds the current account and runs the authentication flows.
pub struct SessionStore {
    transport: Arc<dyn ApiTransport>,
    config: Arc<ClientConfig>,
    state: RwLock<SessionState>,
}

impl SessionStore {
    pub fn new(transport: Arc<dyn ApiTransport>, config: Arc<ClientConfig>) -> Self {
        Self {
            transport,
            config,
            state: RwLock::new(SessionState::default()),
        }
    }

    pub async fn snapshot(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn user(&self) -> Option<SessionUser> {
        self.state.read().await.user.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.status == SessionStatus::Authenticated
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    /// Creates an account, then re-fetches identity (registration logs in).
    ///
    /// Server-side rejections surface the first validation message of the
    /// response body.
    pub async fn register(&self, email: &str, password: &str, password_confirm: &str) -> Result<()> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(TripsnapError::validation("Email and password are required."));
        }
        if password != password_confirm {
            return Err(TripsnapError::validation("Passwords do not match."));
        }

        self.begin_authenticating().await;

        let request = ApiRequest::post(endpoints::REGISTER).json(json!({
            "email": email.trim(),
            "password1": password,
            "password2": password_confirm,
        }));

        let response = match self.transport.request(request).await {
            Ok(response) => response,
            Err(e) => return Err(self.fail(e).await),
        };
        if !response.is_success() {
            let message = response.first_validation_error();
            return Err(self.fail(TripsnapError::api(response.status, message)).await);
        }

        tracing::info!("[SessionStore] Registered {}", email.trim());
        self.fetch_me().await;
        Ok(())
    }

    /// Logs in; returns whether a session is now established.
    ///
    /// Failures never propagate: the message lands in the store's `error`
    /// so the caller can keep the form visible.
    pub async fn login(&self, email: &str, password: &str) -> bool {
        if email.trim().is_empty() || password.is_empty() {
            self.state.write().await.error = Some("Email and password are required.".to_string());
            return false;
        }

        self.begin_authenticating().await;

        let request = ApiRequest::post(endpoints::LOGIN).json(json!({
            "email": email.trim(),
            "password": password,
        }));

        match self.transport.request(request).await {
            Ok(response) if response.is_success() => {}
            Ok(response) => {
                let message = response.first_validation_error();
                self.fail(TripsnapError::api(response.status, message)).await;
                return false;
            }
            Err(e) => {
                self.fail(e).await;
                return false;
            }
        }

        self.fetch_me().await.is_some()
    }

    /// Re-checks identity.
    ///
    /// 401/403 mean "nobody is logged in" and leave `error` empty; any other
    /// failure also clears the user but records the message.
    pub async fn fetch_me(&self) -> Option<SessionUser> {
        self.state.write().await.loading = true;

        let result =
            request_json_or_absent::<SessionUser>(&*self.transport, ApiRequest::get(endpoints::ME))
                .await;

        let mut state = self.state.write().await;
        state.loading = false;
        match result {
            Ok(user) => {
                tracing::debug!("[SessionStore] Authenticated as {}", user.nickname);
                state.user = Some(user.clone());
                state.status = SessionStatus::Authenticated;
                state.error = None;
                Some(user)
            }
            Err(e) if e.is_unauthorized() => {
                state.user = None;
                state.status = SessionStatus::Anonymous;
                state.error = None;
                None
            }
            Err(e) => {
                tracing::warn!("[SessionStore] Identity check failed: {}", e);
                state.user = None;
                state.status = SessionStatus::Anonymous;
                state.error = Some(e.user_message());
                None
            }
        }
    }

    /// Ends the session. Local state is cleared whatever the server says.
    pub async fn logout(&self) {
        if let Err(e) =
            request_json::<Value>(&*self.transport, ApiRequest::post(endpoints::LOGOUT)).await
        {
            tracing::warn!("[SessionStore] Logout request failed, clearing locally: {}", e);
        }
        *self.state.write().await = SessionState::default();
    }

    /// Authorization URL for the third-party login; opening it leaves the app.
    pub fn oauth_login_url(&self) -> String {
        endpoints::oauth_login(
            self.config.origin(),
            &self.config.oauth_provider,
            &self.config.oauth_return_path,
        )
    }

    pub async fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
        new_password_confirm: &str,
    ) -> Result<()> {
        if old_password.is_empty() || new_password.is_empty() {
            return Err(TripsnapError::validation("Both the current and new password are required."));
        }
        if new_password != new_password_confirm {
            return Err(TripsnapError::validation("Passwords do not match."));
        }

        let request = ApiRequest::post(endpoints::PASSWORD_CHANGE).json(json!({
            "old_password": old_password,
            "new_password1": new_password,
            "new_password2": new_password_confirm,
        }));
        let response = self.transport.request(request).await?;
        if !response.is_success() {
            let message = response.first_validation_error();
            return Err(TripsnapError::api(response.status, message));
        }
        Ok(())
    }

    /// Deletes the account and drops the local session.
    pub async fn delete_account(&self) -> Result<()> {
        let body: Value =
            request_json(&*self.transport, ApiRequest::post(endpoints::ACCOUNT_DELETE)).await?;
        if let Some(message) = reported_failure(&body) {
            return Err(TripsnapError::api(200, message));
        }

        tracing::info!("[SessionStore] Account deleted");
        *self.state.write().await = SessionState::default();
        Ok(())
    }

    async fn begin_authenticating(&self) {
        let mut state = self.state.write().await;
        state.status = SessionStatus::Authenticating;
        state.loading = true;
        state.error = None;
    }

    /// Records a failed login/register attempt and hands the error back.
    async fn fail(&self, error: TripsnapError) -> TripsnapError {
        let mut state = self.state.write().await;
        state.loading = false;
        state.error = Some(error.user_message());
        if state.user.is_none() {
            state.status = SessionStatus::Anonymous;
        } else {
            state.status = SessionStatus::Authenticated;
        }
        error
    }
}
