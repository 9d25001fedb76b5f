//! Operator maintenance actions.

use crate::session_store::SessionStore;
use serde_json::Value;
use std::sync::Arc;
use tripsnap_core::endpoints;
use tripsnap_core::{ApiRequest, ApiTransport, ClientConfig, Result, TripsnapError, request_json};

/// Operator-only backend maintenance triggers.
///
/// Access is limited to the account whose email matches `admin_email` in
/// the client configuration; the backend checks again on its side.
pub struct AdminService {
    transport: Arc<dyn ApiTransport>,
    config: Arc<ClientConfig>,
    session: Arc<SessionStore>,
}

impl AdminService {
    pub fn new(
        transport: Arc<dyn ApiTransport>,
        config: Arc<ClientConfig>,
        session: Arc<SessionStore>,
    ) -> Self {
        Self {
            transport,
            config,
            session,
        }
    }

    /// Whether the logged-in account is the configured operator.
    pub async fn is_operator(&self) -> bool {
        let Some(admin_email) = self.config.admin_email.as_deref() else {
            return false;
        };
        self.session
            .user()
            .await
            .is_some_and(|user| user.has_email(admin_email))
    }

    /// Starts the backend's keyword rebuild job.
    pub async fn rebuild_keywords(&self) -> Result<Value> {
        if !self.is_operator().await {
            return Err(TripsnapError::validation(
                "Only the operator account can rebuild keywords.",
            ));
        }

        tracing::info!("[AdminService] Triggering keyword rebuild");
        request_json(&*self.transport, ApiRequest::post(endpoints::KEYWORD_REBUILD)).await
    }
}
