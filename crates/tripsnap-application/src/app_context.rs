use crate::admin_service::AdminService;
use crate::bakery_store::BakeryStore;
use crate::chat_store::ChatStore;
use crate::profile_store::ProfileStore;
use crate::session_store::SessionStore;
use std::sync::Arc;
use tripsnap_core::model::SessionUser;
use tripsnap_core::{ApiTransport, ClientConfig};

/// One instance of every store, sharing a transport and configuration.
///
/// Created at startup; [`AppContext::logout`] tears every store back down to
/// its initial state.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ClientConfig>,
    pub transport: Arc<dyn ApiTransport>,
    pub session: Arc<SessionStore>,
    pub profile: Arc<ProfileStore>,
    pub bakery: Arc<BakeryStore>,
    pub chat: Arc<ChatStore>,
    pub admin: Arc<AdminService>,
}

impl AppContext {
    pub fn new(transport: Arc<dyn ApiTransport>, config: ClientConfig) -> Self {
        let config = Arc::new(config);
        let session = Arc::new(SessionStore::new(transport.clone(), config.clone()));

        Self {
            profile: Arc::new(ProfileStore::new(transport.clone())),
            bakery: Arc::new(BakeryStore::new(
                transport.clone(),
                config.effective_cache_capacity(),
            )),
            chat: Arc::new(ChatStore::new(transport.clone())),
            admin: Arc::new(AdminService::new(
                transport.clone(),
                config.clone(),
                session.clone(),
            )),
            session,
            config,
            transport,
        }
    }

    /// Makes sure mutating calls can carry an anti-forgery token, then
    /// restores the session (if any).
    pub async fn bootstrap(&self) -> Option<SessionUser> {
        if let Err(e) = self.transport.prime_csrf().await {
            tracing::warn!("[AppContext] Could not prime CSRF cookie: {}", e);
        }
        self.session.fetch_me().await
    }

    /// Logs out and resets every store.
    pub async fn logout(&self) {
        self.session.logout().await;
        self.profile.reset_profile().await;
        self.bakery.close_modal().await;
        self.bakery.clear_cache().await;
        self.chat.reset().await;
        tracing::info!("[AppContext] Logged out, stores reset");
    }
}
