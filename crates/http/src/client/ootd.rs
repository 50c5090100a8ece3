//! Client facade wiring the executor, the auth endpoints and the session

use ootd_core::{LoginPayload, MessageResponse, Session, SignupPayload};
use std::sync::Arc;

use super::ApiClient;
use super::auth::AuthApi;
use super::config::ClientConfig;
use super::error::Result;
use super::navigation::Navigator;
use super::session::{SessionConfig, SessionManager};
use super::token_store::TokenStore;
use super::transport::HttpTransport;

/// Everything a host application needs to talk to the closet API
///
/// The executor, the auth endpoints and the session manager share one token
/// store and one cookie jar.
#[derive(Clone)]
pub struct OotdClient {
    api: ApiClient,
    auth: AuthApi,
    session: SessionManager,
}

impl OotdClient {
    pub fn new(config: &ClientConfig, navigator: Arc<dyn Navigator>) -> Result<Self> {
        let session_config = SessionConfig {
            refresh_timeout: config.refresh_timeout(),
            ..SessionConfig::default()
        };
        Self::with_session_config(config, navigator, session_config)
    }

    pub fn with_session_config(
        config: &ClientConfig,
        navigator: Arc<dyn Navigator>,
        session_config: SessionConfig,
    ) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        let tokens = Arc::new(TokenStore::new());
        let auth = AuthApi::new(transport.clone());
        let session = SessionManager::new(
            Arc::clone(&tokens),
            Arc::new(auth.clone()),
            navigator,
            session_config,
        );
        let api = ApiClient::builder()
            .transport(transport)
            .token_store(tokens)
            .unauthorized_handler(Arc::new(session.clone()))
            .build()?;

        Ok(Self { api, auth, session })
    }

    /// Request executor for the closet endpoints
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Sign in and go to the home route
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let payload = LoginPayload {
            email: email.to_string(),
            password: password.to_string(),
        };
        let session = self.auth.login(&payload).await?;
        self.session.establish(session.clone());
        Ok(session)
    }

    /// Create an account, sign in and go to the home route
    pub async fn signup(&self, payload: &SignupPayload) -> Result<Session> {
        let session = self.auth.signup(payload).await?;
        self.session.establish(session.clone());
        Ok(session)
    }

    /// Sign out
    ///
    /// Local state is cleared before the backend is told, so the client is
    /// signed out even when the call fails.
    pub async fn logout(&self) -> Result<MessageResponse> {
        self.session.clear();
        let outcome = self.auth.logout().await;
        if let Err(err) = &outcome {
            warn!(error = %err, "logout request failed");
        }
        self.session.redirect_to_login();
        outcome
    }

    /// Restore a session from the refresh cookie at startup
    pub async fn rehydrate(&self) -> Option<Session> {
        self.session.rehydrate().await
    }
}
