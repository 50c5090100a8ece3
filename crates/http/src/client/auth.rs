//! Authentication API client methods
//!
//! These calls go straight to the transport and never through the executor's
//! 401 handling: a failed login is an answer, not an expired session.

use async_trait::async_trait;
use ootd_core::{AuthResponse, LoginPayload, MessageResponse, Session, SignupPayload};
use reqwest::{Method, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::error::{ClientError, Result};
use super::session::Refresher;
use super::transport::HttpTransport;

/// Cookie carrying the refresh credential
pub const REFRESH_COOKIE: &str = "refresh_token";

const REFRESH_PATH: &str = "/auth/refresh";

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Login, signup, refresh and logout endpoints
#[derive(Clone)]
pub struct AuthApi {
    transport: HttpTransport,
}

impl AuthApi {
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }

    /// Exchange credentials for a session
    pub async fn login(&self, payload: &LoginPayload) -> Result<Session> {
        let response = self
            .transport
            .request(Method::POST, "/auth/login")
            .json(payload)
            .send()
            .await?;
        let auth: AuthResponse = parse(response, "Login failed").await?;
        Ok(auth.into())
    }

    /// Create an account and sign in
    pub async fn signup(&self, payload: &SignupPayload) -> Result<Session> {
        let response = self
            .transport
            .request(Method::POST, "/auth/signup")
            .json(payload)
            .send()
            .await?;
        let auth: AuthResponse = parse(response, "Signup failed").await?;
        Ok(auth.into())
    }

    /// Mint a new access token from the refresh cookie
    ///
    /// On failure the stale refresh cookie is dropped from the jar.
    pub async fn refresh(&self) -> Result<Session> {
        let outcome = async {
            let response = self
                .transport
                .request(Method::POST, REFRESH_PATH)
                .send()
                .await?;
            parse::<AuthResponse>(response, "Refresh token failed").await
        }
        .await;

        match outcome {
            Ok(auth) => Ok(auth.into()),
            Err(err) => {
                debug!(error = %err, "expiring refresh cookie");
                self.transport.expire_cookie(REFRESH_COOKIE, REFRESH_PATH);
                Err(err)
            }
        }
    }

    /// Revoke the refresh credential server-side
    pub async fn logout(&self) -> Result<MessageResponse> {
        let response = self
            .transport
            .request(Method::POST, "/auth/logout")
            .send()
            .await?;
        parse(response, "Logout failed").await
    }
}

#[async_trait]
impl Refresher for AuthApi {
    async fn refresh(&self) -> Result<Session> {
        AuthApi::refresh(self).await
    }
}

/// Decode a success body, or turn the backend's `{"error": ..}` into an
/// authentication failure
async fn parse<T: DeserializeOwned>(response: Response, fallback: &str) -> Result<T> {
    let status = response.status();
    let text = response.text().await?;

    if status.is_success() {
        return Ok(serde_json::from_str(&text)?);
    }

    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or_else(|_| fallback.to_string());
    Err(ClientError::AuthenticationFailed(message))
}
