//! Authenticated client for the closet API
//!
//! [`ApiClient`] is the request executor: it attaches the current bearer
//! token to every attempt and, when a first attempt comes back 401, hands
//! control to its [`UnauthorizedHandler`] before re-issuing the request once.
//! [`OotdClient`] wires the executor, the auth endpoints and the
//! [`SessionManager`] together over one shared transport.

pub mod auth;
pub mod clothes;
pub mod config;
pub mod error;
pub mod navigation;
pub mod ootd;
pub mod session;
pub mod token_store;
pub mod transport;

pub use ootd::OotdClient;

use config::ClientConfig;
use error::{ClientError, Result};
use reqwest::{Method, StatusCode, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use session::UnauthorizedHandler;
use std::sync::Arc;
use token_store::TokenStore;
use transport::HttpTransport;

/// Request executor with one refresh-and-retry on 401
#[derive(Clone)]
pub struct ApiClient {
    transport: HttpTransport,
    tokens: Arc<TokenStore>,
    unauthorized: Option<Arc<dyn UnauthorizedHandler>>,
}

impl ApiClient {
    /// Create a new client builder
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    pub fn token_store(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.execute(Method::GET, path, None).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let body = serde_json::to_vec(body)?;
        self.execute(Method::POST, path, Some(body)).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let body = serde_json::to_vec(body)?;
        self.execute(Method::PUT, path, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.execute(Method::DELETE, path, None).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<T> {
        let operation = format!("{method} {path}");
        let mut attempt = 1;

        loop {
            // The token is read per attempt so a retry picks up a refreshed one
            let mut request = self
                .transport
                .request(method.clone(), path)
                .header(header::CONTENT_TYPE, "application/json");
            if let Some(token) = self.tokens.token() {
                request = request.header(header::AUTHORIZATION, token.bearer());
            }
            if let Some(body) = &body {
                request = request.body(body.clone());
            }

            let response = request.send().await?;
            let status = response.status();
            debug!(
                operation = %operation,
                attempt,
                status = status.as_u16(),
                "request completed"
            );

            if status == StatusCode::UNAUTHORIZED && attempt == 1 {
                if let Some(handler) = &self.unauthorized {
                    info!(operation = %operation, "unauthorized, refreshing session before retry");
                    handler.on_unauthorized(&operation).await;
                    attempt += 1;
                    continue;
                }
            }

            let text = response.text().await.unwrap_or_else(|_| status.to_string());
            if !status.is_success() {
                return Err(ClientError::from_status(operation, status, text));
            }
            return Ok(serde_json::from_str(&text)?);
        }
    }
}

/// Builder for [`ApiClient`]
#[derive(Default)]
pub struct ApiClientBuilder {
    config: Option<ClientConfig>,
    transport: Option<HttpTransport>,
    tokens: Option<Arc<TokenStore>>,
    unauthorized: Option<Arc<dyn UnauthorizedHandler>>,
}

impl ApiClientBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        let mut config = self.config.take().unwrap_or_default();
        config.base_url = url.into();
        self.config = Some(config);
        self
    }

    /// Use a full client configuration
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Share an existing transport (and its cookie jar)
    pub fn transport(mut self, transport: HttpTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Share an existing token store
    pub fn token_store(mut self, tokens: Arc<TokenStore>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Handler awaited before the single retry of a 401
    pub fn unauthorized_handler(mut self, handler: Arc<dyn UnauthorizedHandler>) -> Self {
        self.unauthorized = Some(handler);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<ApiClient> {
        let transport = match (self.transport, self.config) {
            (Some(transport), _) => transport,
            (None, Some(config)) => HttpTransport::new(&config)?,
            (None, None) => {
                return Err(ClientError::Configuration("base_url is required".into()));
            }
        };

        Ok(ApiClient {
            transport,
            tokens: self.tokens.unwrap_or_default(),
            unauthorized: self.unauthorized,
        })
    }
}
