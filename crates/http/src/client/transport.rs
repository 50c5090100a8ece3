//! Shared HTTP transport
//!
//! One `reqwest::Client` and one cookie jar are shared by the auth endpoints
//! and the request executor, so the refresh cookie set by login is the one
//! sent by refresh.

use reqwest::cookie::Jar;
use reqwest::{Client, ClientBuilder, Method, RequestBuilder, Url};
use std::sync::Arc;

use super::config::ClientConfig;
use super::error::{ClientError, Result};

const DEFAULT_USER_AGENT: &str = concat!("ootd-client/", env!("CARGO_PKG_VERSION"));

/// Expiry date used to drop a cookie from the jar
const EXPIRED: &str = "Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT";

#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    cookies: Arc<Jar>,
    base_url: String,
}

impl HttpTransport {
    /// Build the transport described by `config`
    pub fn new(config: &ClientConfig) -> Result<Self> {
        // Ensure base_url ends without a trailing slash
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ClientError::Configuration("base_url is required".into()));
        }
        Url::parse(&base_url).map_err(|err| {
            ClientError::Configuration(format!("invalid base_url {base_url}: {err}"))
        })?;

        let cookies = Arc::new(Jar::default());
        let mut builder = ClientBuilder::new()
            .cookie_provider(Arc::clone(&cookies))
            .user_agent(
                config
                    .user_agent
                    .clone()
                    .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            );

        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            cookies,
            base_url,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Create a request builder; cookies are attached by the jar
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }

    /// Drop a cookie the backend scoped to `path`
    ///
    /// Both the path-default scope and the root scope are expired since the
    /// backend does not always send a `Path` attribute.
    pub fn expire_cookie(&self, name: &str, path: &str) {
        let Ok(url) = Url::parse(&self.url(path)) else {
            return;
        };
        self.cookies.add_cookie_str(&format!("{name}=; {EXPIRED}"), &url);
        self.cookies
            .add_cookie_str(&format!("{name}=; Path=/; {EXPIRED}"), &url);
    }
}
