//! Client configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection and session settings for [`super::OotdClient`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend origin plus the versioned API prefix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds; unset means no timeout
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Deadline for one session refresh, in seconds
    #[serde(default = "default_refresh_timeout")]
    pub refresh_timeout_secs: u64,

    /// User agent sent with every request
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

const fn default_refresh_timeout() -> u64 {
    12
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: None,
            refresh_timeout_secs: default_refresh_timeout(),
            user_agent: None,
        }
    }
}

impl ClientConfig {
    /// Config pointing at `base_url` with everything else defaulted
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub const fn refresh_timeout(&self) -> Duration {
        Duration::from_secs(self.refresh_timeout_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
