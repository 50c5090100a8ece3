//! Terminal stand-in for client-side routing

use ootd_http::Navigator;
use std::sync::{Mutex, PoisonError};
use tracing::info;

/// Remembers the current route and reports moves to the user
#[derive(Debug)]
pub struct TerminalNavigator {
    location: Mutex<String>,
}

impl TerminalNavigator {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: Mutex::new(location.into()),
        }
    }
}

impl Navigator for TerminalNavigator {
    fn current_location(&self) -> String {
        self.location
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn navigate(&self, route: &str) {
        let mut location = self.location.lock().unwrap_or_else(PoisonError::into_inner);
        info!(from = %location, to = %route, "navigate");
        *location = route.to_string();
    }
}
