//! Navigation hook used when a session ends
//!
//! The client never renders anything itself; it only asks the host
//! application where the user currently is and, when a refresh fails, to move
//! them to the login entry point.

use std::sync::{Mutex, PoisonError};

/// Host-side routing, as seen by the session manager
pub trait Navigator: Send + Sync {
    /// Route the user is currently on, e.g. `/closet`
    fn current_location(&self) -> String;

    /// Move the user to `route`
    fn navigate(&self, route: &str);
}

/// Navigator that only remembers where it was sent
///
/// Suitable for headless hosts and tests.
#[derive(Debug)]
pub struct MemoryNavigator {
    location: Mutex<String>,
    history: Mutex<Vec<String>>,
}

impl MemoryNavigator {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: Mutex::new(location.into()),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Routes navigated to, oldest first
    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for MemoryNavigator {
    fn current_location(&self) -> String {
        self.location
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn navigate(&self, route: &str) {
        *self.location.lock().unwrap_or_else(PoisonError::into_inner) = route.to_string();
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route.to_string());
    }
}
