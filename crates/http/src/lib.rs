//! ootd HTTP client
//!
//! Typed access to the closet backend. Every resource call goes through
//! [`client::ApiClient`], which attaches the current bearer token and, on a
//! first-attempt 401, waits for a single shared session refresh before
//! retrying once.

#[macro_use]
extern crate tracing;

pub mod client;

pub use client::{
    ApiClient, OotdClient,
    auth::AuthApi,
    config::ClientConfig,
    error::{ClientError, RefreshError, Result},
    navigation::{MemoryNavigator, Navigator},
    session::{Refresher, SessionConfig, SessionManager, UnauthorizedHandler},
    token_store::TokenStore,
    transport::HttpTransport,
};
