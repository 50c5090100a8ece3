//! Tracing setup shared by ootd binaries
//!
//! Library code only emits events through the `tracing` macros; binaries
//! call [`init::init_tracing`] once at startup.

pub mod config;
pub mod init;

pub use config::{InstrumentationConfig, LogFormat};
pub use init::init_tracing;
