//! Signoff daemon library
//!
//! This module provides the core components of the signoff daemon:
//! - REST API handlers for the approval workflow and notification inbox
//! - Live notification streaming over SSE
//! - Due-date sweep scheduling
//! - Server lifecycle management

pub mod api;
pub mod config;
pub mod error;
pub mod server;

pub use config::DaemonConfig;
pub use error::{ApiError, DaemonError};
pub use server::Server;
