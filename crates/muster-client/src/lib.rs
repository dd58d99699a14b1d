//! Campus events API integration for muster
//!
//! This crate provides the service-facing half of the toolkit:
//!
//! - `client` - CampusClient (HTTP client for the campus events API)
//! - `fake` - CampusFake, an in-memory EventService for tests/offline use
//! - `session` - decode-once bearer-token session context
//! - `config` - file/env client configuration

pub mod client;
pub mod config;
pub mod fake;
pub mod session;


pub use client::CampusClient;
pub use config::ClientConfig;
pub use fake::{CampusFake, FakeProfile};
pub use session::{Role, Session, SessionError, UserClaims};
