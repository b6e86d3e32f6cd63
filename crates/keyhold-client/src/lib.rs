//! keyhold-client - HTTP client SDK for a Consul-compatible coordination service
//!
//! This crate provides:
//! - The [`CoordinationClient`] trait: the session + conditional-KV surface
//!   the lock protocol in `keyhold-lock` is written against
//! - [`HttpCoordinationClient`]: a reqwest-backed implementation over the
//!   Consul v1 HTTP API (sessions, KV acquire/release)
//! - Wire model types for sessions and KV entries

pub mod api;
pub mod error;
pub mod http;
pub mod model;

pub use api::CoordinationClient;
pub use error::{ClientError, Result};
pub use http::{ClientConfig, HttpCoordinationClient};
pub use model::{KvPair, Session, SessionCreateRequest, SessionCreateResponse};
