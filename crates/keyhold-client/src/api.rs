//! The coordination-service seam the lock protocol is written against.

use async_trait::async_trait;

use crate::error::Result;

/// Minimal session + conditional-KV surface of a strongly-consistent
/// coordination service.
///
/// The conditional write (`acquire_key`) and conditional delete
/// (`release_key`) are the sole arbiters of lock ownership; implementations
/// must provide linearizable semantics for both. [`HttpCoordinationClient`]
/// implements this over the Consul v1 HTTP API; tests implement it over an
/// in-memory store.
///
/// [`HttpCoordinationClient`]: crate::http::HttpCoordinationClient
#[async_trait]
pub trait CoordinationClient: Send + Sync {
    /// Create a session with the given TTL in seconds. Returns the session id.
    async fn create_session(&self, ttl_seconds: u64) -> Result<String>;

    /// Destroy a session. Returns `false` if the session was already gone.
    async fn destroy_session(&self, session_id: &str) -> Result<bool>;

    /// Conditionally write `value` at `key`, owned by `session_id`.
    ///
    /// Returns `true` iff the key was unheld and is now associated with the
    /// session.
    async fn acquire_key(&self, key: &str, value: &str, session_id: &str) -> Result<bool>;

    /// Conditionally remove the record at `key`.
    ///
    /// Returns `true` iff the key was held by `session_id` and has been
    /// released and deleted; `false` if it was unheld or held by someone
    /// else (in which case nothing is touched).
    async fn release_key(&self, key: &str, session_id: &str) -> Result<bool>;
}
