//! Session lifecycle management
//!
//! Sessions are temporary, owned by exactly one lock instance, and bounded
//! by their TTL; the coordination service reclaims held keys when a session
//! dies.

use std::sync::Arc;

use tracing::{debug, warn};

use keyhold_client::CoordinationClient;

use crate::error::{LockError, Result};

/// Smallest session TTL the coordination service accepts, in seconds
pub const SESSION_TTL_MIN_SECS: u64 = 10;
/// Largest session TTL the coordination service accepts, in seconds
pub const SESSION_TTL_MAX_SECS: u64 = 3600;

/// Creates and destroys TTL-bound sessions against the coordination service
#[derive(Clone)]
pub struct SessionManager {
    client: Arc<dyn CoordinationClient>,
}

impl SessionManager {
    pub fn new(client: Arc<dyn CoordinationClient>) -> Self {
        Self { client }
    }

    /// Create a session with the given TTL.
    ///
    /// The TTL is validated against the service's accepted bounds before
    /// any network call is made.
    pub async fn create(&self, ttl_seconds: u64) -> Result<String> {
        if !(SESSION_TTL_MIN_SECS..=SESSION_TTL_MAX_SECS).contains(&ttl_seconds) {
            return Err(LockError::Configuration(format!(
                "lock_timeout_seconds must be between {} and {}, got {}",
                SESSION_TTL_MIN_SECS, SESSION_TTL_MAX_SECS, ttl_seconds
            )));
        }

        let session_id = self.client.create_session(ttl_seconds).await?;
        debug!(session_id = %session_id, ttl_seconds, "session created");
        Ok(session_id)
    }

    /// Destroy a session, best effort.
    ///
    /// Destroying an already-gone session is not an error; failures are
    /// logged and swallowed so callers can always run this during cleanup.
    pub async fn destroy(&self, session_id: &str) {
        match self.client.destroy_session(session_id).await {
            Ok(true) => debug!(session_id = %session_id, "session destroyed"),
            Ok(false) => debug!(session_id = %session_id, "session was already gone"),
            Err(e) => warn!(session_id = %session_id, error = %e, "failed to destroy session"),
        }
    }
}
