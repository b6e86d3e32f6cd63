//! Lock error types

use keyhold_client::ClientError;

use crate::lock::LockState;

/// Error type for lock operations
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    /// Invalid configuration (TTL out of the service's accepted bounds,
    /// empty lock key)
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Acquire called on an instance that is not in the `Unacquired` state.
    /// Lock instances are single use.
    #[error("lock is {actual:?}; acquisition requires an unacquired instance")]
    State { actual: LockState },

    /// Fail-hard acquisition exceeded its deadline without winning the key
    #[error("failed to acquire lock on {key} within {waited_ms}ms")]
    AcquireTimeout { key: String, waited_ms: u64 },

    /// Transport/service failure, surfaced unmodified
    #[error("coordination service error: {0}")]
    Coordination(#[from] ClientError),
}

pub type Result<T> = std::result::Result<T, LockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LockError::AcquireTimeout {
            key: "locks/ephemeral/a".to_string(),
            waited_ms: 500,
        };
        assert_eq!(
            err.to_string(),
            "failed to acquire lock on locks/ephemeral/a within 500ms"
        );

        let err = LockError::State {
            actual: LockState::Released,
        };
        assert!(err.to_string().contains("Released"));
    }
}
