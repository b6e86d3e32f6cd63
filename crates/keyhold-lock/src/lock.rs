//! The ephemeral lock state machine
//!
//! Designed for relatively short-lived use-cases, primarily preventing
//! race conditions in application-logic hot spots. Locks are single use:
//! once released an instance is done for good.
//!
//! All serialization of concurrent acquirers is delegated to the
//! coordination service's conditional write; the client holds no local
//! mutex over the remote resource and performs no session heartbeat. A
//! holder that crashes without releasing keeps the key held until the
//! session TTL lapses server-side.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::time::{Duration, Instant, sleep};
use tracing::{debug, warn};

use keyhold_client::CoordinationClient;

use crate::config::{LockConfig, default_config};
use crate::error::{LockError, Result};
use crate::session::SessionManager;

/// Upper bound on conditional-write attempts within a single acquisition,
/// independent of the deadline
const MAX_ACQUIRE_ATTEMPTS: u32 = 1000;

/// Lifecycle of a lock instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    Unacquired,
    Held,
    Released,
}

/// A single-use distributed lock on one key.
///
/// Instances are single-owner: operations take `&mut self`, and sharing an
/// instance across tasks requires external synchronization. Distinct
/// instances for the same key may race freely from any number of tasks;
/// the service's conditional write decides the winner.
///
/// There is no reentrancy: a holder that acquires a second instance for
/// the same key competes with itself and loses until something times out.
pub struct EphemeralLock {
    client: Arc<dyn CoordinationClient>,
    sessions: SessionManager,
    config: LockConfig,
    full_key: String,
    state: LockState,
    session_id: Option<String>,
}

impl EphemeralLock {
    /// Create a lock for `key` using the process-wide default config.
    pub fn new(client: Arc<dyn CoordinationClient>, key: &str) -> Result<Self> {
        Self::with_config(client, key, default_config())
    }

    /// Create a lock for `key` with an explicit config.
    pub fn with_config(
        client: Arc<dyn CoordinationClient>,
        key: &str,
        config: LockConfig,
    ) -> Result<Self> {
        if key.is_empty() {
            return Err(LockError::Configuration(
                "lock key must not be empty".to_string(),
            ));
        }

        let full_key = format!("{}{}", config.key_prefix, key);
        Ok(Self {
            sessions: SessionManager::new(client.clone()),
            client,
            config,
            full_key,
            state: LockState::Unacquired,
            session_id: None,
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> LockState {
        self.state
    }

    /// The full coordination-service key this lock contends on
    pub fn full_key(&self) -> &str {
        &self.full_key
    }

    /// The owning session while held
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Attempt to acquire the lock, waiting up to the configured
    /// `acquire_timeout_ms`.
    ///
    /// Returns `Ok(true)` on ownership. Returns `Ok(false)` if the deadline
    /// passed with the key still held elsewhere, which is an expected
    /// outcome rather than an error. A timeout of 0 means exactly one
    /// attempt. Transport failures surface immediately as `Err`.
    pub async fn try_acquire(&mut self) -> Result<bool> {
        if self.state != LockState::Unacquired {
            return Err(LockError::State { actual: self.state });
        }

        let session_id = self
            .sessions
            .create(self.config.lock_timeout_seconds)
            .await?;

        let started = Instant::now();
        let budget = Duration::from_millis(self.config.acquire_timeout_ms);

        for attempt in 0..MAX_ACQUIRE_ATTEMPTS {
            let value = (self.config.value_generator)();
            let acquired = match self
                .client
                .acquire_key(&self.full_key, &value, &session_id)
                .await
            {
                Ok(acquired) => acquired,
                Err(e) => {
                    self.sessions.destroy(&session_id).await;
                    return Err(e.into());
                }
            };

            if acquired {
                debug!(key = %self.full_key, session_id = %session_id, "lock acquired");
                self.session_id = Some(session_id);
                self.state = LockState::Held;
                return Ok(true);
            }

            let remaining = budget.saturating_sub(started.elapsed());
            if remaining.is_zero() {
                break;
            }

            // Exponential backoff, capped by the remaining deadline budget
            let backoff = Duration::from_millis(50u64.saturating_mul(u64::from(attempt).pow(2)));
            sleep(backoff.min(remaining)).await;
        }

        self.sessions.destroy(&session_id).await;
        debug!(
            key = %self.full_key,
            waited_ms = started.elapsed().as_millis() as u64,
            "lock acquisition timed out"
        );
        Ok(false)
    }

    /// Acquire the lock or fail with [`LockError::AcquireTimeout`].
    ///
    /// The error reports the time actually spent waiting, which can exceed
    /// the configured budget when individual attempts are slow.
    pub async fn acquire(&mut self) -> Result<()> {
        let started = Instant::now();
        if self.try_acquire().await? {
            Ok(())
        } else {
            Err(LockError::AcquireTimeout {
                key: self.full_key.clone(),
                waited_ms: started.elapsed().as_millis() as u64,
            })
        }
    }

    /// Release the lock.
    ///
    /// Never fails: cleanup errors are logged and suppressed so this can
    /// always run unconditionally in cleanup paths. A no-op unless the lock
    /// is currently held; idempotent. Afterwards the instance is
    /// `Released` and cannot be acquired again.
    pub async fn release(&mut self) {
        if self.state != LockState::Held {
            return;
        }

        if let Some(session_id) = self.session_id.take() {
            // Conditional on still owning the key: after an external session
            // expiry another process may have re-acquired it, and their
            // record must not be touched.
            match self.client.release_key(&self.full_key, &session_id).await {
                Ok(true) => debug!(key = %self.full_key, "lock released"),
                Ok(false) => {
                    debug!(key = %self.full_key, "lock record was already gone")
                }
                Err(e) => {
                    warn!(key = %self.full_key, error = %e, "failed to delete lock record")
                }
            }
            self.sessions.destroy(&session_id).await;
        }

        self.state = LockState::Released;
    }

    /// Hold the lock around `work`: fail-hard acquire, run the protected
    /// future, then release on every exit path (normal completion, an
    /// error value flowing out, or a panic, which is resumed after the
    /// release).
    pub async fn hold<F, Fut, T>(mut self, work: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.acquire().await?;
        let outcome = AssertUnwindSafe(work()).catch_unwind().await;
        self.release().await;

        match outcome {
            Ok(value) => Ok(value),
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

impl std::fmt::Debug for EphemeralLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EphemeralLock")
            .field("config", &self.config)
            .field("full_key", &self.full_key)
            .field("state", &self.state)
            .field("session_id", &self.session_id)
            .finish_non_exhaustive()
    }
}
