//! Lock configuration
//!
//! An immutable config struct is passed to each lock constructor. A
//! process-wide default can be installed once with [`set_default_config`]
//! and is read at construction time by `EphemeralLock::new`; there is no
//! ambient mutable state beyond that.

use std::fmt;
use std::sync::{Arc, OnceLock};

/// Producer of the payload stored at the lock key while held
pub type ValueGenerator = Arc<dyn Fn() -> String + Send + Sync>;

/// Configuration for ephemeral locks
#[derive(Clone)]
pub struct LockConfig {
    /// Max wait for acquisition in milliseconds; 0 means a single attempt
    pub acquire_timeout_ms: u64,
    /// Session TTL in seconds; how long the lock survives if never released
    pub lock_timeout_seconds: u64,
    /// Prefix prepended to the logical key to form the full KV path
    pub key_prefix: String,
    /// Producer of the stored payload
    pub value_generator: ValueGenerator,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            acquire_timeout_ms: 0,
            lock_timeout_seconds: 180,
            key_prefix: "locks/ephemeral/".to_string(),
            value_generator: Arc::new(timestamp_value),
        }
    }
}

impl LockConfig {
    /// Set the acquisition deadline in milliseconds
    pub fn with_acquire_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.acquire_timeout_ms = timeout_ms;
        self
    }

    /// Set the session TTL in seconds
    pub fn with_lock_timeout_seconds(mut self, ttl_seconds: u64) -> Self {
        self.lock_timeout_seconds = ttl_seconds;
        self
    }

    /// Set the key prefix
    pub fn with_key_prefix(mut self, prefix: &str) -> Self {
        self.key_prefix = prefix.to_string();
        self
    }

    /// Set the stored-payload generator
    pub fn with_value_generator(mut self, generator: ValueGenerator) -> Self {
        self.value_generator = generator;
        self
    }
}

impl fmt::Debug for LockConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockConfig")
            .field("acquire_timeout_ms", &self.acquire_timeout_ms)
            .field("lock_timeout_seconds", &self.lock_timeout_seconds)
            .field("key_prefix", &self.key_prefix)
            .finish_non_exhaustive()
    }
}

/// Default payload: a JSON object recording when the lock was taken
fn timestamp_value() -> String {
    serde_json::json!({ "locked_at": chrono::Utc::now().to_rfc3339() }).to_string()
}

static DEFAULT_CONFIG: OnceLock<LockConfig> = OnceLock::new();

/// Install the process-wide default config. The first install wins; returns
/// `false` if a default was already set.
pub fn set_default_config(config: LockConfig) -> bool {
    DEFAULT_CONFIG.set(config).is_ok()
}

/// The process-wide default config, or `LockConfig::default()` if none was
/// installed.
pub fn default_config() -> LockConfig {
    DEFAULT_CONFIG.get().cloned().unwrap_or_default()
}
