//! keyhold-lock - distributed mutual exclusion over a coordination service
//!
//! A lock is a key in the coordination service's KV store, held by a
//! TTL-bound session. Acquisition is a conditional write that only
//! succeeds while the key is unheld; the service's linearizable write is
//! the sole arbiter among racing acquirers.
//!
//! ```no_run
//! use std::sync::Arc;
//! use keyhold_client::{ClientConfig, HttpCoordinationClient};
//! use keyhold_lock::{EphemeralLock, LockConfig};
//!
//! # async fn example() -> Result<(), keyhold_lock::LockError> {
//! let client = Arc::new(HttpCoordinationClient::new(ClientConfig::default())?);
//! let config = LockConfig::default().with_acquire_timeout_ms(2000);
//! let lock = EphemeralLock::with_config(client, "my/special/key", config)?;
//!
//! lock.hold(|| async {
//!     // protected work
//! })
//! .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod lock;
pub mod session;

pub use config::{LockConfig, ValueGenerator, default_config, set_default_config};
pub use error::{LockError, Result};
pub use lock::{EphemeralLock, LockState};
pub use session::{SESSION_TTL_MAX_SECS, SESSION_TTL_MIN_SECS, SessionManager};

pub use keyhold_client::CoordinationClient;
