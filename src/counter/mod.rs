//! Cross-process request counter.
//!
//! # Responsibilities
//! - Assign each incoming request an index in a shared, monotonically
//!   increasing sequence
//! - Expose get / increment / reset plus an atomic fetch-and-increment
//!
//! # Design Decisions
//! - The default request path uses the two-step get-then-increment pair.
//!   That pair is not atomic across workers: two requests can read the same
//!   index before either increments, and the observed ratio drifts under
//!   contention. That trade-off is deliberate and documented;
//!   `fetch_increment` is the opt-in strict mode
//! - A counter failure surfaces as an error to the caller. The redirect path
//!   must never fall back to index 0, which would pin every decision to
//!   block position 0
//! - Backed by Redis in multi-worker deployments ([`RedisCounter`]); the
//!   in-memory variant ([`MemoryCounter`]) exists for single-worker setups
//!   and tests

pub mod memory;
pub mod redis;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use self::memory::MemoryCounter;
pub use self::redis::RedisCounter;

/// Errors surfaced by counter operations.
#[derive(Debug, Error)]
pub enum CounterError {
    /// The backing store rejected the operation or is unreachable.
    #[error("counter backend error: {0}")]
    Backend(#[from] ::redis::RedisError),

    /// The operation did not complete within the configured bound.
    #[error("counter operation timed out after {0:?}")]
    Timeout(Duration),
}

/// A monotonically increasing counter shared by all worker processes.
#[async_trait]
pub trait RequestCounter: Send + Sync {
    /// Current value; 0 when never incremented or just reset.
    async fn get(&self) -> Result<u64, CounterError>;

    /// Atomically add 1 in the backing store.
    async fn increment(&self) -> Result<(), CounterError>;

    /// Remove the stored value; the next `get` returns 0.
    async fn reset(&self) -> Result<(), CounterError>;

    /// Atomically increment and return the value *before* the increment.
    ///
    /// Strict alternative to the get/increment pair: no duplicate indices
    /// under concurrent load.
    async fn fetch_increment(&self) -> Result<u64, CounterError>;
}
