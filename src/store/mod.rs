//! Persisted configuration store.
//!
//! # Responsibilities
//! - Hold the authoritative {cdn_host, redirect_ratio} in a singleton-row
//!   PostgreSQL table
//! - Notify the registered change listener after every successful write
//!
//! # Design Decisions
//! - The single row is enforced at the storage layer (`onerow_id bool
//!   PRIMARY KEY DEFAULT true` plus a CHECK constraint); writers address it
//!   with `WHERE onerow_id = true`, never by row identity
//! - Every write reads the row back before reporting success; a write whose
//!   read-back finds nothing is an invariant violation and propagates as an
//!   error instead of being defaulted away
//! - The change listener is an explicit one-shot subscription; the
//!   application context registers it exactly once at startup. Updates made
//!   through one worker's store are only observed in that process

pub mod postgres;

pub use postgres::SettingsStore;

use thiserror::Error;

/// Errors surfaced by the persisted settings store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Connection, query, or pool failure.
    #[error("settings store error: {0}")]
    Database(#[from] sqlx::Error),

    /// The persisted row exists but fails validation.
    #[error("persisted settings row is corrupt: {0}")]
    Corrupt(String),

    /// A write reported success but the immediate read-back found no row.
    #[error("settings row missing immediately after a successful write")]
    ReadBackMissing,
}
