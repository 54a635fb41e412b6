//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! environment (BALANCER_* variables)
//!     → env.rs (read & parse)
//!     → schema.rs (typed Settings, validated)
//!     → merged with the persisted row at startup (lifecycle::startup)
//!     → shared via ArcSwap<Settings> to all handlers
//!
//! On PUT /settings:
//!     store persists the new row
//!     → change listener fires with the persisted values
//!     → atomic swap of Arc<Settings>
//!     → next request observes the new ratio/host
//! ```
//!
//! # Design Decisions
//! - Settings are immutable once constructed; an update builds a whole new
//!   snapshot and swaps it in, never mutates fields in place
//! - The ratio is parsed strictly into a reduced rational; request handlers
//!   never see an unvalidated ratio
//! - An incomplete configuration is a startup failure, not a default

pub mod env;
pub mod ratio;
pub mod schema;

pub use ratio::{RatioParseError, RedirectRatio};
pub use schema::{BalancerSettings, CounterMode, DatabaseSettings, Settings, SettingsPrecedence};

use thiserror::Error;

/// Errors raised while resolving the startup configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is absent.
    #[error("missing required environment variable {0}")]
    MissingVar(String),

    /// A variable is present but its value cannot be used.
    #[error("invalid value for {var}: {reason}")]
    InvalidVar { var: String, reason: String },

    /// The CDN host is not an absolute http(s) URL with a host component.
    #[error("cdn host must be an absolute http(s) URL with a host, got {0:?}")]
    CdnHost(String),

    /// The redirect ratio string failed validation.
    #[error(transparent)]
    Ratio(#[from] RatioParseError),
}
