//! Configuration schema definitions.
//!
//! Two layers of settings exist:
//! - [`Settings`] is the full per-process configuration: the balancer values
//!   plus runtime-only fields (backend addresses, bind address, modes).
//! - [`BalancerSettings`] is the hot-reloadable subset that lives in the
//!   persisted store and travels over the `/settings` API.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::ratio::RedirectRatio;
use crate::config::ConfigError;

/// Parse and validate a CDN host URL.
///
/// The host must be absolute, use http or https, and carry a host component;
/// anything else makes the redirect target undefined.
pub fn parse_cdn_host(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value).map_err(|_| ConfigError::CdnHost(value.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ConfigError::CdnHost(value.to_string()));
    }
    Ok(url)
}

fn deserialize_cdn_host<'de, D>(deserializer: D) -> Result<Url, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_cdn_host(&raw).map_err(serde::de::Error::custom)
}

/// The hot-reloadable balancer values: CDN host and redirect ratio.
///
/// This is the shape of the persisted singleton row and of the `/settings`
/// JSON body (ratio serialized as `"N:D"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalancerSettings {
    /// URL of the CDN service.
    #[serde(deserialize_with = "deserialize_cdn_host")]
    pub cdn_host: Url,

    /// Ratio of CDN redirects to origin-server redirects.
    pub redirect_ratio: RedirectRatio,
}

/// PostgreSQL connection settings for the persisted settings store.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseSettings {
    /// Connection URL (host/port part of the DSN).
    pub url: String,

    /// Database user name.
    pub user: String,

    /// Database user password.
    pub password: String,

    /// Name of the database holding the settings table.
    pub database_name: String,
}

/// How the redirect handler consumes the shared counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CounterMode {
    /// Read the index, decide, then increment. Default; concurrent workers
    /// can observe duplicate indices.
    #[default]
    TwoStep,

    /// Native atomic fetch-and-increment. Strict mode: no duplicate indices
    /// under contention.
    Atomic,
}

impl FromStr for CounterMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "two-step" => Ok(Self::TwoStep),
            "atomic" => Ok(Self::Atomic),
            other => Err(format!("expected \"two-step\" or \"atomic\", got {other:?}")),
        }
    }
}

/// Which source wins at startup when both the environment and the persisted
/// store provide balancer values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettingsPrecedence {
    /// An existing persisted row replaces the environment-sourced values.
    #[default]
    Persisted,

    /// Environment values stay active; the row is only seeded when absent.
    Env,
}

impl FromStr for SettingsPrecedence {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "persisted" => Ok(Self::Persisted),
            "env" => Ok(Self::Env),
            other => Err(format!("expected \"persisted\" or \"env\", got {other:?}")),
        }
    }
}

/// Full per-process configuration snapshot.
///
/// Immutable once constructed; hot updates build a new value via
/// [`Settings::with_balancer`] and atomically swap the process's active
/// reference.
#[derive(Debug, Clone)]
pub struct Settings {
    /// URL of the CDN service.
    pub cdn_host: Url,

    /// Ratio of CDN redirects to origin-server redirects.
    pub redirect_ratio: RedirectRatio,

    /// Address of the shared counter backend. When absent the process falls
    /// back to a process-local counter (single-worker deployments only).
    pub redis_url: Option<Url>,

    /// Persisted settings store. When absent, `/settings` updates are
    /// rejected and configuration is environment-only.
    pub database: Option<DatabaseSettings>,

    /// Listener bind address.
    pub bind_address: String,

    /// Counter consumption mode for the redirect handler.
    pub counter_mode: CounterMode,

    /// Startup precedence between environment and persisted values.
    pub settings_precedence: SettingsPrecedence,

    /// Bound on every counter/store backend operation.
    pub backend_timeout: Duration,
}

impl Settings {
    /// The hot-reloadable subset of this snapshot.
    pub fn balancer(&self) -> BalancerSettings {
        BalancerSettings {
            cdn_host: self.cdn_host.clone(),
            redirect_ratio: self.redirect_ratio,
        }
    }

    /// Build a new snapshot with the given balancer values, keeping every
    /// runtime-only field from `self`.
    pub fn with_balancer(&self, balancer: BalancerSettings) -> Settings {
        Settings {
            cdn_host: balancer.cdn_host,
            redirect_ratio: balancer.redirect_ratio,
            ..self.clone()
        }
    }
}
