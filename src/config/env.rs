//! Environment-sourced configuration loading.
//!
//! Recognized variables carry the `BALANCER_` prefix. The loader is a pure
//! function over a key/value map so tests can exercise it without touching
//! the process environment.

use std::collections::HashMap;
use std::time::Duration;

use url::Url;

use crate::config::schema::{
    parse_cdn_host, CounterMode, DatabaseSettings, Settings, SettingsPrecedence,
};
use crate::config::ConfigError;

/// Variable name prefix: `balancer_cdn_host` → `BALANCER_CDN_HOST`.
pub const ENV_PREFIX: &str = "BALANCER_";

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
const DEFAULT_BACKEND_TIMEOUT_MS: u64 = 5_000;

/// Load settings from the process environment.
pub fn from_env() -> Result<Settings, ConfigError> {
    let vars: HashMap<String, String> = std::env::vars().collect();
    from_vars(&vars)
}

/// Load settings from an explicit variable map.
pub fn from_vars(vars: &HashMap<String, String>) -> Result<Settings, ConfigError> {
    let cdn_host = parse_cdn_host(require(vars, "CDN_HOST")?)?;
    let redirect_ratio = require(vars, "REDIRECT_RATIO")?.parse()?;

    let redis_url = get(vars, "REDIS_URL")
        .map(|raw| {
            Url::parse(raw).map_err(|err| ConfigError::InvalidVar {
                var: var_name("REDIS_URL"),
                reason: err.to_string(),
            })
        })
        .transpose()?;

    // The database block is all-or-nothing: a URL with missing credentials
    // is an incomplete configuration, not a fallback to defaults.
    let database = match get(vars, "DATABASE_URL") {
        Some(url) => Some(DatabaseSettings {
            url: url.to_string(),
            user: require(vars, "DATABASE_USER")?.to_string(),
            password: require(vars, "DATABASE_PASSWORD")?.to_string(),
            database_name: require(vars, "DATABASE_NAME")?.to_string(),
        }),
        None => None,
    };

    let bind_address = get(vars, "BIND_ADDRESS")
        .unwrap_or(DEFAULT_BIND_ADDRESS)
        .to_string();

    let counter_mode = parse_or_default(vars, "COUNTER_MODE", CounterMode::default())?;
    let settings_precedence =
        parse_or_default(vars, "SETTINGS_PRECEDENCE", SettingsPrecedence::default())?;

    let backend_timeout = match get(vars, "BACKEND_TIMEOUT_MS") {
        Some(raw) => Duration::from_millis(raw.parse().map_err(|_| ConfigError::InvalidVar {
            var: var_name("BACKEND_TIMEOUT_MS"),
            reason: format!("expected milliseconds as an integer, got {raw:?}"),
        })?),
        None => Duration::from_millis(DEFAULT_BACKEND_TIMEOUT_MS),
    };

    Ok(Settings {
        cdn_host,
        redirect_ratio,
        redis_url,
        database,
        bind_address,
        counter_mode,
        settings_precedence,
        backend_timeout,
    })
}

fn var_name(name: &str) -> String {
    format!("{ENV_PREFIX}{name}")
}

fn get<'a>(vars: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    vars.get(&var_name(name)).map(String::as_str)
}

fn require<'a>(vars: &'a HashMap<String, String>, name: &str) -> Result<&'a str, ConfigError> {
    get(vars, name).ok_or_else(|| ConfigError::MissingVar(var_name(name)))
}

fn parse_or_default<T>(
    vars: &HashMap<String, String>,
    name: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr<Err = String>,
{
    match get(vars, name) {
        Some(raw) => raw.parse().map_err(|reason| ConfigError::InvalidVar {
            var: var_name(name),
            reason,
        }),
        None => Ok(default),
    }
}
