//! Application context construction.
//!
//! # Responsibilities
//! - Build the counter and store handles from the startup settings
//! - Perform first-run seeding of the persisted row
//! - Resolve environment vs persisted precedence
//! - Subscribe the snapshot-swapping change listener exactly once
//!
//! # Design Decisions
//! - Everything is constructed here, up front; handlers receive finished
//!   handles and there are no lazily initialized globals
//! - Any backend failure during startup is fatal: the process must not
//!   serve traffic with a partial configuration

use std::sync::Arc;

use thiserror::Error;

use crate::config::schema::{Settings, SettingsPrecedence};
use crate::counter::{CounterError, MemoryCounter, RedisCounter, RequestCounter};
use crate::http::server::AppState;
use crate::store::{SettingsStore, StoreError};

/// Fatal startup failures.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("counter backend unavailable: {0}")]
    Counter(#[from] CounterError),

    #[error("settings store unavailable: {0}")]
    Store(#[from] StoreError),
}

/// Name of the logical request counter; combined with the shared namespace
/// this yields the fixed key every worker reads and writes.
const COUNTER_NAME: &str = "request-counter";

/// Build the application state from environment-sourced settings.
pub async fn init_app_state(env_settings: Settings) -> Result<AppState, StartupError> {
    let counter: Arc<dyn RequestCounter> = match &env_settings.redis_url {
        Some(url) => {
            tracing::info!(redis_url = %url, "using shared redis request counter");
            Arc::new(
                RedisCounter::connect(url, COUNTER_NAME, env_settings.backend_timeout).await?,
            )
        }
        None => {
            tracing::warn!(
                "no redis url configured, using a process-local request counter; \
                 the configured ratio only holds for a single worker"
            );
            Arc::new(MemoryCounter::new())
        }
    };

    let mut active_settings = env_settings.clone();
    let store = match &env_settings.database {
        Some(database) => {
            let store =
                Arc::new(SettingsStore::connect(database, env_settings.backend_timeout).await?);
            store.create_table().await?;

            match store.fetch().await? {
                Some(persisted) => match env_settings.settings_precedence {
                    SettingsPrecedence::Persisted => {
                        tracing::info!(
                            cdn_host = %persisted.cdn_host,
                            redirect_ratio = %persisted.redirect_ratio,
                            "adopting persisted settings row"
                        );
                        active_settings = env_settings.with_balancer(persisted);
                    }
                    SettingsPrecedence::Env => {
                        tracing::info!(
                            "environment settings take precedence; persisted row left as is"
                        );
                    }
                },
                // First run: the environment configuration becomes the
                // authoritative row.
                None => {
                    store.seed(&env_settings.balancer()).await?;
                }
            }

            Some(store)
        }
        None => None,
    };

    let state = AppState::new(active_settings, counter, store);

    if let Some(store) = &state.store {
        let snapshot = state.settings.clone();
        store.subscribe(move |persisted| {
            let current = snapshot.load_full();
            snapshot.store(Arc::new(current.with_balancer(persisted.clone())));
            tracing::info!(
                cdn_host = %persisted.cdn_host,
                redirect_ratio = %persisted.redirect_ratio,
                "active settings snapshot replaced"
            );
        });
    }

    Ok(state)
}
