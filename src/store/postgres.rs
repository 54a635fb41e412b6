//! PostgreSQL implementation of the settings store.

use std::sync::OnceLock;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};

use crate::config::schema::{parse_cdn_host, BalancerSettings, DatabaseSettings};
use crate::store::StoreError;

/// Callback invoked with the persisted values after each successful write.
pub type ChangeListener = Box<dyn Fn(&BalancerSettings) + Send + Sync>;

/// Singleton-row settings store backed by PostgreSQL.
pub struct SettingsStore {
    pool: PgPool,
    on_change: OnceLock<ChangeListener>,
}

impl SettingsStore {
    /// Create a store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            on_change: OnceLock::new(),
        }
    }

    /// Connect to the database and create the store.
    pub async fn connect(
        database: &DatabaseSettings,
        acquire_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let options = database
            .url
            .parse::<PgConnectOptions>()?
            .username(&database.user)
            .password(&database.password)
            .database(&database.database_name);

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(acquire_timeout)
            .connect_with(options)
            .await?;

        Ok(Self::new(pool))
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Register the change listener. At most one listener may ever be
    /// registered; later calls are ignored with a warning.
    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&BalancerSettings) + Send + Sync + 'static,
    {
        if self.on_change.set(Box::new(listener)).is_err() {
            tracing::warn!("settings change listener already registered, ignoring new registration");
        }
    }

    /// Create the singleton-row table if it does not exist.
    pub async fn create_table(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS settings(
                onerow_id bool PRIMARY KEY DEFAULT true,
                cdn_host text NOT NULL,
                redirect_ratio text NOT NULL,
                CONSTRAINT onerow_uni CHECK (onerow_id)
            );
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Read the persisted settings, if a row exists.
    pub async fn fetch(&self) -> Result<Option<BalancerSettings>, StoreError> {
        let row: Option<(String, String)> =
            sqlx::query_as("SELECT cdn_host, redirect_ratio FROM settings WHERE onerow_id = true")
                .fetch_optional(&self.pool)
                .await?;
        row.map(|(cdn_host, redirect_ratio)| decode_row(&cdn_host, &redirect_ratio))
            .transpose()
    }

    /// Insert the initial row (first-run seeding) and return the persisted
    /// values.
    pub async fn seed(&self, settings: &BalancerSettings) -> Result<BalancerSettings, StoreError> {
        sqlx::query("INSERT INTO settings(cdn_host, redirect_ratio) VALUES($1, $2)")
            .bind(settings.cdn_host.as_str())
            .bind(settings.redirect_ratio.to_string())
            .execute(&self.pool)
            .await?;

        tracing::info!(
            cdn_host = %settings.cdn_host,
            redirect_ratio = %settings.redirect_ratio,
            "seeded persisted settings row"
        );
        self.read_back_and_notify().await
    }

    /// Replace the persisted values and return what was written.
    pub async fn update(&self, settings: &BalancerSettings) -> Result<BalancerSettings, StoreError> {
        sqlx::query("UPDATE settings SET cdn_host = $1, redirect_ratio = $2 WHERE onerow_id = true")
            .bind(settings.cdn_host.as_str())
            .bind(settings.redirect_ratio.to_string())
            .execute(&self.pool)
            .await?;

        tracing::info!(
            cdn_host = %settings.cdn_host,
            redirect_ratio = %settings.redirect_ratio,
            "updated persisted settings row"
        );
        self.read_back_and_notify().await
    }

    /// Read the row back after a write and fire the change listener.
    ///
    /// The listener runs synchronously, exactly once per successful write,
    /// with the values that are actually on disk.
    async fn read_back_and_notify(&self) -> Result<BalancerSettings, StoreError> {
        let persisted = self.fetch().await?.ok_or(StoreError::ReadBackMissing)?;
        if let Some(listener) = self.on_change.get() {
            listener(&persisted);
        }
        Ok(persisted)
    }
}

fn decode_row(cdn_host: &str, redirect_ratio: &str) -> Result<BalancerSettings, StoreError> {
    let cdn_host = parse_cdn_host(cdn_host).map_err(|err| StoreError::Corrupt(err.to_string()))?;
    let redirect_ratio = redirect_ratio
        .parse()
        .map_err(|err: crate::config::RatioParseError| StoreError::Corrupt(err.to_string()))?;
    Ok(BalancerSettings {
        cdn_host,
        redirect_ratio,
    })
}
