//! HTTP server setup and shared application state.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::schema::Settings;
use crate::counter::RequestCounter;
use crate::http::{redirect, settings_api};
use crate::store::SettingsStore;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Application state injected into handlers.
///
/// Built once at startup (see `lifecycle::startup`); nothing in here is
/// lazily initialized. The settings snapshot is swapped atomically on hot
/// reload, so handlers always dereference the current configuration.
#[derive(Clone)]
pub struct AppState {
    /// Active configuration snapshot.
    pub settings: Arc<ArcSwap<Settings>>,

    /// Shared request counter.
    pub counter: Arc<dyn RequestCounter>,

    /// Persisted settings store, when a database backend is configured.
    pub store: Option<Arc<SettingsStore>>,
}

impl AppState {
    pub fn new(
        settings: Settings,
        counter: Arc<dyn RequestCounter>,
        store: Option<Arc<SettingsStore>>,
    ) -> Self {
        Self {
            settings: Arc::new(ArcSwap::from_pointee(settings)),
            counter,
            store,
        }
    }
}

/// HTTP server for the balancer.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server over the given application state.
    pub fn new(state: AppState) -> Self {
        let router = Router::new()
            .route("/", get(redirect::redirect_handler))
            .route("/health", get(health_check))
            .route(
                "/settings",
                get(settings_api::read_settings).put(settings_api::update_settings),
            )
            .with_state(state)
            .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
            .layer(TraceLayer::new_for_http());

        Self { router }
    }

    /// Run the server until ctrl-c or a shutdown broadcast.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    result = tokio::signal::ctrl_c() => {
                        if let Err(err) = result {
                            tracing::error!(error = %err, "failed to install ctrl-c handler");
                        }
                    }
                    _ = shutdown.recv() => {}
                }
                tracing::info!("shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Liveness probe: empty 200.
async fn health_check() -> StatusCode {
    StatusCode::OK
}
