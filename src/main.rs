//! cdn-balancer daemon.
//!
//! ```text
//!                       ┌──────────────────────────────────────────────┐
//!                       │                 CDN BALANCER                 │
//!                       │                                              │
//!   GET /?video=...     │  ┌────────┐   ┌──────────┐   ┌───────────┐  │
//!   ────────────────────┼─▶│  http  │──▶│ balancer │──▶│  counter  │──┼──▶ Redis
//!                       │  │ server │   │ splitter │   │  (shared) │  │
//!   301 Location: ...   │  └────────┘   └──────────┘   └───────────┘  │
//!   ◀───────────────────┼──────┘                                      │
//!                       │                                              │
//!   PUT /settings       │  ┌──────────┐   ┌─────────────────────────┐ │
//!   ────────────────────┼─▶│  store   │──▶│ invalidation → ArcSwap  │─┼──▶ Postgres
//!                       │  │ (onerow) │   │ settings snapshot        │ │
//!                       │  └──────────┘   └─────────────────────────┘ │
//!                       └──────────────────────────────────────────────┘
//! ```

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cdn_balancer::config;
use cdn_balancer::http::HttpServer;
use cdn_balancer::lifecycle::{self, Shutdown};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cdn_balancer=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("cdn-balancer v{} starting", env!("CARGO_PKG_VERSION"));

    let settings = config::env::from_env()?;
    tracing::info!(
        bind_address = %settings.bind_address,
        cdn_host = %settings.cdn_host,
        redirect_ratio = %settings.redirect_ratio,
        counter_mode = ?settings.counter_mode,
        "configuration loaded"
    );

    let bind_address = settings.bind_address.clone();
    let state = lifecycle::startup::init_app_state(settings).await?;

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(state);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("shutdown complete");
    Ok(())
}
