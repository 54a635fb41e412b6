//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use cdn_balancer::config::schema::{CounterMode, Settings, SettingsPrecedence};
use cdn_balancer::counter::MemoryCounter;
use cdn_balancer::http::{AppState, HttpServer};
use cdn_balancer::lifecycle::Shutdown;

/// Settings for a store-less, in-memory-counter balancer.
pub fn test_settings(ratio: &str) -> Settings {
    Settings {
        cdn_host: "http://cdn-domain".parse().unwrap(),
        redirect_ratio: ratio.parse().unwrap(),
        redis_url: None,
        database: None,
        bind_address: "127.0.0.1:0".to_string(),
        counter_mode: CounterMode::TwoStep,
        settings_precedence: SettingsPrecedence::Persisted,
        backend_timeout: Duration::from_secs(5),
    }
}

/// Video file URL on the origin cluster.
#[allow(dead_code)]
pub fn video_url(video_id: usize) -> String {
    format!("http://s1.origin-cluster/video/{video_id}/file.m3u8")
}

pub struct TestBalancer {
    pub addr: SocketAddr,
    #[allow(dead_code)]
    pub counter: Arc<MemoryCounter>,
    pub shutdown: Shutdown,
}

impl TestBalancer {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

/// Spawn a balancer on an ephemeral port and wait until it serves /health.
pub async fn spawn_balancer(settings: Settings) -> TestBalancer {
    let counter = Arc::new(MemoryCounter::new());
    let state = AppState::new(settings, counter.clone(), None);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(state);
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    let balancer = TestBalancer {
        addr,
        counter,
        shutdown,
    };
    wait_for_health(&balancer.base_url()).await;
    balancer
}

/// Wait for the balancer to answer its liveness probe.
pub async fn wait_for_health(base_url: &str) {
    let client = reqwest::Client::new();
    for _ in 0..50 {
        if let Ok(response) = client
            .get(format!("{base_url}/health"))
            .timeout(Duration::from_millis(500))
            .send()
            .await
        {
            if response.status() == 200 {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("balancer did not become healthy");
}

/// Client that reports redirects instead of following them.
#[allow(dead_code)]
pub fn no_redirect_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}
