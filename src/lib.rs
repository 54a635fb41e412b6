//! Deterministic CDN/origin traffic-splitting redirector.
//!
//! For each playback request the balancer decides, without randomness,
//! whether to redirect the client to a CDN mirror or leave it on the origin
//! server, so that the long-run CDN:origin ratio converges exactly to the
//! configured `"N:D"` value. The decision is driven by a counter shared
//! across all worker processes, not by per-process state.

pub mod balancer;
pub mod config;
pub mod counter;
pub mod http;
pub mod lifecycle;
pub mod store;

pub use config::schema::Settings;
pub use http::{AppState, HttpServer};
pub use lifecycle::Shutdown;
