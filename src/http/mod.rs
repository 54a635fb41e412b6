//! HTTP surface of the balancer.
//!
//! # Responsibilities
//! - Build the Axum router (`/`, `/health`, `/settings`)
//! - Wire up middleware (request timeout, tracing)
//! - Map typed backend errors to status codes without leaking backend
//!   identity
//!
//! # Endpoints
//! - `GET /health` → 200, liveness only
//! - `GET /?video=<absolute-URL>` → 301 redirect to CDN or origin
//! - `GET /settings` → active balancer settings
//! - `PUT /settings` → persist + hot-reload new settings

pub mod redirect;
pub mod server;
pub mod settings_api;

pub use server::{AppState, HttpServer};
