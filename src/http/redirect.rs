//! The playback redirect handler.

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use url::Url;

use crate::balancer::{rewrite_to_cdn, should_redirect_to_cdn};
use crate::config::schema::CounterMode;
use crate::counter::{CounterError, RequestCounter};
use crate::http::server::AppState;

#[derive(Deserialize)]
pub(crate) struct RedirectQuery {
    video: Option<String>,
}

/// `GET /?video=<absolute-URL>` → 301 with a `Location` header.
///
/// Reads the request index from the shared counter, decides CDN vs origin,
/// increments, and answers. A counter failure is a server error for this
/// request; defaulting the index would pin every decision to block
/// position 0.
pub(crate) async fn redirect_handler(
    State(state): State<AppState>,
    Query(query): Query<RedirectQuery>,
) -> Response {
    let Some(raw_video) = query.video else {
        return bad_request("missing required query parameter: video");
    };
    let video = match Url::parse(&raw_video) {
        Ok(url) if url.host_str().is_some() => url,
        _ => return bad_request("video must be an absolute URL with a host"),
    };

    let settings = state.settings.load_full();

    let (request_index, increment_pending) = match settings.counter_mode {
        CounterMode::TwoStep => match state.counter.get().await {
            Ok(index) => (index, true),
            Err(err) => return counter_error(err),
        },
        CounterMode::Atomic => match state.counter.fetch_increment().await {
            Ok(index) => (index, false),
            Err(err) => return counter_error(err),
        },
    };

    let to_cdn = should_redirect_to_cdn(request_index, settings.redirect_ratio);
    let location = if to_cdn {
        // Hosts without an `sN.` label keep their origin URL even on a CDN
        // decision.
        rewrite_to_cdn(&video, &settings.cdn_host).unwrap_or_else(|| video.clone())
    } else {
        video.clone()
    };

    if increment_pending {
        if let Err(err) = state.counter.increment().await {
            return counter_error(err);
        }
    }

    tracing::debug!(
        request_index,
        to_cdn,
        video = %video,
        location = %location,
        "redirect decision"
    );

    (
        StatusCode::MOVED_PERMANENTLY,
        [(header::LOCATION, location.to_string())],
    )
        .into_response()
}

fn bad_request(detail: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "detail": detail })),
    )
        .into_response()
}

fn counter_error(err: CounterError) -> Response {
    // Log the typed error; the response stays generic.
    tracing::error!(error = %err, "request counter unavailable");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "detail": "internal server error" })),
    )
        .into_response()
}
