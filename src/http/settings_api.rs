//! The `/settings` administrative surface.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::config::schema::BalancerSettings;
use crate::http::server::AppState;

/// `GET /settings` → the active balancer settings.
pub(crate) async fn read_settings(State(state): State<AppState>) -> Json<BalancerSettings> {
    Json(state.settings.load().balancer())
}

/// `PUT /settings` → persist new settings and trigger invalidation.
///
/// Requires a persisted-store backend; without one there is no authoritative
/// place to write, and the request fails with a server error. The response
/// body is the row as persisted, not the request payload.
pub(crate) async fn update_settings(
    State(state): State<AppState>,
    payload: Result<Json<BalancerSettings>, JsonRejection>,
) -> Response {
    let new_settings = match payload {
        Ok(Json(settings)) => settings,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "detail": rejection.body_text() })),
            )
                .into_response();
        }
    };

    let Some(store) = state.store.clone() else {
        tracing::error!("settings update rejected: no persisted store configured");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "detail": "no settings store configured" })),
        )
            .into_response();
    };

    match store.update(&new_settings).await {
        Ok(persisted) => Json(persisted).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "failed to persist settings");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "detail": "internal server error" })),
            )
                .into_response()
        }
    }
}
