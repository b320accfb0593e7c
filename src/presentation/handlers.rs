// HTTP request handlers
use crate::domain::snapshot::ViewSnapshot;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current view snapshot: per-region series and loading flags, plus the
/// selected region, last cycle error, and refresh countdown.
pub async fn get_snapshot(State(state): State<Arc<AppState>>) -> Json<ViewSnapshot> {
    Json(state.core.snapshot())
}

/// Start an immediate refresh cycle.
pub async fn trigger_refresh(State(state): State<Arc<AppState>>) -> StatusCode {
    state.core.trigger_refresh();
    StatusCode::ACCEPTED
}

/// Change the selected region, fetching on demand if it has no data yet.
pub async fn select_region(
    Path(region_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> StatusCode {
    if state.core.select_region(&region_id) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// Dismiss the aggregated cycle error notice.
pub async fn dismiss_error(State(state): State<Arc<AppState>>) -> StatusCode {
    state.core.dismiss_error();
    StatusCode::NO_CONTENT
}
