use axum::{extract::State, http::header, http::StatusCode, response::IntoResponse};

use crate::startup::AppState;

pub async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        state.metrics.render(),
    )
}
