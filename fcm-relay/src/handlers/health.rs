use axum::{response::IntoResponse, Json};

use crate::models::HealthStatus;

pub async fn health_check() -> impl IntoResponse {
    Json(HealthStatus::ok())
}
