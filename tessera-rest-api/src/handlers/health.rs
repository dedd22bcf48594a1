//! Health endpoints

use axum::{extract::State, response::IntoResponse, Json};

use tessera_web::ApiResponse;

use crate::{context::AppContext, errors::RestResult, models::HealthResponse};

/// Liveness/readiness probe; checks the repository seam
pub async fn health_check(State(ctx): State<AppContext>) -> RestResult<impl IntoResponse> {
    ctx.repos.health_check().await?;
    Ok(Json(ApiResponse::new(HealthResponse { status: "ok" })))
}
