//! Login handler

use axum::{extract::State, Json};
use inkpress_common::{
    domain::{LoginRequest, LoginResponse},
    errors::Result,
};

use crate::response::ApiResponse;
use crate::AppState;

/// Exchange administrator credentials for a Bearer token
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>> {
    let response = state.services.auth.login(request).await?;
    Ok(ApiResponse::success(response))
}
