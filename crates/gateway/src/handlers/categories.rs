//! Category handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use inkpress_common::{
    auth::AdminUser,
    domain::{Category, CategoryCreateRequest, CategoryUpdateRequest},
    errors::Result,
};

use crate::response::{ApiResponse, MessageBody};
use crate::AppState;

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Category>>>> {
    let categories = state.services.categories.list().await?;
    Ok(ApiResponse::success(categories))
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Category>>> {
    let category = state.services.categories.get_by_id(id).await?;
    Ok(ApiResponse::success(category))
}

pub async fn create_category(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(request): Json<CategoryCreateRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Category>>)> {
    let category = state.services.categories.create(request).await?;
    Ok(ApiResponse::created(category))
}

pub async fn update_category(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
    Json(request): Json<CategoryUpdateRequest>,
) -> Result<Json<ApiResponse<Category>>> {
    let category = state.services.categories.update(id, request).await?;
    Ok(ApiResponse::success(category))
}

pub async fn delete_category(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageBody>>> {
    state.services.categories.delete(id).await?;
    Ok(ApiResponse::message("category deleted"))
}
