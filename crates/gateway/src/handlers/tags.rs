//! Tag handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use inkpress_common::{
    auth::AdminUser,
    domain::{Tag, TagCreateRequest, TagUpdateRequest},
    errors::Result,
};

use crate::response::{ApiResponse, MessageBody};
use crate::AppState;

pub async fn list_tags(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Tag>>>> {
    let tags = state.services.tags.list().await?;
    Ok(ApiResponse::success(tags))
}

pub async fn get_tag(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Tag>>> {
    let tag = state.services.tags.get_by_id(id).await?;
    Ok(ApiResponse::success(tag))
}

pub async fn create_tag(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(request): Json<TagCreateRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Tag>>)> {
    let tag = state.services.tags.create(request).await?;
    Ok(ApiResponse::created(tag))
}

pub async fn update_tag(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
    Json(request): Json<TagUpdateRequest>,
) -> Result<Json<ApiResponse<Tag>>> {
    let tag = state.services.tags.update(id, request).await?;
    Ok(ApiResponse::success(tag))
}

pub async fn delete_tag(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageBody>>> {
    state.services.tags.delete(id).await?;
    Ok(ApiResponse::message("tag deleted"))
}
