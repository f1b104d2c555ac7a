//! Article handlers

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use inkpress_common::{
    auth::AdminUser,
    domain::{Article, ArticleCreateRequest, ArticleUpdateRequest},
    errors::Result,
    pagination::ListQuery,
};

use crate::response::{ApiResponse, MessageBody};
use crate::AppState;

/// List articles with optional paging, published filter and search
pub async fn list_articles(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<Article>>>> {
    let params = query.into_params(&state.config.content);
    let page = state.services.articles.list(&params).await?;
    Ok(ApiResponse::page(page))
}

pub async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Article>>> {
    let article = state.services.articles.get_by_id(id).await?;
    Ok(ApiResponse::success(article))
}

pub async fn list_by_category(
    State(state): State<AppState>,
    Path(category_id): Path<i32>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<Article>>>> {
    let params = query.into_params(&state.config.content);
    let page = state
        .services
        .articles
        .list_by_category(category_id, &params)
        .await?;
    Ok(ApiResponse::page(page))
}

pub async fn list_by_tag(
    State(state): State<AppState>,
    Path(tag_id): Path<i32>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<Article>>>> {
    let params = query.into_params(&state.config.content);
    let page = state.services.articles.list_by_tag(tag_id, &params).await?;
    Ok(ApiResponse::page(page))
}

pub async fn create_article(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(request): Json<ArticleCreateRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Article>>)> {
    let article = state.services.articles.create(request).await?;

    tracing::info!(
        article_id = article.id,
        username = %admin.username,
        "Article published by administrator"
    );

    Ok(ApiResponse::created(article))
}

pub async fn update_article(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
    Json(request): Json<ArticleUpdateRequest>,
) -> Result<Json<ApiResponse<Article>>> {
    let article = state.services.articles.update(id, request).await?;
    Ok(ApiResponse::success(article))
}

pub async fn delete_article(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageBody>>> {
    state.services.articles.delete(id).await?;
    Ok(ApiResponse::message("article deleted"))
}

/// Download every article as a ZIP archive
pub async fn backup_articles(State(state): State<AppState>, _admin: AdminUser) -> Result<Response> {
    let archive = state.services.articles.backup_all().await?;

    let disposition = format!("attachment; filename=\"{}\"", archive.file_name());
    let length = archive.bytes.len().to_string();

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CONTENT_LENGTH, length),
        ],
        archive.bytes,
    )
        .into_response())
}
