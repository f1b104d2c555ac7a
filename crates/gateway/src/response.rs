//! Success envelopes
//!
//! Every successful response is `{code, message, data}`; windowed listings
//! add `meta`. Errors use the `AppError` body instead.

use axum::{http::StatusCode, Json};
use inkpress_common::pagination::{Page, PageMeta};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
}

/// Payload of responses that only carry a confirmation
#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    fn with_status(status: StatusCode, message: &str, data: T, meta: Option<PageMeta>) -> Self {
        Self {
            code: status.as_u16(),
            message: message.to_string(),
            data: Some(data),
            meta,
        }
    }

    /// 200 with `data`
    pub fn success(data: T) -> Json<Self> {
        Json(Self::with_status(StatusCode::OK, "success", data, None))
    }

    /// 201 with the created entity
    pub fn created(data: T) -> (StatusCode, Json<Self>) {
        (
            StatusCode::CREATED,
            Json(Self::with_status(StatusCode::CREATED, "created", data, None)),
        )
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    /// 200 with a listing; `meta` is present only for windowed requests
    pub fn page(page: Page<T>) -> Json<Self> {
        Json(Self::with_status(StatusCode::OK, "success", page.items, page.meta))
    }
}

impl ApiResponse<MessageBody> {
    /// 200 with a confirmation message as `data`
    pub fn message(message: &str) -> Json<Self> {
        Self::success(MessageBody {
            message: message.to_string(),
        })
    }
}
