//! Tag Handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::infrastructure::http::dto::{ApiResponse, TagListResponse, TagResponse};
use crate::infrastructure::http::state::AppState;

/// 标签列表，最新在前
pub async fn list_tags(State(state): State<Arc<AppState>>) -> Json<ApiResponse<TagListResponse>> {
    let tags: Vec<TagResponse> = state.overlay.tags().iter().map(TagResponse::from).collect();
    Json(ApiResponse::success(TagListResponse {
        total: tags.len(),
        tags,
    }))
}
