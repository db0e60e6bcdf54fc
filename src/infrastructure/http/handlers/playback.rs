//! Playback Handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::domain::TagId;
use crate::infrastructure::http::dto::{
    ApiResponse, Empty, PlaybackResponse, SelectTagRequest, SelectTagResponse,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

pub async fn get_playback(State(state): State<Arc<AppState>>) -> Json<ApiResponse<PlaybackResponse>> {
    Json(ApiResponse::success(state.overlay.playback().into()))
}

/// 选中标签并播放；等待音频获取完成后返回
pub async fn select_tag(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SelectTagRequest>,
) -> Result<Json<ApiResponse<SelectTagResponse>>, ApiError> {
    if req.tag_id.trim().is_empty() {
        return Err(ApiError::BadRequest("tag_id cannot be empty".to_string()));
    }

    let outcome = state.overlay.select_tag(&TagId::from_string(req.tag_id)).await?;
    Ok(Json(ApiResponse::success(outcome.into())))
}

pub async fn stop_playback(State(state): State<Arc<AppState>>) -> Json<ApiResponse<Empty>> {
    state.overlay.stop().await;
    Json(ApiResponse::ok())
}

pub async fn cancel_all(State(state): State<Arc<AppState>>) -> Json<ApiResponse<Empty>> {
    state.overlay.cancel_all().await;
    Json(ApiResponse::ok())
}
