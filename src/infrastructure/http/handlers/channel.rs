//! Channel Handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::infrastructure::http::dto::{ApiResponse, ChannelResponse, OpenChannelRequest};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

pub async fn get_channel(State(state): State<Arc<AppState>>) -> Json<ApiResponse<ChannelResponse>> {
    Json(ApiResponse::success(state.overlay.channel_status().into()))
}

/// 打开接收通道；请求体可省略
pub async fn open_channel(
    State(state): State<Arc<AppState>>,
    req: Option<Json<OpenChannelRequest>>,
) -> Result<Json<ApiResponse<ChannelResponse>>, ApiError> {
    let req = req.map(|Json(r)| r).unwrap_or_default();
    let status = state.overlay.open_channel(req.endpoint.as_deref()).await?;
    Ok(Json(ApiResponse::success(status.into())))
}

pub async fn close_channel(State(state): State<Arc<AppState>>) -> Json<ApiResponse<ChannelResponse>> {
    Json(ApiResponse::success(state.overlay.close_channel().await.into()))
}
