//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                  GET   健康检查
//! - /api/tags                  GET   标签列表（最新在前）
//! - /api/playback              GET   当前播放会话
//! - /api/playback/select       POST  选中标签并播放
//! - /api/playback/stop         POST  停止播放
//! - /api/playback/cancel_all   POST  停止并清理会话上下文
//! - /api/channel               GET   接收通道状态
//! - /api/channel/open          POST  打开接收通道
//! - /api/channel/close         POST  关闭接收通道
//! - /ws/events                 WS    浮层事件推送

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", api_routes())
        .route("/ws/events", get(handlers::events_websocket_handler))
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/tags", get(handlers::list_tags))
        .nest("/playback", playback_routes())
        .nest("/channel", channel_routes())
}

/// Playback 路由
fn playback_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::get_playback))
        .route("/select", post(handlers::select_tag))
        .route("/stop", post(handlers::stop_playback))
        .route("/cancel_all", post(handlers::cancel_all))
}

/// Channel 路由
fn channel_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::get_channel))
        .route("/open", post(handlers::open_channel))
        .route("/close", post(handlers::close_channel))
}
