//! HTTP Middleware
//!
//! 请求日志：浮层指令（POST /api/...）记录名称与耗时，HTTP 层 4xx/5xx 单独告警。
//! 业务错误以 200 + errno 返回，在 `ApiError::into_response()` 中记录

use axum::{
    extract::Request,
    http::Method,
    middleware::Next,
    response::Response,
};
use std::time::Instant;

/// 浮层指令名，例如 `playback/select`；查询与 WebSocket 返回 None
fn command_name<'a>(method: &Method, path: &'a str) -> Option<&'a str> {
    if method != Method::POST {
        return None;
    }
    path.strip_prefix("/api/").filter(|name| !name.is_empty())
}

pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if status.is_server_error() {
        tracing::error!(method = %method, path = %path, status = status.as_u16(), elapsed_ms, "HTTP server error");
    } else if status.is_client_error() {
        tracing::warn!(method = %method, path = %path, status = status.as_u16(), elapsed_ms, "HTTP client error");
    } else if let Some(command) = command_name(&method, &path) {
        tracing::info!(command = command, elapsed_ms, "Overlay command handled");
    }

    response
}
