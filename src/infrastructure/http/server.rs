//! HTTP Server
//!
//! 浮层本地 API 的装配与启动

use std::future::Future;
use std::sync::Arc;

use axum::middleware;
use axum::Router;
use http::header::CONTENT_TYPE;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::middleware::request_logging_middleware;
use super::routes::create_routes;
use super::state::AppState;
use crate::config::ServerConfig;

/// HTTP 服务器
pub struct HttpServer {
    addr: String,
    state: Arc<AppState>,
}

impl HttpServer {
    pub fn new(config: &ServerConfig, state: AppState) -> Self {
        Self {
            addr: config.addr(),
            state: Arc::new(state),
        }
    }

    /// 路由 + CORS + 请求日志
    pub(crate) fn build_router(&self) -> Router {
        // 浮层 UI 从本地任意来源访问
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers([CONTENT_TYPE])
            .max_age(std::time::Duration::from_secs(3600));

        create_routes()
            .layer(middleware::from_fn(request_logging_middleware))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .with_state(self.state.clone())
    }

    /// 监听直到 shutdown 完成
    pub async fn serve_until<F>(self, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.build_router();
        let listener = TcpListener::bind(&self.addr).await?;
        tracing::info!(addr = %self.addr, "Overlay API listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{Overlay, PlaybackConfig, PlaybackController, TagChannel};
    use crate::infrastructure::adapters::{ChannelTagStream, ClipScript, LogNotifier, ScriptedTransport};
    use crate::infrastructure::events::EventPublisher;
    use crate::infrastructure::memory::InMemoryTagFeed;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use std::time::Duration;
    use tower::util::ServiceExt;

    fn server() -> HttpServer {
        let publisher = EventPublisher::new().arc();
        let feed = InMemoryTagFeed::new().arc();
        let (stream, _sender) = ChannelTagStream::new();
        let channel = TagChannel::new(
            "http://localhost:8001/api/stream-tags",
            Arc::new(stream),
            feed.clone(),
            Arc::new(LogNotifier::new()),
            publisher.clone(),
        )
        .arc();
        let transport = ScriptedTransport::new(ClipScript::new(Duration::from_secs(1))).arc();
        let playback = PlaybackController::new(PlaybackConfig::default(), transport, publisher.clone()).arc();
        let overlay = Overlay::new(feed, channel, playback).arc();
        HttpServer::new(&ServerConfig::default(), AppState::new(overlay, publisher))
    }

    #[test]
    fn test_binds_configured_addr() {
        assert_eq!(server().addr, "127.0.0.1:5070");
    }

    #[tokio::test]
    async fn test_cors_preflight_from_overlay_origin() {
        let router = server().build_router();
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/playback/select")
            .header(header::ORIGIN, "http://localhost:3000")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }
}
