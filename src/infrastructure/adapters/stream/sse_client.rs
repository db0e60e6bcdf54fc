//! SSE Tag Stream - 通过 HTTP `text/event-stream` 订阅推送
//!
//! 实现 TagStreamPort trait。连接建立后逐块读取响应体，
//! 交给 [`SseDecoder`] 还原事件；服务端关闭连接时流结束

use async_trait::async_trait;
use futures_util::stream::{self, BoxStream};
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use reqwest::Client;
use std::collections::VecDeque;
use std::time::Duration;

use super::sse::SseDecoder;
use crate::application::ports::{PushMessage, PushStream, StreamError, TagStreamPort};

/// SSE 客户端配置
#[derive(Debug, Clone)]
pub struct SseTagStreamConfig {
    /// 建立连接并收到响应头的超时时间（秒）
    pub connect_timeout_secs: u64,
    /// 只接收指定事件名；为空时接收全部事件
    pub event_name: Option<String>,
}

impl Default for SseTagStreamConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            event_name: None,
        }
    }
}

/// SSE 推送订阅
pub struct SseTagStream {
    client: Client,
    config: SseTagStreamConfig,
}

impl SseTagStream {
    pub fn new(config: SseTagStreamConfig) -> Result<Self, StreamError> {
        // 长连接不设置整体超时
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| StreamError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn with_defaults() -> Result<Self, StreamError> {
        Self::new(SseTagStreamConfig::default())
    }
}

struct ReadState {
    body: BoxStream<'static, reqwest::Result<Vec<u8>>>,
    decoder: SseDecoder,
    pending: VecDeque<PushMessage>,
    filter: Option<String>,
    done: bool,
}

#[async_trait]
impl TagStreamPort for SseTagStream {
    async fn connect(&self, endpoint: &str) -> Result<PushStream, StreamError> {
        tracing::info!(endpoint = %endpoint, "Connecting to tag stream");

        let request = self
            .client
            .get(endpoint)
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache")
            .send();

        let timeout = Duration::from_secs(self.config.connect_timeout_secs);
        let response = tokio::time::timeout(timeout, request)
            .await
            .map_err(|_| StreamError::Timeout)?
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(endpoint = %endpoint, status = %status, "Tag stream rejected");
            return Err(StreamError::Rejected(format!("HTTP {}", status)));
        }

        tracing::debug!(endpoint = %endpoint, status = %status, "Tag stream connected");

        let state = ReadState {
            body: response
                .bytes_stream()
                .map(|chunk| chunk.map(|bytes| bytes.to_vec()))
                .boxed(),
            decoder: SseDecoder::new(),
            pending: VecDeque::new(),
            filter: self.config.event_name.clone(),
            done: false,
        };

        let messages = stream::unfold(state, |mut state| async move {
            loop {
                if let Some(message) = state.pending.pop_front() {
                    return Some((Ok(message), state));
                }
                if state.done {
                    return None;
                }
                match state.body.next().await {
                    Some(Ok(chunk)) => {
                        let filter = state.filter.clone();
                        state.pending.extend(
                            state
                                .decoder
                                .feed(&chunk)
                                .into_iter()
                                .filter(|m| event_matches(filter.as_deref(), m)),
                        );
                    }
                    Some(Err(e)) => {
                        state.done = true;
                        return Some((Err(map_reqwest_error(e)), state));
                    }
                    None => return None,
                }
            }
        });

        Ok(messages.boxed())
    }
}

fn event_matches(filter: Option<&str>, message: &PushMessage) -> bool {
    match (filter, message.event.as_deref()) {
        (None, _) => true,
        (Some(wanted), Some(event)) => wanted == event,
        // 未声明事件名的消息按 SSE 约定视为 "message"
        (Some(wanted), None) => wanted == "message",
    }
}

fn map_reqwest_error(e: reqwest::Error) -> StreamError {
    if e.is_timeout() {
        StreamError::Timeout
    } else {
        StreamError::NetworkError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::Router;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn events() -> impl IntoResponse {
        (
            [(header::CONTENT_TYPE, "text/event-stream")],
            ": hello\n\nevent: tag\ndata: {\"justification\":\"a\"}\n\ndata: plain\n\nevent: tag\ndata: b\n\n",
        )
    }

    #[test]
    fn test_event_filter() {
        let mut named = PushMessage::new("x");
        named.event = Some("tag".into());
        let plain = PushMessage::new("y");

        assert!(event_matches(None, &named));
        assert!(event_matches(Some("tag"), &named));
        assert!(!event_matches(Some("tag"), &plain));
        assert!(event_matches(Some("message"), &plain));
    }

    #[tokio::test]
    async fn test_reads_all_events_until_server_closes() {
        let base = serve(Router::new().route("/events", get(events))).await;
        let port = SseTagStream::with_defaults().unwrap();

        let stream = port.connect(&format!("{}/events", base)).await.unwrap();
        let items: Vec<_> = stream.collect().await;
        let data: Vec<_> = items.into_iter().map(|i| i.unwrap().data).collect();
        assert_eq!(data, vec!["{\"justification\":\"a\"}", "plain", "b"]);
    }

    #[tokio::test]
    async fn test_event_name_filter_applies() {
        let base = serve(Router::new().route("/events", get(events))).await;
        let port = SseTagStream::new(SseTagStreamConfig {
            event_name: Some("tag".into()),
            ..Default::default()
        })
        .unwrap();

        let stream = port.connect(&format!("{}/events", base)).await.unwrap();
        let items: Vec<_> = stream.collect().await;
        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn test_non_success_status_is_rejected() {
        let base = serve(Router::new().route("/events", get(|| async { StatusCode::NOT_FOUND }))).await;
        let port = SseTagStream::with_defaults().unwrap();

        let result = port.connect(&format!("{}/events", base)).await;
        assert!(matches!(result, Err(StreamError::Rejected(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let port = SseTagStream::with_defaults().unwrap();
        let result = port.connect(&format!("http://{}/events", addr)).await;
        assert!(matches!(result, Err(StreamError::NetworkError(_))));
    }
}
