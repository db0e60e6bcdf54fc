//! RTMS Monitor - 实时发言核查浮层后端
//!
//! - Domain: tag/, playback/
//! - Application: ingestion, playback, overlay, ports
//! - Infrastructure: http, memory, adapters, events

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use rtms_monitor::application::ports::NotificationCuePort;
use rtms_monitor::application::{Overlay, PlaybackConfig, PlaybackController, TagChannel};
use rtms_monitor::config::{load_config, print_config, AppConfig};
use rtms_monitor::infrastructure::adapters::{
    AudioOutput, ChimeConfig, ChimeNotifier, LogNotifier, RodioTransport, RodioTransportConfig, SseTagStream,
    SseTagStreamConfig,
};
use rtms_monitor::infrastructure::events::EventPublisher;
use rtms_monitor::infrastructure::http::{AppState, HttpServer};
use rtms_monitor::infrastructure::memory::InMemoryTagFeed;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("RTMS Monitor - 实时核查浮层");
    print_config(&config);

    let event_publisher = EventPublisher::new().arc();
    let feed = InMemoryTagFeed::new().arc();

    // 音频输出设备；无设备时仍可接收标签，播放请求以 OutputError 失败
    let output = match AudioOutput::open_default() {
        Ok(output) => Some(Arc::new(output)),
        Err(e) => {
            tracing::warn!(error = %e, "No audio output device, playback and chime disabled");
            None
        }
    };
    let transport = Arc::new(
        RodioTransport::new(
            output.clone(),
            RodioTransportConfig {
                fetch_timeout_secs: config.audio.fetch_timeout_secs,
                volume: config.audio.volume,
            },
        )
        .context("Failed to build audio transport")?,
    );

    let notifier: Arc<dyn NotificationCuePort> = match output {
        Some(output) if config.notification.chime => Arc::new(ChimeNotifier::new(
            output,
            ChimeConfig {
                frequency_hz: config.notification.frequency_hz,
                duration: Duration::from_millis(config.notification.duration_ms),
                ..Default::default()
            },
        )),
        _ => Arc::new(LogNotifier::new()),
    };

    // SSE 订阅
    let stream = Arc::new(SseTagStream::new(SseTagStreamConfig {
        connect_timeout_secs: config.stream.connect_timeout_secs,
        event_name: config.stream.event_name.clone(),
    })?);

    let channel = TagChannel::new(
        config.stream.url.clone(),
        stream,
        feed.clone(),
        notifier,
        event_publisher.clone(),
    )
    .arc();

    let playback = PlaybackController::new(
        PlaybackConfig {
            sample_interval: config.playback.sample_interval(),
            acquire_timeout: config.playback.acquire_timeout(),
        },
        transport,
        event_publisher.clone(),
    )
    .arc();

    let overlay = Overlay::new(feed, channel, playback).arc();

    // 上游不可用时仍启动本地 API，之后可通过 /api/channel/open 重试
    if let Err(e) = overlay.open_channel(None).await {
        tracing::warn!(error = %e, url = %config.stream.url, "Tag channel unavailable at startup");
    }

    let server = HttpServer::new(&config.server, AppState::new(overlay.clone(), event_publisher));

    server
        .serve_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                return;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    overlay.shutdown().await;
    tracing::info!("Server shutdown complete");

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},rtms_monitor={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
