//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::time::Duration;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 本地 API 服务配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 推送订阅配置
    #[serde(default)]
    pub stream: StreamConfig,

    /// 播放控制配置
    #[serde(default)]
    pub playback: PlaybackSettings,

    /// 音频输出配置
    #[serde(default)]
    pub audio: AudioConfig,

    /// 新标签提示配置
    #[serde(default)]
    pub notification: NotificationConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5070
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 推送订阅配置
#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    /// SSE endpoint
    #[serde(default = "default_stream_url")]
    pub url: String,

    /// 连接超时（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// 只接收指定 SSE 事件名
    #[serde(default)]
    pub event_name: Option<String>,
}

fn default_stream_url() -> String {
    "http://localhost:8001/api/stream-tags".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            url: default_stream_url(),
            connect_timeout_secs: default_connect_timeout(),
            event_name: None,
        }
    }
}

/// 播放控制配置
#[derive(Debug, Clone, Deserialize)]
pub struct PlaybackSettings {
    /// 进度采样间隔（毫秒）
    #[serde(default = "default_sample_interval")]
    pub sample_interval_ms: u64,

    /// 音频获取超时（秒），0 表示不限制
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
}

fn default_sample_interval() -> u64 {
    50
}

fn default_acquire_timeout() -> u64 {
    30
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            sample_interval_ms: default_sample_interval(),
            acquire_timeout_secs: default_acquire_timeout(),
        }
    }
}

impl PlaybackSettings {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    pub fn acquire_timeout(&self) -> Option<Duration> {
        (self.acquire_timeout_secs > 0).then(|| Duration::from_secs(self.acquire_timeout_secs))
    }
}

/// 音频输出配置
#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    /// 远程音频拉取超时（秒）
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    /// 音量倍率，范围 [0, 2]
    #[serde(default = "default_volume")]
    pub volume: f32,
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_volume() -> f32 {
    1.0
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: default_fetch_timeout(),
            volume: default_volume(),
        }
    }
}

/// 新标签提示配置
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    /// 是否播放提示音；关闭时只记录日志
    #[serde(default = "default_chime")]
    pub chime: bool,

    #[serde(default = "default_frequency")]
    pub frequency_hz: f32,

    #[serde(default = "default_chime_duration")]
    pub duration_ms: u64,
}

fn default_chime() -> bool {
    true
}

fn default_frequency() -> f32 {
    880.0
}

fn default_chime_duration() -> u64 {
    150
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            chime: default_chime(),
            frequency_hz: default_frequency(),
            duration_ms: default_chime_duration(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
