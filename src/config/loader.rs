//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `RTMS_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `RTMS_SERVER__PORT=8080`
/// - `RTMS_STREAM__URL=http://fact-checker:8001/api/stream-tags`
/// - `RTMS_NOTIFICATION__CHIME=false`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 5070)?
        .set_default("stream.url", "http://localhost:8001/api/stream-tags")?
        .set_default("stream.connect_timeout_secs", 10)?
        .set_default("playback.sample_interval_ms", 50)?
        .set_default("playback.acquire_timeout_secs", 30)?
        .set_default("audio.fetch_timeout_secs", 30)?
        .set_default("audio.volume", 1.0)?
        .set_default("notification.chime", true)?
        .set_default("notification.frequency_hz", 880.0)?
        .set_default("notification.duration_ms", 150)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级），例如 RTMS_STREAM__URL
    builder = builder.add_source(
        Environment::with_prefix("RTMS")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    let url = config.stream.url.trim();
    if url.is_empty() {
        return Err(ConfigError::ValidationError(
            "Stream URL cannot be empty".to_string(),
        ));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::ValidationError(format!(
            "Stream URL must be http(s): {}",
            url
        )));
    }

    if config.playback.sample_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "Playback sample interval cannot be 0".to_string(),
        ));
    }

    if !(0.0..=2.0).contains(&config.audio.volume) {
        return Err(ConfigError::ValidationError(format!(
            "Audio volume must be within [0, 2], got {}",
            config.audio.volume
        )));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}", config.server.addr());
    tracing::info!("Stream URL: {}", config.stream.url);
    tracing::info!("Stream Connect Timeout: {}s", config.stream.connect_timeout_secs);
    if let Some(event) = &config.stream.event_name {
        tracing::info!("Stream Event Filter: {}", event);
    }
    tracing::info!("Sample Interval: {}ms", config.playback.sample_interval_ms);
    tracing::info!("Acquire Timeout: {}s", config.playback.acquire_timeout_secs);
    tracing::info!("Volume: {}", config.audio.volume);
    tracing::info!("Chime Enabled: {}", config.notification.chime);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
