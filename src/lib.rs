//! RTMS Monitor - 实时发言核查浮层后端
//!
//! 架构设计: Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Tag Context: 被标记的发言及其语音片段
//! - Playback Context: 播放状态机、进度、会话代数
//!
//! 应用层 (application/):
//! - Ports: TagStream, TagFeed, AudioTransport, NotificationCue
//! - Ingestion: 推送订阅与标签入列
//! - Playback: 独占式播放控制
//! - Overlay: 浮层用例入口
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: 本地 API + WebSocket
//! - Memory: 标签序列内存实现
//! - Adapters: SSE 客户端, rodio 播放, 提示音
//! - Events: 浮层事件广播

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
