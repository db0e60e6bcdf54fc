//! Audio Transport Adapters
//!
//! - rodio_transport: 扬声器播放（reqwest 拉取 + rodio 解码）
//! - scripted_transport: 虚拟时钟下的脚本化传输

mod output;
mod rodio_transport;
mod scripted_transport;

pub use output::AudioOutput;
pub use rodio_transport::{RodioTransport, RodioTransportConfig};
pub use scripted_transport::{ClipScript, ScriptedTransport};
