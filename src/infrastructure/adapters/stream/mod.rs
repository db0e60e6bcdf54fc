//! Tag Stream Adapters
//!
//! - sse_client: HTTP SSE 长连接订阅
//! - channel_stream: 进程内推送流

mod channel_stream;
mod sse;
mod sse_client;

pub use channel_stream::{ChannelTagStream, PushSender};
pub use sse::SseDecoder;
pub use sse_client::{SseTagStream, SseTagStreamConfig};
