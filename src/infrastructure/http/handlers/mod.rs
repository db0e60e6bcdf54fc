//! HTTP Handlers

mod channel;
mod ping;
mod playback;
mod tags;
mod websocket;

pub use channel::*;
pub use ping::*;
pub use playback::*;
pub use tags::*;
pub use websocket::*;
