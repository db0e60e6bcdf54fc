//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod audio;
pub mod notifier;
pub mod stream;

pub use audio::*;
pub use notifier::*;
pub use stream::*;
