//! Tag Context - 标签限界上下文
//!
//! 职责:
//! - 标签实体（不可变）
//! - 推送载荷解码
//! - 标识、分类、音频定位符等值对象

mod entity;
mod errors;
mod value_objects;

pub use entity::{Tag, TagPayload};
pub use errors::TagError;
pub use value_objects::{AudioRef, Classification, TagId};
