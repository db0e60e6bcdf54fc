//! Application State

use std::sync::Arc;

use crate::application::Overlay;
use crate::infrastructure::events::EventPublisher;

/// 应用状态
pub struct AppState {
    pub overlay: Arc<Overlay>,
    pub event_publisher: Arc<EventPublisher>,
}

impl AppState {
    pub fn new(overlay: Arc<Overlay>, event_publisher: Arc<EventPublisher>) -> Self {
        Self {
            overlay,
            event_publisher,
        }
    }
}
