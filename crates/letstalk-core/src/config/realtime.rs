//! Real-time WebSocket engine configuration.

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Outbound channel buffer size per connection.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Bounded retry attempts for optimistic-write conflicts.
    #[serde(default = "default_conflict_retries")]
    pub max_conflict_retries: u32,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: default_channel_buffer(),
            max_conflict_retries: default_conflict_retries(),
        }
    }
}

fn default_channel_buffer() -> usize {
    64
}

fn default_conflict_retries() -> u32 {
    3
}
