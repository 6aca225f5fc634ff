use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// A chat message observed by the platform adapter.
///
/// Messages from automated accounts are filtered upstream and never reach
/// the ingestor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEvent {
    pub user_id: UserId,
    /// Latest display name for the author, if the platform supplied one.
    #[serde(default)]
    pub username: Option<String>,
    /// Direct messages have no server; they are recorded under server 0.
    #[serde(default)]
    pub server_id: Option<u64>,
    pub channel_id: u64,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl MessageEvent {
    pub fn server_or_default(&self) -> u64 {
        self.server_id.unwrap_or(0)
    }
}

/// A reaction added to a platform message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionEvent {
    pub user_id: UserId,
    pub message_id: u64,
    pub emoji: String,
}
