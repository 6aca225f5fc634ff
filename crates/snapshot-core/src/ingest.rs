use std::sync::Arc;

use snapshot_db::Database;
use snapshot_db::models::MessageActivity;
use snapshot_types::events::MessageEvent;
use tracing::{debug, warn};

use crate::classifier::{extract_emoji, tokenize};
use crate::clock::Clock;
use crate::{SnapshotError, blocking};

/// Turns inbound messages into counter increments.
#[derive(Clone)]
pub struct Ingestor {
    db: Arc<Database>,
    clock: Arc<dyn Clock>,
}

impl Ingestor {
    pub fn new(db: Arc<Database>, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Count one message: one message increment for its (server, channel),
    /// one increment per word occurrence and per emoji occurrence, all under
    /// the civil date read once at ingestion time.
    pub fn record(&self, event: &MessageEvent) -> Result<(), SnapshotError> {
        self.apply(event).map_err(SnapshotError::Store)
    }

    fn apply(&self, event: &MessageEvent) -> anyhow::Result<()> {
        let date = self.clock.today();
        let words = tokenize(&event.text);
        let emojis = extract_emoji(&event.text);

        let activity = MessageActivity {
            user_id: event.user_id,
            username: event.username.as_deref().filter(|n| !n.trim().is_empty()),
            server_id: event.server_or_default(),
            channel_id: event.channel_id,
            words: &words,
            emojis: &emojis,
        };

        self.db.record_message(&activity, date)?;

        debug!(
            user_id = event.user_id,
            %date,
            words = words.len(),
            emojis = emojis.len(),
            "Message counted"
        );
        Ok(())
    }

    /// Async entry point for the event pipeline. A store failure drops the
    /// event (undercounting) instead of blocking or retrying.
    pub async fn ingest(&self, event: MessageEvent) -> bool {
        let this = self.clone();
        let user_id = event.user_id;
        let result = blocking(move || this.apply(&event)).await;

        match result {
            Ok(()) => true,
            Err(e) => {
                warn!("Dropping message event from user {}: {}", user_id, e);
                false
            }
        }
    }
}
