use std::sync::Arc;
use std::time::Duration;

use snapshot_db::Database;
use snapshot_types::UserId;
use snapshot_types::models::{Mood, SnapshotData, Theme, UnknownTheme};
use tracing::info;

use crate::clock::Clock;
use crate::compiler::SnapshotCompiler;
use crate::delivery::DeliveryGateway;
use crate::prompts::{MoodPrompts, PromptOutcome};
use crate::{SnapshotError, blocking};

/// Longest note accepted, in characters.
pub const MAX_NOTE_CHARS: usize = 1000;

/// User-initiated operations: mood, note, theme and on-demand snapshots.
#[derive(Clone)]
pub struct Commands {
    db: Arc<Database>,
    clock: Arc<dyn Clock>,
    compiler: SnapshotCompiler,
    gateway: Arc<dyn DeliveryGateway>,
    prompts: MoodPrompts,
    mood_timeout: Duration,
}

impl Commands {
    pub fn new(
        db: Arc<Database>,
        clock: Arc<dyn Clock>,
        gateway: Arc<dyn DeliveryGateway>,
        prompts: MoodPrompts,
        mood_timeout: Duration,
    ) -> Self {
        Self {
            compiler: SnapshotCompiler::new(db.clone()),
            db,
            clock,
            gateway,
            prompts,
            mood_timeout,
        }
    }

    pub fn prompts(&self) -> &MoodPrompts {
        &self.prompts
    }

    /// Wait for the user to react to their mood prompt, then record it for today.
    /// A timeout writes nothing.
    pub async fn set_mood(&self, user_id: UserId, message_id: u64) -> Result<Mood, SnapshotError> {
        let mood = match self.prompts.await_mood(user_id, message_id, self.mood_timeout).await {
            PromptOutcome::Selected(mood) => mood,
            PromptOutcome::TimedOut => return Err(SnapshotError::Timeout),
            PromptOutcome::Superseded => {
                return Err(SnapshotError::Validation("mood prompt replaced by a newer one".into()));
            }
        };

        let date = self.clock.today();
        let db = self.db.clone();
        blocking(move || db.set_mood(user_id, date, mood.emoji())).await?;

        info!(user_id, %date, mood = mood.emoji(), "Mood recorded");
        Ok(mood)
    }

    pub async fn set_note(&self, user_id: UserId, note: &str) -> Result<(), SnapshotError> {
        let note = note.trim();
        if note.is_empty() {
            return Err(SnapshotError::Validation("note text is required".into()));
        }
        if note.chars().count() > MAX_NOTE_CHARS {
            return Err(SnapshotError::Validation(format!(
                "note is longer than {} characters",
                MAX_NOTE_CHARS
            )));
        }

        let date = self.clock.today();
        let db = self.db.clone();
        let note = note.to_string();
        blocking(move || db.set_note(user_id, date, &note)).await
    }

    pub async fn set_theme(&self, user_id: UserId, name: &str) -> Result<Theme, SnapshotError> {
        let theme: Theme = name
            .parse()
            .map_err(|e: UnknownTheme| SnapshotError::Validation(e.to_string()))?;

        let db = self.db.clone();
        blocking(move || db.set_theme(user_id, theme)).await?;
        Ok(theme)
    }

    pub async fn get_theme(&self, user_id: UserId) -> Result<Theme, SnapshotError> {
        let db = self.db.clone();
        blocking(move || db.get_theme(user_id)).await
    }

    /// Compile today's snapshot and deliver it right away.
    pub async fn snapshot_now(&self, user_id: UserId) -> Result<SnapshotData, SnapshotError> {
        let date = self.clock.today();
        let snapshot = self.compiler.compile_async(user_id, date).await?;
        self.gateway.deliver(user_id, &snapshot).await?;
        Ok(snapshot)
    }
}
