use std::sync::Arc;

use chrono::NaiveDate;
use snapshot_db::Database;
use snapshot_types::UserId;
use snapshot_types::models::{SnapshotData, describe_mood};

use crate::{SnapshotError, blocking};

pub const TOP_WORDS: usize = 5;
pub const NO_EMOJI: &str = "none";
pub const NO_MOOD: &str = "none";
pub const NO_NOTE: &str = "No note for today.";

/// Reduces one user's day into a [`SnapshotData`]. Read-only.
#[derive(Clone)]
pub struct SnapshotCompiler {
    db: Arc<Database>,
}

impl SnapshotCompiler {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn compile(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> Result<SnapshotData, SnapshotError> {
        self.reduce(user_id, date).map_err(SnapshotError::Store)
    }

    pub async fn compile_async(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> Result<SnapshotData, SnapshotError> {
        let this = self.clone();
        blocking(move || this.reduce(user_id, date)).await
    }

    fn reduce(&self, user_id: UserId, date: NaiveDate) -> anyhow::Result<SnapshotData> {
        let summary = self.db.query_day_summary(user_id, date, TOP_WORDS)?;
        let theme = self.db.get_theme(user_id)?;
        let username = self
            .db
            .get_username(user_id)?
            .unwrap_or_else(|| user_id.to_string());

        Ok(SnapshotData {
            username,
            display_date: display_date(date),
            theme,
            messages_sent: summary.total_messages,
            top_words: summary.top_words,
            top_emoji: summary.top_emoji.unwrap_or_else(|| NO_EMOJI.to_string()),
            mood_description: describe_mood(summary.mood.as_deref()).to_string(),
            mood: summary.mood.unwrap_or_else(|| NO_MOOD.to_string()),
            note: summary
                .note
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| NO_NOTE.to_string()),
        })
    }
}

/// "19 October 2026"
pub fn display_date(date: NaiveDate) -> String {
    date.format("%-d %B %Y").to_string()
}
