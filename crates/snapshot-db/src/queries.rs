use crate::models::{CountRow, DaySummary, MessageActivity};
use crate::Database;
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};
use snapshot_types::UserId;
use snapshot_types::models::Theme;
use tracing::warn;

/// Civil-day key as stored in every per-day table.
pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

impl Database {
    // -- Counters --

    pub fn increment_message(
        &self,
        user_id: UserId,
        server_id: u64,
        channel_id: u64,
        date: NaiveDate,
    ) -> Result<()> {
        let day = day_key(date);
        self.with_conn(|conn| upsert_message(conn, user_id, server_id, channel_id, &day))
    }

    pub fn increment_word(&self, user_id: UserId, date: NaiveDate, word: &str) -> Result<()> {
        let day = day_key(date);
        self.with_conn(|conn| upsert_word(conn, user_id, &day, word))
    }

    pub fn increment_emoji(&self, user_id: UserId, date: NaiveDate, emoji: &str) -> Result<()> {
        let day = day_key(date);
        self.with_conn(|conn| upsert_emoji(conn, user_id, &day, emoji))
    }

    /// Apply one message's counters (and display name) in a single transaction,
    /// so a failed write drops the whole event rather than part of it.
    pub fn record_message(&self, activity: &MessageActivity<'_>, date: NaiveDate) -> Result<()> {
        let day = day_key(date);
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            upsert_message(&tx, activity.user_id, activity.server_id, activity.channel_id, &day)?;
            for word in activity.words {
                upsert_word(&tx, activity.user_id, &day, word)?;
            }
            for emoji in activity.emojis {
                upsert_emoji(&tx, activity.user_id, &day, emoji)?;
            }
            if let Some(username) = activity.username {
                upsert_username(&tx, activity.user_id, username)?;
            }
            tx.commit()?;
            Ok(())
        })
    }

    pub fn message_total(&self, user_id: UserId, date: NaiveDate) -> Result<u64> {
        let day = day_key(date);
        self.with_conn(|conn| query_message_total(conn, user_id, &day))
    }

    /// Word counts for a user's day, highest first; equal counts keep first-seen order.
    pub fn word_counts(
        &self,
        user_id: UserId,
        date: NaiveDate,
        limit: usize,
    ) -> Result<Vec<CountRow>> {
        let day = day_key(date);
        self.with_conn(|conn| query_counts(conn, "words", "word", user_id, &day, limit))
    }

    pub fn emoji_counts(
        &self,
        user_id: UserId,
        date: NaiveDate,
        limit: usize,
    ) -> Result<Vec<CountRow>> {
        let day = day_key(date);
        self.with_conn(|conn| query_counts(conn, "emojis", "emoji", user_id, &day, limit))
    }

    // -- Mood / note (last write wins) --

    pub fn set_mood(&self, user_id: UserId, date: NaiveDate, mood: &str) -> Result<()> {
        let day = day_key(date);
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO moods (user_id, date, mood) VALUES (?1, ?2, ?3)
                 ON CONFLICT(user_id, date) DO UPDATE SET mood = excluded.mood",
                params![user_id, day, mood],
            )?;
            Ok(())
        })
    }

    pub fn get_mood(&self, user_id: UserId, date: NaiveDate) -> Result<Option<String>> {
        let day = day_key(date);
        self.with_conn(|conn| query_mood(conn, user_id, &day))
    }

    pub fn set_note(&self, user_id: UserId, date: NaiveDate, note: &str) -> Result<()> {
        let day = day_key(date);
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO notes (user_id, date, note) VALUES (?1, ?2, ?3)
                 ON CONFLICT(user_id, date) DO UPDATE SET note = excluded.note",
                params![user_id, day, note],
            )?;
            Ok(())
        })
    }

    pub fn get_note(&self, user_id: UserId, date: NaiveDate) -> Result<Option<String>> {
        let day = day_key(date);
        self.with_conn(|conn| query_note(conn, user_id, &day))
    }

    // -- Theme --

    /// Stored theme, or the default when the user never picked one.
    pub fn get_theme(&self, user_id: UserId) -> Result<Theme> {
        let stored: Option<String> = self.with_conn(|conn| {
            let theme = conn
                .query_row("SELECT theme FROM themes WHERE user_id = ?1", [user_id], |row| {
                    row.get(0)
                })
                .optional()?;
            Ok(theme)
        })?;

        match stored {
            None => Ok(Theme::default()),
            Some(name) => Ok(name.parse().unwrap_or_else(|e| {
                warn!("Ignoring stored theme for user {}: {}", user_id, e);
                Theme::default()
            })),
        }
    }

    pub fn set_theme(&self, user_id: UserId, theme: Theme) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO themes (user_id, theme) VALUES (?1, ?2)
                 ON CONFLICT(user_id) DO UPDATE SET theme = excluded.theme",
                params![user_id, theme.as_str()],
            )?;
            Ok(())
        })
    }

    // -- Display names --

    pub fn set_username(&self, user_id: UserId, username: &str) -> Result<()> {
        self.with_conn(|conn| upsert_username(conn, user_id, username))
    }

    pub fn get_username(&self, user_id: UserId) -> Result<Option<String>> {
        self.with_conn(|conn| {
            let name = conn
                .query_row("SELECT username FROM users WHERE user_id = ?1", [user_id], |row| {
                    row.get(0)
                })
                .optional()?;
            Ok(name)
        })
    }

    // -- Reductions --

    /// Read-only reduction of one user's day. All reads happen under one lock
    /// acquisition so the summary is internally consistent.
    pub fn query_day_summary(
        &self,
        user_id: UserId,
        date: NaiveDate,
        top_n: usize,
    ) -> Result<DaySummary> {
        let day = day_key(date);
        self.with_conn(|conn| {
            let total_messages = query_message_total(conn, user_id, &day)?;
            let top_words = query_counts(conn, "words", "word", user_id, &day, top_n)?
                .into_iter()
                .map(|row| row.key)
                .collect();
            let top_emoji = query_counts(conn, "emojis", "emoji", user_id, &day, 1)?
                .into_iter()
                .next()
                .map(|row| row.key);

            Ok(DaySummary {
                total_messages,
                top_words,
                top_emoji,
                mood: query_mood(conn, user_id, &day)?,
                note: query_note(conn, user_id, &day)?,
            })
        })
    }

    /// Users with at least one message counted on `date`, ascending by id.
    pub fn list_users_active_on(&self, date: NaiveDate) -> Result<Vec<UserId>> {
        let day = day_key(date);
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT DISTINCT user_id FROM messages
                 WHERE date = ?1 AND message_count > 0
                 ORDER BY user_id",
            )?;
            let users = stmt
                .query_map([&day], |row| row.get::<_, UserId>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(users)
        })
    }

    // -- Recap cursor --

    pub fn get_recap_cursor(&self, scope: &str) -> Result<Option<NaiveDate>> {
        let stored: Option<String> = self.with_conn(|conn| {
            let day = conn
                .query_row(
                    "SELECT last_triggered FROM recap_cursor WHERE scope = ?1",
                    [scope],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(day)
        })?;

        stored
            .map(|day| {
                NaiveDate::parse_from_str(&day, "%Y-%m-%d")
                    .map_err(|e| anyhow::anyhow!("Corrupt recap cursor '{}': {}", day, e))
            })
            .transpose()
    }

    /// Durable once this returns: the write is committed before the caller proceeds.
    pub fn set_recap_cursor(&self, scope: &str, date: NaiveDate) -> Result<()> {
        let day = day_key(date);
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO recap_cursor (scope, last_triggered) VALUES (?1, ?2)
                 ON CONFLICT(scope) DO UPDATE SET last_triggered = excluded.last_triggered",
                params![scope, day],
            )?;
            Ok(())
        })
    }
}

fn upsert_message(
    conn: &Connection,
    user_id: UserId,
    server_id: u64,
    channel_id: u64,
    day: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO messages (user_id, server_id, channel_id, date, message_count)
         VALUES (?1, ?2, ?3, ?4, 1)
         ON CONFLICT(user_id, server_id, channel_id, date)
         DO UPDATE SET message_count = message_count + 1",
        params![user_id, server_id, channel_id, day],
    )?;
    Ok(())
}

fn upsert_word(conn: &Connection, user_id: UserId, day: &str, word: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO words (user_id, date, word, count) VALUES (?1, ?2, ?3, 1)
         ON CONFLICT(user_id, date, word) DO UPDATE SET count = count + 1",
        params![user_id, day, word],
    )?;
    Ok(())
}

fn upsert_emoji(conn: &Connection, user_id: UserId, day: &str, emoji: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO emojis (user_id, date, emoji, count) VALUES (?1, ?2, ?3, 1)
         ON CONFLICT(user_id, date, emoji) DO UPDATE SET count = count + 1",
        params![user_id, day, emoji],
    )?;
    Ok(())
}

fn upsert_username(conn: &Connection, user_id: UserId, username: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO users (user_id, username) VALUES (?1, ?2)
         ON CONFLICT(user_id) DO UPDATE
         SET username = excluded.username, updated_at = datetime('now')",
        params![user_id, username],
    )?;
    Ok(())
}

fn query_message_total(conn: &Connection, user_id: UserId, day: &str) -> Result<u64> {
    let total: i64 = conn.query_row(
        "SELECT COALESCE(SUM(message_count), 0) FROM messages WHERE user_id = ?1 AND date = ?2",
        params![user_id, day],
        |row| row.get(0),
    )?;
    Ok(u64::try_from(total)?)
}

/// `table` and `column` are only ever the fixed names used above.
fn query_counts(
    conn: &Connection,
    table: &str,
    column: &str,
    user_id: UserId,
    day: &str,
    limit: usize,
) -> Result<Vec<CountRow>> {
    let sql = format!(
        "SELECT {column}, count FROM {table}
         WHERE user_id = ?1 AND date = ?2
         ORDER BY count DESC, rowid ASC
         LIMIT ?3"
    );
    let limit = i64::try_from(limit)?;
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![user_id, day, limit], |row| {
            Ok(CountRow {
                key: row.get(0)?,
                count: row.get(1)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn query_mood(conn: &Connection, user_id: UserId, day: &str) -> Result<Option<String>> {
    let mood = conn
        .query_row(
            "SELECT mood FROM moods WHERE user_id = ?1 AND date = ?2",
            params![user_id, day],
            |row| row.get(0),
        )
        .optional()?;
    Ok(mood)
}

fn query_note(conn: &Connection, user_id: UserId, day: &str) -> Result<Option<String>> {
    let note = conn
        .query_row(
            "SELECT note FROM notes WHERE user_id = ?1 AND date = ?2",
            params![user_id, day],
            |row| row.get(0),
        )
        .optional()?;
    Ok(note)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    #[test]
    fn message_counter_upserts_and_increments() {
        let db = Database::open_in_memory().unwrap();
        for _ in 0..3 {
            db.increment_message(7, 1, 10, day(19)).unwrap();
        }
        db.increment_message(7, 2, 20, day(19)).unwrap();
        db.increment_message(7, 1, 10, day(20)).unwrap();

        assert_eq!(db.message_total(7, day(19)).unwrap(), 4);
        assert_eq!(db.message_total(7, day(20)).unwrap(), 1);
        assert_eq!(db.message_total(8, day(19)).unwrap(), 0);
    }

    #[test]
    fn word_counter_counts_every_call() {
        let db = Database::open_in_memory().unwrap();
        for _ in 0..5 {
            db.increment_word(1, day(19), "rust").unwrap();
        }
        let rows = db.word_counts(1, day(19), 10).unwrap();
        assert_eq!(rows, vec![CountRow { key: "rust".into(), count: 5 }]);
    }

    #[test]
    fn top_words_break_ties_by_first_insertion() {
        let db = Database::open_in_memory().unwrap();
        for w in ["hi", "go", "bot", "hi", "go", "hi", "go"] {
            db.increment_word(1, day(19), w).unwrap();
        }

        let summary = db.query_day_summary(1, day(19), 2).unwrap();
        assert_eq!(summary.top_words, vec!["hi", "go"]);

        // A later insertion overtaking an earlier one reorders by count
        for _ in 0..3 {
            db.increment_word(1, day(19), "bot").unwrap();
        }
        let summary = db.query_day_summary(1, day(19), 5).unwrap();
        assert_eq!(summary.top_words, vec!["bot", "hi", "go"]);
    }

    #[test]
    fn top_words_is_capped() {
        let db = Database::open_in_memory().unwrap();
        for w in ["a", "b", "c", "d", "e", "f", "g"] {
            db.increment_word(1, day(19), w).unwrap();
        }
        let summary = db.query_day_summary(1, day(19), 5).unwrap();
        assert_eq!(summary.top_words, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn top_emoji_ties_keep_first_seen() {
        let db = Database::open_in_memory().unwrap();
        db.increment_emoji(1, day(19), "🚀").unwrap();
        db.increment_emoji(1, day(19), "😃").unwrap();
        let summary = db.query_day_summary(1, day(19), 5).unwrap();
        assert_eq!(summary.top_emoji.as_deref(), Some("🚀"));

        db.increment_emoji(1, day(19), "😃").unwrap();
        let summary = db.query_day_summary(1, day(19), 5).unwrap();
        assert_eq!(summary.top_emoji.as_deref(), Some("😃"));
    }

    #[test]
    fn mood_is_last_write_wins() {
        let db = Database::open_in_memory().unwrap();
        db.set_mood(1, day(19), "😃").unwrap();
        db.set_mood(1, day(19), "😴").unwrap();

        assert_eq!(db.get_mood(1, day(19)).unwrap().as_deref(), Some("😴"));
        let rows: i64 = db
            .with_conn(|conn| {
                let sql = "SELECT COUNT(*) FROM moods WHERE user_id = 1";
                Ok(conn.query_row(sql, [], |r| r.get(0))?)
            })
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn note_is_last_write_wins_per_day() {
        let db = Database::open_in_memory().unwrap();
        db.set_note(1, day(19), "first").unwrap();
        db.set_note(1, day(19), "second").unwrap();
        db.set_note(1, day(20), "tomorrow").unwrap();

        assert_eq!(db.get_note(1, day(19)).unwrap().as_deref(), Some("second"));
        assert_eq!(db.get_note(1, day(20)).unwrap().as_deref(), Some("tomorrow"));
        assert_eq!(db.get_note(2, day(19)).unwrap(), None);
    }

    #[test]
    fn theme_defaults_and_persists() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.get_theme(1).unwrap(), Theme::Pastel);

        db.set_theme(1, Theme::Neon).unwrap();
        db.set_theme(1, Theme::Dark).unwrap();
        assert_eq!(db.get_theme(1).unwrap(), Theme::Dark);
        assert_eq!(db.get_theme(2).unwrap(), Theme::Pastel);
    }

    #[test]
    fn record_message_writes_all_counters() {
        let db = Database::open_in_memory().unwrap();
        let words = vec!["coffee".to_string(), "coffee".to_string(), "code".to_string()];
        let emojis = vec!["😃".to_string()];
        let activity = MessageActivity {
            user_id: 3,
            username: Some("ada"),
            server_id: 0,
            channel_id: 99,
            words: &words,
            emojis: &emojis,
        };
        db.record_message(&activity, day(19)).unwrap();

        let summary = db.query_day_summary(3, day(19), 5).unwrap();
        assert_eq!(summary.total_messages, 1);
        assert_eq!(summary.top_words, vec!["coffee", "code"]);
        assert_eq!(summary.top_emoji.as_deref(), Some("😃"));
        assert_eq!(db.get_username(3).unwrap().as_deref(), Some("ada"));
    }

    #[test]
    fn empty_day_summary() {
        let db = Database::open_in_memory().unwrap();
        let summary = db.query_day_summary(1, day(19), 5).unwrap();
        assert_eq!(summary, DaySummary::default());
    }

    #[test]
    fn active_users_are_scoped_to_the_day() {
        let db = Database::open_in_memory().unwrap();
        db.increment_message(5, 1, 1, day(19)).unwrap();
        db.increment_message(2, 1, 1, day(19)).unwrap();
        db.increment_message(2, 3, 4, day(19)).unwrap();
        db.increment_message(9, 1, 1, day(18)).unwrap();

        assert_eq!(db.list_users_active_on(day(19)).unwrap(), vec![2, 5]);
        assert_eq!(db.list_users_active_on(day(18)).unwrap(), vec![9]);
        assert!(db.list_users_active_on(day(17)).unwrap().is_empty());
    }

    #[test]
    fn recap_cursor_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.db");

        {
            let db = Database::open(&path).unwrap();
            assert_eq!(db.get_recap_cursor("daily").unwrap(), None);
            db.set_recap_cursor("daily", day(19)).unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(db.get_recap_cursor("daily").unwrap(), Some(day(19)));
        assert_eq!(db.get_recap_cursor("other").unwrap(), None);
    }
}
