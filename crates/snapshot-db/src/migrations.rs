use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

/// Forward-only migrations. Tables are never dropped on startup.
pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (aggregate tables)");
        conn.execute_batch(
            "
            BEGIN;

            CREATE TABLE messages (
                user_id         INTEGER NOT NULL,
                server_id       INTEGER NOT NULL,
                channel_id      INTEGER NOT NULL,
                date            TEXT NOT NULL,
                message_count   INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (user_id, server_id, channel_id, date)
            );

            CREATE INDEX idx_messages_date ON messages(date, user_id);

            -- rowid order doubles as first-seen order for tie-breaks
            CREATE TABLE words (
                user_id     INTEGER NOT NULL,
                date        TEXT NOT NULL,
                word        TEXT NOT NULL,
                count       INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (user_id, date, word)
            );

            CREATE TABLE emojis (
                user_id     INTEGER NOT NULL,
                date        TEXT NOT NULL,
                emoji       TEXT NOT NULL,
                count       INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (user_id, date, emoji)
            );

            CREATE TABLE moods (
                user_id     INTEGER NOT NULL,
                date        TEXT NOT NULL,
                mood        TEXT NOT NULL,
                PRIMARY KEY (user_id, date)
            );

            CREATE TABLE notes (
                user_id     INTEGER NOT NULL,
                date        TEXT NOT NULL,
                note        TEXT NOT NULL,
                PRIMARY KEY (user_id, date)
            );

            CREATE TABLE themes (
                user_id     INTEGER PRIMARY KEY,
                theme       TEXT NOT NULL DEFAULT 'pastel'
            );

            CREATE TABLE recap_cursor (
                scope           TEXT PRIMARY KEY,
                last_triggered  TEXT NOT NULL
            );

            INSERT INTO schema_version (version) VALUES (1);

            COMMIT;
            ",
        )?;
    }

    if version < 2 {
        info!("Running migration v2 (display names)");
        conn.execute_batch(
            "
            BEGIN;

            CREATE TABLE users (
                user_id     INTEGER PRIMARY KEY,
                username    TEXT NOT NULL,
                updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            INSERT INTO schema_version (version) VALUES (2);

            COMMIT;
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
