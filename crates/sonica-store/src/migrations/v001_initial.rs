//! v001 -- Initial schema creation.
//!
//! Creates the two core tables: `users` and `audio_records`.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Users
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS users (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    name       TEXT NOT NULL UNIQUE,
    token      TEXT NOT NULL UNIQUE,        -- uuid v4, upload shared-secret
    created_at TEXT NOT NULL                -- ISO-8601 / RFC-3339
);

-- ----------------------------------------------------------------
-- Audio records
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS audio_records (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id    INTEGER NOT NULL,            -- FK -> users(id)
    public_id  TEXT NOT NULL UNIQUE,        -- uuid v4, exposed to clients
    file_path  TEXT NOT NULL UNIQUE,        -- converted mp3 on disk
    created_at TEXT NOT NULL,

    FOREIGN KEY (user_id) REFERENCES users(id)
);

CREATE INDEX IF NOT EXISTS idx_audio_records_user_id ON audio_records(user_id);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
