//! CRUD operations for [`AudioRecord`] rows.

use chrono::{DateTime, Utc};
use rusqlite::params;
use uuid::Uuid;

use crate::database::{is_unique_violation, Database};
use crate::error::{Result, StoreError};
use crate::models::AudioRecord;

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a new audio record for a user.
    ///
    /// The caller supplies the client-facing `public_id` and the on-disk
    /// location of the converted file.  Returns [`StoreError::Conflict`] when
    /// either collides with an existing row; generated uuids make that
    /// improbable and no retry is attempted.
    pub fn create_record(
        &self,
        user_id: i64,
        public_id: Uuid,
        file_path: &str,
    ) -> Result<AudioRecord> {
        let created_at = Utc::now();

        self.conn()
            .execute(
                "INSERT INTO audio_records (user_id, public_id, file_path, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    user_id,
                    public_id.to_string(),
                    file_path,
                    created_at.to_rfc3339(),
                ],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::Conflict("audio record identifier already exists".to_string())
                } else {
                    StoreError::Sqlite(e)
                }
            })?;

        let id = self.conn().last_insert_rowid();

        Ok(AudioRecord {
            id,
            user_id,
            public_id,
            file_path: file_path.to_string(),
            created_at,
        })
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch a single record by its client-facing identifier.
    pub fn get_record_by_public_id(&self, public_id: Uuid) -> Result<AudioRecord> {
        self.conn()
            .query_row(
                "SELECT id, user_id, public_id, file_path, created_at
                 FROM audio_records
                 WHERE public_id = ?1",
                params![public_id.to_string()],
                row_to_record,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// List all records owned by a user, oldest first.
    pub fn list_records_for_user(&self, user_id: i64) -> Result<Vec<AudioRecord>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, user_id, public_id, file_path, created_at
             FROM audio_records
             WHERE user_id = ?1
             ORDER BY id ASC",
        )?;

        let rows = stmt.query_map(params![user_id], row_to_record)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete a record by its client-facing identifier.  Returns `true` if a
    /// row was deleted.
    ///
    /// Only removes the db row, not the file on disk.
    pub fn delete_record(&self, public_id: Uuid) -> Result<bool> {
        let affected = self.conn().execute(
            "DELETE FROM audio_records WHERE public_id = ?1",
            params![public_id.to_string()],
        )?;
        Ok(affected > 0)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map a `rusqlite::Row` to an [`AudioRecord`].
fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<AudioRecord> {
    let id: i64 = row.get(0)?;
    let user_id: i64 = row.get(1)?;
    let public_id_str: String = row.get(2)?;
    let file_path: String = row.get(3)?;
    let created_str: String = row.get(4)?;

    let public_id = Uuid::parse_str(&public_id_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&created_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(AudioRecord {
        id,
        user_id,
        public_id,
        file_path,
        created_at,
    })
}
