//! CRUD operations for [`User`] records.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use crate::database::{is_unique_violation, Database};
use crate::error::{Result, StoreError};
use crate::models::User;

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Register a new user.
    ///
    /// A fresh uuid-v4 token is generated and stored alongside the name.
    /// Returns [`StoreError::Conflict`] when the name is already taken.
    pub fn create_user(&self, name: &str) -> Result<User> {
        let token = Uuid::new_v4().to_string();
        let created_at = Utc::now();

        self.conn()
            .execute(
                "INSERT INTO users (name, token, created_at)
                 VALUES (?1, ?2, ?3)",
                params![name, token, created_at.to_rfc3339()],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::Conflict(format!("user name '{name}' already exists"))
                } else {
                    StoreError::Sqlite(e)
                }
            })?;

        let id = self.conn().last_insert_rowid();

        Ok(User {
            id,
            name: name.to_string(),
            token,
            created_at,
        })
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch a single user by id.
    pub fn get_user(&self, id: i64) -> Result<User> {
        self.conn()
            .query_row(
                "SELECT id, name, token, created_at
                 FROM users
                 WHERE id = ?1",
                params![id],
                row_to_user,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// Look up a user by the exact id + token pairing.
    ///
    /// Returns `Ok(None)` when either the id does not exist or the token does
    /// not match; callers cannot distinguish the two cases.
    pub fn find_user_by_credentials(&self, id: i64, token: &str) -> Result<Option<User>> {
        self.conn()
            .query_row(
                "SELECT id, name, token, created_at
                 FROM users
                 WHERE id = ?1 AND token = ?2",
                params![id, token],
                row_to_user,
            )
            .optional()
            .map_err(StoreError::Sqlite)
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete a user together with all of their audio records.
    ///
    /// Both deletions happen inside a single transaction.  Returns
    /// [`StoreError::NotFound`] (and rolls back) when no such user exists.
    pub fn delete_user(&mut self, id: i64) -> Result<()> {
        let tx = self.conn_mut().transaction()?;

        tx.execute(
            "DELETE FROM audio_records WHERE user_id = ?1",
            params![id],
        )?;
        let affected = tx.execute("DELETE FROM users WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }

        tx.commit()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map a `rusqlite::Row` to a [`User`].
fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let id: i64 = row.get(0)?;
    let name: String = row.get(1)?;
    let token: String = row.get(2)?;
    let created_str: String = row.get(3)?;

    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&created_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(User {
        id,
        name,
        token,
        created_at,
    })
}
