//! Domain model structs persisted in the SQLite database.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A registered user.
///
/// The `token` is an opaque uuid-v4 string generated at registration time.
/// Together with the numeric `id` it forms the shared secret that authorizes
/// audio uploads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Integer primary key, generated by SQLite.
    pub id: i64,
    /// Display name, unique across all users.
    pub name: String,
    /// Upload credential, unique across all users.
    pub token: String,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// AudioRecord
// ---------------------------------------------------------------------------

/// A converted audio file owned by a user.
///
/// Clients never see the integer `id`; the uuid `public_id` is exposed
/// instead so that record identifiers cannot be enumerated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AudioRecord {
    /// Integer primary key, generated by SQLite.
    pub id: i64,
    /// Owning user.
    pub user_id: i64,
    /// Client-facing identifier.
    pub public_id: Uuid,
    /// On-disk location of the converted MP3, unique.
    pub file_path: String,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}
