//! Track entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tunehost_core::types::{DbId, Timestamp};
use validator::Validate;

/// A row from the `tracks` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Track {
    pub id: DbId,
    pub name: String,
    pub artist: String,
    pub url: String,
    pub likes: i64,
    pub dislikes: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new track.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTrack {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub artist: String,
    #[validate(url)]
    pub url: String,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub likes: i64,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub dislikes: i64,
}

/// DTO for updating an existing track. All fields optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTrack {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub artist: Option<String>,
    #[validate(url)]
    pub url: Option<String>,
    #[validate(range(min = 0))]
    pub likes: Option<i64>,
    #[validate(range(min = 0))]
    pub dislikes: Option<i64>,
}
