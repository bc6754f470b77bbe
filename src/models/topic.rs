// src/models/topic.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'topics' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: i64,

    /// Unique subject-area name, e.g. "JavaScript".
    pub name: String,

    pub description: Option<String>,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for the favorites toggle.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRequest {
    pub topic_id: Option<i64>,
}
