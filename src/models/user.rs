// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,

    /// Unique login email.
    pub email: String,

    /// Display name; may be absent for accounts created via Google auth.
    pub name: Option<String>,

    /// Argon2 password hash; `None` for accounts created via Google auth.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: Option<String>,

    /// External identity linkage set by the Google auth flow.
    pub google_id: Option<String>,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for account creation (signup).
/// Required fields are `Option` so a missing field reports a 400 with a
/// useful message instead of a deserialize reject.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(
        min = 4,
        max = 128,
        message = "Password length must be between 4 and 128 characters."
    ))]
    pub password: Option<String>,
    #[validate(length(max = 100, message = "Name must be at most 100 characters."))]
    pub name: Option<String>,
}

/// DTO for credential login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// DTO for the Google auth exchange.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GoogleAuthRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(max = 100, message = "Name must be at most 100 characters."))]
    pub name: Option<String>,
    pub google_id: Option<String>,
}

/// DTO for account removal.
#[derive(Debug, Deserialize)]
pub struct DeleteUserRequest {
    pub email: Option<String>,
}
