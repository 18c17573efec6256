use serde::Serialize;
use sqlx::FromRow;

/// User record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,           // unique user ID
    pub username: String,  // login name, unique
    pub email: String,     // unique
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, never rendered
}
