//! Data models for `BotPanel` storage.

use serde::{Deserialize, Serialize};

use crate::bot::BotStatus;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bot {
    pub id: i64,
    pub user_id: i64,
    pub status: BotStatus,
    /// Process id recorded by the external runner.
    pub pid: Option<i64>,
    pub log_file: Option<String>,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    pub id: String,
    pub user_id: i64,
    pub expires_at: i64,
    pub revoked: i64,
    pub created_at: i64,
}

/// One row of the admin listing: a user joined with its bot.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserWithBot {
    pub user_id: i64,
    pub email: String,
    pub is_admin: bool,
    pub bot_id: i64,
    pub status: BotStatus,
    pub pid: Option<i64>,
    pub log_file: Option<String>,
}
