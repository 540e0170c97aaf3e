//! Database queries for the `BotPanel` server.

use botpanel_core::db::unix_timestamp;

use super::db::PanelDatabase;
use super::models::{Bot, Session, User, UserWithBot};
use crate::bot::{BotCommand, BotStatus};
use botpanel_core::db::DatabaseError;

impl PanelDatabase {
    // =========================================================================
    // Account queries
    // =========================================================================

    /// Create a user together with its bot record.
    ///
    /// Both rows are written in one transaction: either the account exists
    /// with a `Stopped` bot, or nothing was written. A taken email surfaces
    /// as [`DatabaseError::Conflict`].
    pub async fn create_account(
        &self,
        email: &str,
        password_hash: &str,
        is_admin: bool,
    ) -> Result<(User, Bot), DatabaseError> {
        let now = unix_timestamp();
        let mut tx = self.pool().begin().await?;

        let user_id = sqlx::query(
            "INSERT INTO users (email, password_hash, is_admin, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(email)
        .bind(password_hash)
        .bind(is_admin)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        sqlx::query("INSERT INTO bots (user_id, status, updated_at) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(BotStatus::Stopped)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;
        let bot = sqlx::query_as::<_, Bot>("SELECT * FROM bots WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((user, bot))
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: i64) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("User {id}")))
    }

    /// Look a user up by email.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(self.pool())
            .await?;
        Ok(user)
    }

    /// Every user joined with its bot, ordered by user id.
    pub async fn list_users_with_bots(&self) -> Result<Vec<UserWithBot>, DatabaseError> {
        let rows = sqlx::query_as::<_, UserWithBot>(
            "SELECT u.id AS user_id, u.email, u.is_admin, b.id AS bot_id, b.status, b.pid, b.log_file \
             FROM users u JOIN bots b ON b.user_id = u.id ORDER BY u.id",
        )
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }

    // =========================================================================
    // Bot queries
    // =========================================================================

    /// Get the bot owned by a user.
    pub async fn get_bot_for_user(&self, user_id: i64) -> Result<Bot, DatabaseError> {
        sqlx::query_as::<_, Bot>("SELECT * FROM bots WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Bot for user {user_id}")))
    }

    /// Apply a start/stop command to a user's bot and return the new record.
    ///
    /// The target status depends only on the command, so this is a single
    /// write statement; concurrent toggles queue on the busy timeout and the
    /// last writer wins.
    pub async fn apply_bot_command(
        &self,
        user_id: i64,
        command: BotCommand,
    ) -> Result<Bot, DatabaseError> {
        sqlx::query_as::<_, Bot>(
            "UPDATE bots SET status = ?, updated_at = ? WHERE user_id = ? RETURNING *",
        )
        .bind(command.target())
        .bind(unix_timestamp())
        .bind(user_id)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("Bot for user {user_id}")))
    }

    /// Overwrite a bot's status. This is the write the external runner
    /// performs, e.g. to flag `Error`.
    pub async fn set_bot_status(
        &self,
        user_id: i64,
        status: BotStatus,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE bots SET status = ?, updated_at = ? WHERE user_id = ?")
            .bind(status)
            .bind(unix_timestamp())
            .bind(user_id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Bot for user {user_id}")));
        }
        Ok(())
    }

    // =========================================================================
    // Session queries
    // =========================================================================

    /// Delete sessions that can no longer authenticate anyone.
    pub async fn purge_stale_sessions(&self) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ? OR revoked = 1")
            .bind(unix_timestamp())
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected())
    }

    /// Record a login session.
    pub async fn create_session(
        &self,
        id: &str,
        user_id: i64,
        expires_at: i64,
    ) -> Result<Session, DatabaseError> {
        let now = unix_timestamp();

        sqlx::query("INSERT INTO sessions (id, user_id, expires_at, created_at) VALUES (?, ?, ?, ?)")
            .bind(id)
            .bind(user_id)
            .bind(expires_at)
            .bind(now)
            .execute(self.pool())
            .await?;

        sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = ?")
            .bind(id)
            .fetch_one(self.pool())
            .await
            .map_err(Into::into)
    }

    /// Find a session that is neither revoked nor expired.
    pub async fn get_live_session(&self, id: &str) -> Result<Option<Session>, DatabaseError> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions WHERE id = ? AND revoked = 0 AND expires_at > ?",
        )
        .bind(id)
        .bind(unix_timestamp())
        .fetch_optional(self.pool())
        .await?;

        Ok(session)
    }

    /// Revoke a session by ID.
    pub async fn revoke_session(&self, id: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query("UPDATE sessions SET revoked = 1 WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
