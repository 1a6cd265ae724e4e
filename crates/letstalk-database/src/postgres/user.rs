//! PostgreSQL user store implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use letstalk_core::AppResult;
use letstalk_core::error::{AppError, ErrorKind};
use letstalk_core::types::id::{ConnectionId, UserId};
use letstalk_entity::user::{NewUser, PresenceStatus, User};

use crate::store::UserStore;

/// User repository over PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Create a new user store over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, data: &NewUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (first_name, last_name, email, verified) \
             VALUES ($1, $2, LOWER($3), $4) \
             RETURNING *",
        )
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.email)
        .bind(data.verified)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.constraint() == Some("users_email_key") => {
                AppError::conflict(format!("Email '{}' already in use", data.email))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create user", e),
        })
    }

    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> AppResult<Vec<User>> {
        let raw: Vec<Uuid> = ids.iter().map(|id| id.0).collect();
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ANY($1)")
            .bind(&raw)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find users", e))
    }

    async fn find_verified(&self) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE verified = TRUE ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list verified users", e))
    }

    async fn set_presence(
        &self,
        id: UserId,
        status: PresenceStatus,
        socket_id: Option<ConnectionId>,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE users SET status = $2, socket_id = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .bind(socket_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update presence", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User {id} not found")));
        }
        Ok(())
    }

    async fn reset_presence(&self) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE users SET status = $1, socket_id = NULL, updated_at = NOW() \
             WHERE status <> $1 OR socket_id IS NOT NULL",
        )
        .bind(PresenceStatus::Offline)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to reset presence", e))?;

        Ok(result.rows_affected())
    }

    async fn friend_ids(&self, id: UserId) -> AppResult<Vec<UserId>> {
        sqlx::query_scalar::<_, UserId>(
            "SELECT friend_id FROM friendships WHERE user_id = $1 ORDER BY created_at ASC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list friends", e))
    }

    async fn are_friends(&self, a: UserId, b: UserId) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM friendships WHERE user_id = $1 AND friend_id = $2)",
        )
        .bind(a)
        .bind(b)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check friendship", e))
    }
}
