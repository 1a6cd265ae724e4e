//! PostgreSQL friend request store implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use letstalk_core::AppResult;
use letstalk_core::error::{AppError, ErrorKind};
use letstalk_core::types::id::{FriendRequestId, UserId};
use letstalk_entity::friend_request::{FriendRequest, NewFriendRequest};

use crate::store::FriendRequestStore;

/// Friend request repository over PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgFriendRequestStore {
    pool: PgPool,
}

impl PgFriendRequestStore {
    /// Create a new friend request store over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FriendRequestStore for PgFriendRequestStore {
    async fn create(&self, data: &NewFriendRequest) -> AppResult<FriendRequest> {
        sqlx::query_as::<_, FriendRequest>(
            "INSERT INTO friend_requests (sender_id, receiver_id) \
             VALUES ($1, $2) \
             RETURNING *",
        )
        .bind(data.sender_id)
        .bind(data.receiver_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("friend_requests_pair_key") =>
            {
                AppError::conflict("A request for this pair is already pending")
            }
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("friend_requests_sender_id_fkey")
                    || db_err.constraint() == Some("friend_requests_receiver_id_fkey") =>
            {
                AppError::not_found("Sender or receiver does not exist")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create friend request", e),
        })
    }

    async fn find_by_id(&self, id: FriendRequestId) -> AppResult<Option<FriendRequest>> {
        sqlx::query_as::<_, FriendRequest>("SELECT * FROM friend_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find friend request", e)
            })
    }

    async fn find_by_receiver(&self, receiver: UserId) -> AppResult<Vec<FriendRequest>> {
        sqlx::query_as::<_, FriendRequest>(
            "SELECT * FROM friend_requests WHERE receiver_id = $1 ORDER BY created_at DESC",
        )
        .bind(receiver)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list friend requests", e)
        })
    }

    async fn resolve_accept(&self, id: FriendRequestId) -> AppResult<Option<FriendRequest>> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        // Delete-first: if the request is gone a racing accept already won
        // and nothing else must happen.
        let request = sqlx::query_as::<_, FriendRequest>(
            "DELETE FROM friend_requests WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to delete friend request", e)
        })?;

        let Some(request) = request else {
            tx.rollback().await.map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to roll back transaction", e)
            })?;
            return Ok(None);
        };

        // Both directions in one statement; ON CONFLICT keeps a re-derived
        // accept (e.g. of a leftover reverse request) idempotent.
        sqlx::query(
            "INSERT INTO friendships (user_id, friend_id) \
             VALUES ($1, $2), ($2, $1) \
             ON CONFLICT DO NOTHING",
        )
        .bind(request.sender_id)
        .bind(request.receiver_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to record friendship", e)
        })?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit accept", e)
        })?;

        Ok(Some(request))
    }
}
