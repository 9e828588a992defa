use async_trait::async_trait;
use log::info;
use sqlx::{postgres::PgPoolOptions, query, query_as, query_scalar, Error as SqlxError, PgPool};

use super::{
    Database, DatabaseError, DatabaseResult, IntoDatabaseError, NewQueueItem, NewSession,
    NowPlayingData, PrimaryKey, QueueItemData, RankedQueueItem, Result, SessionData, UserData,
};

/// A postgres database implementation for encore
pub struct PgDatabase {
    pool: PgPool,
}

impl PgDatabase {
    pub async fn new(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await
            .map_err(|e| DatabaseError::Internal(Box::new(e)))?;

        info!("Running database migrations...");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| DatabaseError::Internal(Box::new(e)))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl Database for PgDatabase {
    async fn user_by_id(&self, user_id: PrimaryKey) -> Result<UserData> {
        query_as("SELECT id, email FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("user", "id"))
    }

    async fn user_by_email(&self, email: &str) -> Result<UserData> {
        query_as("SELECT id, email FROM users WHERE email = $1")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("user", "email"))
    }

    async fn upsert_user_by_email(&self, email: &str) -> Result<UserData> {
        query_as(
            "INSERT INTO users (email) VALUES ($1)
             ON CONFLICT (email) DO UPDATE SET email = excluded.email
             RETURNING id, email",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn session_by_token(&self, token: &str) -> Result<SessionData> {
        let row: (PrimaryKey, String, chrono::DateTime<chrono::Utc>, PrimaryKey, String) =
            query_as(
                "SELECT sessions.id, sessions.token, sessions.expires_at, users.id, users.email
                 FROM sessions
                    INNER JOIN users ON sessions.user_id = users.id
                 WHERE token = $1",
            )
            .bind(token)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("session", "token"))?;

        Ok(SessionData {
            id: row.0,
            token: row.1,
            expires_at: row.2,
            user: UserData {
                id: row.3,
                email: row.4,
            },
        })
    }

    async fn create_session(&self, new_session: NewSession) -> Result<SessionData> {
        self.session_by_token(&new_session.token)
            .await
            .conflict_or_ok("session", "token", &new_session.token)?;

        let (token,): (String,) = query_as(
            "INSERT INTO sessions (token, user_id, expires_at) VALUES ($1, $2, $3) RETURNING token",
        )
        .bind(&new_session.token)
        .bind(new_session.user_id)
        .bind(new_session.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())?;

        self.session_by_token(&token).await
    }

    async fn delete_session_by_token(&self, token: &str) -> Result<()> {
        // Ensure session exists
        let _ = self.session_by_token(token).await?;

        query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn clear_expired_sessions(&self) -> Result<()> {
        query("DELETE FROM sessions WHERE now() > expires_at")
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn queue_item_by_id(&self, item_id: PrimaryKey) -> Result<QueueItemData> {
        query_as("SELECT * FROM queue_items WHERE id = $1")
            .bind(item_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("queue item", "id"))
    }

    async fn create_queue_item(&self, new_item: NewQueueItem) -> Result<QueueItemData> {
        // Ensure the creator exists
        let _ = self.user_by_id(new_item.user_id).await?;

        query_as(
            "INSERT INTO queue_items (user_id, video_id, url, title, small_thumbnail, big_thumbnail)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(new_item.user_id)
        .bind(&new_item.video_id)
        .bind(&new_item.url)
        .bind(&new_item.title)
        .bind(&new_item.small_thumbnail)
        .bind(&new_item.big_thumbnail)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn list_unplayed(&self, owner_id: PrimaryKey) -> Result<Vec<RankedQueueItem>> {
        query_as(
            "SELECT qi.*, COUNT(v.id) AS votes
             FROM queue_items qi
                LEFT JOIN votes v ON v.queue_item_id = qi.id
             WHERE qi.user_id = $1 AND qi.played = false
             GROUP BY qi.id
             ORDER BY votes DESC, qi.id ASC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn create_vote(&self, voter_id: PrimaryKey, item_id: PrimaryKey) -> Result<()> {
        // Ensure the item exists before touching the vote ledger
        let _ = self.queue_item_by_id(item_id).await?;

        // The existence check in the queue manager is racy by itself,
        // so the unique constraint is the enforcement of last resort.
        query("INSERT INTO votes (user_id, queue_item_id) VALUES ($1, $2)")
            .bind(voter_id)
            .bind(item_id)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                SqlxError::Database(db) if db.is_unique_violation() => DatabaseError::Conflict {
                    resource: "vote",
                    field: "voter:item",
                    value: format!("{voter_id}:{item_id}"),
                },
                e => e.any(),
            })
            .map(|_| ())
    }

    async fn delete_vote(&self, voter_id: PrimaryKey, item_id: PrimaryKey) -> Result<()> {
        let result = query("DELETE FROM votes WHERE user_id = $1 AND queue_item_id = $2")
            .bind(voter_id)
            .bind(item_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound {
                resource: "vote",
                identifier: "voter:item",
            });
        }

        Ok(())
    }

    async fn vote_count(&self, item_id: PrimaryKey) -> Result<i64> {
        query_scalar("SELECT COUNT(*) FROM votes WHERE queue_item_id = $1")
            .bind(item_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.any())
    }

    async fn now_playing(&self, owner_id: PrimaryKey) -> Result<Option<NowPlayingData>> {
        let item: Option<QueueItemData> = query_as(
            "SELECT qi.* FROM now_playing np
                INNER JOIN queue_items qi ON np.queue_item_id = qi.id
             WHERE np.user_id = $1",
        )
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| e.any())?;

        Ok(item.map(|item| NowPlayingData {
            user_id: owner_id,
            item,
        }))
    }

    async fn advance_queue(&self, owner_id: PrimaryKey) -> Result<QueueItemData> {
        let mut tx = self.pool.begin().await.map_err(|e| e.any())?;

        // The `played = false` predicate prevents re-selection once a
        // concurrent transaction commits on the same row.
        let item: Option<QueueItemData> = query_as(
            "UPDATE queue_items SET played = true, played_at = now()
             WHERE id = (
                SELECT qi.id FROM queue_items qi
                    LEFT JOIN votes v ON v.queue_item_id = qi.id
                WHERE qi.user_id = $1 AND qi.played = false
                GROUP BY qi.id
                ORDER BY COUNT(v.id) DESC, qi.id ASC
                LIMIT 1
             ) AND played = false
             RETURNING *",
        )
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| e.any())?;

        // Dropping the transaction rolls back, leaving the pointer untouched
        let item = item.ok_or(DatabaseError::NotFound {
            resource: "queue item",
            identifier: "unplayed",
        })?;

        query(
            "INSERT INTO now_playing (user_id, queue_item_id) VALUES ($1, $2)
             ON CONFLICT (user_id) DO UPDATE SET queue_item_id = excluded.queue_item_id",
        )
        .bind(owner_id)
        .bind(item.id)
        .execute(&mut *tx)
        .await
        .map_err(|e| e.any())?;

        tx.commit().await.map_err(|e| e.any())?;

        Ok(item)
    }
}

impl IntoDatabaseError for SqlxError {
    fn any(self) -> DatabaseError {
        DatabaseError::Internal(Box::new(self))
    }

    fn not_found_or(self, resource: &'static str, identifier: &'static str) -> DatabaseError {
        match self {
            SqlxError::RowNotFound => DatabaseError::NotFound {
                resource,
                identifier,
            },
            e => Self::any(e),
        }
    }
}
