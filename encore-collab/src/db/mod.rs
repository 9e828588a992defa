use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

mod data;
pub use data::*;

mod pg;
pub use pg::*;

#[cfg(test)]
mod memory;
#[cfg(test)]
pub use memory::*;

pub type Result<T> = std::result::Result<T, DatabaseError>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    /// An unknown or internal error happened with the database
    #[error(transparent)]
    Internal(Box<dyn std::error::Error + Send + Sync>),
    /// A resource already exists
    #[error("{resource} with {field} of value {value} already exists")]
    Conflict {
        /// The resource in question
        resource: &'static str,
        /// The field that is conflicting
        field: &'static str,
        /// The conflicting value
        value: String,
    },
    /// A resource in the database doesn't exist
    #[error("{resource}:{identifier} doesn't exist")]
    NotFound {
        resource: &'static str,
        identifier: &'static str,
    },
}

/// Helper trait to reduce boilerplate
pub trait IntoDatabaseError {
    fn not_found_or(self, resource: &'static str, identifier: &'static str) -> DatabaseError;
    fn any(self) -> DatabaseError;
}

/// Helper trait to reduce boilerplate
pub trait DatabaseResult {
    /// Turns the Result into a conflict error if it's Ok()
    fn conflict_or_ok(self, resource: &'static str, field: &'static str, value: &str)
        -> Result<()>;
}

impl<T> DatabaseResult for Result<T> {
    fn conflict_or_ok(
        self,
        resource: &'static str,
        field: &'static str,
        value: &str,
    ) -> Result<()> {
        match self {
            Ok(_) => Err(DatabaseError::Conflict {
                resource,
                field,
                value: value.to_string(),
            }),
            Err(e) => match e {
                DatabaseError::NotFound {
                    resource: _,
                    identifier: _,
                } => Ok(()),
                e => Err(e),
            },
        }
    }
}

/// Represents a type that can fetch and mutate encore data in a database
#[async_trait]
pub trait Database: Send + Sync {
    async fn user_by_id(&self, user_id: PrimaryKey) -> Result<UserData>;
    async fn user_by_email(&self, email: &str) -> Result<UserData>;
    /// Returns the user with the given email, creating it on first sign-in
    async fn upsert_user_by_email(&self, email: &str) -> Result<UserData>;

    async fn session_by_token(&self, token: &str) -> Result<SessionData>;
    async fn create_session(&self, new_session: NewSession) -> Result<SessionData>;
    async fn delete_session_by_token(&self, token: &str) -> Result<()>;
    async fn clear_expired_sessions(&self) -> Result<()>;

    async fn queue_item_by_id(&self, item_id: PrimaryKey) -> Result<QueueItemData>;
    async fn create_queue_item(&self, new_item: NewQueueItem) -> Result<QueueItemData>;
    /// All unplayed items of a creator with their live vote counts,
    /// ordered by votes descending, ties broken by ascending item id
    async fn list_unplayed(&self, owner_id: PrimaryKey) -> Result<Vec<RankedQueueItem>>;

    /// Records a vote. A `(voter, item)` pair can hold at most one vote,
    /// enforced by a unique constraint as the mechanism of last resort.
    async fn create_vote(&self, voter_id: PrimaryKey, item_id: PrimaryKey) -> Result<()>;
    /// Retracts a vote, failing with NotFound if none exists for the pair
    async fn delete_vote(&self, voter_id: PrimaryKey, item_id: PrimaryKey) -> Result<()>;
    async fn vote_count(&self, item_id: PrimaryKey) -> Result<i64>;

    async fn now_playing(&self, owner_id: PrimaryKey) -> Result<Option<NowPlayingData>>;
    /// Atomically marks the top-voted unplayed item of a creator as played
    /// and repoints the now-playing pointer at it, returning the item.
    /// Fails with NotFound when no unplayed item exists, leaving the
    /// pointer untouched.
    async fn advance_queue(&self, owner_id: PrimaryKey) -> Result<QueueItemData>;
}

#[derive(Debug)]
pub struct NewSession {
    pub token: String,
    pub user_id: PrimaryKey,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct NewQueueItem {
    /// The creator whose queue the item is submitted to
    pub user_id: PrimaryKey,
    pub video_id: String,
    pub url: String,
    pub title: Option<String>,
    pub small_thumbnail: Option<String>,
    pub big_thumbnail: Option<String>,
}
