use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// The type used for primary keys in the database.
pub type PrimaryKey = i32;

/// An encore account, created the first time an email signs in
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct UserData {
    pub id: PrimaryKey,
    pub email: String,
}

/// Login session data for authentication
#[derive(Debug, Clone)]
pub struct SessionData {
    pub id: PrimaryKey,
    /// The session token, or key if you will
    pub token: String,
    pub expires_at: DateTime<Utc>,
    /// The user that is logged in
    pub user: UserData,
}

/// A submitted entry in a creator's queue
#[derive(Debug, Clone, FromRow)]
pub struct QueueItemData {
    pub id: PrimaryKey,
    /// The creator whose queue this item belongs to
    pub user_id: PrimaryKey,
    /// The 11 character id extracted from the submitted link
    pub video_id: String,
    pub url: String,
    pub title: Option<String>,
    pub small_thumbnail: Option<String>,
    pub big_thumbnail: Option<String>,
    /// Always "video" for now
    pub kind: String,
    /// Set to true exactly once, by the advance operation
    pub played: bool,
    pub played_at: Option<DateTime<Utc>>,
}

/// A queue item annotated with its live vote count.
/// The count is always derived by aggregation, never stored on the item.
#[derive(Debug, Clone, FromRow)]
pub struct RankedQueueItem {
    #[sqlx(flatten)]
    pub item: QueueItemData,
    pub votes: i64,
}

/// The per-creator record of which item is currently selected for playback
#[derive(Debug, Clone)]
pub struct NowPlayingData {
    /// The creator owning the pointer
    pub user_id: PrimaryKey,
    pub item: QueueItemData,
}
