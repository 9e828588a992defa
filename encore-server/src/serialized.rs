//! All schemas that are exposed from endpoints are defined here
//! along with the conversion impls

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use encore_collab::{
    NowPlayingData, QueueItemData, RankedQueueItem as CollabRankedItem, SessionData, UserData,
};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: i32,
    email: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResult {
    token: String,
    user: User,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueueItem {
    id: i32,
    creator_id: i32,
    video_id: String,
    url: String,
    title: Option<String>,
    small_thumbnail: Option<String>,
    big_thumbnail: Option<String>,
    kind: String,
    played: bool,
    played_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankedQueueItem {
    item: QueueItem,
    votes: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueueView {
    pub items: Vec<RankedQueueItem>,
    pub now_playing: Option<QueueItem>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResult {
    pub id: i32,
}

/// Helper trait to convert any type into a serialized version
pub trait ToSerialized<T>
where
    T: Serialize,
{
    fn to_serialized(&self) -> T;
}

impl<I, O> ToSerialized<Vec<O>> for Vec<I>
where
    I: ToSerialized<O>,
    O: Serialize,
{
    fn to_serialized(&self) -> Vec<O> {
        self.iter().map(|x| x.to_serialized()).collect()
    }
}

impl ToSerialized<User> for UserData {
    fn to_serialized(&self) -> User {
        User {
            id: self.id,
            email: self.email.clone(),
        }
    }
}

impl ToSerialized<LoginResult> for SessionData {
    fn to_serialized(&self) -> LoginResult {
        LoginResult {
            token: self.token.clone(),
            user: self.user.to_serialized(),
        }
    }
}

impl ToSerialized<QueueItem> for QueueItemData {
    fn to_serialized(&self) -> QueueItem {
        QueueItem {
            id: self.id,
            creator_id: self.user_id,
            video_id: self.video_id.clone(),
            url: self.url.clone(),
            title: self.title.clone(),
            small_thumbnail: self.small_thumbnail.clone(),
            big_thumbnail: self.big_thumbnail.clone(),
            kind: self.kind.clone(),
            played: self.played,
            played_at: self.played_at,
        }
    }
}

impl ToSerialized<RankedQueueItem> for CollabRankedItem {
    fn to_serialized(&self) -> RankedQueueItem {
        RankedQueueItem {
            item: self.item.to_serialized(),
            votes: self.votes,
        }
    }
}

impl ToSerialized<QueueItem> for NowPlayingData {
    fn to_serialized(&self) -> QueueItem {
        self.item.to_serialized()
    }
}
