use std::sync::Arc;
use thiserror::Error;

use crate::{
    Database, DatabaseError, InputError, NewQueueItem, NowPlayingData, PrimaryKey, QueueItemData,
    RankedQueueItem, VideoLink, YouTubeLookup,
};

/// The vote-ordered queue of a creator, along with the playback pointer.
///
/// All state lives in the database; this type only coordinates the
/// operations on top of it.
pub struct QueueManager<Db> {
    db: Arc<Db>,
    lookup: Option<YouTubeLookup>,
}

#[derive(Debug, Error)]
pub enum QueueError {
    /// The submitted url is not a recognized video link, or metadata
    /// resolution failed
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Db(#[from] DatabaseError),
}

/// A creator's unplayed queue as served to viewers
#[derive(Debug)]
pub struct QueueView {
    /// Unplayed items ordered by vote count descending, ties by
    /// submission order
    pub items: Vec<RankedQueueItem>,
    pub now_playing: Option<NowPlayingData>,
}

impl<Db> QueueManager<Db>
where
    Db: Database,
{
    pub fn new(db: &Arc<Db>, lookup: Option<YouTubeLookup>) -> Self {
        Self {
            db: db.clone(),
            lookup,
        }
    }

    /// Submits a link to a creator's queue.
    ///
    /// The url is validated and reduced to its video id before anything is
    /// persisted. When a metadata lookup is configured, a lookup failure
    /// fails the whole submission so no item exists without display data.
    pub async fn submit(&self, owner_id: PrimaryKey, url: &str) -> Result<QueueItemData, QueueError> {
        let link = VideoLink::parse(url)?;

        let metadata = match &self.lookup {
            Some(lookup) => Some(lookup.metadata(&link.id).await?),
            None => None,
        };

        let (title, small_thumbnail, big_thumbnail) = match metadata {
            Some(m) => (Some(m.title), m.small_thumbnail, m.big_thumbnail),
            None => (None, None, None),
        };

        let item = self
            .db
            .create_queue_item(NewQueueItem {
                user_id: owner_id,
                video_id: link.id,
                url: link.url,
                title,
                small_thumbnail,
                big_thumbnail,
            })
            .await?;

        Ok(item)
    }

    /// Records a voter's support for an item. Voting twice on the same item
    /// is a conflict.
    pub async fn vote(&self, voter_id: PrimaryKey, item_id: PrimaryKey) -> Result<(), QueueError> {
        self.db.create_vote(voter_id, item_id).await?;
        Ok(())
    }

    /// Retracts a voter's support for an item. This is not a negative vote,
    /// it only cancels a prior one; retracting without one is an error.
    pub async fn retract_vote(
        &self,
        voter_id: PrimaryKey,
        item_id: PrimaryKey,
    ) -> Result<(), QueueError> {
        self.db.delete_vote(voter_id, item_id).await?;
        Ok(())
    }

    /// Returns a creator's unplayed queue with live vote counts, plus the
    /// current now-playing pointer
    pub async fn list(&self, owner_id: PrimaryKey) -> Result<QueueView, QueueError> {
        // Missing creators are reported rather than served an empty queue
        let _ = self.db.user_by_id(owner_id).await?;

        let items = self.db.list_unplayed(owner_id).await?;
        let now_playing = self.db.now_playing(owner_id).await?;

        Ok(QueueView { items, now_playing })
    }

    /// Promotes the top-voted unplayed item to now playing, marking it
    /// played. Fails when the queue has no unplayed items left.
    pub async fn advance(&self, owner_id: PrimaryKey) -> Result<QueueItemData, QueueError> {
        let item = self.db.advance_queue(owner_id).await?;
        Ok(item)
    }
}
