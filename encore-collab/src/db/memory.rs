//! An in-memory [Database] used to test queue semantics without postgres.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use super::{
    Database, DatabaseError, NewQueueItem, NewSession, NowPlayingData, PrimaryKey, QueueItemData,
    RankedQueueItem, Result, SessionData, UserData,
};

#[derive(Default)]
struct State {
    users: Vec<UserData>,
    sessions: Vec<(PrimaryKey, String, chrono::DateTime<Utc>, PrimaryKey)>,
    items: Vec<QueueItemData>,
    votes: Vec<(PrimaryKey, PrimaryKey, PrimaryKey)>,
    now_playing: Vec<(PrimaryKey, PrimaryKey)>,
    next_id: PrimaryKey,
}

#[derive(Default)]
pub struct MemoryDatabase {
    state: Mutex<State>,
}

impl State {
    fn next_id(&mut self) -> PrimaryKey {
        self.next_id += 1;
        self.next_id
    }

    fn votes_for(&self, item_id: PrimaryKey) -> i64 {
        self.votes.iter().filter(|(_, _, i)| *i == item_id).count() as i64
    }

    fn ranked_unplayed(&self, owner_id: PrimaryKey) -> Vec<RankedQueueItem> {
        let mut ranked: Vec<_> = self
            .items
            .iter()
            .filter(|i| i.user_id == owner_id && !i.played)
            .map(|i| RankedQueueItem {
                item: i.clone(),
                votes: self.votes_for(i.id),
            })
            .collect();

        ranked.sort_by(|a, b| b.votes.cmp(&a.votes).then(a.item.id.cmp(&b.item.id)));
        ranked
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn user_by_id(&self, user_id: PrimaryKey) -> Result<UserData> {
        self.state
            .lock()
            .users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or(DatabaseError::NotFound {
                resource: "user",
                identifier: "id",
            })
    }

    async fn user_by_email(&self, email: &str) -> Result<UserData> {
        self.state
            .lock()
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(DatabaseError::NotFound {
                resource: "user",
                identifier: "email",
            })
    }

    async fn upsert_user_by_email(&self, email: &str) -> Result<UserData> {
        let mut state = self.state.lock();

        if let Some(user) = state.users.iter().find(|u| u.email == email) {
            return Ok(user.clone());
        }

        let user = UserData {
            id: state.next_id(),
            email: email.to_string(),
        };

        state.users.push(user.clone());
        Ok(user)
    }

    async fn session_by_token(&self, token: &str) -> Result<SessionData> {
        let state = self.state.lock();

        let (id, token, expires_at, user_id) = state
            .sessions
            .iter()
            .find(|(_, t, _, _)| t.as_str() == token)
            .cloned()
            .ok_or(DatabaseError::NotFound {
                resource: "session",
                identifier: "token",
            })?;

        let user = state
            .users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or(DatabaseError::NotFound {
                resource: "user",
                identifier: "id",
            })?;

        Ok(SessionData {
            id,
            token,
            expires_at,
            user,
        })
    }

    async fn create_session(&self, new_session: NewSession) -> Result<SessionData> {
        {
            let mut state = self.state.lock();
            let id = state.next_id();

            state.sessions.push((
                id,
                new_session.token.clone(),
                new_session.expires_at,
                new_session.user_id,
            ));
        }

        self.session_by_token(&new_session.token).await
    }

    async fn delete_session_by_token(&self, token: &str) -> Result<()> {
        let mut state = self.state.lock();
        let before = state.sessions.len();

        state.sessions.retain(|(_, t, _, _)| t.as_str() != token);

        if state.sessions.len() == before {
            return Err(DatabaseError::NotFound {
                resource: "session",
                identifier: "token",
            });
        }

        Ok(())
    }

    async fn clear_expired_sessions(&self) -> Result<()> {
        let now = Utc::now();
        self.state
            .lock()
            .sessions
            .retain(|(_, _, expires_at, _)| *expires_at > now);

        Ok(())
    }

    async fn queue_item_by_id(&self, item_id: PrimaryKey) -> Result<QueueItemData> {
        self.state
            .lock()
            .items
            .iter()
            .find(|i| i.id == item_id)
            .cloned()
            .ok_or(DatabaseError::NotFound {
                resource: "queue item",
                identifier: "id",
            })
    }

    async fn create_queue_item(&self, new_item: NewQueueItem) -> Result<QueueItemData> {
        let _ = self.user_by_id(new_item.user_id).await?;

        let mut state = self.state.lock();

        let item = QueueItemData {
            id: state.next_id(),
            user_id: new_item.user_id,
            video_id: new_item.video_id,
            url: new_item.url,
            title: new_item.title,
            small_thumbnail: new_item.small_thumbnail,
            big_thumbnail: new_item.big_thumbnail,
            kind: "video".to_string(),
            played: false,
            played_at: None,
        };

        state.items.push(item.clone());
        Ok(item)
    }

    async fn list_unplayed(&self, owner_id: PrimaryKey) -> Result<Vec<RankedQueueItem>> {
        Ok(self.state.lock().ranked_unplayed(owner_id))
    }

    async fn create_vote(&self, voter_id: PrimaryKey, item_id: PrimaryKey) -> Result<()> {
        let mut state = self.state.lock();

        if !state.items.iter().any(|i| i.id == item_id) {
            return Err(DatabaseError::NotFound {
                resource: "queue item",
                identifier: "id",
            });
        }

        if state
            .votes
            .iter()
            .any(|(_, v, i)| *v == voter_id && *i == item_id)
        {
            return Err(DatabaseError::Conflict {
                resource: "vote",
                field: "voter:item",
                value: format!("{voter_id}:{item_id}"),
            });
        }

        let id = state.next_id();
        state.votes.push((id, voter_id, item_id));

        Ok(())
    }

    async fn delete_vote(&self, voter_id: PrimaryKey, item_id: PrimaryKey) -> Result<()> {
        let mut state = self.state.lock();
        let before = state.votes.len();

        state
            .votes
            .retain(|(_, v, i)| !(*v == voter_id && *i == item_id));

        if state.votes.len() == before {
            return Err(DatabaseError::NotFound {
                resource: "vote",
                identifier: "voter:item",
            });
        }

        Ok(())
    }

    async fn vote_count(&self, item_id: PrimaryKey) -> Result<i64> {
        Ok(self.state.lock().votes_for(item_id))
    }

    async fn now_playing(&self, owner_id: PrimaryKey) -> Result<Option<NowPlayingData>> {
        let state = self.state.lock();

        let item = state
            .now_playing
            .iter()
            .find(|(owner, _)| *owner == owner_id)
            .and_then(|(_, item_id)| state.items.iter().find(|i| i.id == *item_id))
            .cloned();

        Ok(item.map(|item| NowPlayingData {
            user_id: owner_id,
            item,
        }))
    }

    async fn advance_queue(&self, owner_id: PrimaryKey) -> Result<QueueItemData> {
        // A single lock covers selection, marking, and repointing, mirroring
        // the transaction boundary of the postgres implementation.
        let mut state = self.state.lock();

        let selected = state
            .ranked_unplayed(owner_id)
            .into_iter()
            .next()
            .ok_or(DatabaseError::NotFound {
                resource: "queue item",
                identifier: "unplayed",
            })?;

        let item = state
            .items
            .iter_mut()
            .find(|i| i.id == selected.item.id)
            .ok_or(DatabaseError::NotFound {
                resource: "queue item",
                identifier: "id",
            })?;

        item.played = true;
        item.played_at = Some(Utc::now());
        let item = item.clone();

        state.now_playing.retain(|(owner, _)| *owner != owner_id);
        state.now_playing.push((owner_id, item.id));

        Ok(item)
    }
}
