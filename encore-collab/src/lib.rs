mod auth;
mod db;
mod input;
mod queue;
mod util;

use std::sync::Arc;

pub use auth::*;
pub use db::*;
pub use input::*;
pub use queue::*;

/// The encore collab system, facilitating identity resolution and the
/// vote-ordered stream queue.
pub struct Collab<Db> {
    pub auth: Identity<Db>,
    pub queues: QueueManager<Db>,
}

impl<Db> Collab<Db>
where
    Db: Database,
{
    pub fn new(database: Db, lookup: Option<YouTubeLookup>) -> Self {
        let database = Arc::new(database);

        Self {
            auth: Identity::new(&database),
            queues: QueueManager::new(&database, lookup),
        }
    }
}
