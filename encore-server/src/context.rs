use std::sync::Arc;

use encore_collab::{Collab, PgDatabase};

#[derive(Clone)]
pub struct ServerContext {
    pub collab: Arc<Collab<PgDatabase>>,
}
