// db/db.rs
use sqlx::{Pool, Postgres};

use super::{jobdb::JobExt, servicedb::ServiceExt, statsdb::StatsExt, userdb::UserExt};

#[derive(Clone)]
pub struct DBClient {
    pub pool: Pool<Postgres>,
}

impl std::fmt::Debug for DBClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DBClient")
            .field("pool", &"Pool<Postgres>")
            .finish()
    }
}

impl DBClient {
    pub fn new(pool: Pool<Postgres>) -> Self {
        DBClient { pool }
    }
}

/// Everything the services need from persistence. `DBClient` is the
/// production implementation.
pub trait MarketStore: UserExt + JobExt + ServiceExt + StatsExt + std::fmt::Debug + Send + Sync {}

impl<T> MarketStore for T where T: UserExt + JobExt + ServiceExt + StatsExt + std::fmt::Debug + Send + Sync {}
