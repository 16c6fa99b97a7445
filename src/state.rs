use std::sync::Arc;

use crate::db::{DbPool, OrmConn, orm_from_pool};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub auth: Arc<AuthSettings>,
}

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

impl AppState {
    pub fn new(pool: DbPool, auth: AuthSettings) -> Self {
        let orm = orm_from_pool(pool.clone());
        Self {
            pool,
            orm,
            auth: Arc::new(auth),
        }
    }
}
