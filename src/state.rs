use sqlx::SqlitePool;

use crate::services::fixer_api::FixerApi;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub fixer_api: FixerApi,
}

impl AppState {
    pub fn new(pool: SqlitePool, fixer_api: FixerApi) -> Self {
        Self { pool, fixer_api }
    }
}
