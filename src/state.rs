use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    auth::repo::{PgUserStore, UserStore},
    config::AppConfig,
    emails::repo::{EmailStore, PgEmailStore},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub emails: Arc<dyn EmailStore>,
    pub users: Arc<dyn UserStore>,
}

impl AppState {
    pub fn from_pool(db: PgPool, config: Arc<AppConfig>) -> Self {
        Self::from_parts(
            config,
            Arc::new(PgEmailStore::new(db.clone())),
            Arc::new(PgUserStore::new(db)),
        )
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        emails: Arc<dyn EmailStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            config,
            emails,
            users,
        }
    }
}
