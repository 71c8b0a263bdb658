use crate::config::AppConfig;
use crate::products::{repo::ProductStore, services::ProductService};
use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub products: ProductService,
}

impl AppState {
    pub fn from_store(store: Arc<dyn ProductStore>) -> Self {
        Self {
            products: ProductService::new(store),
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::products::memory::InMemoryProductStore;
        Self::from_store(Arc::new(InMemoryProductStore::new()))
    }
}

pub async fn connect_db(config: &AppConfig) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .context("connect to database")
}
