use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

mod app;
mod config;
mod error;
mod products;
mod response;
mod state;

use crate::{config::AppConfig, products::repo::PgProductStore, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let db = state::connect_db(&config).await?;

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .context("run migrations")?;

    let app_state = AppState::from_store(Arc::new(PgProductStore::new(db)));
    let app = app::build_app(app_state);
    app::serve(app, &config).await
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("inventory=debug,tower_http=info"));
    let fmt = tracing_subscriber::fmt().with_env_filter(filter);
    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => fmt.json().with_current_span(true).init(),
        _ => fmt.init(),
    }
}
