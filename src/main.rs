use std::sync::Arc;

mod admin;
mod app;
mod auth;
mod config;
mod csv;
mod db;
mod emails;
mod error;
mod form;
mod state;
mod validation;

#[cfg(test)]
mod testing;

use crate::{config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "email_manager=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = Arc::new(AppConfig::from_env()?);
    let pool = db::connect(&config).await?;
    db::migrate(&pool).await;

    let state = AppState::from_pool(pool, config.clone());

    if let Some(admin) = &config.admin {
        if let Some(user) = admin::services::bootstrap_admin(state.users.as_ref(), admin).await? {
            tracing::info!(user_id = %user.id, username = %user.username, "admin account created");
        }
    }

    app::serve(app::build_app(state)).await
}
