mod db;
mod error;
mod models;
mod routes;
mod services;
mod settings;
mod state;
mod store;

use anyhow::Context;
use db::Database;
use settings::Settings;
use state::AppState;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading settings")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .init();

    let db = Database::new(&settings.database_url)
        .await
        .context("connecting to database")?;
    db.run_migrations().await.context("running migrations")?;

    if let Some((username, password)) = settings.admin_credentials() {
        services::auth_service::ensure_admin(&db, username, password)
            .await
            .context("creating admin user")?;
    }

    let state = AppState::new(Arc::new(db));

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr)
        .await
        .with_context(|| format!("binding {}", settings.bind_addr))?;
    tracing::info!("Server listening on {}", settings.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
