use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::time::Duration;

pub mod queries;

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        // In-memory databases exist per connection, so they get a single one
        let in_memory = database_url.contains(":memory:");

        // Create the database file on first start
        let connection_url = if database_url.starts_with("sqlite:")
            && !in_memory
            && !database_url.contains('?')
        {
            format!("{}?mode=rwc", database_url)
        } else {
            database_url.to_string()
        };

        tracing::info!("Connecting with URL: {}", connection_url);

        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { 5 })
            .acquire_timeout(Duration::from_secs(3))
            .connect(&connection_url)
            .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}
