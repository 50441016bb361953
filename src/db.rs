use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tokio::sync::OnceCell;
use tracing::info;

/// Process-wide database handle, owned by [`crate::state::AppState`] and shared
/// by the Postgres stores.
///
/// The pool is created on first use. Concurrent first callers wait on the same
/// connect attempt; a failed attempt leaves the cell empty so the next caller
/// retries.
pub struct Database {
    url: String,
    max_connections: u32,
    pool: OnceCell<PgPool>,
}

impl Database {
    pub fn new(url: impl Into<String>, max_connections: u32) -> Self {
        Self {
            url: url.into(),
            max_connections,
            pool: OnceCell::new(),
        }
    }

    pub async fn pool(&self) -> anyhow::Result<&PgPool> {
        self.pool
            .get_or_try_init(|| async {
                let pool = PgPoolOptions::new()
                    .max_connections(self.max_connections)
                    .connect(&self.url)
                    .await
                    .context("connect to database")?;
                info!(max_connections = self.max_connections, "connected to database");
                Ok::<_, anyhow::Error>(pool)
            })
            .await
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        let pool = self.pool().await?;
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .context("run migrations")?;
        Ok(())
    }
}
