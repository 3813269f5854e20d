use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::warn;

use crate::config::Config;

pub struct AppContext {
    pub config: Config,
    db: PgPool,
    running: AtomicBool,
}

impl AppContext {
    pub async fn new(config: &Config) -> Result<Self, sqlx::Error> {
        let options = PgPoolOptions::new().max_connections(config.max_pg_connections);
        let db = options.connect(&config.database_url).await?;
        Ok(Self::from_pool(config.clone(), db))
    }

    /// Wrap an existing pool; integration tests hand in the pool sqlx::test
    /// provisions.
    pub fn from_pool(config: Config, db: PgPool) -> Self {
        Self {
            config,
            db,
            running: AtomicBool::new(true),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.db
    }

    /// Cancellation is honored at chunk boundaries only; pipelines poll this
    /// between chunks and finish the in-flight one.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn spawn_shutdown_listener(self: Arc<Self>) {
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("shutdown signal received, finishing the current chunk");
                self.stop();
            }
        });
    }
}
