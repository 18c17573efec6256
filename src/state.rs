use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::auth::repo::{PgUserRepo, UserRepo};
use crate::config::AppConfig;
use crate::entries::repo::{EntryRepo, PgEntryRepo};
use crate::storage::{DiskStorage, StorageClient};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepo>,
    pub entries: Arc<dyn EntryRepo>,
    pub storage: Arc<dyn StorageClient>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
            tracing::warn!(error = %e, "migration failed; continuing");
        }

        let storage = DiskStorage::new(&config.upload_dir).await?;
        tracing::info!(dir = %storage.root().display(), "upload storage ready");

        Ok(Self::from_parts(
            Arc::new(PgUserRepo::new(db.clone())),
            Arc::new(PgEntryRepo::new(db)),
            Arc::new(storage),
            config,
        ))
    }

    pub fn from_parts(
        users: Arc<dyn UserRepo>,
        entries: Arc<dyn EntryRepo>,
        storage: Arc<dyn StorageClient>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            users,
            entries,
            storage,
            config,
        }
    }
}
