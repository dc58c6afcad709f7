use anyhow::Context;

use crate::config::AppConfig;
use crate::db::{self, PgProfileStore, ProfileStore};
use crate::storage::{Storage, StorageClient};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn ProfileStore>,
    pub storage: Arc<dyn StorageClient>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let pool = db::connect(&config.database_url).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        let store = Arc::new(PgProfileStore::new(pool)) as Arc<dyn ProfileStore>;

        // Real S3/MinIO
        let s3 = Arc::new(Storage::new(&config.s3).await?) as Arc<dyn StorageClient>;
        let storage = ready_storage(s3, &config.s3.bucket).await?;

        Ok(Self {
            config,
            store,
            storage,
        })
    }
}

/// Checks the bucket before serving, a missing bucket is a startup error.
async fn ready_storage(
    storage: Arc<dyn StorageClient>,
    bucket: &str,
) -> anyhow::Result<Arc<dyn StorageClient>> {
    storage
        .ensure_bucket()
        .await
        .with_context(|| format!("object storage bucket {} is not available", bucket))?;
    tracing::info!(bucket, "object storage ready");
    Ok(storage)
}
