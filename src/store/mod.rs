pub mod json_file;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::StoreConfig;
use crate::models::Submission;

pub use json_file::JsonFileStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write submissions: {0}")]
    Write(String),
    #[error("failed to read submissions: {0}")]
    Read(String),
}

/// Durable, ordered, append-only collection of submissions.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Short backend name used in logs.
    fn backend(&self) -> &'static str;

    /// Append one record. Once this returns `Ok`, the record survives a restart.
    async fn append(&self, submission: &Submission) -> Result<(), StoreError>;

    /// Every stored record, oldest first.
    async fn list_all(&self) -> Result<Vec<Submission>, StoreError>;

    async fn last_id(&self) -> Result<Option<i64>, StoreError> {
        Ok(self.list_all().await?.last().map(|s| s.id))
    }
}

/// Open the backend selected by configuration, creating an empty collection if needed.
pub async fn open(config: &StoreConfig) -> Result<Arc<dyn SubmissionStore>, StoreError> {
    match config {
        StoreConfig::File { path } => {
            let store = JsonFileStore::open(path).await?;
            tracing::info!("Submissions will be saved to: {}", store.path().display());
            Ok(Arc::new(store))
        }
        StoreConfig::Postgres { database_url } => {
            let store = PgStore::connect(database_url).await?;
            tracing::info!("Submissions will be saved to PostgreSQL");
            Ok(Arc::new(store))
        }
    }
}
