use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::{StoreError, SubmissionStore};
use crate::models::Submission;

/// Stores every submission in one pretty-printed JSON array.
///
/// Appends rewrite the whole file. The rewrite goes to a sibling temp file
/// that is synced and renamed over the data file, and a mutex serializes the
/// read-modify-write so concurrent requests cannot drop each other's records.
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Write(format!("create {}: {e}", parent.display())))?;
        }

        let store = Self {
            path,
            write_lock: Mutex::new(()),
        };

        match fs::metadata(&store.path).await {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                store.write_all(&[]).await?;
                tracing::info!("Created empty submissions file at {}", store.path.display());
            }
            Err(e) => {
                return Err(StoreError::Read(format!("{}: {e}", store.path.display())));
            }
        }

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Vec<Submission>, StoreError> {
        let bytes = fs::read(&self.path)
            .await
            .map_err(|e| StoreError::Read(format!("{}: {e}", self.path.display())))?;

        serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::Read(format!("{}: {e}", self.path.display())))
    }

    async fn write_all(&self, submissions: &[Submission]) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(submissions)
            .map_err(|e| StoreError::Write(format!("serialize: {e}")))?;

        let tmp = self.tmp_path();
        let write_err = |e: std::io::Error| StoreError::Write(format!("{}: {e}", tmp.display()));

        let mut file = fs::File::create(&tmp).await.map_err(write_err)?;
        file.write_all(&json).await.map_err(write_err)?;
        file.sync_all().await.map_err(write_err)?;
        drop(file);

        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::Write(format!("{}: {e}", self.path.display())))
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SubmissionStore for JsonFileStore {
    fn backend(&self) -> &'static str {
        "file"
    }

    async fn append(&self, submission: &Submission) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut submissions = self.read_all().await.map_err(|e| match e {
            StoreError::Read(msg) => StoreError::Write(format!("existing collection unreadable: {msg}")),
            other => other,
        })?;
        submissions.push(submission.clone());

        self.write_all(&submissions).await
    }

    async fn list_all(&self) -> Result<Vec<Submission>, StoreError> {
        // Readers wait out an in-flight rewrite.
        let _guard = self.write_lock.lock().await;
        self.read_all().await
    }
}
