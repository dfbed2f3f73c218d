use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::email::{NotifyError, Notifier};
use crate::models::{ContactInput, Submission};
use crate::store::{StoreError, SubmissionStore};

use super::ids::IdClock;

/// Accepts one submission: stamp it, store it, then try to notify.
///
/// Storage failures fail the request. Notification failures are logged and
/// never change the outcome, and a stored record is never rolled back.
pub struct IngestionWorkflow {
    store: Arc<dyn SubmissionStore>,
    notifier: Arc<dyn Notifier>,
    ids: IdClock,
    notify_timeout: Duration,
}

impl IngestionWorkflow {
    pub fn new(
        store: Arc<dyn SubmissionStore>,
        notifier: Arc<dyn Notifier>,
        notify_timeout: Duration,
    ) -> Self {
        Self {
            store,
            notifier,
            ids: IdClock::new(),
            notify_timeout,
        }
    }

    /// Like [`IngestionWorkflow::new`], but ids continue after the newest stored record.
    pub async fn start(
        store: Arc<dyn SubmissionStore>,
        notifier: Arc<dyn Notifier>,
        notify_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let ids = match store.last_id().await? {
            Some(last) => IdClock::starting_after(last),
            None => IdClock::new(),
        };

        Ok(Self {
            store,
            notifier,
            ids,
            notify_timeout,
        })
    }

    pub async fn submit(&self, input: ContactInput) -> Result<Submission, StoreError> {
        let submission = self.stamp(input, Utc::now());

        self.store.append(&submission).await.map_err(|e| match e {
            StoreError::Read(msg) => StoreError::Write(msg),
            other => other,
        })?;

        tracing::info!(
            id = submission.id,
            service = %submission.service,
            backend = self.store.backend(),
            "New submission saved"
        );

        match self.dispatch(&submission).await {
            Ok(()) => tracing::info!(id = submission.id, "Email notification sent"),
            Err(NotifyError::Disabled) => {
                tracing::debug!(id = submission.id, "Email notification skipped, notifier disabled")
            }
            Err(e) => tracing::warn!(id = submission.id, "Email notification failed: {e}"),
        }

        Ok(submission)
    }

    pub async fn list_all(&self) -> Result<Vec<Submission>, StoreError> {
        self.store.list_all().await
    }

    fn stamp(&self, input: ContactInput, now: DateTime<Utc>) -> Submission {
        let id = self.ids.next_id(now);
        // Stored and serialized at millisecond precision.
        let timestamp = DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now);
        Submission::from_input(input, id, timestamp)
    }

    async fn dispatch(&self, submission: &Submission) -> Result<(), NotifyError> {
        tokio::time::timeout(self.notify_timeout, self.notifier.notify(submission))
            .await
            .map_err(|_| NotifyError::Timeout(self.notify_timeout))?
    }
}
