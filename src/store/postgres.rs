use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;

use super::{StoreError, SubmissionStore};
use crate::models::Submission;

pub struct PgStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct SubmissionRow {
    id: i64,
    name: String,
    email: String,
    service: String,
    message: String,
    extras: Json<Map<String, Value>>,
    submitted_at: DateTime<Utc>,
}

impl From<SubmissionRow> for Submission {
    fn from(row: SubmissionRow) -> Self {
        Submission {
            name: row.name,
            email: row.email,
            service: row.service,
            message: row.message,
            extras: row.extras.0,
            timestamp: row.submitted_at,
            id: row.id,
        }
    }
}

impl PgStore {
    /// Connect and apply migrations. Safe to call against an initialised database.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Read(format!("connect: {e}")))?;

        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: PgPool) -> Result<Self, StoreError> {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Write(format!("migrate: {e}")))?;

        tracing::info!("Migrations applied");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl SubmissionStore for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn append(&self, submission: &Submission) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO contact_submissions (id, name, email, service, message, extras, submitted_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(submission.id)
        .bind(&submission.name)
        .bind(&submission.email)
        .bind(&submission.service)
        .bind(&submission.message)
        .bind(Json(&submission.extras))
        .bind(submission.timestamp)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Write(e.to_string()))?;

        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Submission>, StoreError> {
        let rows = sqlx::query_as::<_, SubmissionRow>(
            "SELECT id, name, email, service, message, extras, submitted_at
             FROM contact_submissions ORDER BY seq ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Read(e.to_string()))?;

        Ok(rows.into_iter().map(Submission::from).collect())
    }

    async fn last_id(&self) -> Result<Option<i64>, StoreError> {
        sqlx::query_scalar::<_, i64>("SELECT id FROM contact_submissions ORDER BY seq DESC LIMIT 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Read(e.to_string()))
    }
}
