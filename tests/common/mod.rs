#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;

use contact_intake::config::{Config, CorsConfig, Environment, StoreConfig, DEV_ORIGINS};
use contact_intake::email::{NotifyError, Notifier, SmtpNotifier};
use contact_intake::models::Submission;
use contact_intake::store::{JsonFileStore, StoreError, SubmissionStore};
use contact_intake::submission::IngestionWorkflow;

/// A running server backed by a JSON file store in a temporary directory.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub store: Arc<dyn SubmissionStore>,
    pub dir: TempDir,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// POST a JSON body to the contact endpoint, return (body, status).
    pub async fn submit(&self, data: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/contact"))
            .json(data)
            .send()
            .await
            .expect("submit request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// GET the stored submissions, return (body, status).
    pub async fn list(&self) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url("/api/contact"))
            .send()
            .await
            .expect("list request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }
}

pub fn test_config(dir: &TempDir, environment: Environment) -> Config {
    Config {
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        environment,
        cors: CorsConfig {
            allowed_origins: DEV_ORIGINS
                .iter()
                .map(|s| s.to_string())
                .chain(std::iter::once("https://studio.example.com".to_string()))
                .collect(),
            allowed_suffixes: vec![".pages.dev".to_string()],
        },
        store: StoreConfig::File {
            path: dir.path().join("contact-submissions.json"),
        },
        max_body_size: 16 * 1024,
        notify_timeout: Duration::from_millis(500),
        log_level: "warn".to_string(),
        smtp: None,
    }
}

/// Spawn the app with a fresh file store and a disabled notifier.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(Arc::new(SmtpNotifier::disabled()), Environment::Development).await
}

pub async fn spawn_app_with(notifier: Arc<dyn Notifier>, environment: Environment) -> TestApp {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store: Arc<dyn SubmissionStore> = Arc::new(
        JsonFileStore::open(dir.path().join("contact-submissions.json"))
            .await
            .expect("Failed to open store"),
    );
    spawn_app_on(dir, store, notifier, environment).await
}

pub async fn spawn_app_on(
    dir: TempDir,
    store: Arc<dyn SubmissionStore>,
    notifier: Arc<dyn Notifier>,
    environment: Environment,
) -> TestApp {
    let config = test_config(&dir, environment);
    let workflow = IngestionWorkflow::start(store.clone(), notifier, config.notify_timeout)
        .await
        .expect("Failed to start workflow");

    let app = contact_intake::build_app(config, workflow);

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        addr,
        client: Client::new(),
        store,
        dir,
    }
}

pub fn ada() -> Value {
    json!({
        "name": "Ada",
        "email": "ada@x.com",
        "service": "Editing",
        "message": "Hi",
    })
}

// ── Test doubles ────────────────────────────────────────────────

/// Records every submission it is asked to deliver.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<Submission>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Submission> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, submission: &Submission) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(submission.clone());
        Ok(())
    }
}

/// Always fails as if the mail server dropped the connection.
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify(&self, _submission: &Submission) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("connection reset by peer".to_string()))
    }
}

/// Never finishes within any reasonable timeout.
pub struct HangingNotifier;

#[async_trait]
impl Notifier for HangingNotifier {
    async fn notify(&self, _submission: &Submission) -> Result<(), NotifyError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }
}

/// Wraps a real store and fails appends while `fail_writes` is set.
pub struct FlakyStore {
    pub inner: JsonFileStore,
    pub fail_writes: AtomicBool,
}

impl FlakyStore {
    pub async fn open(dir: &TempDir) -> Self {
        Self {
            inner: JsonFileStore::open(dir.path().join("contact-submissions.json"))
                .await
                .expect("Failed to open store"),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_writes.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl SubmissionStore for FlakyStore {
    fn backend(&self) -> &'static str {
        "flaky"
    }

    async fn append(&self, submission: &Submission) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Write("disk full".to_string()));
        }
        self.inner.append(submission).await
    }

    async fn list_all(&self) -> Result<Vec<Submission>, StoreError> {
        self.inner.list_all().await
    }
}
