pub mod templates;

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

use crate::config::{SmtpConfig, TlsMode};
use crate::models::Submission;

/// Per-connection SMTP timeout.
const SMTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notifications are disabled")]
    Disabled,
    #[error("could not build notification: {0}")]
    Message(String),
    #[error("mail server rejected notification: {0}")]
    Rejected(String),
    #[error("mail transport failed: {0}")]
    Transport(String),
    #[error("notification timed out after {0:?}")]
    Timeout(Duration),
}

/// Best-effort delivery of a summary of one submission.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, submission: &Submission) -> Result<(), NotifyError>;
}

/// Emails each submission to a fixed recipient. Disabled when no credentials
/// were configured at startup.
pub struct SmtpNotifier {
    mailer: Option<Mailer>,
}

struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpNotifier {
    pub fn from_config(config: Option<&SmtpConfig>) -> Self {
        let Some(config) = config else {
            tracing::warn!(
                "Email notifications are disabled: set CONTACT_SMTP_USER and CONTACT_SMTP_PASS to enable them"
            );
            return Self::disabled();
        };

        match Mailer::new(config) {
            Ok(mailer) => {
                tracing::info!("SMTP configured for {}:{}", config.host, config.port);
                Self {
                    mailer: Some(mailer),
                }
            }
            Err(e) => {
                tracing::warn!("Email notifications are disabled: {e}");
                Self::disabled()
            }
        }
    }

    pub fn disabled() -> Self {
        Self { mailer: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.mailer.is_some()
    }

    /// Check the mail server once and log whether notifications will work.
    pub async fn verify(&self) {
        let Some(mailer) = &self.mailer else {
            return;
        };

        match mailer.transport.test_connection().await {
            Ok(true) => {
                tracing::info!("Email server {} is ready to send messages", mailer.host);
                tracing::info!("Notifications will be sent to: {}", mailer.to);
            }
            Ok(false) => {
                tracing::warn!("Email server {} refused the connection test", mailer.host);
            }
            Err(e) => {
                tracing::warn!("Email configuration error for {}: {e}", mailer.host);
                tracing::warn!("Check CONTACT_SMTP_HOST, CONTACT_SMTP_PORT, CONTACT_SMTP_TLS and the credentials");
            }
        }
    }
}

impl Mailer {
    fn new(config: &SmtpConfig) -> Result<Self, String> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| format!("Invalid from address '{}': {e}", config.from))?;
        let to: Mailbox = config
            .to
            .parse()
            .map_err(|e| format!("Invalid to address '{}': {e}", config.to))?;

        Ok(Self {
            transport: build_smtp_transport(config)?,
            host: config.host.clone(),
            from,
            to,
        })
    }

    fn build_message(&self, submission: &Submission) -> Result<Message, NotifyError> {
        let rendered = templates::render_notification(submission)
            .map_err(|e| NotifyError::Message(format!("Failed to render template: {e}")))?;

        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(rendered.subject);

        // The submitter's address is not validated, so only use it when it parses.
        if let Ok(reply_to) = submission.email.parse::<Mailbox>() {
            builder = builder.reply_to(reply_to);
        }

        builder
            .multipart(MultiPart::alternative_plain_html(rendered.text, rendered.html))
            .map_err(|e| NotifyError::Message(format!("Failed to build email: {e}")))
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, submission: &Submission) -> Result<(), NotifyError> {
        let mailer = self.mailer.as_ref().ok_or(NotifyError::Disabled)?;
        let message = mailer.build_message(submission)?;

        mailer.transport.send(message).await.map_err(|e| {
            if e.is_permanent() {
                NotifyError::Rejected(e.to_string())
            } else {
                NotifyError::Transport(e.to_string())
            }
        })?;

        Ok(())
    }
}

fn build_smtp_transport(config: &SmtpConfig) -> Result<AsyncSmtpTransport<Tokio1Executor>, String> {
    let creds = Credentials::new(config.user.clone(), config.pass.clone());

    let transport = match config.tls {
        TlsMode::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|e| format!("SMTP relay error: {e}"))?
            .port(config.port)
            .credentials(creds)
            .timeout(Some(SMTP_TIMEOUT))
            .build(),
        TlsMode::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            .port(config.port)
            .credentials(creds)
            .timeout(Some(SMTP_TIMEOUT))
            .build(),
        TlsMode::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| format!("SMTP starttls error: {e}"))?
            .port(config.port)
            .credentials(creds)
            .timeout(Some(SMTP_TIMEOUT))
            .build(),
    };

    Ok(transport)
}
