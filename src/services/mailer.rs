//! Outgoing email.
//!
//! [`Mailer`] is the transport seam: SMTP in production, a logging no-op when
//! SMTP is not configured, and an in-memory recorder for tests.
//! [`EmailService`] renders the stored templates and hands the result to the
//! configured transport.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::ExposeSecret;
use tracing::{info, warn};

use super::template::{self, TemplateVars};
use crate::config::SmtpConfig;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};

/// A fully rendered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
    /// Overrides the configured sender.
    pub from: Option<String>,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_email(&self, email: OutgoingEmail) -> AppResult<()>;
}

/// SMTP delivery through lettre.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> AppResult<Self> {
        let address = config
            .from_address
            .parse()
            .map_err(|e| AppError::Email(format!("Invalid sender address: {}", e)))?;
        let from = Mailbox::new(Some(config.from_name.clone()), address);

        // Local relays (mail catchers) speak plain SMTP.
        let mut builder = if matches!(config.host.as_str(), "localhost" | "127.0.0.1") {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| AppError::Email(format!("Invalid SMTP relay: {}", e)))?
        }
        .port(config.port);

        if let (Some(user), Some(password)) = (&config.user, &config.password) {
            builder = builder.credentials(Credentials::new(
                user.clone(),
                password.expose_secret().to_string(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_email(&self, email: OutgoingEmail) -> AppResult<()> {
        let from = match &email.from {
            Some(from) => from
                .parse()
                .map_err(|e| AppError::Email(format!("Invalid sender address: {}", e)))?,
            None => self.from.clone(),
        };
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|e| AppError::Email(format!("Invalid recipient {}: {}", email.to, e)))?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(email.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(email.html)
            .map_err(|e| AppError::Email(format!("Failed to build message: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::Email(format!("SMTP delivery to {} failed: {}", email.to, e)))?;

        info!(to = %email.to, subject = %email.subject, "Email sent");
        Ok(())
    }
}

/// Used when SMTP is not configured: messages are logged and dropped.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_email(&self, email: OutgoingEmail) -> AppResult<()> {
        info!(to = %email.to, subject = %email.subject, "SMTP disabled, email not sent");
        Ok(())
    }
}

/// Keeps every message in memory.
#[derive(Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<OutgoingEmail>>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn sent_to(&self, address: &str) -> Vec<OutgoingEmail> {
        self.sent()
            .into_iter()
            .filter(|m| m.to.eq_ignore_ascii_case(address))
            .collect()
    }

    pub fn clear(&self) {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_email(&self, email: OutgoingEmail) -> AppResult<()> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(email);
        Ok(())
    }
}

/// Build the transport for the configuration.
pub fn mailer_from_config(smtp: Option<&SmtpConfig>) -> AppResult<Arc<dyn Mailer>> {
    match smtp {
        Some(config) => {
            info!("SMTP delivery via {}:{}", config.host, config.port);
            Ok(Arc::new(SmtpMailer::new(config)?))
        }
        None => {
            warn!("SMTP_HOST not set, outgoing email is disabled");
            Ok(Arc::new(LogMailer))
        }
    }
}

/// Template-aware email sending.
#[derive(Clone)]
pub struct EmailService {
    db: DbPool,
    mailer: Arc<dyn Mailer>,
}

impl std::fmt::Debug for EmailService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailService").finish_non_exhaustive()
    }
}

impl EmailService {
    pub fn new(db: DbPool, mailer: Arc<dyn Mailer>) -> Self {
        Self { db, mailer }
    }

    pub async fn send_email(&self, to: &str, subject: &str, html: &str) -> AppResult<()> {
        self.mailer
            .send_email(OutgoingEmail {
                to: to.to_string(),
                subject: subject.to_string(),
                html: html.to_string(),
                from: None,
            })
            .await
    }

    /// Render the active template `key` with `vars` and send it to `to`.
    pub async fn send_templated_email(
        &self,
        key: &str,
        to: &str,
        vars: &TemplateVars,
    ) -> AppResult<()> {
        let template = self
            .db
            .get_active_email_template(key)
            .await?
            .ok_or_else(|| AppError::Email(format!("Template {} introuvable ou inactif", key)))?;

        let subject = template::render(&template.sujet, vars);
        let html = template::render(&template.corps_html, vars);
        self.send_email(to, &subject, &html).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(to: &str) -> OutgoingEmail {
        OutgoingEmail {
            to: to.to_string(),
            subject: "Sujet".into(),
            html: "<p>corps</p>".into(),
            from: None,
        }
    }

    #[actix_rt::test]
    async fn test_recording_mailer_keeps_messages() {
        let mailer = RecordingMailer::new();
        mailer.send_email(message("a@example.com")).await.unwrap();
        mailer.send_email(message("B@example.com")).await.unwrap();

        assert_eq!(mailer.sent().len(), 2);
        assert_eq!(mailer.sent_to("b@example.com").len(), 1);
        mailer.clear();
        assert!(mailer.sent().is_empty());
    }

    #[test]
    fn test_smtp_mailer_rejects_bad_sender() {
        let config = SmtpConfig {
            host: "localhost".into(),
            port: 1025,
            from_address: "not an address".into(),
            from_name: "Gestion".into(),
            user: None,
            password: None,
        };
        assert!(matches!(SmtpMailer::new(&config), Err(AppError::Email(_))));
    }
}
