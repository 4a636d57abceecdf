//! Workflow outcomes and best-effort notifications.
//!
//! A status change is committed before any email goes out; delivery failures
//! are logged and turned into warning notices instead of errors.

use tracing::warn;

use super::mailer::EmailService;
use super::template::TemplateVars;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{Notice, NoticeLevel};

/// Result of a workflow action together with the notices for the caller.
#[derive(Debug)]
pub struct Outcome<T> {
    pub value: T,
    pub notices: Vec<Notice>,
}

impl<T> Outcome<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            notices: Vec::new(),
        }
    }

    pub fn push(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(Notice {
            level,
            message: message.into(),
        });
    }

    pub fn warnings(&self) -> usize {
        self.notices
            .iter()
            .filter(|n| n.level == NoticeLevel::Warning)
            .count()
    }
}

/// Send one templated email; returns whether it was delivered.
pub async fn deliver<T>(
    email: &EmailService,
    outcome: &mut Outcome<T>,
    key: &str,
    to: &str,
    vars: &TemplateVars,
) -> bool {
    match email.send_templated_email(key, to, vars).await {
        Ok(()) => true,
        Err(e) => {
            warn!(template = key, to = to, "Email not sent: {}", e);
            outcome.push(
                NoticeLevel::Warning,
                format!("L'email à {} n'a pas pu être envoyé", to),
            );
            false
        }
    }
}

/// Administrator notification address: the configured one, else the
/// `email_admin` parameter.
pub async fn admin_address(db: &DbPool, configured: &str) -> AppResult<Option<String>> {
    let configured = configured.trim();
    if !configured.is_empty() {
        return Ok(Some(configured.to_string()));
    }
    db.get_parametre_string("email_admin").await
}

/// Display name of an administrator in emails.
pub fn admin_label(admin: &crate::entity::administrateur::Model) -> String {
    admin
        .nom
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(&admin.username)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_count() {
        let mut outcome = Outcome::new(());
        outcome.push(NoticeLevel::Success, "ok");
        outcome.push(NoticeLevel::Warning, "email");
        assert_eq!(outcome.warnings(), 1);
    }
}
