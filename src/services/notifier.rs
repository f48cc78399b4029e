// src/services/notifier.rs

//! New-post notifications over SMTP.

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::error::{AppError, Result};
use crate::models::{Post, SmtpConfig};

/// Subject line of every notification.
pub const SUBJECT: &str = "New Posts Found";

/// Delivers a message announcing newly added posts.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Announce `added`. Only called with a non-empty set.
    async fn notify(&self, added: &BTreeSet<Post>) -> Result<()>;
}

/// Build the plain-text body: one `- {title} ({url})` line per post.
///
/// Iteration order of the set is (title, url), so the body is stable.
pub fn compose_body(added: &BTreeSet<Post>) -> String {
    added.iter().map(|post| post.line() + "\n").collect()
}

/// Notifier that submits mail through an authenticated STARTTLS relay.
#[derive(Debug, Clone)]
pub struct SmtpNotifier {
    config: SmtpConfig,
}

impl SmtpNotifier {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    /// Build the message for `added`.
    ///
    /// Fails with `AppError::Notify` when the sender or recipient is
    /// missing or malformed.
    pub fn build_message(&self, added: &BTreeSet<Post>) -> Result<Message> {
        let from = self
            .config
            .sender()
            .ok_or_else(|| AppError::notify("sender address is not configured"))?;
        let to = self
            .config
            .recipient
            .as_deref()
            .ok_or_else(|| AppError::notify("recipient address is not configured"))?;

        let from: Mailbox = from
            .parse()
            .map_err(|e| AppError::notify(format!("invalid sender '{from}': {e}")))?;
        let to: Mailbox = to
            .parse()
            .map_err(|e| AppError::notify(format!("invalid recipient '{to}': {e}")))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(SUBJECT)
            .header(ContentType::TEXT_PLAIN)
            .body(compose_body(added))
            .map_err(AppError::notify)
    }

    fn credentials(&self) -> Result<Credentials> {
        let username = self
            .config
            .username
            .clone()
            .ok_or_else(|| AppError::notify("SMTP username is not configured"))?;
        let password = self
            .config
            .password
            .clone()
            .ok_or_else(|| AppError::notify("SMTP password is not configured"))?;
        Ok(Credentials::new(username, password))
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let credentials = self.credentials()?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.server)
            .map_err(AppError::notify)?
            .port(self.config.port)
            .credentials(credentials)
            .timeout(Some(Duration::from_secs(self.config.timeout_secs)))
            .build();
        Ok(transport)
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, added: &BTreeSet<Post>) -> Result<()> {
        let message = self.build_message(added)?;
        let transport = self.transport()?;

        transport.send(message).await.map_err(AppError::notify)?;
        log::info!(
            "Email sent to {} ({} new posts)",
            self.config.recipient.as_deref().unwrap_or_default(),
            added.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn added() -> BTreeSet<Post> {
        [Post::new("Exam Y", "/y"), Post::new("Exam X", "/x")]
            .into_iter()
            .collect()
    }

    fn configured() -> SmtpConfig {
        SmtpConfig {
            username: Some("bot@example.com".into()),
            password: Some("secret".into()),
            recipient: Some("me@example.com".into()),
            ..SmtpConfig::default()
        }
    }

    #[test]
    fn test_compose_body_one_line_per_post() {
        let body = compose_body(&added());
        assert_eq!(body, "- Exam X (/x)\n- Exam Y (/y)\n");
        assert_eq!(body.lines().count(), 2);
    }

    #[test]
    fn test_build_message_headers() {
        let notifier = SmtpNotifier::new(configured());
        let message = notifier.build_message(&added()).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("Subject: New Posts Found"));
        assert!(raw.contains("From: bot@example.com"));
        assert!(raw.contains("To: me@example.com"));
        assert!(raw.contains("text/plain"));
        assert!(raw.contains("- Exam X (/x)"));
    }

    #[test]
    fn test_from_overrides_username_as_sender() {
        let notifier = SmtpNotifier::new(SmtpConfig {
            from: Some("noreply@example.com".into()),
            ..configured()
        });
        let raw = String::from_utf8(notifier.build_message(&added()).unwrap().formatted()).unwrap();
        assert!(raw.contains("From: noreply@example.com"));
    }

    #[test]
    fn test_missing_recipient_is_notify_error() {
        let notifier = SmtpNotifier::new(SmtpConfig {
            recipient: None,
            ..configured()
        });
        assert!(matches!(
            notifier.build_message(&added()),
            Err(AppError::Notify(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_password_is_notify_error() {
        let notifier = SmtpNotifier::new(SmtpConfig {
            password: None,
            ..configured()
        });
        let err = notifier.notify(&added()).await.unwrap_err();
        assert!(matches!(err, AppError::Notify(_)));
    }
}
