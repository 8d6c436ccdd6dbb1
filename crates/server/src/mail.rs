// Outgoing email seam
// Decision: Delivery is an external collaborator; the server only composes
// messages and hands them to an injected Mailer
// Decision: Mail failures are logged and never fail the request that triggered them

use anyhow::Result;
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<()>;
}

/// Mailer that only records the send in the log; bodies carry one-time
/// tokens and are never logged
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: EmailMessage) -> Result<()> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            "Email handed to log mailer"
        );
        Ok(())
    }
}

pub fn verification_email(frontend_url: &str, to: &str, name: &str, token: &str) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: "Confirm your Taskvilla email".to_string(),
        body: format!(
            "Hi {name},\n\nConfirm your email address by opening the link below:\n\n\
             {frontend_url}/verify-email?token={token}\n\nThe link is valid for 24 hours."
        ),
    }
}

pub fn password_reset_email(frontend_url: &str, to: &str, name: &str, token: &str) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: "Reset your Taskvilla password".to_string(),
        body: format!(
            "Hi {name},\n\nSomeone asked to reset the password for this account. \
             If it was you, open the link below:\n\n\
             {frontend_url}/reset-password?token={token}\n\n\
             The link is valid for 1 hour. If you did not ask for this, ignore this email."
        ),
    }
}
