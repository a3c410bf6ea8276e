use async_trait::async_trait;
use tracing::info;

use crate::domain::error::DomainError;
use crate::domain::user::User;

pub const WELCOME_SUBJECT: &str = "Регистрация на Yatube";
pub const WELCOME_BODY: &str = "Поздравляем с успешной регистрацией на Yatube!";
pub const WELCOME_FROM: &str = "noreply@yatube.com";

/// Sends the sign-up greeting. Delivery itself belongs to the mail provider.
#[async_trait]
pub trait WelcomeMailer: Send + Sync {
    async fn send_welcome(&self, user: &User) -> Result<(), DomainError>;
}

/// Writes outgoing mail to the log instead of an SMTP server.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl WelcomeMailer for LogMailer {
    async fn send_welcome(&self, user: &User) -> Result<(), DomainError> {
        info!(
            from = WELCOME_FROM,
            to = %user.email,
            subject = WELCOME_SUBJECT,
            body = WELCOME_BODY,
            "welcome mail sent"
        );
        Ok(())
    }
}
