use async_trait::async_trait;
use tracing::info;

use crate::errors::AppError;

/// Outbound account mail. Carried in `AppState` as `Arc<dyn Mailer>`.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_password_reset(&self, email: &str, reset_url: &str) -> Result<(), AppError>;
}

/// Writes outgoing mail to the log instead of delivering it.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_password_reset(&self, email: &str, reset_url: &str) -> Result<(), AppError> {
        info!(to = email, "Password reset requested: {reset_url}");
        Ok(())
    }
}
