use async_trait::async_trait;
use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::{
    config::SmtpConfig,
    error::{AppError, Result},
};

/// A fully composed outbound email. Rendering is the caller's business;
/// this layer only knows how to deliver.
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub subject: String,
    pub body: String,
}

impl OutgoingEmail {
    pub fn order_created(ordered: &str, amount: i64, currency: &str, payment_url: &str) -> Self {
        Self {
            subject: format!("Your order: {}", ordered),
            body: format!(
                "We have created your order for {} ({} {}).\n\nComplete the payment here: {}\n",
                ordered, amount, currency, payment_url
            ),
        }
    }

    pub fn order_completed(ordered: &str, amount: i64, currency: &str) -> Self {
        Self {
            subject: format!("Payment received: {}", ordered),
            body: format!(
                "Your payment of {} {} for {} went through. Access has been granted.\n",
                amount, currency, ordered
            ),
        }
    }

    pub fn enrollment(subject: &str, body: &str) -> Self {
        Self {
            subject: subject.to_string(),
            body: body.to_string(),
        }
    }
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, email: &OutgoingEmail, to: &str) -> Result<()>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    /// Returns `None` when SMTP is disabled or not fully configured; the
    /// caller falls back to the noop sender.
    pub fn from_config(config: &SmtpConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }

        let (host, username, password, from) = match (
            config.host.as_ref(),
            config.username.as_ref(),
            config.password.as_ref(),
            config.from.as_ref(),
        ) {
            (Some(h), Some(u), Some(p), Some(f)) => (h, u, p, f),
            _ => {
                tracing::warn!("SMTP enabled but missing configuration");
                return None;
            }
        };

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .ok()?
            .credentials(Credentials::new(username.clone(), password.clone()))
            .build();

        Some(Self {
            transport,
            from: from.clone(),
        })
    }
}

#[async_trait]
impl EmailSender for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail, to: &str) -> Result<()> {
        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| AppError::Internal(format!("bad from address: {}", e)))?,
            )
            .to(to
                .parse()
                .map_err(|e| AppError::Internal(format!("bad recipient address: {}", e)))?)
            .subject(&email.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone())
            .map_err(|e| AppError::Internal(format!("could not build email: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::Internal(format!("could not send email: {}", e)))?;

        Ok(())
    }
}

/// Logs instead of sending. Used in dev and tests where no SMTP relay is
/// configured.
pub struct NoopMailer;

#[async_trait]
impl EmailSender for NoopMailer {
    async fn send(&self, email: &OutgoingEmail, to: &str) -> Result<()> {
        tracing::info!(to = %to, subject = %email.subject, "email delivery skipped (no SMTP configured)");
        Ok(())
    }
}
