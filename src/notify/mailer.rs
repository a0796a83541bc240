use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, warn};

use crate::error::{CareTrackError, Result};

/// Outbound mail seam. Sweeps and routes talk to this trait so tests can
/// record sends instead of hitting a relay.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_html(&self, to: &str, subject: &str, html_body: &str) -> Result<()>;
}

/// Stands in when no SMTP relay is configured. Sends are dropped with a
/// debug log so sweeps still run end to end.
pub struct NoopMailer;

#[async_trait]
impl EmailSender for NoopMailer {
    async fn send_html(&self, to: &str, subject: &str, _html_body: &str) -> Result<()> {
        tracing::debug!(to, subject, "smtp not configured, dropping email");
        Ok(())
    }
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(
        host: &str,
        port: u16,
        user: Option<&str>,
        pass: Option<&str>,
        from: &str,
    ) -> Result<Self> {
        let from: Mailbox = from
            .parse()
            .map_err(|_| CareTrackError::Config(format!("invalid from address: {from}")))?;
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| CareTrackError::Config(e.to_string()))?
            .port(port);
        if let (Some(user), Some(pass)) = (user, pass) {
            builder = builder.credentials(Credentials::new(user.to_string(), pass.to_string()));
        }
        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    /// Boot-time connectivity probe. Failure is logged, never fatal; the
    /// next sweep tick retries naturally.
    pub async fn verify(&self) {
        match self.transport.test_connection().await {
            Ok(true) => info!("smtp relay reachable"),
            Ok(false) => warn!("smtp relay refused test connection"),
            Err(err) => warn!(error = %err, "smtp relay unreachable"),
        }
    }
}

#[async_trait]
impl EmailSender for SmtpMailer {
    async fn send_html(&self, to: &str, subject: &str, html_body: &str) -> Result<()> {
        let to: Mailbox = to
            .parse()
            .map_err(|_| CareTrackError::Validation(format!("invalid recipient: {to}")))?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| CareTrackError::Runtime(e.to_string()))?;
        self.transport
            .send(message)
            .await
            .map_err(|e| CareTrackError::ExternalService(e.to_string()))?;
        Ok(())
    }
}
