//! Email delivery of run reports over SMTP.

use async_trait::async_trait;
use calsweep_core::config::SmtpConfig;
use calsweep_core::error::{SweepError, SweepResult};
use calsweep_core::provider::Notifier;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// Sends reports through an SMTP relay using STARTTLS.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    pub fn new(config: &SmtpConfig) -> SweepResult<Self> {
        let from: Mailbox = config.from.parse().map_err(|e| {
            SweepError::Config(format!("Invalid smtp.from address '{}': {e}", config.from))
        })?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| SweepError::Config(format!("Invalid SMTP host '{}': {e}", config.host)))?
            .port(config.port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(SmtpNotifier {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> SweepResult<()> {
        let message = build_message(&self.from, recipient, subject, body)?;

        tracing::debug!(recipient, subject, "sending report email");
        self.transport
            .send(message)
            .await
            .map_err(|e| SweepError::Notify(e.to_string()))?;

        Ok(())
    }
}

fn build_message(from: &Mailbox, recipient: &str, subject: &str, body: &str) -> SweepResult<Message> {
    let to: Mailbox = recipient
        .parse()
        .map_err(|e| SweepError::Notify(format!("Invalid recipient '{recipient}': {e}")))?;

    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body.to_string())
        .map_err(|e| SweepError::Notify(e.to_string()))
}
