//! SMTP submission over STARTTLS.

use anyhow::{Context, Result};
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Deserialize;
use tracing::info;

use crate::report::Report;

/// Mail submission settings; deserialized from `config.json` in local runs.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailSettings {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub sender_email: String,
    pub sender_password: String,
    pub recipient_email: String,
}

/// Outbound mail transport. Built once per run; the relay is only contacted
/// when a report is actually submitted.
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
    recipient: Mailbox,
}

impl Mailer {
    pub fn new(settings: &EmailSettings) -> Result<Self> {
        let sender: Mailbox = settings
            .sender_email
            .parse()
            .context("parsing sender address")?;
        let recipient: Mailbox = settings
            .recipient_email
            .parse()
            .context("parsing recipient address")?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp_server)
            .context("building smtp transport")?
            .port(settings.smtp_port)
            .credentials(Credentials::new(
                settings.sender_email.clone(),
                settings.sender_password.clone(),
            ))
            .build();
        Ok(Self {
            transport,
            sender,
            recipient,
        })
    }

    pub async fn send(&self, report: &Report) -> Result<()> {
        let message = Message::builder()
            .from(self.sender.clone())
            .to(self.recipient.clone())
            .subject(report.subject.clone())
            .multipart(MultiPart::mixed().singlepart(SinglePart::plain(report.body.clone())))
            .context("building notification message")?;

        self.transport
            .send(message)
            .await
            .context("submitting notification mail")?;
        info!(high_value = report.high_value_total, "notification mail sent");
        Ok(())
    }
}
