use async_trait::async_trait;
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};
use tracing::info;

use crate::config::{Config, MailSettings};
use crate::error::{Result, WatchError};
use crate::notify::{Digest, Notifier};

/// Sends digests over SMTP with implicit TLS (SMTPS, port 465 by default).
pub struct EmailNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Vec<Mailbox>,
}

impl EmailNotifier {
    pub fn new(config: &Config, mail: &MailSettings) -> Result<Self> {
        let from = parse_mailbox(&mail.from, "MAIL_FROM")?;
        let to = parse_recipients(&mail.to)?;

        let creds = Credentials::new(mail.smtp_user.clone(), mail.smtp_pass.clone());
        // relay() wraps the connection in TLS from the first byte, unlike starttls_relay()
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| WatchError::Config(format!("invalid SMTP host {}: {}", config.smtp_host, e)))?
            .port(config.smtp_port)
            .credentials(creds)
            .build();

        Ok(Self { mailer, from, to })
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, digest: &Digest) -> Result<()> {
        let msg = build_message(&self.from, &self.to, digest)?;

        self.mailer
            .send(msg)
            .await
            .map_err(|e| WatchError::Delivery(format!("SMTP send failed: {}", e)))?;

        info!("Sent \"{}\" to {} recipient(s)", digest.subject, self.to.len());
        Ok(())
    }
}

fn parse_mailbox(address: &str, var: &str) -> Result<Mailbox> {
    address
        .trim()
        .parse()
        .map_err(|e| WatchError::Config(format!("invalid {} address {:?}: {}", var, address, e)))
}

/// `MAIL_TO` may hold a comma separated list.
fn parse_recipients(addresses: &str) -> Result<Vec<Mailbox>> {
    let to = addresses
        .split(',')
        .filter(|a| !a.trim().is_empty())
        .map(|a| parse_mailbox(a, "MAIL_TO"))
        .collect::<Result<Vec<_>>>()?;

    if to.is_empty() {
        return Err(WatchError::Config("MAIL_TO has no recipients".to_string()));
    }
    Ok(to)
}

fn build_message(from: &Mailbox, to: &[Mailbox], digest: &Digest) -> Result<Message> {
    let mut builder = Message::builder()
        .from(from.clone())
        .subject(digest.subject.clone())
        .header(header::ContentType::TEXT_PLAIN);

    for recipient in to {
        builder = builder.to(recipient.clone());
    }

    builder
        .body(digest.body.clone())
        .map_err(|e| WatchError::Delivery(format!("failed to build email: {}", e)))
}
