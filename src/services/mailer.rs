// src/services/mailer.rs

//! Outbound email transport.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::error::Result;
use crate::models::Config;

/// A plain-text email addressed to one or more recipients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub recipients: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Delivers composed emails.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &Email) -> Result<()>;
}

/// SMTP submission over STARTTLS, one session per message.
#[derive(Clone)]
pub struct SmtpMailer {
    host: String,
    port: u16,
    sender: String,
    token: String,
}

impl SmtpMailer {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        sender: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            sender: sender.into(),
            token: token.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.smtp_host,
            config.smtp_port,
            &config.sender_email,
            &config.mail_api_token,
        )
    }

    /// Build the MIME message sent for an email.
    pub fn build_message(&self, email: &Email) -> Result<Message> {
        let from: Mailbox = self.sender.parse()?;
        let mut builder = Message::builder()
            .from(from)
            .subject(email.subject.as_str())
            .header(ContentType::TEXT_PLAIN);
        for recipient in &email.recipients {
            builder = builder.to(recipient.parse()?);
        }
        Ok(builder.body(email.body.clone())?)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &Email) -> Result<()> {
        let message = self.build_message(email)?;
        log::debug!("{}", String::from_utf8_lossy(&message.formatted()));

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)?
            .port(self.port)
            .credentials(Credentials::new(self.sender.clone(), self.token.clone()))
            .build();
        transport.send(message).await?;
        Ok(())
    }
}
