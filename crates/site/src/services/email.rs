//! Inquiry notification email.
//!
//! Uses SMTP via lettre for delivery with Askama templates. The notifier is
//! behind the [`InquiryNotifier`] trait so the inquiry service never depends
//! on SMTP directly.

use askama::Template;
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::MailConfig;
use crate::models::Inquiry;

/// HTML template for the staff notification.
#[derive(Template)]
#[template(path = "email/inquiry_notification.html")]
struct InquiryNotificationHtml<'a> {
    inquiry: &'a Inquiry,
}

/// Plain text template for the staff notification.
#[derive(Template)]
#[template(path = "email/inquiry_notification.txt")]
struct InquiryNotificationText<'a> {
    inquiry: &'a Inquiry,
}

/// Errors that can occur when sending a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// The attempt did not finish in time.
    #[error("notification timed out")]
    Timeout,
}

/// Sends a notice about a newly stored inquiry.
#[async_trait]
pub trait InquiryNotifier: Send + Sync {
    /// Notify staff about `inquiry`.
    async fn notify(&self, inquiry: &Inquiry) -> Result<(), NotifyError>;
}

/// SMTP-backed [`InquiryNotifier`].
#[derive(Clone)]
pub struct SmtpNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpNotifier {
    /// Create a notifier from mail configuration.
    ///
    /// `secure = true` uses implicit TLS; otherwise STARTTLS is required.
    ///
    /// # Errors
    ///
    /// Returns an error if the relay cannot be configured or an address is
    /// invalid.
    pub fn new(config: &MailConfig) -> Result<Self, NotifyError> {
        let credentials = Credentials::new(
            config.username.clone(),
            config.password.expose_secret().to_string(),
        );

        let builder = if config.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
        };

        let mailer = builder
            .port(config.port)
            .credentials(credentials)
            .timeout(Some(config.timeout))
            .build();

        Ok(Self {
            mailer,
            from: parse_mailbox(&config.from_address)?,
            to: parse_mailbox(&config.recipient)?,
        })
    }
}

#[async_trait]
impl InquiryNotifier for SmtpNotifier {
    async fn notify(&self, inquiry: &Inquiry) -> Result<(), NotifyError> {
        let html = InquiryNotificationHtml { inquiry }.render()?;
        let text = InquiryNotificationText { inquiry }.render()?;
        let email = build_message(
            self.from.clone(),
            self.to.clone(),
            &subject_for(inquiry),
            text,
            html,
        )?;

        self.mailer.send(email).await?;

        tracing::info!(inquiry_id = %inquiry.id, "Inquiry notification sent");
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address
        .parse()
        .map_err(|_| NotifyError::InvalidAddress(address.to_string()))
}

fn subject_for(inquiry: &Inquiry) -> String {
    format!("New Ask a Librarian inquiry: {}", inquiry.category)
}

/// Build a multipart email with both plain text and HTML versions.
fn build_message(
    from: Mailbox,
    to: Mailbox,
    subject: &str,
    text_body: String,
    html_body: String,
) -> Result<Message, NotifyError> {
    Ok(Message::builder()
        .from(from)
        .to(to)
        .subject(subject)
        .multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(text_body),
                )
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(html_body),
                ),
        )?)
}
