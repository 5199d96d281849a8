//! Email delivery over SMTPS.
//!
//! [`Mailer`] is the capability seam; [`SmtpMailer`] delivers through an
//! implicit-TLS relay (Gmail by default) authenticated with the account's
//! app password. Credentials are checked at send time so an unconfigured
//! agent still starts and can do everything else.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use miette::Diagnostic;
use thiserror::Error;
use tracing::info;

use crate::config::SmtpConfig;

/// Errors from the mail subsystem.
#[derive(Debug, Error, Diagnostic)]
pub enum MailError {
    #[error("missing SMTP app password")]
    #[diagnostic(
        code(atlas::mail::missing_credential),
        help("Set SMTP_PASS in the environment or a .env file. For Gmail, use an App Password, not the account password.")
    )]
    MissingCredential,

    #[error("invalid email address '{address}'")]
    #[diagnostic(
        code(atlas::mail::invalid_address),
        help("Addresses must be of the form user@example.com.")
    )]
    InvalidAddress { address: String },

    #[error("failed to build message: {message}")]
    #[diagnostic(code(atlas::mail::build))]
    Build { message: String },

    #[error("SMTP transport error: {message}")]
    #[diagnostic(
        code(atlas::mail::transport),
        help("Check the SMTP host, port, and credentials.")
    )]
    Transport { message: String },
}

pub type MailResult<T> = std::result::Result<T, MailError>;

/// The seam between the dispatcher and email delivery.
pub trait Mailer: Send + Sync {
    fn send(&self, to: &str, subject: &str, body: &str) -> MailResult<()>;
}

/// Production mailer speaking SMTPS to the configured relay.
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, to: &str, subject: &str, body: &str) -> MailResult<()> {
        let password = self
            .config
            .app_password
            .as_deref()
            .ok_or(MailError::MissingCredential)?;

        let from = self
            .config
            .sender
            .parse()
            .map_err(|_| MailError::InvalidAddress {
                address: self.config.sender.clone(),
            })?;
        let to_mailbox = to.parse().map_err(|_| MailError::InvalidAddress {
            address: to.to_string(),
        })?;

        let email = Message::builder()
            .from(from)
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| MailError::Build {
                message: e.to_string(),
            })?;

        let credentials = Credentials::new(self.config.sender.clone(), password.to_string());
        let transport = SmtpTransport::relay(&self.config.host)
            .map_err(|e| MailError::Transport {
                message: e.to_string(),
            })?
            .port(self.config.port)
            .credentials(credentials)
            .build();

        transport.send(&email).map_err(|e| MailError::Transport {
            message: e.to_string(),
        })?;
        info!(to, subject, "email sent");
        Ok(())
    }
}
