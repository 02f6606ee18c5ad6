//! SMTP delivery over implicit TLS via lettre.
//!
//! Each delivery opens its own connection and walks the phases in order:
//! connect (TCP + TLS + EHLO), authenticate, send. The first failing phase
//! decides the error kind. The connection is closed on every path.

use std::fmt;
use std::time::Duration;

use lettre::Message;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::transport::smtp::client::{SmtpConnection, TlsParameters};
use lettre::transport::smtp::extension::ClientId;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error, info};

use super::MailTransport;
use crate::config::SmtpConfig;
use crate::error::{ConfigError, DeliveryError};
use crate::quote::OutboundMessage;

const AUTH_MECHANISMS: &[Mechanism] = &[Mechanism::Plain, Mechanism::Login];

/// Where a delivery attempt currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryPhase {
    Connecting,
    Authenticating,
    Sending,
}

impl DeliveryPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Authenticating => "authenticating",
            Self::Sending => "sending",
        }
    }

    /// Wrap a failure cause in the error kind owned by this phase.
    pub fn fail(self, cause: impl fmt::Display) -> DeliveryError {
        match self {
            Self::Connecting => DeliveryError::Connection(cause.to_string()),
            Self::Authenticating => DeliveryError::Auth(cause.to_string()),
            Self::Sending => DeliveryError::Send(cause.to_string()),
        }
    }
}

impl fmt::Display for DeliveryPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sends each message over a fresh SMTPS connection. No pooling, no retry.
#[derive(Clone)]
pub struct SmtpRelay {
    host: String,
    port: u16,
    username: String,
    password: SecretString,
    timeout: Duration,
    tls: TlsParameters,
    hello_name: ClientId,
}

impl SmtpRelay {
    pub fn new(config: &SmtpConfig) -> Result<Self, ConfigError> {
        let tls = TlsParameters::new(config.host.clone()).map_err(|e| {
            ConfigError::InvalidValue {
                key: "SMTP_HOST".into(),
                message: format!("TLS setup failed: {e}"),
            }
        })?;

        Ok(Self {
            host: config.host.clone(),
            port: config.port,
            username: config.username.clone(),
            password: config.password.clone(),
            timeout: config.timeout,
            tls,
            hello_name: ClientId::default(),
        })
    }

    fn connect(&self) -> Result<SmtpConnection, DeliveryError> {
        SmtpConnection::connect(
            (self.host.as_str(), self.port),
            Some(self.timeout),
            &self.hello_name,
            Some(&self.tls),
            None,
        )
        .map_err(|e| DeliveryPhase::Connecting.fail(e))
    }

    fn credentials(&self) -> Credentials {
        Credentials::new(
            self.username.clone(),
            self.password.expose_secret().to_string(),
        )
    }
}

impl fmt::Debug for SmtpRelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpRelay")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl MailTransport for SmtpRelay {
    fn deliver(&self, message: &OutboundMessage) -> Result<(), DeliveryError> {
        let email = build_message(message)?;

        debug!(phase = %DeliveryPhase::Connecting, host = %self.host, port = self.port, "SMTP delivery");
        let mut conn = self.connect().inspect_err(|e| {
            error!(phase = %DeliveryPhase::Connecting, error = %e, "SMTP delivery failed");
        })?;

        let outcome = transmit(&mut conn, &self.credentials(), &email);
        match &outcome {
            Ok(()) => {
                // The server has already accepted the message; a failed QUIT changes nothing.
                if let Err(e) = conn.quit() {
                    debug!(error = %e, "SMTP QUIT failed after delivery");
                }
                info!(to = %message.to, reply_to = %message.reply_to, "Quote request email delivered");
            }
            Err(e) => {
                conn.abort();
                error!(category = e.category(), error = %e, "SMTP delivery failed");
            }
        }
        outcome
    }
}

/// Authenticate and send on an open connection.
fn transmit(
    conn: &mut SmtpConnection,
    credentials: &Credentials,
    email: &Message,
) -> Result<(), DeliveryError> {
    debug!(phase = %DeliveryPhase::Authenticating, "SMTP delivery");
    conn.auth(AUTH_MECHANISMS, credentials)
        .map_err(|e| DeliveryPhase::Authenticating.fail(e))?;

    debug!(phase = %DeliveryPhase::Sending, "SMTP delivery");
    conn.send(email.envelope(), &email.formatted())
        .map_err(|e| DeliveryPhase::Sending.fail(e))?;

    Ok(())
}

/// Convert an [`OutboundMessage`] into a lettre message with a plain-text body.
pub(crate) fn build_message(message: &OutboundMessage) -> Result<Message, DeliveryError> {
    let mailbox = |label: &str, address: &str| {
        address
            .parse::<Mailbox>()
            .map_err(|e| DeliveryPhase::Sending.fail(format!("invalid {label} address: {e}")))
    };

    Message::builder()
        .from(mailbox("from", &message.from)?)
        .to(mailbox("to", &message.to)?)
        .reply_to(mailbox("reply-to", &message.reply_to)?)
        .subject(message.subject.as_str())
        .header(ContentType::TEXT_PLAIN)
        .body(message.body_text.clone())
        .map_err(|e| DeliveryPhase::Sending.fail(format!("failed to build email: {e}")))
}
