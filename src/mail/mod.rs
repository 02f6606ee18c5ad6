//! Outbound mail delivery.
//!
//! [`MailTransport`] is the seam between the HTTP layer and the mail server.
//! [`SmtpRelay`] is the production implementation; tests swap in fakes.

mod smtp;

pub use smtp::{DeliveryPhase, SmtpRelay};

use crate::error::DeliveryError;
use crate::quote::OutboundMessage;

/// A single, synchronous delivery attempt.
///
/// Implementations block until the server accepts or rejects the message, or a
/// timeout elapses. They must not retry.
pub trait MailTransport: Send + Sync + 'static {
    fn deliver(&self, message: &OutboundMessage) -> Result<(), DeliveryError>;
}
