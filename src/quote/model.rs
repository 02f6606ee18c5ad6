//! Data carried through the quote pipeline.

/// Form fields that must be present and non-blank, in declared order.
pub const REQUIRED_FIELDS: [&str; 5] = ["name", "email", "phone", "address", "description"];

/// Substituted when the submitter leaves `observations` out.
pub const OBSERVATIONS_PLACEHOLDER: &str = "None provided";

/// A quote request that passed validation.
///
/// Values are kept exactly as submitted (no trimming, no escaping).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedFields {
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Zip code or street address, whatever the form collected.
    pub address: String,
    pub description: String,
    pub observations: String,
}

/// The single email produced for one quote request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub subject: String,
    pub from: String,
    pub to: String,
    pub reply_to: String,
    pub body_text: String,
}
