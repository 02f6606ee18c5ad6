//! Builds the outbound email for a validated quote request.

use super::model::{OutboundMessage, ValidatedFields};
use crate::config::ServiceConfig;

const SUBJECT_PREFIX: &str = "New Quote Request from ";

/// Sender and recipient shared by every message the service sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageIdentity {
    /// The authenticated SMTP identity.
    pub from: String,
    /// The business inbox.
    pub to: String,
}

impl MessageIdentity {
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self {
            from: config.smtp.username.clone(),
            to: config.recipient.clone(),
        }
    }
}

/// Turns validated fields into the email handed to the transport.
#[derive(Debug, Clone)]
pub struct Composer {
    identity: MessageIdentity,
}

impl Composer {
    pub fn new(identity: MessageIdentity) -> Self {
        Self { identity }
    }

    /// Compose the message. Replies go straight to the requester.
    pub fn compose(&self, fields: &ValidatedFields) -> OutboundMessage {
        OutboundMessage {
            subject: format!("{SUBJECT_PREFIX}{}", fields.name),
            from: self.identity.from.clone(),
            to: self.identity.to.clone(),
            reply_to: fields.email.clone(),
            body_text: render_body(fields),
        }
    }
}

fn render_body(fields: &ValidatedFields) -> String {
    format!(
        "New Quote Request Received\n\
         \n\
         Full Name: {name}\n\
         Email: {email}\n\
         Phone: {phone}\n\
         Zip Code: {address}\n\
         \n\
         Project Description:\n\
         {description}\n\
         \n\
         Additional Notes:\n\
         {observations}\n",
        name = fields.name,
        email = fields.email,
        phone = fields.phone,
        address = fields.address,
        description = fields.description,
        observations = fields.observations,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composer() -> Composer {
        Composer::new(MessageIdentity {
            from: "relay@brfix.example".into(),
            to: "quotes@brfix.example".into(),
        })
    }

    fn jane() -> ValidatedFields {
        ValidatedFields {
            name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            phone: "555-1234".into(),
            address: "90210".into(),
            description: "Leaky roof".into(),
            observations: "None provided".into(),
        }
    }

    #[test]
    fn subject_carries_name_unmodified() {
        let mut fields = jane();
        fields.name = "  Zoë <O'Brien>  ".into();
        let msg = composer().compose(&fields);
        assert_eq!(msg.subject, "New Quote Request from   Zoë <O'Brien>  ");
    }

    #[test]
    fn headers_come_from_identity_and_requester() {
        let msg = composer().compose(&jane());
        assert_eq!(msg.from, "relay@brfix.example");
        assert_eq!(msg.to, "quotes@brfix.example");
        assert_eq!(msg.reply_to, "jane@example.com");
    }

    #[test]
    fn body_matches_template() {
        let msg = composer().compose(&jane());
        let expected = "New Quote Request Received\n\
                        \n\
                        Full Name: Jane Doe\n\
                        Email: jane@example.com\n\
                        Phone: 555-1234\n\
                        Zip Code: 90210\n\
                        \n\
                        Project Description:\n\
                        Leaky roof\n\
                        \n\
                        Additional Notes:\n\
                        None provided\n";
        assert_eq!(msg.body_text, expected);
    }

    #[test]
    fn body_embeds_values_verbatim() {
        let fields = ValidatedFields {
            name: "A & B <Roofing>".into(),
            email: "a.b-c@d-e.org".into(),
            phone: "+1 (555) 000".into(),
            address: "  12345  ".into(),
            description: "line one\nline two\n\n<script>".into(),
            observations: "x".repeat(10_000),
        };
        let msg = composer().compose(&fields);
        for value in [
            &fields.name,
            &fields.email,
            &fields.phone,
            &fields.address,
            &fields.description,
            &fields.observations,
        ] {
            assert!(msg.body_text.contains(value.as_str()), "body lost {value:?}");
        }
    }

    #[test]
    fn compose_is_deterministic() {
        let c = composer();
        assert_eq!(c.compose(&jane()), c.compose(&jane()));
    }

    #[test]
    fn identity_from_config_uses_smtp_user_as_sender() {
        let config = ServiceConfig::from_lookup(|key| {
            match key {
                "SMTP_HOST" => Some("smtp.example.com"),
                "SMTP_USER" => Some("relay@example.com"),
                "SMTP_PASS" => Some("secret"),
                "TO_EMAIL" => Some("sales@example.com"),
                _ => None,
            }
            .map(String::from)
        })
        .unwrap();
        let identity = MessageIdentity::from_config(&config);
        assert_eq!(identity.from, "relay@example.com");
        assert_eq!(identity.to, "sales@example.com");
    }
}
