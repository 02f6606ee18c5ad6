//! Validation of an untrusted quote-request payload.
//!
//! Checks run in two passes:
//! - presence: every required field must be a non-blank string; all
//!   violations are collected so the caller can fix them in one round trip
//! - format: only once nothing is missing, `email` must look like
//!   `local@domain.tld` and be an address the mailer can put in a header

use std::sync::LazyLock;

use lettre::message::Mailbox;
use regex::Regex;
use serde_json::{Map, Value};

use super::model::{OBSERVATIONS_PLACEHOLDER, REQUIRED_FIELDS, ValidatedFields};
use crate::error::ValidationError;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.-]+@[\w.-]+\.\w+$").expect("email pattern compiles"));

/// Validate a submitted payload.
///
/// Anything other than a JSON object is treated as an empty submission.
pub fn validate(payload: &Value) -> Result<ValidatedFields, ValidationError> {
    let empty = Map::new();
    let fields = payload.as_object().unwrap_or(&empty);

    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|key| present(fields, key).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    let field = |key: &str| present(fields, key).unwrap_or_default().to_string();

    let email = field("email");
    if !is_valid_email(&email) {
        return Err(ValidationError::InvalidEmail);
    }

    let observations = present(fields, "observations")
        .unwrap_or(OBSERVATIONS_PLACEHOLDER)
        .to_string();

    Ok(ValidatedFields {
        name: field("name"),
        email,
        phone: field("phone"),
        address: field("address"),
        description: field("description"),
        observations,
    })
}

/// Whether `email` has the basic `local@domain.tld` shape.
///
/// The pattern admits some addresses (`a..b@x.com`, `a@-x.com`) that the
/// mailbox grammar refuses, so both must accept it.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email) && email.parse::<Mailbox>().is_ok()
}

/// The raw string value of `key`, if it is a string with non-whitespace content.
fn present<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn complete() -> Value {
        json!({
            "name": "Jane Doe",
            "email": "jane@example.com",
            "phone": "555-1234",
            "address": "90210",
            "description": "Leaky roof",
        })
    }

    fn without(mut payload: Value, keys: &[&str]) -> Value {
        let map = payload.as_object_mut().unwrap();
        for key in keys {
            map.remove(*key);
        }
        payload
    }

    #[test]
    fn accepts_complete_payload() {
        let fields = validate(&complete()).unwrap();
        assert_eq!(fields.name, "Jane Doe");
        assert_eq!(fields.email, "jane@example.com");
        assert_eq!(fields.phone, "555-1234");
        assert_eq!(fields.address, "90210");
        assert_eq!(fields.description, "Leaky roof");
    }

    #[test]
    fn absent_observations_get_placeholder() {
        let fields = validate(&complete()).unwrap();
        assert_eq!(fields.observations, "None provided");
    }

    #[test]
    fn blank_observations_get_placeholder() {
        let mut payload = complete();
        payload["observations"] = json!("   ");
        assert_eq!(validate(&payload).unwrap().observations, "None provided");
    }

    #[test]
    fn observations_kept_verbatim() {
        let mut payload = complete();
        payload["observations"] = json!("  Gate code <1234> & dog in yard\n");
        assert_eq!(
            validate(&payload).unwrap().observations,
            "  Gate code <1234> & dog in yard\n"
        );
    }

    #[test]
    fn values_are_not_trimmed_or_escaped() {
        let mut payload = complete();
        payload["description"] = json!("  <b>two</b>\nlines  ");
        assert_eq!(
            validate(&payload).unwrap().description,
            "  <b>two</b>\nlines  "
        );
    }

    #[test]
    fn only_name_lists_the_rest_in_declared_order() {
        let err = validate(&json!({ "name": "Bob" })).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFields(vec!["email", "phone", "address", "description"])
        );
        assert_eq!(err.to_string(), "Missing: email, phone, address, description");
    }

    #[test]
    fn order_follows_declaration_not_payload() {
        let payload = json!({
            "description": "x",
            "email": "a@b.co",
        });
        let err = validate(&payload).unwrap_err();
        assert_eq!(err.to_string(), "Missing: name, phone, address");
    }

    #[test]
    fn whitespace_only_counts_as_missing() {
        let mut payload = complete();
        payload["phone"] = json!(" \t\n");
        assert_eq!(
            validate(&payload).unwrap_err(),
            ValidationError::MissingFields(vec!["phone"])
        );
    }

    #[test]
    fn non_string_values_count_as_missing() {
        let mut payload = complete();
        payload["phone"] = json!(5551234);
        payload["address"] = json!(null);
        payload["description"] = json!(["roof"]);
        assert_eq!(
            validate(&payload).unwrap_err(),
            ValidationError::MissingFields(vec!["phone", "address", "description"])
        );
    }

    #[test]
    fn non_object_payload_misses_everything() {
        for payload in [json!(null), json!("hi"), json!([1, 2]), json!(42)] {
            assert_eq!(
                validate(&payload).unwrap_err(),
                ValidationError::MissingFields(REQUIRED_FIELDS.to_vec())
            );
        }
    }

    #[test]
    fn missing_takes_precedence_over_invalid_email() {
        let mut payload = without(complete(), &["phone"]);
        payload["email"] = json!("not-an-email");
        assert_eq!(
            validate(&payload).unwrap_err(),
            ValidationError::MissingFields(vec!["phone"])
        );
    }

    #[test]
    fn malformed_email_is_rejected() {
        let payload = json!({
            "name": "Bob",
            "email": "not-an-email",
            "phone": "555",
            "address": "10001",
            "description": "Fence",
        });
        assert_eq!(validate(&payload).unwrap_err(), ValidationError::InvalidEmail);
    }

    #[test]
    fn email_shapes() {
        for ok in [
            "jane@example.com",
            "first.last@sub.example.co",
            "a-b_c@my-host.io",
            "x@y.z",
        ] {
            assert!(is_valid_email(ok), "{ok} should be accepted");
        }
        for bad in [
            "plainaddress",
            "@example.com",
            "jane@",
            "jane@example",
            "jane@example.",
            "jane doe@example.com",
            " jane@example.com",
            "jane@example.com ",
            "jane+tag@example.com",
            "a..b@example.com",
            "jane.@example.com",
            ".jane@example.com",
            "a@-x.com",
        ] {
            assert!(!is_valid_email(bad), "{bad} should be rejected");
        }
    }

    #[test]
    fn unsendable_dotted_address_is_invalid_email() {
        let mut payload = complete();
        payload["email"] = json!("jane..doe@example.com");
        assert_eq!(validate(&payload).unwrap_err(), ValidationError::InvalidEmail);
    }

    #[test]
    fn email_with_surrounding_space_is_invalid_not_missing() {
        let mut payload = complete();
        payload["email"] = json!(" jane@example.com ");
        assert_eq!(validate(&payload).unwrap_err(), ValidationError::InvalidEmail);
    }
}
