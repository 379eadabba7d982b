//! Contact-form input validation
//!
//! Decides whether a name/email/message submission may proceed to the store
//! and the email notification. Purely syntactic and table driven: no DNS or
//! MX lookups happen here.
//!
//! # Email check order
//!
//! ```text
//! shape ──✗──→ "Please enter a valid email address"
//!   │
//! disposable substring ──✗──→ "Please use a permanent email address ..."
//!   │
//! typo table (exact) ──✗──→ "Did you mean local@fixed?"
//!   │
//! allow-list (advisory, logs only)
//!   │
//!   ✓
//! ```
//!
//! The allow-list step never rejects; unknown business domains are accepted.

mod tables;

pub use tables::DomainTables;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

pub const NAME_REQUIRED: &str = "Name is required";
pub const EMAIL_REQUIRED: &str = "Email is required";
pub const MESSAGE_REQUIRED: &str = "Message is required";
pub const INVALID_EMAIL: &str = "Please enter a valid email address";
pub const DISPOSABLE_EMAIL: &str =
    "Please use a permanent email address (no temporary/disposable emails)";

/// `user@host.tld`, no whitespace, exactly one `@`
///
/// Whitespace is the browser's set (includes U+FEFF, excludes U+0085),
/// not the regex crate's Unicode `\s`.
const EMAIL_SHAPE: &str = concat!(
    r"^[^@\t\n\x0B\f\r \u{A0}\u{1680}\u{2000}-\u{200A}\u{2028}\u{2029}\u{202F}\u{205F}\u{3000}\u{FEFF}]+",
    r"@[^@\t\n\x0B\f\r \u{A0}\u{1680}\u{2000}-\u{200A}\u{2028}\u{2029}\u{202F}\u{205F}\u{3000}\u{FEFF}]+",
    r"\.[^@\t\n\x0B\f\r \u{A0}\u{1680}\u{2000}-\u{200A}\u{2028}\u{2029}\u{202F}\u{205F}\u{3000}\u{FEFF}]+$",
);

/// A visitor's contact form submission
///
/// Fields are kept exactly as typed; trimming only happens inside checks.
/// Missing keys and JSON `null` both read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Submission {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }
}

/// Result of checking a single email address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailValidation {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EmailValidation {
    fn valid() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    fn rejected(error: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error: Some(error.into()),
        }
    }
}

/// Result of checking a whole submission
///
/// `errors` is ordered name → email → message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    /// Most fundamental problem, shown in single-line status messages
    pub fn first_error(&self) -> Option<&str> {
        self.errors.first().map(String::as_str)
    }
}

/// Submission validator bound to a set of domain tables
#[derive(Debug, Clone)]
pub struct Validator {
    tables: DomainTables,
    shape: Regex,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(DomainTables::default())
    }
}

impl Validator {
    pub fn new(tables: DomainTables) -> Self {
        Self {
            tables,
            // Constant pattern, covered by tests
            shape: Regex::new(EMAIL_SHAPE).expect("email shape pattern compiles"),
        }
    }

    /// Classify a single address
    pub fn validate_email(&self, email: &str) -> EmailValidation {
        if !self.shape.is_match(email) {
            return EmailValidation::rejected(INVALID_EMAIL);
        }

        // Shape guarantees exactly one '@'
        let Some((local, domain)) = email.split_once('@') else {
            return EmailValidation::rejected(INVALID_EMAIL);
        };
        let domain = domain.to_lowercase();

        if self.tables.is_disposable(&domain) {
            return EmailValidation::rejected(DISPOSABLE_EMAIL);
        }

        if let Some(fixed) = self.tables.correction_for(&domain) {
            return EmailValidation::rejected(format!("Did you mean {}@{}?", local, fixed));
        }

        if !self.tables.is_legitimate(&domain) {
            tracing::debug!("Custom domain accepted: {}", domain);
        }

        EmailValidation::valid()
    }

    /// Check every field and collect all failures in field order
    pub fn validate_form(&self, submission: &Submission) -> ValidationResult {
        let mut errors = Vec::new();

        if submission.name.trim().is_empty() {
            errors.push(NAME_REQUIRED.to_string());
        }

        if submission.email.trim().is_empty() {
            errors.push(EMAIL_REQUIRED.to_string());
        } else if let Some(error) = self.validate_email(&submission.email).error {
            errors.push(error);
        }

        if submission.message.trim().is_empty() {
            errors.push(MESSAGE_REQUIRED.to_string());
        }

        ValidationResult {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn validator() -> Validator {
        Validator::default()
    }

    fn error_of(email: &str) -> Option<String> {
        validator().validate_email(email).error
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Email checks
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_malformed_address_rejected() {
        let result = validator().validate_email("not-an-email");
        assert!(!result.is_valid);
        assert_eq!(result.error.as_deref(), Some(INVALID_EMAIL));
    }

    #[test]
    fn test_shape_edge_cases() {
        for bad in [
            "",
            "user@",
            "@host.com",
            "user@host",
            "a@b@c.com",
            " user@gmail.com",
            "user@gmail.com ",
            "us er@gmail.com",
            "user@gmail.com\n",
            "user\u{FEFF}@gmail.com",
            "user@gmail.com\u{A0}",
            "user@gmail\u{3000}.com",
        ] {
            assert_eq!(error_of(bad).as_deref(), Some(INVALID_EMAIL), "{:?}", bad);
        }
    }

    #[test]
    fn test_next_line_is_not_whitespace() {
        assert!(validator().validate_email("us\u{85}er@gmail.com").is_valid);
    }

    #[test]
    fn test_null_fields_deserialize_as_empty() {
        let submission: Submission =
            serde_json::from_str(r#"{"name": null, "email": "a@gmail.com", "message": "hi"}"#)
                .unwrap();
        assert_eq!(submission, Submission::new("", "a@gmail.com", "hi"));

        let missing: Submission = serde_json::from_str("{}").unwrap();
        assert_eq!(missing, Submission::default());

        let result = validator().validate_form(&submission);
        assert_eq!(result.errors, vec![NAME_REQUIRED]);
    }

    #[test]
    fn test_disposable_address_rejected() {
        let result = validator().validate_email("user@mailinator.com");
        assert!(!result.is_valid);
        assert_eq!(result.error.as_deref(), Some(DISPOSABLE_EMAIL));
    }

    #[test]
    fn test_disposable_match_is_case_insensitive() {
        assert_eq!(
            error_of("user@MailInator.COM").as_deref(),
            Some(DISPOSABLE_EMAIL)
        );
        assert_eq!(
            error_of("user@inbox.yopmail.com").as_deref(),
            Some(DISPOSABLE_EMAIL)
        );
    }

    #[test]
    fn test_typo_suggests_correction() {
        let result = validator().validate_email("john@gamil.com");
        assert!(!result.is_valid);
        assert_eq!(result.error.as_deref(), Some("Did you mean john@gmail.com?"));
    }

    #[test]
    fn test_typo_keeps_local_part_case() {
        assert_eq!(
            error_of("John.Smith@GMAIL.CO").as_deref(),
            Some("Did you mean John.Smith@gmail.com?")
        );
    }

    #[test]
    fn test_unknown_domain_accepted() {
        let result = validator().validate_email("person@my-custom-startup.io");
        assert!(result.is_valid);
        assert_eq!(result.error, None);
    }

    #[test]
    fn test_common_providers_accepted() {
        for ok in [
            "a@gmail.com",
            "a.b+tag@outlook.com",
            "student@cs.mit.edu",
            "first.last@sub.example.co.uk",
        ] {
            assert!(validator().validate_email(ok).is_valid, "{}", ok);
        }
    }

    #[test]
    fn test_disposable_wins_over_typo() {
        // Minimal fixture: the same domain is both disposable and a typo key
        let tables = DomainTables {
            legitimate: vec![],
            disposable: vec!["gamil.com".to_string()],
            typos: BTreeMap::from([("gamil.com".to_string(), "gmail.com".to_string())]),
        };
        let validator = Validator::new(tables);
        assert_eq!(
            validator.validate_email("john@gamil.com").error.as_deref(),
            Some(DISPOSABLE_EMAIL)
        );
    }

    #[test]
    fn test_allow_list_never_rejects() {
        let tables = DomainTables {
            legitimate: vec!["only-this.com".to_string()],
            ..DomainTables::empty()
        };
        let validator = Validator::new(tables);
        assert!(validator.validate_email("x@anything-else.net").is_valid);
    }

    #[test]
    fn test_empty_tables_accept_any_well_shaped_address() {
        let validator = Validator::new(DomainTables::empty());
        assert!(validator.validate_email("john@gamil.com").is_valid);
        assert!(validator.validate_email("user@mailinator.com").is_valid);
        assert!(!validator.validate_email("nope").is_valid);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Form checks
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_complete_submission_is_valid() {
        let submission = Submission::new("Ada", "ada@gmail.com", "Hello there");
        let result = validator().validate_form(&submission);
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_missing_name_and_message() {
        let submission = Submission::new("", "x@gmail.com", "");
        let result = validator().validate_form(&submission);
        assert!(!result.is_valid);
        assert_eq!(result.errors, vec![NAME_REQUIRED, MESSAGE_REQUIRED]);
    }

    #[test]
    fn test_all_fields_missing_in_field_order() {
        let submission = Submission::new("  ", "\t", "\n");
        let result = validator().validate_form(&submission);
        assert_eq!(
            result.errors,
            vec![NAME_REQUIRED, EMAIL_REQUIRED, MESSAGE_REQUIRED]
        );
        assert_eq!(result.first_error(), Some(NAME_REQUIRED));
    }

    #[test]
    fn test_each_missing_field_alone() {
        let cases = [
            (Submission::new("", "a@gmail.com", "hi"), NAME_REQUIRED),
            (Submission::new("Ada", "", "hi"), EMAIL_REQUIRED),
            (Submission::new("Ada", "a@gmail.com", ""), MESSAGE_REQUIRED),
        ];
        for (submission, expected) in cases {
            let result = validator().validate_form(&submission);
            assert_eq!(result.errors, vec![expected]);
        }
    }

    #[test]
    fn test_email_error_replaces_required_message() {
        let submission = Submission::new("", "john@gamil.com", "hi");
        let result = validator().validate_form(&submission);
        assert_eq!(
            result.errors,
            vec![NAME_REQUIRED, "Did you mean john@gmail.com?"]
        );
    }

    #[test]
    fn test_untrimmed_email_fails_shape_check() {
        let submission = Submission::new("Ada", " ada@gmail.com ", "hi");
        let result = validator().validate_form(&submission);
        assert_eq!(result.errors, vec![INVALID_EMAIL]);
    }

    #[test]
    fn test_validate_form_is_idempotent() {
        let validator = validator();
        let submission = Submission::new("", "user@mailinator.com", "msg");
        let first = validator.validate_form(&submission);
        let second = validator.validate_form(&submission);
        assert_eq!(first, second);
        assert_eq!(first.errors, vec![NAME_REQUIRED, DISPOSABLE_EMAIL]);
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result = validator().validate_form(&Submission::default());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["isValid"], false);
        assert_eq!(json["errors"].as_array().unwrap().len(), 3);

        let email = validator().validate_email("a@gmail.com");
        let json = serde_json::to_value(&email).unwrap();
        assert_eq!(json, serde_json::json!({ "isValid": true }));
    }

    #[test]
    fn test_non_ascii_input_never_panics() {
        for input in ["ü@ß.de", "日本@例え.jp", "@", "\u{0}", "a@b.c\u{301}"] {
            let _ = validator().validate_email(input);
            let _ = validator().validate_form(&Submission::new(input, input, input));
        }
    }
}
