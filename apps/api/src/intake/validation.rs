use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::session::{CandidateProfile, MISSING_VALUE};

/// Loose email shape: something, `@`, something, `.`, something.
static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern is valid"));

/// Placeholder the extraction service uses when it found no name.
const NAME_PLACEHOLDER: &str = "Candidate";

const PHONE_SEPARATORS: &[char] = &['-', '+', '(', ')'];
const MIN_PHONE_DIGITS: usize = 7;

/// Profile attributes that must be present before an interview can start,
/// in the order they are asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileField {
    Name,
    Email,
    Phone,
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProfileField::Name => "Name",
            ProfileField::Email => "Email",
            ProfileField::Phone => "Phone",
        };
        f.write_str(label)
    }
}

pub fn validate_email(text: &str) -> bool {
    EMAIL_PATTERN.is_match(text)
}

/// A phone number is valid when at least 7 characters remain after removing
/// whitespace and `- + ( )`.
pub fn validate_phone(text: &str) -> bool {
    text.chars()
        .filter(|c| !c.is_whitespace() && !PHONE_SEPARATORS.contains(c))
        .count()
        >= MIN_PHONE_DIGITS
}

fn is_placeholder(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case(MISSING_VALUE)
}

fn is_blank_or_placeholder(value: &str) -> bool {
    value.trim().is_empty() || is_placeholder(value)
}

/// Validates a value supplied for `field`.
pub fn validate_field(field: ProfileField, value: &str) -> bool {
    if is_blank_or_placeholder(value) {
        return false;
    }
    match field {
        ProfileField::Name => value.trim() != NAME_PLACEHOLDER,
        ProfileField::Email => validate_email(value),
        ProfileField::Phone => validate_phone(value),
    }
}

/// Returns the first of Name, Email, Phone that is still missing or invalid,
/// or `None` when the profile is complete.
pub fn next_missing_field(profile: &CandidateProfile) -> Option<ProfileField> {
    [
        (ProfileField::Name, profile.name.as_str()),
        (ProfileField::Email, profile.email.as_str()),
        (ProfileField::Phone, profile.phone.as_str()),
    ]
    .into_iter()
    .find(|(field, value)| !validate_field(*field, value))
    .map(|(field, _)| field)
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    fn profile(name: &str, email: &str, phone: &str) -> CandidateProfile {
        CandidateProfile {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
        }
    }

    #[test]
    fn test_valid_emails() {
        for email in ["jane@x.com", "a.b+tag@mail.example.org", "dev@sub.domain.io"] {
            assert!(validate_email(email), "{email} should be valid");
        }
    }

    #[test]
    fn test_email_missing_at() {
        assert!(!validate_email("jane.x.com"));
    }

    #[test]
    fn test_email_missing_domain_dot() {
        assert!(!validate_email("jane@localhost"));
    }

    #[test]
    fn test_email_placeholder_invalid() {
        assert!(!validate_email("N/A"));
        assert!(!validate_email(""));
    }

    #[test]
    fn test_phone_with_separators() {
        assert!(validate_phone("555-1234567"));
        assert!(validate_phone("+1 (555) 123-4567"));
        assert!(validate_phone("1234567"));
    }

    #[test]
    fn test_phone_too_short() {
        assert!(!validate_phone("123-456"));
        assert!(!validate_phone("(+1) - -"));
        assert!(!validate_phone(""));
    }

    proptest! {
        #[test]
        fn test_phone_matches_strip_and_count(text in "[0-9a-z ()+\\-\t]{0,20}") {
            let kept = text
                .chars()
                .filter(|c| !c.is_whitespace() && !"-+()".contains(*c))
                .count();
            prop_assert_eq!(validate_phone(&text), kept >= 7);
        }

        #[test]
        fn test_phone_accepts_any_unicode_without_panicking(text in "\\PC*") {
            let _ = validate_phone(&text);
        }

        #[test]
        fn test_email_shaped_text_is_valid(
            local in "[a-z0-9.+_]{1,12}",
            host in "[a-z0-9-]{1,12}",
            tld in "[a-z]{2,6}",
        ) {
            let email = format!("{local}@{host}.{tld}");
            prop_assert!(validate_email(&email));
        }

        #[test]
        fn test_email_without_at_is_invalid(text in "[^@]{0,30}") {
            prop_assert!(!validate_email(&text));
        }

        #[test]
        fn test_email_without_domain_dot_is_invalid(
            local in "[a-z0-9]{1,12}",
            host in "[a-z0-9]{1,12}",
        ) {
            let email = format!("{local}@{host}");
            prop_assert!(!validate_email(&email));
        }
    }

    #[test]
    fn test_resolver_priority_order() {
        assert_eq!(next_missing_field(&profile("", "", "")), Some(ProfileField::Name));
        assert_eq!(
            next_missing_field(&profile("Jane", "N/A", "")),
            Some(ProfileField::Email)
        );
        assert_eq!(
            next_missing_field(&profile("Jane", "jane@x.com", "12")),
            Some(ProfileField::Phone)
        );
    }

    #[test]
    fn test_resolver_placeholders_count_as_missing() {
        assert_eq!(
            next_missing_field(&profile("Candidate", "jane@x.com", "5551234567")),
            Some(ProfileField::Name)
        );
        assert_eq!(
            next_missing_field(&profile("n/a", "jane@x.com", "5551234567")),
            Some(ProfileField::Name)
        );
        assert_eq!(
            next_missing_field(&CandidateProfile::placeholder()),
            Some(ProfileField::Name)
        );
    }

    #[test]
    fn test_resolver_complete_profile() {
        assert_eq!(
            next_missing_field(&profile("Jane Doe", "jane@x.com", "555-1234567")),
            None
        );
    }

    #[test]
    fn test_resolver_invalid_email_format() {
        assert_eq!(
            next_missing_field(&profile("Jane Doe", "jane-at-x", "555-1234567")),
            Some(ProfileField::Email)
        );
    }

    #[test]
    fn test_validate_field_name() {
        assert!(validate_field(ProfileField::Name, "Jane Doe"));
        assert!(!validate_field(ProfileField::Name, "   "));
        assert!(!validate_field(ProfileField::Name, "N/A"));
    }
}
