//! Field validators for Chilean enrollment data.
//!
//! - [`identifier`] - RUT checksum validation with the provisional (IPE) exemption
//! - [`validate_email`] - basic `local@domain.tld` shape check
//!
//! Validators only answer yes/no. Recording a failure in the ledger is up
//! to the pipeline stage that calls them.
//!
//! # Example
//!
//! ```
//! use dobby::validation::{validate_email, validate_rut};
//!
//! assert!(validate_rut("12345678-5"));
//! assert!(!validate_rut("12345678-9"));
//! assert!(validate_email("juan@test.com"));
//! ```

pub mod identifier;

use once_cell::sync::Lazy;
use regex::Regex;

pub use identifier::{check_character, format_rut, is_provisional, normalize_rut, validate_rut};

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("Invalid email pattern")
});

/// Check an email address for the `local-part@domain.tld` shape.
///
/// Empty input is `false`; whether an absent email is a problem is the
/// caller's decision.
pub fn validate_email(email: &str) -> bool {
    !email.is_empty() && EMAIL_PATTERN.is_match(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(validate_email("juan@test.com"));
        assert!(validate_email("maria.elena+apoderado@colegio.cl"));
        assert!(validate_email("a_b%c@sub.domain.org"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!validate_email(""));
        assert!(!validate_email("juan"));
        assert!(!validate_email("juan@test"));
        assert!(!validate_email("juan@test.c"));
        assert!(!validate_email("@test.com"));
        assert!(!validate_email("juan pablo@test.com"));
        assert!(!validate_email("josé@test.com"));
    }
}
