//! Advisory syntax checks for fiscal form fields
//!
//! These gate the submit button and drive inline warnings. The backend
//! validates again and has the final word.

use regex::Regex;
use std::sync::LazyLock;

/// RFC: 3 letters (persona moral) or 4 (persona física), birth/incorporation
/// date as YYMMDD, 3-character homoclave.
static RFC_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-ZÑ&]{3,4}[0-9]{6}[A-Z0-9]{3}$").expect("valid RFC regex"));

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Check RFC syntax. Case-insensitive: the input is upper-cased first.
pub fn is_valid_rfc(rfc: &str) -> bool {
    RFC_PATTERN.is_match(&rfc.to_uppercase())
}

/// Check email syntax: `local@domain.tld`, no whitespace, no DNS lookup.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Trim and upper-case an RFC the way it is sent to the backend.
pub fn normalize_rfc(rfc: &str) -> String {
    rfc.trim().to_uppercase()
}
