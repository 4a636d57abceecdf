//! Administrator authentication: password hashing, session resolution and
//! CSRF verification.

mod context;
mod password;

use subtle::ConstantTimeEq;

pub use context::RequestContext;
pub(crate) use context::client_ip;
pub use password::{hash_password, validate_password_strength, verify_password};

/// Constant-time comparison of a submitted CSRF token with the session's
/// token. An empty session token never matches.
pub fn csrf_matches(expected: &str, provided: &str) -> bool {
    if expected.is_empty() {
        return false;
    }
    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csrf_matches() {
        assert!(csrf_matches("abc123", "abc123"));
        assert!(!csrf_matches("abc123", "abc124"));
        assert!(!csrf_matches("abc123", "abc"));
        assert!(!csrf_matches("", ""));
    }
}
