//! Machine-readable error codes.
//!
//! Every portal error type implements [`ErrorCode`] so callers can
//! tell a policy denial from a configuration fault from a transient
//! upstream outage without matching on message text.
//!
//! # Example
//!
//! ```
//! use portal_types::ErrorCode;
//!
//! #[derive(Debug)]
//! enum StoreError {
//!     Unreachable,
//!     Denied,
//! }
//!
//! impl ErrorCode for StoreError {
//!     fn code(&self) -> &'static str {
//!         match self {
//!             Self::Unreachable => "STORE_UNREACHABLE",
//!             Self::Denied => "STORE_DENIED",
//!         }
//!     }
//!
//!     fn is_recoverable(&self) -> bool {
//!         matches!(self, Self::Unreachable)
//!     }
//! }
//!
//! assert_eq!(StoreError::Denied.code(), "STORE_DENIED");
//! assert!(StoreError::Unreachable.is_recoverable());
//! ```

/// Unified error code interface.
///
/// # Code Format
///
/// - UPPER_SNAKE_CASE, e.g. `"AUTH_DENIED"`
/// - Prefixed by domain (`AUTH_`, `CONFIG_`, `UPSTREAM_`, `SESSION_`)
/// - Stable once published
///
/// # Recoverability
///
/// Recoverable means retrying or re-authenticating may succeed
/// (upstream outage, expired session). A policy denial is never
/// recoverable by retry, and a retryable failure must never be read
/// as a change in permissions.
pub trait ErrorCode {
    /// Returns a machine-readable error code.
    fn code(&self) -> &'static str;

    /// Returns whether retrying or re-authenticating may succeed.
    fn is_recoverable(&self) -> bool;
}

/// Asserts that an error code is non-empty, UPPER_SNAKE_CASE and
/// starts with `expected_prefix`.
///
/// # Panics
///
/// Panics with a descriptive message if any check fails.
///
/// # Example
///
/// ```
/// use portal_types::{assert_error_code, ErrorCode};
///
/// struct Expired;
///
/// impl ErrorCode for Expired {
///     fn code(&self) -> &'static str { "SESSION_EXPIRED" }
///     fn is_recoverable(&self) -> bool { true }
/// }
///
/// assert_error_code(&Expired, "SESSION_");
/// ```
pub fn assert_error_code<E: ErrorCode>(err: &E, expected_prefix: &str) {
    let code = err.code();

    assert!(!code.is_empty(), "Error code must not be empty");
    assert!(
        code.starts_with(expected_prefix),
        "Error code '{}' must start with prefix '{}'",
        code,
        expected_prefix
    );
    assert!(
        is_upper_snake_case(code),
        "Error code '{}' must be UPPER_SNAKE_CASE",
        code
    );
}

/// Validates a slice of errors with [`assert_error_code`].
pub fn assert_error_codes<E: ErrorCode>(errors: &[E], expected_prefix: &str) {
    for err in errors {
        assert_error_code(err, expected_prefix);
    }
}

fn is_upper_snake_case(s: &str) -> bool {
    if s.is_empty() || s.starts_with('_') || s.ends_with('_') || s.contains("__") {
        return false;
    }

    s.chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    enum TestError {
        Outage,
        Denied,
    }

    impl ErrorCode for TestError {
        fn code(&self) -> &'static str {
            match self {
                Self::Outage => "TEST_OUTAGE",
                Self::Denied => "TEST_DENIED",
            }
        }

        fn is_recoverable(&self) -> bool {
            matches!(self, Self::Outage)
        }
    }

    #[test]
    fn error_code_trait() {
        assert_eq!(TestError::Outage.code(), "TEST_OUTAGE");
        assert!(TestError::Outage.is_recoverable());
        assert!(!TestError::Denied.is_recoverable());
    }

    #[test]
    fn assert_error_codes_all_variants() {
        assert_error_codes(&[TestError::Outage, TestError::Denied], "TEST_");
    }

    #[test]
    #[should_panic(expected = "must start with prefix")]
    fn assert_error_code_wrong_prefix() {
        assert_error_code(&TestError::Outage, "AUTH_");
    }

    #[test]
    fn upper_snake_case() {
        assert!(is_upper_snake_case("AUTH_DENIED"));
        assert!(is_upper_snake_case("E_404"));
        assert!(!is_upper_snake_case(""));
        assert!(!is_upper_snake_case("auth_denied"));
        assert!(!is_upper_snake_case("_AUTH"));
        assert!(!is_upper_snake_case("AUTH__DENIED"));
    }
}
