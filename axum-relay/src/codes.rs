//! Error code registry
//!
//! Maps application failures to the integer code carried in the response
//! envelope. Every lookup runs against the failure's root cause, the
//! innermost error of its source chain, so a registered leaf error keeps its
//! code no matter how much context gets wrapped around it on the way up.
//!
//! # Example
//!
//! ```rust
//! use axum_relay::codes::ErrorCodes;
//!
//! #[derive(Debug, PartialEq, thiserror::Error)]
//! enum CatalogError {
//!     #[error("widget not found")]
//!     NotFound,
//! }
//!
//! let codes = ErrorCodes::new().register_value(CatalogError::NotFound, 40401);
//!
//! let err = anyhow::Error::new(CatalogError::NotFound).context("loading widget 42");
//! assert_eq!(codes.resolve(&err), Some(40401));
//! ```

use std::error::Error as StdError;
use std::fmt;

type Predicate = Box<dyn Fn(&(dyn StdError + 'static)) -> bool + Send + Sync>;

struct CodeEntry {
    code: i64,
    matches: Predicate,
}

/// Registry resolving failures to envelope codes
///
/// Built once at startup and read-only afterwards. Entries are consulted in
/// registration order and the first match wins, so list specific entries
/// before broad ones.
#[derive(Default)]
pub struct ErrorCodes {
    entries: Vec<CodeEntry>,
}

impl fmt::Debug for ErrorCodes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorCodes")
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl ErrorCodes {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Map every root cause of type `E` to `code`
    #[must_use]
    pub fn register<E>(mut self, code: i64) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.entries.push(CodeEntry {
            code,
            matches: Box::new(|root: &(dyn StdError + 'static)| root.is::<E>()),
        });
        self
    }

    /// Map root causes of type `E` equal to `value` to `code`
    ///
    /// The Rust rendering of keying on a sentinel error value: variants of
    /// one error enum can carry distinct codes.
    #[must_use]
    pub fn register_value<E>(mut self, value: E, code: i64) -> Self
    where
        E: StdError + PartialEq + Send + Sync + 'static,
    {
        self.entries.push(CodeEntry {
            code,
            matches: Box::new(move |root: &(dyn StdError + 'static)| {
                root.downcast_ref::<E>() == Some(&value)
            }),
        });
        self
    }

    /// Map root causes satisfying `predicate` to `code`
    #[must_use]
    pub fn register_with<F>(mut self, code: i64, predicate: F) -> Self
    where
        F: Fn(&(dyn StdError + 'static)) -> bool + Send + Sync + 'static,
    {
        self.entries.push(CodeEntry {
            code,
            matches: Box::new(predicate),
        });
        self
    }

    /// Number of registered entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve the envelope code for a failure
    ///
    /// Returns `None` when no entry matches the root cause. Resolution is
    /// pure: the same error against the same registry always yields the same
    /// code.
    pub fn resolve(&self, err: &anyhow::Error) -> Option<i64> {
        let root = err.root_cause();
        self.entries
            .iter()
            .find(|entry| (entry.matches)(root))
            .map(|entry| entry.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error, PartialEq)]
    enum CatalogError {
        #[error("widget not found")]
        NotFound,
        #[error("widget already exists")]
        Duplicate,
    }

    #[derive(Debug, Error)]
    #[error("quota exhausted")]
    struct QuotaError;

    fn registry() -> ErrorCodes {
        ErrorCodes::new()
            .register_value(CatalogError::NotFound, 40401)
            .register_value(CatalogError::Duplicate, 40901)
            .register::<QuotaError>(42901)
    }

    #[test]
    fn test_resolve_by_value() {
        let err = anyhow::Error::new(CatalogError::NotFound);
        assert_eq!(registry().resolve(&err), Some(40401));

        let err = anyhow::Error::new(CatalogError::Duplicate);
        assert_eq!(registry().resolve(&err), Some(40901));
    }

    #[test]
    fn test_resolve_by_type() {
        let err = anyhow::Error::new(QuotaError);
        assert_eq!(registry().resolve(&err), Some(42901));
    }

    #[test]
    fn test_resolve_sees_through_wrapping() {
        let err = anyhow::Error::new(CatalogError::NotFound)
            .context("loading widget 42")
            .context("GET /widgets/42");
        assert_eq!(registry().resolve(&err), Some(40401));
    }

    #[test]
    fn test_unregistered_error_unresolved() {
        let err = anyhow::anyhow!("some ad-hoc failure");
        assert_eq!(registry().resolve(&err), None);
    }

    #[test]
    fn test_first_match_wins() {
        let codes = ErrorCodes::new()
            .register::<QuotaError>(1)
            .register::<QuotaError>(2);
        let err = anyhow::Error::new(QuotaError);
        assert_eq!(codes.resolve(&err), Some(1));
    }

    #[test]
    fn test_register_with_predicate() {
        let codes =
            ErrorCodes::new().register_with(50001, |root| root.to_string().contains("timeout"));
        let err = anyhow::anyhow!("upstream timeout after 3s");
        assert_eq!(codes.resolve(&err), Some(50001));

        let err = anyhow::anyhow!("connection refused");
        assert_eq!(codes.resolve(&err), None);
    }

    #[test]
    fn test_empty_registry() {
        let codes = ErrorCodes::new();
        assert!(codes.is_empty());
        assert_eq!(codes.len(), 0);
        assert_eq!(codes.resolve(&anyhow::anyhow!("anything")), None);
    }
}
