#![forbid(unsafe_code)]

//! Error type for mutations rejected by the backing object.

use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, ReactiveError>;

/// Errors surfaced by intercepted (and raw) mutations.
///
/// Failures come from the backing object itself, never from the tracking
/// machinery: a missing dependency entry is a no-op, and non-object inputs to
/// wrapping pass through unchanged. A failed mutation fires no notification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReactiveError {
    /// Write rejected because the target object is frozen.
    #[error("cannot write property `{key}`: target object is frozen")]
    FrozenWrite {
        /// The property the write was addressed to.
        key: String,
    },

    /// Delete rejected because the target object is frozen.
    #[error("cannot delete property `{key}`: target object is frozen")]
    FrozenDelete {
        /// The property the delete was addressed to.
        key: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_key() {
        let err = ReactiveError::FrozenWrite { key: "name".into() };
        assert!(err.to_string().contains("`name`"));
        assert!(err.to_string().contains("frozen"));

        let err = ReactiveError::FrozenDelete { key: "age".into() };
        assert!(err.to_string().contains("`age`"));
    }

    #[test]
    fn errors_compare_by_variant_and_key() {
        let a = ReactiveError::FrozenWrite { key: "x".into() };
        let b = ReactiveError::FrozenWrite { key: "x".into() };
        let c = ReactiveError::FrozenDelete { key: "x".into() };
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
