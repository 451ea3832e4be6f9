//! Failure classification for retry decisions.
//!
//! Operations surface errors of arbitrary concrete types; the retry policy only
//! cares which *class* a failure falls into. Error types opt in by implementing
//! [`Classify`]; anything that does not override [`Classify::class`] lands in
//! [`FailureClass::Unclassified`], which the default [`RetryOn::Any`] policy
//! still retries, so unexpected failures are never silently dropped on the
//! first attempt.
//!
//! Example
//! ```rust
//! use diehard::{Classify, FailureClass, RetryOn};
//!
//! #[derive(Debug)]
//! struct ProviderTimeout;
//! impl std::fmt::Display for ProviderTimeout {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "provider timed out")
//!     }
//! }
//! impl std::error::Error for ProviderTimeout {}
//! impl Classify for ProviderTimeout {
//!     fn class(&self) -> FailureClass {
//!         FailureClass::Transient
//!     }
//! }
//!
//! let policy = RetryOn::classes([FailureClass::Transient]);
//! assert!(policy.permits(ProviderTimeout.class()));
//! assert!(!policy.permits(FailureClass::Permanent));
//! ```

/// Coarse failure classes understood by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureClass {
    /// Network or provider hiccup; retrying is likely to help.
    Transient,
    /// Bad input, auth failure, or other error retrying cannot fix.
    Permanent,
    /// Default bucket for errors that do not classify themselves.
    Unclassified,
}

/// Trait operations' error types implement to classify their failures.
///
/// The default implementation returns [`FailureClass::Unclassified`], so a
/// bare `impl Classify for MyError {}` is enough to use a type with the
/// default any-error retry policy.
pub trait Classify: std::error::Error + Send + Sync + 'static {
    /// The class this particular error instance falls into.
    fn class(&self) -> FailureClass {
        FailureClass::Unclassified
    }
}

/// The set of failure classes a retry policy treats as retryable.
///
/// [`RetryOn::Any`] is the default: every error is retryable regardless of
/// class. An explicit class list is taken literally; include
/// [`FailureClass::Unclassified`] if unexpected error types should keep
/// retrying under a restricted policy.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RetryOn {
    /// Every failure is retryable.
    #[default]
    Any,
    /// Only failures in the listed classes are retryable.
    Classes(Vec<FailureClass>),
}

impl RetryOn {
    /// Retry every failure.
    pub fn any() -> Self {
        RetryOn::Any
    }

    /// Retry only failures in the given classes.
    pub fn classes<I>(classes: I) -> Self
    where
        I: IntoIterator<Item = FailureClass>,
    {
        RetryOn::Classes(classes.into_iter().collect())
    }

    /// Retry transient failures only; permanent and unclassified fail fast.
    pub fn transient_only() -> Self {
        RetryOn::Classes(vec![FailureClass::Transient])
    }

    /// Whether a failure of the given class may be retried.
    pub fn permits(&self, class: FailureClass) -> bool {
        match self {
            RetryOn::Any => true,
            RetryOn::Classes(classes) => classes.contains(&class),
        }
    }
}
