#![forbid(unsafe_code)]
#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::all))]

//! # Diehard
//!
//! Retry and failure-alerting primitives for fallible async operations:
//! bounded retry with escalating backoff, failure classification, and
//! out-of-band alert delivery.
//!
//! ## Features
//!
//! - **Retry policies** with classification-aware fail-fast, linear/constant/
//!   exponential backoff, and one alert per failed attempt
//! - **Failure reporting** that captures an error's cause chain, ships it to
//!   an operations channel, and suppresses or propagates per configuration
//! - **Pluggable alert channels** behind the [`Notifier`] trait
//! - **Composable stacks** via [`GuardStack`] or tower layers
//! - **Deterministic tests** through injectable sleepers and a recording
//!   notifier
//!
//! ## Quick Start
//!
//! ```rust
//! use diehard::{Backoff, Classify, RetryPolicy};
//! use std::time::Duration;
//!
//! #[derive(Debug)]
//! struct FetchError;
//! impl std::fmt::Display for FetchError {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "fetch failed")
//!     }
//! }
//! impl std::error::Error for FetchError {}
//! impl Classify for FetchError {}
//!
//! #[tokio::main]
//! async fn main() {
//!     let policy = RetryPolicy::builder()
//!         .max_attempts(3)
//!         .backoff(Backoff::linear(Duration::from_secs(1)))
//!         .build()
//!         .unwrap();
//!
//!     let result: Result<&str, FetchError> = policy
//!         .execute(|| async {
//!             // Your fallible fetch here
//!             Ok("candles")
//!         })
//!         .await;
//!     assert!(result.is_ok());
//! }
//! ```

pub mod backoff;
pub mod class;
pub mod jitter;
pub mod notify;
pub mod prelude;
pub mod presets;
pub mod report;
pub mod retry;
pub mod sleeper;
pub mod stack;

// Re-exports
pub use backoff::{Backoff, BackoffError, MAX_BACKOFF};
pub use class::{Classify, FailureClass, RetryOn};
pub use jitter::Jitter;
pub use notify::{
    AlertRoute, ContentType, MemoryNotifier, NoopNotifier, Notifier, SentAlert, TracingNotifier,
};
pub use report::{FailureReport, ReportLayer, ReportMode, ReportPolicy, ReportService};
pub use retry::{BuildError, RetryLayer, RetryPolicy, RetryPolicyBuilder, RetryService};
pub use sleeper::{InstantSleeper, Sleeper, TokioSleeper, TrackingSleeper};
pub use stack::{GuardStack, GuardStackBuilder};
