//! Convenient re-exports for common diehard types.
pub use crate::{
    backoff::{Backoff, BackoffError, MAX_BACKOFF},
    class::{Classify, FailureClass, RetryOn},
    jitter::Jitter,
    notify::{AlertRoute, ContentType, MemoryNotifier, NoopNotifier, Notifier, TracingNotifier},
    report::{FailureReport, ReportLayer, ReportMode, ReportPolicy},
    retry::{BuildError, RetryLayer, RetryPolicy, RetryPolicyBuilder},
    sleeper::{InstantSleeper, Sleeper, TokioSleeper, TrackingSleeper},
    stack::{GuardStack, GuardStackBuilder},
};
