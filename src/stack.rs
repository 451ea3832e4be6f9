//! Composition of retry and reporting around one operation.
//!
//! Wrapping order is fixed: the reporter (when present) sits outside the retry
//! policy, so retries observe raw errors and the reporter only sees what
//! escapes the whole retry sequence. With a suppressing reporter the caller
//! receives `Ok(None)` after exhaustion; with no reporter, failures propagate.

use crate::class::Classify;
use crate::report::ReportPolicy;
use crate::retry::RetryPolicy;
use std::future::Future;

/// A composed guard around a fallible operation: optional retry, optional
/// failure reporting.
#[derive(Debug, Clone, Default)]
pub struct GuardStack {
    retry: Option<RetryPolicy>,
    report: Option<ReportPolicy>,
}

impl GuardStack {
    pub fn builder() -> GuardStackBuilder {
        GuardStackBuilder::default()
    }

    /// Execute the operation through the configured wrappers.
    ///
    /// Callers must handle all three outcomes: `Ok(Some(value))` (success),
    /// `Ok(None)` (failure suppressed by the reporter), `Err(error)`
    /// (propagated failure).
    pub async fn execute<T, E, Fut, Op>(&self, operation: Op) -> Result<Option<T>, E>
    where
        T: Send,
        E: Classify,
        Fut: Future<Output = Result<T, E>> + Send,
        Op: FnMut() -> Fut + Send,
    {
        match (&self.report, &self.retry) {
            (Some(report), Some(retry)) => report.execute(|| retry.execute(operation)).await,
            (Some(report), None) => report.execute(operation).await,
            (None, Some(retry)) => retry.execute(operation).await.map(Some),
            (None, None) => {
                let mut operation = operation;
                operation().await.map(Some)
            }
        }
    }
}

/// Builder for [`GuardStack`].
#[derive(Debug, Clone, Default)]
pub struct GuardStackBuilder {
    retry: Option<RetryPolicy>,
    report: Option<ReportPolicy>,
}

impl GuardStackBuilder {
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    pub fn report(mut self, policy: ReportPolicy) -> Self {
        self.report = Some(policy);
        self
    }

    pub fn build(self) -> GuardStack {
        GuardStack { retry: self.retry, report: self.report }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::MemoryNotifier;
    use crate::sleeper::InstantSleeper;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct TestError(&'static str);

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    impl std::error::Error for TestError {}
    impl Classify for TestError {}

    #[tokio::test]
    async fn bare_stack_passes_values_through() {
        let stack = GuardStack::builder().build();
        let result: Result<Option<u32>, TestError> = stack.execute(|| async { Ok(5) }).await;
        assert_eq!(result.unwrap(), Some(5));
    }

    #[tokio::test]
    async fn bare_stack_propagates_errors() {
        let stack = GuardStack::builder().build();
        let result: Result<Option<u32>, TestError> =
            stack.execute(|| async { Err(TestError("raw")) }).await;
        assert_eq!(result.unwrap_err(), TestError("raw"));
    }

    #[tokio::test]
    async fn retry_only_stack_maps_success_to_some() {
        let retry = RetryPolicy::builder()
            .max_attempts(3)
            .with_sleeper(InstantSleeper)
            .build()
            .expect("builder");
        let stack = GuardStack::builder().retry(retry).build();

        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();

        let result = stack
            .execute(|| {
                let calls = calls_clone.clone();
                async move {
                    let n = calls.fetch_add(1, Ordering::SeqCst);
                    if n < 1 {
                        Err(TestError("flaky"))
                    } else {
                        Ok("bars")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), Some("bars"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn suppressing_reporter_catches_exhausted_retries() {
        let notifier = MemoryNotifier::new();
        let retry = RetryPolicy::builder()
            .max_attempts(3)
            .notifier(notifier.clone())
            .with_sleeper(InstantSleeper)
            .build()
            .expect("builder");
        let report = ReportPolicy::new(notifier.clone());
        let stack = GuardStack::builder().retry(retry).report(report).build();

        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();

        let result: Result<Option<u32>, TestError> = stack
            .execute(|| {
                let calls = calls_clone.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(TestError("provider down"))
                }
            })
            .await;

        assert_eq!(result.unwrap(), None, "exhausted failure is suppressed");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 3 retry alerts plus 1 failure report
        assert_eq!(notifier.sent().len(), 4);
    }

    #[tokio::test]
    async fn reporter_sees_nothing_when_retries_recover() {
        let notifier = MemoryNotifier::new();
        let retry = RetryPolicy::builder()
            .max_attempts(3)
            .with_sleeper(InstantSleeper)
            .build()
            .expect("builder");
        let report = ReportPolicy::new(notifier.clone());
        let stack = GuardStack::builder().retry(retry).report(report).build();

        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();

        let result = stack
            .execute(|| {
                let calls = calls_clone.clone();
                async move {
                    let n = calls.fetch_add(1, Ordering::SeqCst);
                    if n < 2 {
                        Err(TestError("flaky"))
                    } else {
                        Ok(1)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), Some(1));
        assert!(notifier.sent().is_empty(), "recovered runs report nothing");
    }
}
