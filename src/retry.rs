//! Bounded retry with escalating delay and per-attempt alerting.
//!
//! Semantics:
//! - `max_attempts` counts total attempts (initial try + retries) and must be
//!   at least 1; the builder rejects 0.
//! - A failure is retried only if [`RetryOn`] permits its
//!   [`FailureClass`](crate::FailureClass);
//!   the default `RetryOn::Any` retries everything. A non-retryable failure
//!   propagates immediately with no alert and no delay.
//! - Every failed retryable attempt sends one alert through the configured
//!   [`Notifier`] with the body `"Retry, exception: <error>"`, including the
//!   final attempt before exhaustion.
//! - The wait after the i-th failed attempt (0-indexed) is
//!   `backoff.delay(i + 1)` (`base * (1 + i)` under the default linear
//!   schedule), applied through the [`Sleeper`]; no wait is scheduled after
//!   the final attempt.
//! - Exhaustion propagates the final attempt's error itself, never a
//!   synthesized aggregate.
//!
//! Example
//! ```rust
//! use std::time::Duration;
//! use diehard::{Backoff, Classify, RetryPolicy};
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
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let policy = RetryPolicy::builder()
//!     .max_attempts(3)
//!     .backoff(Backoff::linear(Duration::from_millis(1)))
//!     .build()
//!     .unwrap();
//! let result: Result<u32, FetchError> = policy.execute(|| async { Ok(42) }).await;
//! assert_eq!(result.unwrap(), 42);
//! # });
//! ```

use crate::class::{Classify, RetryOn};
use crate::notify::{AlertRoute, ContentType, NoopNotifier, Notifier};
use crate::sleeper::{Sleeper, TokioSleeper};
use crate::{Backoff, Jitter};
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tower_layer::Layer;
use tower_service::Service;

/// Retry policy combining attempt budget, backoff, jitter, failure
/// classification, sleeper, and alert route.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: usize,
    backoff: Backoff,
    jitter: Jitter,
    retry_on: RetryOn,
    sleeper: Arc<dyn Sleeper>,
    notifier: Arc<dyn Notifier>,
    route: AlertRoute,
}

/// Errors produced while building a retry policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("max_attempts must be > 0 (got {0})")]
    InvalidMaxAttempts(usize),
}

impl RetryPolicy {
    /// Construct a new builder with defaults.
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder::new()
    }

    /// Execute an async operation with retry semantics.
    ///
    /// Returns the operation's value as soon as an attempt succeeds; on
    /// exhaustion returns the error from the final attempt.
    pub async fn execute<T, E, Fut, Op>(&self, mut operation: Op) -> Result<T, E>
    where
        T: Send,
        E: Classify,
        Fut: Future<Output = Result<T, E>> + Send,
        Op: FnMut() -> Fut + Send,
    {
        for attempt in 0..self.max_attempts {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    let class = error.class();
                    if !self.retry_on.permits(class) {
                        tracing::warn!(?class, error = %error, "non-retryable failure, propagating");
                        return Err(error);
                    }

                    let body = format!("Retry, exception: {error}");
                    self.notifier
                        .send(&self.route.recipient, &body, &self.route.subject, ContentType::Plain)
                        .await;

                    // Final attempt: propagate the error itself, no further wait
                    if attempt + 1 >= self.max_attempts {
                        tracing::warn!(
                            attempts = self.max_attempts,
                            error = %error,
                            "retry attempts exhausted"
                        );
                        return Err(error);
                    }

                    let delay = self.jitter.apply(self.backoff.delay(attempt + 1));
                    tracing::warn!(
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "attempt failed, retrying"
                    );
                    self.sleeper.sleep(delay).await;
                }
            }
        }

        // Safety: the loop runs at least once (max_attempts >= 1 is enforced by
        // the builder) and the final iteration always returns.
        debug_assert!(false, "retry loop should have returned; this indicates a logic bug");
        unreachable!()
    }
}

/// Builder for [`RetryPolicy`].
pub struct RetryPolicyBuilder {
    max_attempts: usize,
    backoff: Backoff,
    jitter: Jitter,
    retry_on: RetryOn,
    sleeper: Arc<dyn Sleeper>,
    notifier: Arc<dyn Notifier>,
    route: AlertRoute,
}

impl RetryPolicyBuilder {
    /// Create a builder with defaults: 3 attempts, linear 1s backoff, no
    /// jitter, any-error retry, tokio sleeper, no-op notifier.
    pub fn new() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::linear(Duration::from_secs(1)),
            jitter: Jitter::None,
            retry_on: RetryOn::Any,
            sleeper: Arc::new(TokioSleeper),
            notifier: Arc::new(NoopNotifier),
            route: AlertRoute::default(),
        }
    }

    /// Set total attempts (initial + retries). Must be > 0.
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set the backoff schedule.
    pub fn backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Set the jitter strategy.
    pub fn with_jitter(mut self, jitter: Jitter) -> Self {
        self.jitter = jitter;
        self
    }

    /// Restrict which failure classes are retryable.
    pub fn retry_on(mut self, retry_on: RetryOn) -> Self {
        self.retry_on = retry_on;
        self
    }

    /// Provide a custom sleeper implementation.
    pub fn with_sleeper<S>(mut self, sleeper: S) -> Self
    where
        S: Sleeper + 'static,
    {
        self.sleeper = Arc::new(sleeper);
        self
    }

    /// Set the alert channel for per-attempt notifications.
    pub fn notifier<N>(mut self, notifier: N) -> Self
    where
        N: Notifier + 'static,
    {
        self.notifier = Arc::new(notifier);
        self
    }

    /// Set a shared alert channel.
    pub fn shared_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Set the recipient and subject for per-attempt alerts.
    pub fn route(mut self, route: AlertRoute) -> Self {
        self.route = route;
        self
    }

    /// Build the retry policy, validating inputs.
    pub fn build(self) -> Result<RetryPolicy, BuildError> {
        if self.max_attempts == 0 {
            return Err(BuildError::InvalidMaxAttempts(0));
        }
        Ok(RetryPolicy {
            max_attempts: self.max_attempts,
            backoff: self.backoff,
            jitter: self.jitter,
            retry_on: self.retry_on,
            sleeper: self.sleeper,
            notifier: self.notifier,
            route: self.route,
        })
    }
}

impl Default for RetryPolicyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Tower-native retry layer.
#[derive(Clone)]
pub struct RetryLayer {
    policy: RetryPolicy,
}

impl RetryLayer {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }
}

/// Retry service produced by [`RetryLayer`].
#[derive(Clone)]
pub struct RetryService<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S, Request> Service<Request> for RetryService<S>
where
    Request: Clone + Send + 'static,
    S: Service<Request> + Clone + Send + 'static,
    S::Response: Send + 'static,
    S::Error: Classify,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let policy = self.policy.clone();
        let inner = self.inner.clone();
        Box::pin(async move {
            policy
                .execute(move || {
                    let mut service = inner.clone();
                    let req = req.clone();
                    async move { service.call(req).await }
                })
                .await
        })
    }
}

impl<S> Layer<S> for RetryLayer {
    type Service = RetryService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RetryService { inner, policy: self.policy.clone() }
    }
}
