//! Failure capture and alerting.
//!
//! [`ReportPolicy`] guarantees that any error escaping a wrapped operation is
//! captured, formatted, and reported exactly once, then either suppressed or
//! propagated per [`ReportMode`]:
//!
//! - On success the operation's value passes through untouched, no side
//!   effects.
//! - On failure a [`FailureReport`] is captured (class, message, cause trace,
//!   timestamp), rendered as markup, and sent through the [`Notifier`] to the
//!   policy's fixed [`AlertRoute`]; a local `tracing::error!` diagnostic is
//!   emitted alongside.
//! - `ReportMode::Suppress` (the default) then yields `Ok(None)` so the caller
//!   observes a soft no-value instead of a hard failure; operators learn of
//!   the error from the alert channel. `ReportMode::Propagate` re-surfaces the
//!   original error after reporting, for callers that must observe failure.
//!
//! The trace is the error's cause chain rendered top-level error first, root
//! cause last, the same oldest-call-first reading as an interpreter
//! traceback, one line per link.

use crate::class::{Classify, FailureClass};
use crate::notify::{AlertRoute, ContentType, Notifier};
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use std::time::SystemTime;
use tower_layer::Layer;
use tower_service::Service;

/// What to do with a failure after it has been reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportMode {
    /// Swallow the failure; the wrapped call yields no value.
    #[default]
    Suppress,
    /// Re-surface the original error to the caller.
    Propagate,
}

/// Captured record of an escaped error, consumed by the alert channel.
#[derive(Debug, Clone)]
pub struct FailureReport {
    pub class: FailureClass,
    pub message: String,
    /// Cause chain, top-level error first, root cause last.
    pub trace: Vec<String>,
    pub timestamp: SystemTime,
}

impl FailureReport {
    /// Capture a report from an error at the moment it is caught.
    pub fn capture<E: Classify>(error: &E) -> Self {
        let mut trace = vec![error.to_string()];
        let mut source = std::error::Error::source(error);
        while let Some(cause) = source {
            trace.push(format!("caused by: {cause}"));
            source = cause.source();
        }
        Self {
            class: error.class(),
            message: error.to_string(),
            trace,
            timestamp: SystemTime::now(),
        }
    }

    /// Render the trace as one markup string for rich delivery.
    pub fn render_markup(&self) -> String {
        self.trace.join("<br/> ")
    }

    /// Render the trace as plain text, one line per link.
    pub fn render_plain(&self) -> String {
        self.trace.join("\n")
    }
}

/// Policy that reports any escaped error and then suppresses or propagates it.
#[derive(Debug, Clone)]
pub struct ReportPolicy {
    route: AlertRoute,
    mode: ReportMode,
    notifier: Arc<dyn Notifier>,
}

impl ReportPolicy {
    /// Report through the given notifier, suppressing failures by default.
    pub fn new<N>(notifier: N) -> Self
    where
        N: Notifier + 'static,
    {
        Self { route: AlertRoute::default(), mode: ReportMode::Suppress, notifier: Arc::new(notifier) }
    }

    /// Report through a shared notifier.
    pub fn with_shared(notifier: Arc<dyn Notifier>) -> Self {
        Self { route: AlertRoute::default(), mode: ReportMode::Suppress, notifier }
    }

    /// Set the recipient and subject for failure reports.
    pub fn route(mut self, route: AlertRoute) -> Self {
        self.route = route;
        self
    }

    /// Set the post-report behavior.
    pub fn mode(mut self, mode: ReportMode) -> Self {
        self.mode = mode;
        self
    }

    /// Re-surface errors after reporting instead of suppressing them.
    pub fn propagating(self) -> Self {
        self.mode(ReportMode::Propagate)
    }

    /// Invoke the operation, reporting any escaped error exactly once.
    ///
    /// Returns `Ok(Some(value))` on success, `Ok(None)` for a suppressed
    /// failure, `Err(error)` for a reported-then-propagated failure.
    pub async fn execute<T, E, Fut, Op>(&self, operation: Op) -> Result<Option<T>, E>
    where
        T: Send,
        E: Classify,
        Fut: Future<Output = Result<T, E>> + Send,
        Op: FnOnce() -> Fut + Send,
    {
        match operation().await {
            Ok(value) => Ok(Some(value)),
            Err(error) => {
                let report = FailureReport::capture(&error);
                self.notifier
                    .send(
                        &self.route.recipient,
                        &report.render_markup(),
                        &self.route.subject,
                        ContentType::Markup,
                    )
                    .await;
                tracing::error!(
                    class = ?report.class,
                    error = %report.message,
                    trace = %report.render_plain(),
                    "operation failed"
                );
                match self.mode {
                    ReportMode::Suppress => {
                        tracing::debug!("failure suppressed after reporting");
                        Ok(None)
                    }
                    ReportMode::Propagate => Err(error),
                }
            }
        }
    }
}

/// Tower-native reporting layer.
///
/// The produced service's response type is `Option<Response>`: suppress mode
/// maps a reported failure to `Ok(None)`.
#[derive(Clone)]
pub struct ReportLayer {
    policy: ReportPolicy,
}

impl ReportLayer {
    pub fn new(policy: ReportPolicy) -> Self {
        Self { policy }
    }
}

/// Reporting service produced by [`ReportLayer`].
#[derive(Clone)]
pub struct ReportService<S> {
    inner: S,
    policy: ReportPolicy,
}

impl<S, Request> Service<Request> for ReportService<S>
where
    Request: Send + 'static,
    S: Service<Request> + Clone + Send + 'static,
    S::Response: Send + 'static,
    S::Error: Classify,
    S::Future: Send + 'static,
{
    type Response = Option<S::Response>;
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
        let mut inner = self.inner.clone();
        Box::pin(async move { policy.execute(move || inner.call(req)).await })
    }
}

impl<S> Layer<S> for ReportLayer {
    type Service = ReportService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ReportService { inner, policy: self.policy.clone() }
    }
}
