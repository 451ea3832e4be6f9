//! Pre-configured guard stacks for common call sites.
//!
//! These mirror the configurations the surrounding data pipeline runs its
//! fetches under, so route handlers compose one call instead of wiring
//! policies by hand.

use crate::notify::{AlertRoute, Notifier};
use crate::report::ReportPolicy;
use crate::retry::RetryPolicy;
use crate::stack::GuardStack;
use crate::Backoff;
use std::sync::Arc;
use std::time::Duration;

const DATA_FETCH_ATTEMPTS: usize = 3;
const DATA_FETCH_BASE_DELAY: Duration = Duration::from_secs(1);

/// Guard for third-party data fetches behind a web route.
///
/// 3 attempts with linear 1s backoff, every failure alerted, and a
/// suppressing reporter outermost: an exhausted fetch yields `Ok(None)` to
/// the route instead of crashing it, and operators learn of the failure from
/// the alert channel.
pub fn data_fetch(route: AlertRoute, notifier: Arc<dyn Notifier>) -> GuardStack {
    GuardStack::builder()
        .retry(fetch_retry(route.clone(), notifier.clone()))
        .report(ReportPolicy::with_shared(notifier).route(route))
        .build()
}

/// Like [`data_fetch`], but failures propagate to the caller after reporting.
pub fn strict_fetch(route: AlertRoute, notifier: Arc<dyn Notifier>) -> GuardStack {
    GuardStack::builder()
        .retry(fetch_retry(route.clone(), notifier.clone()))
        .report(ReportPolicy::with_shared(notifier).route(route).propagating())
        .build()
}

fn fetch_retry(route: AlertRoute, notifier: Arc<dyn Notifier>) -> RetryPolicy {
    RetryPolicy::builder()
        .max_attempts(DATA_FETCH_ATTEMPTS)
        .backoff(Backoff::linear(DATA_FETCH_BASE_DELAY))
        .route(route)
        .shared_notifier(notifier)
        .build()
        .expect("preset retry configuration is valid")
}
