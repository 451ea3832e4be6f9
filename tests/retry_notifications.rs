use diehard::{
    AlertRoute, Backoff, Classify, ContentType, MemoryNotifier, RetryPolicy, TrackingSleeper,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
struct FetchError(String);

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for FetchError {}
impl Classify for FetchError {}

fn policy(
    max_attempts: usize,
    base_delay: Duration,
    notifier: &MemoryNotifier,
    sleeper: &TrackingSleeper,
) -> RetryPolicy {
    RetryPolicy::builder()
        .max_attempts(max_attempts)
        .backoff(Backoff::linear(base_delay))
        .notifier(notifier.clone())
        .with_sleeper(sleeper.clone())
        .route(AlertRoute::new("ops@example.com", "algo error"))
        .build()
        .expect("policy")
}

#[tokio::test]
async fn two_failures_then_success_returns_value_with_escalating_delays() {
    let notifier = MemoryNotifier::new();
    let sleeper = TrackingSleeper::new();
    let retry = policy(3, Duration::from_secs(1), &notifier, &sleeper);

    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = calls.clone();

    let result = retry
        .execute(|| {
            let calls = calls_clone.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(FetchError(format!("failure {n}")))
                } else {
                    Ok(42)
                }
            }
        })
        .await;

    assert_eq!(result.unwrap(), 42);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(notifier.sent().len(), 2);
    assert_eq!(sleeper.calls(), vec![Duration::from_secs(1), Duration::from_secs(2)]);
}

#[tokio::test]
async fn zero_base_delay_still_runs_the_loop_and_alerts() {
    let notifier = MemoryNotifier::new();
    let sleeper = TrackingSleeper::new();
    let retry = policy(2, Duration::ZERO, &notifier, &sleeper);

    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = calls.clone();

    let result: Result<(), FetchError> = retry
        .execute(|| {
            let calls = calls_clone.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(FetchError("timeout".into()))
            }
        })
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(notifier.sent().len(), 2);
    assert_eq!(result.unwrap_err().to_string(), "timeout");
    // One zero-duration wait between the two attempts, none after exhaustion
    assert_eq!(sleeper.calls(), vec![Duration::ZERO]);
}

#[tokio::test]
async fn always_failing_operation_runs_exactly_max_attempts() {
    for max_attempts in 1..=5 {
        let notifier = MemoryNotifier::new();
        let sleeper = TrackingSleeper::new();
        let retry = policy(max_attempts, Duration::from_secs(1), &notifier, &sleeper);

        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();

        let result: Result<(), FetchError> = retry
            .execute(|| {
                let calls = calls_clone.clone();
                async move {
                    let n = calls.fetch_add(1, Ordering::SeqCst);
                    Err(FetchError(format!("failure {n}")))
                }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), max_attempts);
        assert_eq!(
            result.unwrap_err(),
            FetchError(format!("failure {}", max_attempts - 1)),
            "the propagated error is the last attempt's"
        );
        assert_eq!(notifier.sent().len(), max_attempts);
        assert_eq!(sleeper.calls().len(), max_attempts - 1);
    }
}

#[tokio::test]
async fn delays_are_monotonically_non_decreasing() {
    let notifier = MemoryNotifier::new();
    let sleeper = TrackingSleeper::new();
    let retry = policy(6, Duration::from_millis(250), &notifier, &sleeper);

    let _ = retry
        .execute(|| async { Err::<(), _>(FetchError("persistent".into())) })
        .await;

    let delays = sleeper.calls();
    assert_eq!(delays.len(), 5);
    for pair in delays.windows(2) {
        assert!(pair[1] >= pair[0]);
    }
}

#[tokio::test]
async fn alerts_are_plain_text_on_the_configured_route() {
    let notifier = MemoryNotifier::new();
    let sleeper = TrackingSleeper::new();
    let retry = policy(2, Duration::from_secs(1), &notifier, &sleeper);

    let _ = retry
        .execute(|| async { Err::<(), _>(FetchError("rate limited".into())) })
        .await;

    for alert in notifier.sent() {
        assert_eq!(alert.recipient, "ops@example.com");
        assert_eq!(alert.subject, "algo error");
        assert_eq!(alert.body, "Retry, exception: rate limited");
        assert_eq!(alert.content_type, ContentType::Plain);
    }
}
