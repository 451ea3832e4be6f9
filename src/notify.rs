//! Out-of-band alert delivery.
//!
//! Policies report failures through a [`Notifier`]: a best-effort, fire-and-forget
//! channel to wherever operators watch (email relay, chat webhook, ticket queue).
//! The core never inspects delivery results; an implementation that cannot send
//! should log and move on rather than surface an error into the hot path.
//!
//! Three implementations ship in-crate:
//! - [`NoopNotifier`]: discards everything (the default on a bare policy).
//! - [`TracingNotifier`]: routes alerts into the `tracing` log stream.
//! - [`MemoryNotifier`]: records every send for assertions in tests.

use async_trait::async_trait;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Content type tag for an alert body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    /// Plain text body.
    Plain,
    /// Markup body (line breaks rendered as `<br/>`).
    Markup,
}

/// Fixed addressing for a policy's alerts: who gets them and under what subject.
///
/// Configured once at policy construction and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertRoute {
    /// Recipient identifier, in whatever form the notifier understands.
    pub recipient: String,
    /// Subject tag identifying the sending application.
    pub subject: String,
}

impl AlertRoute {
    pub fn new(recipient: impl Into<String>, subject: impl Into<String>) -> Self {
        Self { recipient: recipient.into(), subject: subject.into() }
    }
}

impl Default for AlertRoute {
    fn default() -> Self {
        Self::new("ops", "operation alert")
    }
}

/// Best-effort alert channel.
///
/// `send` must not block the caller on delivery confirmation; implementations
/// that talk to slow transports should hand off internally.
#[async_trait]
pub trait Notifier: Send + Sync + fmt::Debug {
    async fn send(&self, recipient: &str, body: &str, subject: &str, content_type: ContentType);
}

/// Notifier that discards every alert.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send(&self, _recipient: &str, _body: &str, _subject: &str, _content_type: ContentType) {
    }
}

/// Notifier that emits alerts as `tracing` warnings.
///
/// Useful when no external channel is wired up yet but alerts should still be
/// visible in operator logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn send(&self, recipient: &str, body: &str, subject: &str, content_type: ContentType) {
        tracing::warn!(recipient, subject, content_type = ?content_type, body, "alert dispatched");
    }
}

/// A single recorded alert, as captured by [`MemoryNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentAlert {
    pub recipient: String,
    pub body: String,
    pub subject: String,
    pub content_type: ContentType,
}

/// Test notifier that records every send.
#[derive(Debug, Clone, Default)]
pub struct MemoryNotifier {
    sent: Arc<Mutex<Vec<SentAlert>>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self { sent: Arc::new(Mutex::new(Vec::new())) }
    }

    /// Snapshot of every alert sent so far, in send order.
    pub fn sent(&self) -> Vec<SentAlert> {
        self.sent.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn send(&self, recipient: &str, body: &str, subject: &str, content_type: ContentType) {
        self.sent.lock().unwrap().push(SentAlert {
            recipient: recipient.to_string(),
            body: body.to_string(),
            subject: subject.to_string(),
            content_type,
        });
    }
}
