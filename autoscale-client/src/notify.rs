//! Notification sink and listing view collaborators

use tokio::sync::broadcast;

/// Renders user-facing success/error messages
pub trait NotificationSink: Send + Sync {
    fn notify_success(&self, title: Option<&str>, message: &str);
    fn notify_error(&self, title: &str, detail: &str);
}

/// Sink that writes notifications to the tracing log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify_success(&self, title: Option<&str>, message: &str) {
        tracing::info!(title = title.unwrap_or_default(), "{}", message);
    }

    fn notify_error(&self, title: &str, detail: &str) {
        tracing::error!(detail, "{}", title);
    }
}

/// A collection display that can re-fetch and redraw itself
pub trait ListingView: Send + Sync {
    fn refresh(&self);
}

/// Refresh request broadcast to listing subscribers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshRequest;

/// Fire-and-forget refresh signal over a broadcast channel
#[derive(Debug, Clone)]
pub struct RefreshChannel {
    tx: broadcast::Sender<RefreshRequest>,
}

impl RefreshChannel {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RefreshRequest> {
        self.tx.subscribe()
    }
}

impl Default for RefreshChannel {
    fn default() -> Self {
        Self::new(16)
    }
}

impl ListingView for RefreshChannel {
    fn refresh(&self) {
        // No subscribers is fine, nobody is displaying the list
        if self.tx.send(RefreshRequest).is_err() {
            tracing::debug!("Listing refresh requested with no subscribers");
        }
    }
}
