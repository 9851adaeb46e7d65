//! Test doubles for the sync adapter's collaborators
//!
//! Recording implementations of [`NotificationSink`] and [`ListingView`],
//! plus a scripted [`Transport`]. Used by the crate's own tests and
//! available to embedders testing their wiring.

use async_trait::async_trait;
use serde_json::Value;
use shared::FormBody;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;

use crate::http::{Action, Transport};
use crate::notify::{ListingView, NotificationSink};
use crate::{ClientError, ClientResult};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A notification as seen by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success { title: Option<String>, message: String },
    Error { title: String, detail: String },
}

/// Notification sink that records every call
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    /// Drain the recorded notifications
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *lock(&self.events))
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify_success(&self, title: Option<&str>, message: &str) {
        lock(&self.events).push(Notification::Success {
            title: title.map(String::from),
            message: message.to_string(),
        });
    }

    fn notify_error(&self, title: &str, detail: &str) {
        lock(&self.events).push(Notification::Error {
            title: title.to_string(),
            detail: detail.to_string(),
        });
    }
}

/// Listing view that counts refresh calls
#[derive(Debug, Default)]
pub struct RecordingListing {
    refreshes: AtomicUsize,
}

impl RecordingListing {
    pub fn count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

impl ListingView for RecordingListing {
    fn refresh(&self) {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
    }
}

type ErrorFactory = Box<dyn Fn() -> ClientError + Send + Sync>;

enum Script {
    /// Replies taken in order; the last one repeats
    Replies(Mutex<VecDeque<ClientResult<Value>>>),
    /// Every call fails with a fresh error
    Fail(ErrorFactory),
}

/// Scripted transport recording every request
pub struct MockTransport {
    script: Script,
    gate: Option<Arc<Notify>>,
    requests: Mutex<Vec<(Action, FormBody)>>,
}

impl MockTransport {
    /// Always reply with `body`
    pub fn replying(body: Value) -> Self {
        Self::sequence(vec![Ok(body)])
    }

    /// Reply with each result in turn
    pub fn sequence(replies: Vec<ClientResult<Value>>) -> Self {
        Self {
            script: Script::Replies(Mutex::new(replies.into())),
            gate: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Fail every request with the error built by `make`
    pub fn failing(make: impl Fn() -> ClientError + Send + Sync + 'static) -> Self {
        Self {
            script: Script::Fail(Box::new(make)),
            gate: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Reply with `body` only once the returned gate is notified
    pub fn gated(body: Value) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let mut transport = Self::replying(body);
        transport.gate = Some(gate.clone());
        (transport, gate)
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<(Action, FormBody)> {
        lock(&self.requests).clone()
    }

    fn next_reply(&self) -> ClientResult<Value> {
        match &self.script {
            Script::Fail(make) => Err(make()),
            Script::Replies(replies) => {
                let mut replies = lock(replies);
                if replies.len() > 1 {
                    replies.pop_front().unwrap_or_else(|| Ok(Value::Null))
                } else {
                    match replies.front() {
                        Some(Ok(body)) => Ok(body.clone()),
                        Some(Err(e)) => Err(ClientError::InvalidResponse(e.to_string())),
                        None => Ok(Value::Null),
                    }
                }
            }
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn post_form(&self, action: Action, form: &FormBody) -> ClientResult<Value> {
        lock(&self.requests).push((action, form.clone()));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.next_reply()
    }
}
