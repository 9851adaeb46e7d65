//! Launch configuration sync adapter
//!
//! Maps create/delete of a [`LaunchConfigurationSpec`] onto the autoscaling
//! console actions and turns each response into exactly one user-facing
//! notification.
//!
//! # Lifecycle
//!
//! Every call is a single-shot state machine:
//!
//! ```text
//! Pending ──response──▶ Succeeded
//!    │
//!    └──failure───────▶ Failed(kind)
//! ```
//!
//! `Pending` is entered on dispatch. The terminal state is reached once,
//! there are no intermediate states and no cancellation. Completions of
//! concurrent calls for the same name are not ordered; the last one to run
//! decides what the user saw last.

use serde_json::Value;
use shared::{AutoscalingResponse, FormBody, LaunchConfigurationSpec};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::Instrument;

use crate::csrf::{CsrfTokenSource, StaticToken, XSRF_FIELD};
use crate::escape::{HtmlEncoder, HtmlEscaper};
use crate::http::{Action, NetworkTransport, Transport};
use crate::i18n::{MessageCatalog, MessageKey, PropertiesCatalog};
use crate::notify::{ListingView, NotificationSink, TracingNotifier};
use crate::{ClientError, ClientResult, SyncConfig};

/// Why a sync call ended in `Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Request not sent, network failure, non-2xx or undecodable body
    Transport,
    /// Well-formed response without a truthy `results`
    Application,
    /// The completion task stopped before reaching a terminal state
    Interrupted,
}

/// State of a single sync call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Pending,
    Succeeded,
    Failed(FailureKind),
}

impl SyncState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SyncState::Pending)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SyncState::Succeeded)
    }
}

/// Handle to a dispatched sync call
///
/// Dropping the handle does not cancel the request; the notification is
/// still emitted when the response arrives.
#[derive(Debug)]
pub struct PendingSync {
    action: Action,
    name: String,
    rx: watch::Receiver<SyncState>,
}

impl PendingSync {
    pub fn action(&self) -> Action {
        self.action
    }

    /// Identity of the launch configuration
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current state without waiting
    pub fn state(&self) -> SyncState {
        *self.rx.borrow()
    }

    /// Wait for the terminal state
    pub async fn wait(mut self) -> SyncState {
        match self.rx.wait_for(SyncState::is_terminal).await {
            Ok(state) => *state,
            Err(_) => {
                tracing::error!(action = %self.action, name = %self.name, "Sync task ended without an outcome");
                SyncState::Failed(FailureKind::Interrupted)
            }
        }
    }
}

/// Injected collaborators of the sync adapter
#[derive(Clone)]
pub struct Collaborators {
    pub csrf: Arc<dyn CsrfTokenSource>,
    pub escaper: Arc<dyn HtmlEscaper>,
    pub catalog: Arc<dyn MessageCatalog>,
    pub notifier: Arc<dyn NotificationSink>,
    pub listing: Arc<dyn ListingView>,
}

impl Collaborators {
    /// Collaborators with the default escaper and the English catalog
    pub fn new(
        csrf: Arc<dyn CsrfTokenSource>,
        notifier: Arc<dyn NotificationSink>,
        listing: Arc<dyn ListingView>,
    ) -> Self {
        Self {
            csrf,
            escaper: Arc::new(HtmlEncoder),
            catalog: Arc::new(PropertiesCatalog::english()),
            notifier,
            listing,
        }
    }

    pub fn with_escaper(mut self, escaper: Arc<dyn HtmlEscaper>) -> Self {
        self.escaper = escaper;
        self
    }

    pub fn with_catalog(mut self, catalog: Arc<dyn MessageCatalog>) -> Self {
        self.catalog = catalog;
        self
    }
}

/// Resource sync adapter for launch configurations
#[derive(Clone)]
pub struct LaunchConfigSync {
    transport: Arc<dyn Transport>,
    collab: Collaborators,
}

impl LaunchConfigSync {
    pub fn new(transport: Arc<dyn Transport>, collaborators: Collaborators) -> Self {
        Self {
            transport,
            collab: collaborators,
        }
    }

    /// Build the network stack described by `config`
    ///
    /// The CSRF token comes from `config.xsrf_token` when set, otherwise
    /// from the `_xsrf` cookie of the transport's jar. Notifications go to
    /// the tracing log.
    pub fn from_config(config: &SyncConfig, listing: Arc<dyn ListingView>) -> ClientResult<Self> {
        let transport = NetworkTransport::new(config)?;

        let csrf: Arc<dyn CsrfTokenSource> = match &config.xsrf_token {
            Some(token) => Arc::new(StaticToken::new(token.clone())),
            None => Arc::new(transport.token_source()?),
        };

        let mut catalog = PropertiesCatalog::english();
        if let Some(path) = &config.message_catalog {
            catalog = catalog.merge(PropertiesCatalog::load(path)?);
        }

        let collab = Collaborators::new(csrf, Arc::new(TracingNotifier), listing)
            .with_catalog(Arc::new(catalog));
        Ok(Self::new(Arc::new(transport), collab))
    }

    /// Replace the notification sink chosen by [`LaunchConfigSync::from_config`]
    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
        self.collab.notifier = notifier;
        self
    }

    /// Dispatch creation and return immediately
    pub fn create(&self, spec: LaunchConfigurationSpec) -> PendingSync {
        self.dispatch(Action::CreateLaunchConfiguration, spec)
    }

    /// Dispatch deletion and return immediately
    pub fn delete(&self, spec: LaunchConfigurationSpec) -> PendingSync {
        self.dispatch(Action::DeleteLaunchConfiguration, spec)
    }

    /// Run creation inline and return the terminal state
    pub async fn create_now(&self, spec: &LaunchConfigurationSpec) -> SyncState {
        self.execute(Action::CreateLaunchConfiguration, spec).await
    }

    /// Run deletion inline and return the terminal state
    pub async fn delete_now(&self, spec: &LaunchConfigurationSpec) -> SyncState {
        self.execute(Action::DeleteLaunchConfiguration, spec).await
    }

    /// Request body for `action`, starting with the CSRF token
    pub fn build_form(&self, action: Action, spec: &LaunchConfigurationSpec) -> ClientResult<FormBody> {
        let token = self.collab.csrf.token().ok_or(ClientError::MissingToken)?;

        let mut form = FormBody::new();
        form.push(XSRF_FIELD, token);
        match action {
            Action::CreateLaunchConfiguration => spec.write_create_fields(&mut form)?,
            Action::DeleteLaunchConfiguration => spec.write_delete_fields(&mut form)?,
        }
        Ok(form)
    }

    fn dispatch(&self, action: Action, spec: LaunchConfigurationSpec) -> PendingSync {
        let (tx, rx) = watch::channel(SyncState::Pending);
        let name = spec.name.clone();
        let this = self.clone();

        tokio::spawn(async move {
            let state = this.execute(action, &spec).await;
            tx.send_replace(state);
        });

        PendingSync { action, name, rx }
    }

    async fn execute(&self, action: Action, spec: &LaunchConfigurationSpec) -> SyncState {
        let span = tracing::info_span!("launch_config_sync", action = %action, name = %spec.name);

        async move {
            let result = match self.build_form(action, spec) {
                Ok(form) => {
                    tracing::debug!(fields = form.len(), "Dispatching");
                    self.transport.post_form(action, &form).await
                }
                Err(e) => Err(e),
            };
            self.complete(action, &spec.name, result)
        }
        .instrument(span)
        .await
    }

    /// Interpret the outcome and emit exactly one notification
    fn complete(&self, action: Action, name: &str, result: ClientResult<Value>) -> SyncState {
        let escaped = self.collab.escaper.escape(name);
        let (success_key, error_key) = message_keys(action);

        match result {
            Ok(body) if AutoscalingResponse::from_value(&body).is_success() => {
                tracing::info!("Launch configuration {} succeeded", action);
                let message = self.collab.catalog.prop(success_key.as_str(), &[&escaped]);
                self.collab.notifier.notify_success(None, &message);
                if refreshes_listing(action) {
                    self.collab.listing.refresh();
                }
                SyncState::Succeeded
            }
            Ok(body) => {
                tracing::warn!(response = %body, "Remote service reported failure");
                let title = self.collab.catalog.prop(error_key.as_str(), &[&escaped]);
                let detail = self.collab.catalog.prop(MessageKey::UndefinedError.as_str(), &[]);
                self.collab.notifier.notify_error(&title, &detail);
                SyncState::Failed(FailureKind::Application)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Launch configuration request failed");
                let title = self.collab.catalog.prop(error_key.as_str(), &[&escaped]);
                let detail = self.collab.escaper.escape(&e.detail());
                self.collab.notifier.notify_error(&title, &detail);
                SyncState::Failed(FailureKind::Transport)
            }
        }
    }
}

fn message_keys(action: Action) -> (MessageKey, MessageKey) {
    match action {
        Action::CreateLaunchConfiguration => (MessageKey::CreateSuccess, MessageKey::CreateError),
        Action::DeleteLaunchConfiguration => (MessageKey::DeleteSuccess, MessageKey::DeleteError),
    }
}

/// Only creation refreshes the listing; deletion leaves it to the caller
fn refreshes_listing(action: Action) -> bool {
    matches!(action, Action::CreateLaunchConfiguration)
}
