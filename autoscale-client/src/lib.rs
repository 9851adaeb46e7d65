//! Autoscale Client - launch configuration sync for the autoscaling console
//!
//! Sends create/delete of launch configurations to the console's autoscaling
//! endpoints as form-encoded POSTs and reports each outcome through injected
//! notification and listing collaborators.

pub mod config;
pub mod csrf;
pub mod error;
pub mod escape;
pub mod http;
pub mod i18n;
pub mod logger;
pub mod notify;
pub mod sync;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::SyncConfig;
pub use csrf::{CookieTokenSource, CsrfTokenSource, StaticToken};
pub use error::{ClientError, ClientResult};
pub use escape::{HtmlEncoder, HtmlEscaper};
pub use http::{Action, NetworkTransport, Transport};
pub use i18n::{CatalogError, MessageCatalog, MessageKey, PropertiesCatalog};
pub use notify::{ListingView, NotificationSink, RefreshChannel, RefreshRequest, TracingNotifier};
pub use sync::{Collaborators, FailureKind, LaunchConfigSync, PendingSync, SyncState};

// Re-export shared types for convenience
pub use shared::{BlockDeviceMapping, Ebs, LaunchConfigurationSpec};
