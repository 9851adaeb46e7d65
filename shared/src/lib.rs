//! Shared types for the autoscaling launch configuration client
//!
//! Data model, declarative form field tables and the response envelope
//! used by the autoscaling console endpoints.

pub mod form;
pub mod models;
pub mod response;

// Re-exports
pub use form::{Field, FormBody, FormEncode, FormError, serialize_defined};
pub use models::{BlockDeviceMapping, Ebs, LaunchConfigurationSpec};
pub use response::{AutoscalingResponse, is_truthy};
