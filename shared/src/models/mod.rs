//! Data models synchronized with the autoscaling service

pub mod launch_config;

pub use launch_config::{
    BlockDeviceMapping, Ebs, IDENTITY_FIELDS, LAUNCH_CONFIGURATION_FIELDS,
    LAUNCH_CONFIGURATION_NAME, LaunchConfigurationSpec,
};
