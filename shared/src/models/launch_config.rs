//! Launch Configuration Model

use serde::{Deserialize, Deserializer, Serialize};

use crate::form::{defined, serialize_defined, serialize_with_prefix, Field, FormBody, FormEncode, FormError};

/// Wire name of the identity attribute
pub const LAUNCH_CONFIGURATION_NAME: &str = "LaunchConfigurationName";

/// Launch configuration entity
///
/// `name` is the identity attribute and is always present. Every other
/// attribute is sent to the remote service iff it is `Some`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaunchConfigurationSpec {
    pub name: String,
    pub image_id: Option<String>,
    pub key_name: Option<String>,
    /// Opaque, passed through verbatim
    pub user_data: Option<String>,
    pub instance_type: Option<String>,
    pub kernel_id: Option<String>,
    pub ramdisk_id: Option<String>,
    #[serde(default, deserialize_with = "bool_like")]
    pub instance_monitoring: Option<bool>,
    /// Decimal text, sent as given
    #[serde(default, deserialize_with = "text_like")]
    pub spot_price: Option<String>,
    pub instance_profile_name: Option<String>,
    pub security_groups: Option<Vec<String>>,
    pub block_device_mappings: Option<Vec<BlockDeviceMapping>>,
}

/// Block device mapping for a launch configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockDeviceMapping {
    pub device_name: String,
    pub virtual_name: Option<String>,
    pub ebs: Option<Ebs>,
    pub no_device: Option<bool>,
}

/// EBS parameters of a block device mapping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ebs {
    pub snapshot_id: Option<String>,
    pub volume_size: Option<u32>,
    pub delete_on_termination: Option<bool>,
}

/// Identity-only field set, used for deletion
pub static IDENTITY_FIELDS: &[Field<LaunchConfigurationSpec>] = &[Field {
    attribute: "name",
    wire: LAUNCH_CONFIGURATION_NAME,
    required: true,
    value: |lc| Some(&lc.name as &dyn FormEncode),
}];

/// Full field set sent on creation, in wire order
pub static LAUNCH_CONFIGURATION_FIELDS: &[Field<LaunchConfigurationSpec>] = &[
    Field {
        attribute: "name",
        wire: LAUNCH_CONFIGURATION_NAME,
        required: true,
        value: |lc| Some(&lc.name as &dyn FormEncode),
    },
    Field {
        attribute: "image_id",
        wire: "ImageId",
        required: false,
        value: |lc| defined(&lc.image_id),
    },
    Field {
        attribute: "key_name",
        wire: "KeyName",
        required: false,
        value: |lc| defined(&lc.key_name),
    },
    Field {
        attribute: "user_data",
        wire: "UserData",
        required: false,
        value: |lc| defined(&lc.user_data),
    },
    Field {
        attribute: "instance_type",
        wire: "InstanceType",
        required: false,
        value: |lc| defined(&lc.instance_type),
    },
    Field {
        attribute: "kernel_id",
        wire: "KernelId",
        required: false,
        value: |lc| defined(&lc.kernel_id),
    },
    Field {
        attribute: "ramdisk_id",
        wire: "RamdiskId",
        required: false,
        value: |lc| defined(&lc.ramdisk_id),
    },
    Field {
        attribute: "instance_monitoring",
        wire: "InstanceMonitoring",
        required: false,
        value: |lc| defined(&lc.instance_monitoring),
    },
    Field {
        attribute: "spot_price",
        wire: "SpotPrice",
        required: false,
        value: |lc| defined(&lc.spot_price),
    },
    Field {
        attribute: "instance_profile_name",
        wire: "IamInstanceProfile",
        required: false,
        value: |lc| defined(&lc.instance_profile_name),
    },
    Field {
        attribute: "security_groups",
        wire: "SecurityGroups",
        required: false,
        value: |lc| defined(&lc.security_groups),
    },
    Field {
        attribute: "block_device_mappings",
        wire: "BlockDeviceMappings",
        required: false,
        value: |lc| defined(&lc.block_device_mappings),
    },
];

static BLOCK_DEVICE_MAPPING_FIELDS: &[Field<BlockDeviceMapping>] = &[
    Field {
        attribute: "device_name",
        wire: "DeviceName",
        required: true,
        value: |m| Some(&m.device_name as &dyn FormEncode),
    },
    Field {
        attribute: "virtual_name",
        wire: "VirtualName",
        required: false,
        value: |m| defined(&m.virtual_name),
    },
    Field {
        attribute: "ebs",
        wire: "Ebs",
        required: false,
        value: |m| defined(&m.ebs),
    },
    Field {
        attribute: "no_device",
        wire: "NoDevice",
        required: false,
        value: |m| defined(&m.no_device),
    },
];

static EBS_FIELDS: &[Field<Ebs>] = &[
    Field {
        attribute: "snapshot_id",
        wire: "SnapshotId",
        required: false,
        value: |e| defined(&e.snapshot_id),
    },
    Field {
        attribute: "volume_size",
        wire: "VolumeSize",
        required: false,
        value: |e| defined(&e.volume_size),
    },
    Field {
        attribute: "delete_on_termination",
        wire: "DeleteOnTermination",
        required: false,
        value: |e| defined(&e.delete_on_termination),
    },
];

impl FormEncode for BlockDeviceMapping {
    fn encode_into(&self, key: &str, form: &mut FormBody) -> Result<(), FormError> {
        serialize_with_prefix(BLOCK_DEVICE_MAPPING_FIELDS, self, Some(key), form)
    }
}

impl FormEncode for Ebs {
    fn encode_into(&self, key: &str, form: &mut FormBody) -> Result<(), FormError> {
        serialize_with_prefix(EBS_FIELDS, self, Some(key), form)
    }
}

impl LaunchConfigurationSpec {
    /// Create a launch configuration with only its identity set
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Decode from an entity store attribute map
    ///
    /// Fails when `name` is missing; all other attributes are optional.
    pub fn from_attributes(attributes: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(attributes)
    }

    pub fn with_image_id(mut self, image_id: impl Into<String>) -> Self {
        self.image_id = Some(image_id.into());
        self
    }

    pub fn with_key_name(mut self, key_name: impl Into<String>) -> Self {
        self.key_name = Some(key_name.into());
        self
    }

    pub fn with_user_data(mut self, user_data: impl Into<String>) -> Self {
        self.user_data = Some(user_data.into());
        self
    }

    pub fn with_instance_type(mut self, instance_type: impl Into<String>) -> Self {
        self.instance_type = Some(instance_type.into());
        self
    }

    pub fn with_kernel_id(mut self, kernel_id: impl Into<String>) -> Self {
        self.kernel_id = Some(kernel_id.into());
        self
    }

    pub fn with_ramdisk_id(mut self, ramdisk_id: impl Into<String>) -> Self {
        self.ramdisk_id = Some(ramdisk_id.into());
        self
    }

    pub fn with_instance_monitoring(mut self, enabled: bool) -> Self {
        self.instance_monitoring = Some(enabled);
        self
    }

    pub fn with_spot_price(mut self, price: impl Into<String>) -> Self {
        self.spot_price = Some(price.into());
        self
    }

    pub fn with_instance_profile_name(mut self, profile: impl Into<String>) -> Self {
        self.instance_profile_name = Some(profile.into());
        self
    }

    pub fn with_security_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.security_groups = Some(groups.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_block_device_mapping(mut self, mapping: BlockDeviceMapping) -> Self {
        self.block_device_mappings
            .get_or_insert_with(Vec::new)
            .push(mapping);
        self
    }

    /// Append the creation payload (identity plus defined attributes)
    pub fn write_create_fields(&self, form: &mut FormBody) -> Result<(), FormError> {
        serialize_defined(LAUNCH_CONFIGURATION_FIELDS, self, form)
    }

    /// Append the deletion payload (identity only)
    pub fn write_delete_fields(&self, form: &mut FormBody) -> Result<(), FormError> {
        serialize_defined(IDENTITY_FIELDS, self, form)
    }
}

impl BlockDeviceMapping {
    pub fn new(device_name: impl Into<String>) -> Self {
        Self {
            device_name: device_name.into(),
            ..Default::default()
        }
    }

    pub fn with_ebs(mut self, ebs: Ebs) -> Self {
        self.ebs = Some(ebs);
        self
    }
}

/// Accept a JSON bool, a number (zero is false) or a common flag word
///
/// Recognized words, case-insensitive: `true`/`false`, `1`/`0`, `yes`/`no`,
/// `on`/`off`, `enabled`/`disabled`.
fn bool_like<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolLike {
        Bool(bool),
        Number(f64),
        Text(String),
    }

    match Option::<BoolLike>::deserialize(deserializer)? {
        None => Ok(None),
        Some(BoolLike::Bool(b)) => Ok(Some(b)),
        Some(BoolLike::Number(n)) => Ok(Some(n != 0.0)),
        Some(BoolLike::Text(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" | "enabled" => Ok(Some(true)),
            "false" | "0" | "no" | "off" | "disabled" => Ok(Some(false)),
            other => Err(serde::de::Error::custom(format!(
                "invalid instance_monitoring value: {other}"
            ))),
        },
    }
}

/// Accept a string verbatim, or a JSON number as its literal text
fn text_like<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextLike {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<TextLike>::deserialize(deserializer)?.map(|value| match value {
        TextLike::Text(s) => s,
        TextLike::Number(n) => n.to_string(),
    }))
}
