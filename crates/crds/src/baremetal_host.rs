//! BareMetalHost (read-only mirror)
//!
//! The BareMetalHost CRD is owned by the bare-metal operator. Only the
//! fields the classification controller reads are modelled here; the
//! controller never writes anything but `metadata.labels`, and it does so
//! with a merge patch so unmodelled fields are left untouched.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Provisioning states in which a host takes part in matching.
pub const READY_STATES: &[&str] = &["ready", "available"];

/// Host `status.operationalStatus` value for hosts in an error state.
pub const OPERATIONAL_STATUS_ERROR: &str = "error";

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[kube(
    group = "metal3.io",
    version = "v1alpha1",
    kind = "BareMetalHost",
    namespaced,
    status = "BareMetalHostStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct BareMetalHostSpec {
    #[serde(default)]
    pub online: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct BareMetalHostStatus {
    /// "OK", "discovered", "error", ...
    #[serde(default)]
    pub operational_status: String,

    /// Category of the last error, empty when healthy.
    #[serde(default)]
    pub error_type: String,

    #[serde(default)]
    pub error_message: String,

    /// Inspected hardware. Absent until inspection has completed.
    #[serde(default, alias = "hardwareDetails", skip_serializing_if = "Option::is_none")]
    pub hardware: Option<HardwareDetails>,

    #[serde(default)]
    pub provisioning: ProvisionStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionStatus {
    #[serde(default)]
    pub state: String,
}

/// Hardware inventory collected by inspection.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HardwareDetails {
    #[serde(default)]
    pub system_vendor: HardwareSystemVendor,

    #[serde(default)]
    pub firmware: HostFirmware,

    #[serde(default)]
    pub ram_mebibytes: u64,

    #[serde(default)]
    pub nics: Vec<HostNic>,

    #[serde(default)]
    pub storage: Vec<Storage>,

    #[serde(default)]
    pub cpu: HostCpu,

    #[serde(default)]
    pub hostname: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HardwareSystemVendor {
    #[serde(default)]
    pub manufacturer: String,

    #[serde(default)]
    pub product_name: String,

    #[serde(default)]
    pub serial_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HostFirmware {
    #[serde(default)]
    pub bios: HostBios,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HostBios {
    #[serde(default)]
    pub date: String,

    #[serde(default)]
    pub vendor: String,

    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HostNic {
    #[serde(default)]
    pub name: String,

    /// Vendor and product, e.g. "0x8086 0x1572" or "Intel X710".
    #[serde(default)]
    pub model: String,

    #[serde(default)]
    pub mac: String,

    #[serde(default)]
    pub ip: String,

    #[serde(default)]
    pub speed_gbps: u32,

    #[serde(default)]
    pub pxe: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Storage {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub rotational: bool,

    #[serde(default)]
    pub size_bytes: u64,

    #[serde(default)]
    pub vendor: String,

    #[serde(default)]
    pub model: String,

    #[serde(default)]
    pub serial_number: String,

    /// SCSI address, "Host:Channel:Target:Lun".
    #[serde(default)]
    pub hctl: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HostCpu {
    #[serde(default)]
    pub arch: String,

    #[serde(default)]
    pub model: String,

    /// Clock speed in MHz; inspection reports fractional values.
    #[serde(default)]
    pub clock_megahertz: f64,

    #[serde(default)]
    pub flags: Vec<String>,

    #[serde(default)]
    pub count: u32,
}

/// Host error categories counted in the profile status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HostErrorCategory {
    Registration,
    Introspection,
    Provisioning,
    PowerManagement,
    ProvisionedRegistration,
    Preparation,
    Detach,
}

impl HostErrorCategory {
    /// Maps a host's `status.errorType`. Unknown categories yield `None`.
    pub fn from_error_type(error_type: &str) -> Option<Self> {
        match error_type {
            "registration error" => Some(Self::Registration),
            "inspection error" => Some(Self::Introspection),
            "provisioning error" => Some(Self::Provisioning),
            "power management error" => Some(Self::PowerManagement),
            "provisioned registration error" => Some(Self::ProvisionedRegistration),
            "preparation error" => Some(Self::Preparation),
            "detach error" => Some(Self::Detach),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Registration => "registration error",
            Self::Introspection => "inspection error",
            Self::Provisioning => "provisioning error",
            Self::PowerManagement => "power management error",
            Self::ProvisionedRegistration => "provisioned registration error",
            Self::Preparation => "preparation error",
            Self::Detach => "detach error",
        }
    }
}

impl BareMetalHost {
    pub fn hardware_details(&self) -> Option<&HardwareDetails> {
        self.status.as_ref().and_then(|s| s.hardware.as_ref())
    }

    pub fn provisioning_state(&self) -> &str {
        self.status
            .as_ref()
            .map_or("", |s| s.provisioning.state.as_str())
    }

    /// Whether the host is in a state where it takes part in matching.
    pub fn is_ready(&self) -> bool {
        READY_STATES.contains(&self.provisioning_state())
    }

    /// Error category of a host that has no hardware details and is in
    /// an error state.
    pub fn detail_missing_error(&self) -> Option<HostErrorCategory> {
        let status = self.status.as_ref()?;
        if status.hardware.is_some() || status.operational_status != OPERATIONAL_STATUS_ERROR {
            return None;
        }
        HostErrorCategory::from_error_type(&status.error_type)
    }
}
