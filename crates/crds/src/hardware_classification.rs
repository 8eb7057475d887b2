//! HardwareClassification CRD
//!
//! A named hardware profile. Every `BareMetalHost` in the same namespace
//! whose inspected hardware satisfies the profile is labelled
//! `hardwareclassification.metal3.io/<profile>`, so host selectors further
//! down the provisioning chain can pick machines by hardware class.

use kube::{CustomResource, ResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Prefix of every label written to a host. The profile name is appended.
pub const LABEL_PREFIX: &str = "hardwareclassification.metal3.io/";

/// Label value used when the profile does not supply its own.
pub const DEFAULT_LABEL_VALUE: &str = "matches";

/// Finalizer blocking profile deletion while hosts still carry its label.
pub const FINALIZER: &str = "hardwareclassification.metal3.io";

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[kube(
    group = "metal3.io",
    version = "v1alpha1",
    kind = "HardwareClassification",
    namespaced,
    status = "HardwareClassificationStatus",
    shortname = "hwc",
    printcolumn = r#"{"name":"ProfileMatchStatus","type":"string","jsonPath":".status.profileMatchStatus","description":"Profile Match Status"}"#,
    printcolumn = r#"{"name":"Matched","type":"integer","jsonPath":".status.matchedCount","description":"Hosts matching the profile"}"#,
    printcolumn = r#"{"name":"Error","type":"string","jsonPath":".status.errorMessage","description":"Most recent error"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct HardwareClassificationSpec {
    /// Expected hardware characteristics. Absent blocks are not checked.
    #[serde(default)]
    pub hardware_characteristics: HardwareCharacteristics,
}

/// One optional constraint block per hardware dimension.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HardwareCharacteristics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<Cpu>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ram: Option<Ram>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nic: Option<Nic>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk: Option<Disk>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firmware: Option<Firmware>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_vendor: Option<SystemVendor>,
}

impl HardwareCharacteristics {
    /// True when no dimension is constrained at all.
    pub fn is_empty(&self) -> bool {
        self.cpu.is_none()
            && self.ram.is_none()
            && self.nic.is_none()
            && self.disk.is_none()
            && self.firmware.is_none()
            && self.system_vendor.is_none()
    }
}

/// CPU constraints. Zero bounds are unbounded on that side.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Cpu {
    /// Exact architecture, e.g. "x86_64". Empty matches any.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub architecture: String,

    #[serde(default)]
    pub minimum_count: u32,

    #[serde(default)]
    pub maximum_count: u32,

    #[serde(default, rename = "minimumSpeedMHz")]
    pub minimum_speed_mhz: u32,

    #[serde(default, rename = "maximumSpeedMHz")]
    pub maximum_speed_mhz: u32,
}

/// RAM constraints in GB.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Ram {
    #[serde(default, rename = "minimumSizeGB")]
    pub minimum_size_gb: u64,

    #[serde(default, rename = "maximumSizeGB")]
    pub maximum_size_gb: u64,
}

/// NIC constraints.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Nic {
    #[serde(default)]
    pub minimum_count: u32,

    #[serde(default)]
    pub maximum_count: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nic_selector: Option<NicSelector>,
}

impl Nic {
    /// Required vendor tokens, empty when no selector is given.
    pub fn required_vendors(&self) -> &[String] {
        self.nic_selector
            .as_ref()
            .map_or(&[], |selector| selector.vendor.as_slice())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NicSelector {
    /// Vendor tokens, compared against the first word of each NIC model.
    #[serde(default)]
    pub vendor: Vec<String>,
}

/// Disk constraints.
///
/// Individual size bounds require a count bound; this is enforced by the
/// controller's validation, not by the schema.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Disk {
    #[serde(default)]
    pub minimum_count: u32,

    #[serde(default)]
    pub maximum_count: u32,

    #[serde(default, rename = "minimumIndividualSizeGB")]
    pub minimum_individual_size_gb: u64,

    #[serde(default, rename = "maximumIndividualSizeGB")]
    pub maximum_individual_size_gb: u64,

    /// Bus-position patterns; each must be satisfied by at least one disk.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disk_selector: Vec<DiskSelector>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DiskSelector {
    /// Host:Channel:Target:Lun, where `N` stands for any positive value.
    pub hctl: String,

    #[serde(default)]
    pub rotational: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Firmware {
    #[serde(default)]
    pub bios: Bios,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Bios {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub vendor: String,

    /// Exact version.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,

    /// Inclusive lower bound, compared numerically per dot-separated field.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub minimum_version: String,

    /// Inclusive upper bound, compared numerically per dot-separated field.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub maximum_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SystemVendor {
    /// Exact manufacturer.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub manufacturer: String,

    /// Substring of the product name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub product_name: String,
}

/// Observed state of a profile.
///
/// `errorType` is serialized as `null` when clear so a merge patch removes it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HardwareClassificationStatus {
    #[serde(default)]
    pub profile_match_status: ProfileMatchStatus,

    #[serde(default)]
    pub error_type: Option<ErrorType>,

    #[serde(default)]
    pub error_message: String,

    #[serde(default)]
    pub matched_count: u32,

    #[serde(default)]
    pub unmatched_count: u32,

    /// Hosts without hardware details that are in an error state.
    #[serde(default)]
    pub error_hosts: u32,

    #[serde(default)]
    pub registration_error_count: u32,

    #[serde(default)]
    pub introspection_error_count: u32,

    #[serde(default)]
    pub provisioning_error_count: u32,

    #[serde(default)]
    pub power_mgmt_error_count: u32,

    #[serde(default)]
    pub provisioned_registration_error_count: u32,

    #[serde(default)]
    pub preparation_error_count: u32,

    #[serde(default)]
    pub detach_error_count: u32,
}

/// Aggregate match state of a profile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
pub enum ProfileMatchStatus {
    /// Not evaluated yet, or the profile is misconfigured
    #[default]
    #[serde(rename = "")]
    Empty,

    /// At least one host matches
    #[serde(rename = "matched")]
    Matched,

    /// Hosts exist but none matches
    #[serde(rename = "unmatched")]
    Unmatched,

    /// No hosts in the profile's namespace
    #[serde(rename = "nohosts")]
    NoHosts,
}

/// Class of problem that put the profile into an error state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub enum ErrorType {
    /// One or more host label writes failed
    #[serde(rename = "label update error")]
    LabelUpdateFailure,

    /// One or more host label removals failed
    #[serde(rename = "label delete error")]
    LabelDeleteFailure,

    /// Hosts could not be listed
    #[serde(rename = "fetch BMH list error")]
    FetchBmhListFailure,

    /// The profile fails validation
    #[serde(rename = "Empty Profile Error")]
    ProfileMisConfigured,

    /// No hosts in the profile's namespace
    #[serde(rename = "No baremetal host found")]
    NoBmhHost,
}

impl HardwareClassification {
    /// Label key this profile writes to matching hosts.
    pub fn label_key(&self) -> String {
        format!("{}{}", LABEL_PREFIX, self.name_any())
    }

    /// Label value: the profile's own `metadata.labels[<name>]` when set.
    pub fn label_value(&self) -> String {
        self.labels()
            .get(&self.name_any())
            .cloned()
            .unwrap_or_else(|| DEFAULT_LABEL_VALUE.to_string())
    }

    pub fn is_terminating(&self) -> bool {
        self.metadata.deletion_timestamp.is_some()
    }

    pub fn has_finalizer(&self) -> bool {
        self.finalizers().iter().any(|f| f == FINALIZER)
    }
}
