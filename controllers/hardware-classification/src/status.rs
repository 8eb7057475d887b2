//! Status aggregation for HardwareClassification profiles.

use crate::labels::LabelSyncReport;
use crate::validation::ValidationError;
use crds::{
    BareMetalHost, ErrorType, HardwareClassificationStatus, HostErrorCategory, ProfileMatchStatus,
};

/// Hosts without hardware details that are in an error state, by category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorHostCounts {
    pub registration: u32,
    pub introspection: u32,
    pub provisioning: u32,
    pub power_management: u32,
    pub provisioned_registration: u32,
    pub preparation: u32,
    pub detach: u32,
}

impl ErrorHostCounts {
    /// Buckets every host that lacks hardware details and is in error.
    /// Unknown error categories are dropped.
    pub fn from_hosts<'a>(hosts: impl IntoIterator<Item = &'a BareMetalHost>) -> Self {
        let mut counts = Self::default();
        for category in hosts.into_iter().filter_map(BareMetalHost::detail_missing_error) {
            counts.record(category);
        }
        counts
    }

    pub fn record(&mut self, category: HostErrorCategory) {
        let bucket = match category {
            HostErrorCategory::Registration => &mut self.registration,
            HostErrorCategory::Introspection => &mut self.introspection,
            HostErrorCategory::Provisioning => &mut self.provisioning,
            HostErrorCategory::PowerManagement => &mut self.power_management,
            HostErrorCategory::ProvisionedRegistration => &mut self.provisioned_registration,
            HostErrorCategory::Preparation => &mut self.preparation,
            HostErrorCategory::Detach => &mut self.detach,
        };
        *bucket += 1;
    }

    pub fn total(&self) -> u32 {
        self.registration
            + self.introspection
            + self.provisioning
            + self.power_management
            + self.provisioned_registration
            + self.preparation
            + self.detach
    }
}

/// Status after a complete matching pass over `total` hosts.
pub fn aggregate(matched: u32, errors: &ErrorHostCounts, total: u32) -> HardwareClassificationStatus {
    if total == 0 {
        return no_hosts(None);
    }

    let error_hosts = errors.total();
    let profile_match_status = if matched > 0 {
        ProfileMatchStatus::Matched
    } else {
        ProfileMatchStatus::Unmatched
    };

    HardwareClassificationStatus {
        profile_match_status,
        error_type: None,
        error_message: String::new(),
        matched_count: matched,
        unmatched_count: total.saturating_sub(matched).saturating_sub(error_hosts),
        error_hosts,
        registration_error_count: errors.registration,
        introspection_error_count: errors.introspection,
        provisioning_error_count: errors.provisioning,
        power_mgmt_error_count: errors.power_management,
        provisioned_registration_error_count: errors.provisioned_registration,
        preparation_error_count: errors.preparation,
        detach_error_count: errors.detach,
    }
}

/// Status of a profile whose namespace has no hosts.
pub fn no_hosts(namespace: Option<&str>) -> HardwareClassificationStatus {
    let error_message = match namespace {
        Some(ns) => format!("No BareMetalHost found in namespace {ns}"),
        None => "No BareMetalHost found".to_string(),
    };
    HardwareClassificationStatus {
        profile_match_status: ProfileMatchStatus::NoHosts,
        error_type: Some(ErrorType::NoBmhHost),
        error_message,
        ..Default::default()
    }
}

/// Status of a profile that failed validation. Counts are cleared since
/// no host was evaluated.
pub fn misconfigured(error: &ValidationError) -> HardwareClassificationStatus {
    HardwareClassificationStatus {
        profile_match_status: ProfileMatchStatus::Empty,
        error_type: Some(ErrorType::ProfileMisConfigured),
        error_message: error.to_string(),
        ..Default::default()
    }
}

/// Records failed label writes on an aggregated status.
pub fn with_label_failures(
    mut status: HardwareClassificationStatus,
    report: &LabelSyncReport,
) -> HardwareClassificationStatus {
    if let Some(error_type) = report.error_type() {
        status.error_type = Some(error_type);
        status.error_message = report.failure_message();
    }
    status
}

/// A status write is only issued when some field differs.
pub fn needs_update(
    current: Option<&HardwareClassificationStatus>,
    desired: &HardwareClassificationStatus,
) -> bool {
    current != Some(desired)
}
