//! Test utilities for unit testing reconcilers
//!
//! Builders for profiles and hosts plus a reconciler wired to a
//! `MockMetal3Client`.

use crate::config::ControllerConfig;
use crate::reconciler::Reconciler;
use crds::*;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};
use metal3_client::MockMetal3Client;

pub const NAMESPACE: &str = "metal3";

pub const GB: u64 = 1_000_000_000;

/// Reconciler backed by (a clone of) `mock`.
pub fn test_reconciler(mock: &MockMetal3Client) -> Reconciler {
    Reconciler::new(Box::new(mock.clone()), &ControllerConfig::default())
}

/// Profile without finalizer or status.
pub fn test_profile(name: &str, characteristics: HardwareCharacteristics) -> HardwareClassification {
    HardwareClassification {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(NAMESPACE.to_string()),
            ..Default::default()
        },
        spec: HardwareClassificationSpec {
            hardware_characteristics: characteristics,
        },
        status: None,
    }
}

/// Profile that already carries the controller's finalizer.
pub fn active_profile(name: &str, characteristics: HardwareCharacteristics) -> HardwareClassification {
    let mut profile = test_profile(name, characteristics);
    profile.metadata.finalizers = Some(vec![FINALIZER.to_string()]);
    profile
}

/// Marks a profile as being deleted.
pub fn terminating(mut profile: HardwareClassification) -> HardwareClassification {
    profile.metadata.deletion_timestamp = Some(Time(Default::default()));
    profile
}

/// At least four CPUs and 16 GB of RAM.
pub fn valid_characteristics() -> HardwareCharacteristics {
    HardwareCharacteristics {
        cpu: Some(Cpu {
            minimum_count: 4,
            ..Default::default()
        }),
        ram: Some(Ram {
            minimum_size_gb: 16,
            maximum_size_gb: 0,
        }),
        ..Default::default()
    }
}

/// Inventory satisfying [`valid_characteristics`].
pub fn matching_details() -> HardwareDetails {
    HardwareDetails {
        cpu: HostCpu {
            arch: "x86_64".to_string(),
            clock_megahertz: 2400.0,
            count: 8,
            ..Default::default()
        },
        ram_mebibytes: 64 * 1024,
        nics: vec![HostNic {
            name: "eno1".to_string(),
            model: "0x8086 0x1572".to_string(),
            ..Default::default()
        }],
        storage: vec![Storage {
            name: "/dev/sda".to_string(),
            hctl: "0:0:0:0".to_string(),
            size_bytes: 480 * GB,
            ..Default::default()
        }],
        ..Default::default()
    }
}

/// Inventory failing [`valid_characteristics`] on CPU count.
pub fn small_details() -> HardwareDetails {
    let mut details = matching_details();
    details.cpu.count = 2;
    details
}

pub fn test_host(name: &str, state: &str, details: Option<HardwareDetails>) -> BareMetalHost {
    BareMetalHost {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(NAMESPACE.to_string()),
            ..Default::default()
        },
        spec: BareMetalHostSpec::default(),
        status: Some(BareMetalHostStatus {
            operational_status: "OK".to_string(),
            hardware: details,
            provisioning: ProvisionStatus {
                state: state.to_string(),
            },
            ..Default::default()
        }),
    }
}

/// Host that failed before inspection completed.
pub fn error_host(name: &str, error_type: &str) -> BareMetalHost {
    let mut host = test_host(name, "inspecting", None);
    if let Some(status) = host.status.as_mut() {
        status.operational_status = "error".to_string();
        status.error_type = error_type.to_string();
    }
    host
}

/// Adds `label_key = value` to a host.
pub fn labelled(mut host: BareMetalHost, key: &str, value: &str) -> BareMetalHost {
    host.metadata
        .labels
        .get_or_insert_with(Default::default)
        .insert(key.to_string(), value.to_string());
    host
}

/// Current stored copy of a host.
pub fn host_of(mock: &MockMetal3Client, name: &str) -> BareMetalHost {
    mock.host(NAMESPACE, name).expect("host exists in mock")
}
