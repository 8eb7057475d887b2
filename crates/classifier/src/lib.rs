//! Hardware profile matching
//!
//! Decides whether the inspected hardware of a `BareMetalHost` satisfies the
//! constraints of a `HardwareClassification`. Dimensions are evaluated in a
//! fixed order and evaluation stops at the first failing one:
//!
//! CPU → RAM → NIC → Disk → Firmware → System vendor
//!
//! An absent constraint block always passes. The reason for a failed match
//! is returned as a [`Mismatch`] for logging; it is never persisted.

pub mod cpu;
pub mod disk;
pub mod disk_selector;
pub mod firmware;
pub mod nic;
pub mod ram;
pub mod range;
pub mod system_vendor;

use crds::{BareMetalHost, HardwareCharacteristics, HardwareClassification, HardwareDetails};
use kube::ResourceExt;
use thiserror::Error;
use tracing::debug;

pub use range::in_range;

/// Why a host does not satisfy a profile.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Mismatch {
    #[error("CPU architecture {actual:?} is not {expected:?}")]
    CpuArchitecture { expected: String, actual: String },

    #[error("CPU count {actual} outside [{min}, {max}]")]
    CpuCount { min: u32, max: u32, actual: u32 },

    #[error("CPU clock {actual} MHz outside [{min}, {max}] MHz")]
    CpuSpeed { min: u32, max: u32, actual: f64 },

    #[error("RAM {actual_mib} MiB outside [{min_mib}, {max_mib}] MiB")]
    Ram { min_mib: u64, max_mib: u64, actual_mib: u64 },

    #[error("NIC count {actual} outside [{min}, {max}]")]
    NicCount { min: u32, max: u32, actual: u32 },

    #[error("no NIC from vendor {vendor:?}")]
    NicVendor { vendor: String },

    #[error("no disk matches selector {hctl} (rotational: {rotational})")]
    DiskSelector { hctl: String, rotational: bool },

    #[error("disk count {actual} outside [{min}, {max}]")]
    DiskCount { min: u32, max: u32, actual: u32 },

    #[error("disk {disk} size {actual_gb} GB outside [{min_gb}, {max_gb}] GB")]
    DiskSize { disk: String, min_gb: u64, max_gb: u64, actual_gb: u64 },

    #[error("BIOS vendor {actual:?} is not {expected:?}")]
    BiosVendor { expected: String, actual: String },

    #[error("BIOS version {actual:?} is not {expected:?}")]
    BiosVersion { expected: String, actual: String },

    #[error("BIOS version {actual:?} outside [{min:?}, {max:?}]")]
    BiosVersionRange { min: String, max: String, actual: String },

    #[error("manufacturer {actual:?} is not {expected:?}")]
    Manufacturer { expected: String, actual: String },

    #[error("product name {actual:?} does not contain {expected:?}")]
    ProductName { expected: String, actual: String },

    #[error("host has no hardware details")]
    NoHardwareDetails,
}

impl Mismatch {
    /// Hardware dimension the mismatch belongs to.
    pub fn dimension(&self) -> &'static str {
        match self {
            Self::CpuArchitecture { .. } | Self::CpuCount { .. } | Self::CpuSpeed { .. } => "CPU",
            Self::Ram { .. } => "RAM",
            Self::NicCount { .. } | Self::NicVendor { .. } => "NIC",
            Self::DiskSelector { .. } | Self::DiskCount { .. } | Self::DiskSize { .. } => "Disk",
            Self::BiosVendor { .. } | Self::BiosVersion { .. } | Self::BiosVersionRange { .. } => {
                "Firmware"
            }
            Self::Manufacturer { .. } | Self::ProductName { .. } => "SystemVendor",
            Self::NoHardwareDetails => "Inventory",
        }
    }
}

/// Evaluates every constrained dimension, stopping at the first failure.
pub fn classify(
    characteristics: &HardwareCharacteristics,
    details: &HardwareDetails,
) -> Result<(), Mismatch> {
    cpu::check(characteristics.cpu.as_ref(), &details.cpu)?;
    ram::check(characteristics.ram.as_ref(), details.ram_mebibytes)?;
    nic::check(characteristics.nic.as_ref(), &details.nics)?;
    disk::check(characteristics.disk.as_ref(), &details.storage)?;
    firmware::check(characteristics.firmware.as_ref(), &details.firmware)?;
    system_vendor::check(characteristics.system_vendor.as_ref(), &details.system_vendor)?;
    Ok(())
}

/// Evaluates `profile` against `host`.
///
/// Hosts without hardware details never match.
pub fn evaluate(profile: &HardwareClassification, host: &BareMetalHost) -> Result<(), Mismatch> {
    let details = host.hardware_details().ok_or(Mismatch::NoHardwareDetails)?;
    let result = classify(&profile.spec.hardware_characteristics, details);
    match &result {
        Ok(()) => debug!(
            profile = %profile.name_any(),
            host = %host.name_any(),
            "profile matches host"
        ),
        Err(mismatch) => debug!(
            profile = %profile.name_any(),
            host = %host.name_any(),
            dimension = mismatch.dimension(),
            reason = %mismatch,
            "profile does not match host"
        ),
    }
    result
}

/// True when `host` satisfies every constraint in `profile`.
pub fn profile_matches_host(profile: &HardwareClassification, host: &BareMetalHost) -> bool {
    evaluate(profile, host).is_ok()
}
