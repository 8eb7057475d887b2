//! Profile validation.
//!
//! A profile that fails validation is never matched against hosts; its
//! status reports the problem instead.

use classifier::disk_selector;
use classifier::firmware::{compare_versions, parse_version};
use crds::{Cpu, Disk, Firmware, HardwareCharacteristics, Nic, Ram, SystemVendor};
use std::cmp::Ordering;
use std::fmt::Display;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Hardware profile details can not be empty")]
    Empty,

    #[error("Invalid {0} details")]
    EmptyDimension(&'static str),

    #[error("disk count is mandatory if disk individual size is given")]
    DiskSizeWithoutCount,

    #[error("{field}: minimum {min} is greater than maximum {max}")]
    InvertedRange {
        field: &'static str,
        min: String,
        max: String,
    },

    #[error("invalid disk selector hctl {0:?}, expected four fields of digits or N")]
    DiskSelector(String),

    #[error("invalid BIOS version bound {0:?}")]
    BiosVersion(String),
}

/// Checks a profile's constraints before any host is evaluated.
pub fn validate(hw: &HardwareCharacteristics) -> Result<(), ValidationError> {
    if hw.is_empty() {
        return Err(ValidationError::Empty);
    }
    if let Some(cpu) = &hw.cpu {
        validate_cpu(cpu)?;
    }
    if let Some(ram) = &hw.ram {
        validate_ram(ram)?;
    }
    if let Some(nic) = &hw.nic {
        validate_nic(nic)?;
    }
    if let Some(disk) = &hw.disk {
        validate_disk(disk)?;
    }
    if let Some(firmware) = &hw.firmware {
        validate_firmware(firmware)?;
    }
    if let Some(vendor) = &hw.system_vendor {
        validate_system_vendor(vendor)?;
    }
    Ok(())
}

/// Zero bounds are open, so only two non-zero bounds can be inverted.
fn ordered<T>(field: &'static str, min: T, max: T) -> Result<(), ValidationError>
where
    T: PartialOrd + Default + Display,
{
    let zero = T::default();
    if min > zero && max > zero && min > max {
        return Err(ValidationError::InvertedRange {
            field,
            min: min.to_string(),
            max: max.to_string(),
        });
    }
    Ok(())
}

fn validate_cpu(cpu: &Cpu) -> Result<(), ValidationError> {
    if cpu.architecture.is_empty()
        && cpu.minimum_count == 0
        && cpu.maximum_count == 0
        && cpu.minimum_speed_mhz == 0
        && cpu.maximum_speed_mhz == 0
    {
        return Err(ValidationError::EmptyDimension("CPU"));
    }
    ordered("cpu count", cpu.minimum_count, cpu.maximum_count)?;
    ordered("cpu speed", cpu.minimum_speed_mhz, cpu.maximum_speed_mhz)
}

fn validate_ram(ram: &Ram) -> Result<(), ValidationError> {
    if ram.minimum_size_gb == 0 && ram.maximum_size_gb == 0 {
        return Err(ValidationError::EmptyDimension("RAM"));
    }
    ordered("ram size", ram.minimum_size_gb, ram.maximum_size_gb)
}

fn validate_nic(nic: &Nic) -> Result<(), ValidationError> {
    if nic.minimum_count == 0 && nic.maximum_count == 0 && nic.required_vendors().is_empty() {
        return Err(ValidationError::EmptyDimension("NIC"));
    }
    ordered("nic count", nic.minimum_count, nic.maximum_count)
}

fn validate_disk(disk: &Disk) -> Result<(), ValidationError> {
    let has_count = disk.minimum_count > 0 || disk.maximum_count > 0;
    let has_size = disk.minimum_individual_size_gb > 0 || disk.maximum_individual_size_gb > 0;

    if !has_count && !has_size && disk.disk_selector.is_empty() {
        return Err(ValidationError::EmptyDimension("DISK"));
    }
    if has_size && !has_count {
        return Err(ValidationError::DiskSizeWithoutCount);
    }
    ordered("disk count", disk.minimum_count, disk.maximum_count)?;
    ordered(
        "disk size",
        disk.minimum_individual_size_gb,
        disk.maximum_individual_size_gb,
    )?;

    if let Some(bad) = disk
        .disk_selector
        .iter()
        .find(|selector| !disk_selector::is_valid_pattern(&selector.hctl))
    {
        return Err(ValidationError::DiskSelector(bad.hctl.clone()));
    }
    Ok(())
}

fn validate_firmware(firmware: &Firmware) -> Result<(), ValidationError> {
    let bios = &firmware.bios;
    if bios.vendor.is_empty()
        && bios.version.is_empty()
        && bios.minimum_version.is_empty()
        && bios.maximum_version.is_empty()
    {
        return Err(ValidationError::EmptyDimension("firmware"));
    }

    let parse_bound = |bound: &str| -> Result<Option<Vec<u64>>, ValidationError> {
        if bound.is_empty() {
            return Ok(None);
        }
        parse_version(bound)
            .map(Some)
            .ok_or_else(|| ValidationError::BiosVersion(bound.to_string()))
    };
    let min = parse_bound(&bios.minimum_version)?;
    let max = parse_bound(&bios.maximum_version)?;

    if let (Some(min), Some(max)) = (min, max)
        && compare_versions(&min, &max) == Ordering::Greater
    {
        return Err(ValidationError::InvertedRange {
            field: "bios version",
            min: bios.minimum_version.clone(),
            max: bios.maximum_version.clone(),
        });
    }
    Ok(())
}

fn validate_system_vendor(vendor: &SystemVendor) -> Result<(), ValidationError> {
    if vendor.manufacturer.is_empty() && vendor.product_name.is_empty() {
        return Err(ValidationError::EmptyDimension("system vendor"));
    }
    Ok(())
}
