//! Disk selection by SCSI bus position.
//!
//! A disk's HCTL ("Host:Channel:Target:Lun") is canonicalized by replacing
//! every strictly positive component with [`WILDCARD`], so the pattern
//! `0:N:0:0` covers any disk on channel 1, 2, 3, ... of host 0. A pattern
//! may also name a disk's exact address.

use crate::Mismatch;
use crds::{DiskSelector, Storage};

/// Stands for any strictly positive HCTL component.
pub const WILDCARD: &str = "N";

const HCTL_COMPONENTS: usize = 4;

/// Replaces each strictly positive numeric component with [`WILDCARD`].
///
/// Zero components and anything that does not parse as an integer are
/// kept as they are.
pub fn canonicalize_hctl(hctl: &str) -> String {
    hctl.split(':')
        .map(|component| match component.parse::<u64>() {
            Ok(value) if value > 0 => WILDCARD,
            _ => component,
        })
        .collect::<Vec<_>>()
        .join(":")
}

/// True when `pattern` has four components, each a non-negative integer
/// or the wildcard.
pub fn is_valid_pattern(pattern: &str) -> bool {
    let components: Vec<&str> = pattern.split(':').collect();
    components.len() == HCTL_COMPONENTS
        && components
            .iter()
            .all(|c| *c == WILDCARD || (!c.is_empty() && c.bytes().all(|b| b.is_ascii_digit())))
}

/// Whether `disk` satisfies `selector`.
pub fn matches(selector: &DiskSelector, disk: &Storage) -> bool {
    selector.rotational == disk.rotational
        && (selector.hctl == disk.hctl || selector.hctl == canonicalize_hctl(&disk.hctl))
}

/// Applies `selectors` to `disks`.
///
/// Every selector must be satisfied by at least one disk; the first one
/// that is not is reported. On success the disks satisfying any selector
/// are returned in host order, each once.
pub fn select<'a>(
    selectors: &[DiskSelector],
    disks: &'a [Storage],
) -> Result<Vec<&'a Storage>, Mismatch> {
    if let Some(unsatisfied) = selectors
        .iter()
        .find(|selector| !disks.iter().any(|disk| matches(selector, disk)))
    {
        return Err(Mismatch::DiskSelector {
            hctl: unsatisfied.hctl.clone(),
            rotational: unsatisfied.rotational,
        });
    }

    Ok(disks
        .iter()
        .filter(|disk| selectors.iter().any(|selector| matches(selector, disk)))
        .collect())
}
