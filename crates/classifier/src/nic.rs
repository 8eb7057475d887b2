//! NIC dimension: count range and vendor coverage.

use crate::{Mismatch, in_range};
use crds::{HostNic, Nic};

/// Vendor token of a NIC: the first whitespace-separated word of its model.
pub fn vendor_of(nic: &HostNic) -> Option<&str> {
    nic.model.split_whitespace().next()
}

pub fn check(nic: Option<&Nic>, nics: &[HostNic]) -> Result<(), Mismatch> {
    let Some(nic) = nic else {
        return Ok(());
    };

    let actual = u32::try_from(nics.len()).unwrap_or(u32::MAX);
    if !in_range(nic.minimum_count, nic.maximum_count, actual) {
        return Err(Mismatch::NicCount {
            min: nic.minimum_count,
            max: nic.maximum_count,
            actual,
        });
    }

    // NICs with an empty model carry no vendor and are ignored here.
    let vendors: Vec<&str> = nics.iter().filter_map(vendor_of).collect();
    for required in nic.required_vendors() {
        if !vendors.iter().any(|vendor| vendor == required) {
            return Err(Mismatch::NicVendor {
                vendor: required.clone(),
            });
        }
    }

    Ok(())
}
