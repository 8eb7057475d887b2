//! System vendor dimension.

use crate::Mismatch;
use crds::{HardwareSystemVendor, SystemVendor};

pub fn check(
    vendor: Option<&SystemVendor>,
    host: &HardwareSystemVendor,
) -> Result<(), Mismatch> {
    let Some(vendor) = vendor else {
        return Ok(());
    };

    if !vendor.manufacturer.is_empty() && vendor.manufacturer != host.manufacturer {
        return Err(Mismatch::Manufacturer {
            expected: vendor.manufacturer.clone(),
            actual: host.manufacturer.clone(),
        });
    }

    // Product names carry SKU suffixes, so only containment is required.
    if !vendor.product_name.is_empty() && !host.product_name.contains(&vendor.product_name) {
        return Err(Mismatch::ProductName {
            expected: vendor.product_name.clone(),
            actual: host.product_name.clone(),
        });
    }

    Ok(())
}
