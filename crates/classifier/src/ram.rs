//! RAM dimension.
//!
//! Profiles state sizes in GB while hosts report MiB. The profile bounds
//! are scaled up by 1024 rather than scaling the host value down, so no
//! precision is lost on the host side.

use crate::{Mismatch, in_range};
use crds::Ram;

const MIB_PER_GB: u64 = 1024;

pub fn check(ram: Option<&Ram>, ram_mebibytes: u64) -> Result<(), Mismatch> {
    let Some(ram) = ram else {
        return Ok(());
    };

    let min_mib = ram.minimum_size_gb.saturating_mul(MIB_PER_GB);
    let max_mib = ram.maximum_size_gb.saturating_mul(MIB_PER_GB);

    if in_range(min_mib, max_mib, ram_mebibytes) {
        Ok(())
    } else {
        Err(Mismatch::Ram {
            min_mib,
            max_mib,
            actual_mib: ram_mebibytes,
        })
    }
}
