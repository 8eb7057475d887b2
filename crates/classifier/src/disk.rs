//! Disk dimension: selectors, count, per-disk size.

use crate::{Mismatch, disk_selector, in_range};
use crds::{Disk, Storage};
use tracing::debug;

/// Decimal gigabyte, the unit of profile disk sizes.
const BYTES_PER_GB: u64 = 1_000_000_000;

pub fn check(disk: Option<&Disk>, storage: &[Storage]) -> Result<(), Mismatch> {
    let Some(disk) = disk else {
        return Ok(());
    };

    let mut disks: Vec<&Storage> = storage.iter().collect();
    if !disk.disk_selector.is_empty() {
        let selected = disk_selector::select(&disk.disk_selector, storage)?;
        if selected.is_empty() {
            debug!("disk selectors selected nothing, checking all disks");
        } else {
            disks = selected;
        }
    }

    let actual = u32::try_from(disks.len()).unwrap_or(u32::MAX);
    if !in_range(disk.minimum_count, disk.maximum_count, actual) {
        return Err(Mismatch::DiskCount {
            min: disk.minimum_count,
            max: disk.maximum_count,
            actual,
        });
    }

    for candidate in disks {
        let actual_gb = candidate.size_bytes / BYTES_PER_GB;
        if !in_range(
            disk.minimum_individual_size_gb,
            disk.maximum_individual_size_gb,
            actual_gb,
        ) {
            return Err(Mismatch::DiskSize {
                disk: candidate.name.clone(),
                min_gb: disk.minimum_individual_size_gb,
                max_gb: disk.maximum_individual_size_gb,
                actual_gb,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{GB, disk};
    use crds::DiskSelector;

    fn count_rule(min: u32, max: u32) -> Disk {
        Disk {
            minimum_count: min,
            maximum_count: max,
            ..Default::default()
        }
    }

    fn size_rule(min_gb: u64, max_gb: u64) -> Disk {
        Disk {
            minimum_count: 1,
            minimum_individual_size_gb: min_gb,
            maximum_individual_size_gb: max_gb,
            ..Default::default()
        }
    }

    fn two_disks() -> Vec<Storage> {
        vec![
            disk("/dev/sda", "0:0:0:0", false, 99 * GB),
            disk("/dev/sdb", "0:0:1:0", true, 99 * GB),
        ]
    }

    #[test]
    fn test_count_table() {
        let cases = [
            ("no-min-max", count_rule(0, 0), true),
            ("within-max", count_rule(0, 2), true),
            ("within-min", count_rule(1, 0), true),
            ("under-min", count_rule(3, 0), false),
            ("over-max", count_rule(0, 1), false),
        ];
        for (scenario, rule, expected) in cases {
            assert_eq!(check(Some(&rule), &two_disks()).is_ok(), expected, "{scenario}");
        }
    }

    #[test]
    fn test_size_table() {
        let cases = [
            ("no-min-max", size_rule(0, 0), true),
            ("within-max", size_rule(0, 100), true),
            ("within-min", size_rule(1, 0), true),
            ("exact", size_rule(99, 99), true),
            ("under-min", size_rule(100, 0), false),
            ("over-max", size_rule(0, 98), false),
        ];
        for (scenario, rule, expected) in cases {
            assert_eq!(check(Some(&rule), &two_disks()).is_ok(), expected, "{scenario}");
        }
    }

    #[test]
    fn test_size_truncates_to_whole_gb() {
        // 480.1 GB reads as 480.
        let storage = vec![disk("/dev/sda", "0:0:0:0", false, 480_103_981_056)];
        assert!(check(Some(&size_rule(0, 480)), &storage).is_ok());
        assert_eq!(
            check(Some(&size_rule(481, 0)), &storage),
            Err(Mismatch::DiskSize {
                disk: "/dev/sda".to_string(),
                min_gb: 481,
                max_gb: 0,
                actual_gb: 480
            })
        );
    }

    #[test]
    fn test_count_applies_to_selected_disks() {
        let storage = vec![
            disk("/dev/sda", "0:0:0:0", false, 480 * GB),
            disk("/dev/sdb", "0:0:1:0", true, 4000 * GB),
            disk("/dev/sdc", "0:0:2:0", true, 4000 * GB),
        ];
        let rule = Disk {
            minimum_count: 2,
            maximum_count: 2,
            minimum_individual_size_gb: 1000,
            disk_selector: vec![DiskSelector {
                hctl: "0:0:N:0".to_string(),
                rotational: true,
            }],
            ..Default::default()
        };
        // The small boot disk is outside the selection so its size is ignored.
        assert!(check(Some(&rule), &storage).is_ok());

        let rule = Disk {
            maximum_count: 1,
            ..rule
        };
        assert!(matches!(
            check(Some(&rule), &storage),
            Err(Mismatch::DiskCount { actual: 2, .. })
        ));
    }

    #[test]
    fn test_unsatisfied_selector_fails_before_count() {
        let rule = Disk {
            minimum_count: 1,
            disk_selector: vec![DiskSelector {
                hctl: "0:0:0:0".to_string(),
                rotational: true,
            }],
            ..Default::default()
        };
        assert!(matches!(
            check(Some(&rule), &two_disks()),
            Err(Mismatch::DiskSelector { .. })
        ));
    }
}
