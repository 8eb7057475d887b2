//! Firmware dimension: BIOS vendor, exact version, version range.

use crate::Mismatch;
use crds::{Firmware, HostFirmware};
use std::cmp::Ordering;

pub fn check(firmware: Option<&Firmware>, host: &HostFirmware) -> Result<(), Mismatch> {
    let Some(firmware) = firmware else {
        return Ok(());
    };
    let bios = &firmware.bios;

    if !bios.vendor.is_empty() && bios.vendor != host.bios.vendor {
        return Err(Mismatch::BiosVendor {
            expected: bios.vendor.clone(),
            actual: host.bios.vendor.clone(),
        });
    }

    if !bios.version.is_empty() && bios.version != host.bios.version {
        return Err(Mismatch::BiosVersion {
            expected: bios.version.clone(),
            actual: host.bios.version.clone(),
        });
    }

    if !version_in_range(&bios.minimum_version, &bios.maximum_version, &host.bios.version) {
        return Err(Mismatch::BiosVersionRange {
            min: bios.minimum_version.clone(),
            max: bios.maximum_version.clone(),
            actual: host.bios.version.clone(),
        });
    }

    Ok(())
}

/// Parses a dot-separated numeric version such as "2.8.2".
pub fn parse_version(version: &str) -> Option<Vec<u64>> {
    version
        .split('.')
        .map(|component| component.trim().parse::<u64>().ok())
        .collect()
}

/// Compares versions component by component, padding the shorter with
/// zeros so "2.1" == "2.1.0".
pub fn compare_versions(a: &[u64], b: &[u64]) -> Ordering {
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            let left = a.get(i).copied().unwrap_or(0);
            let right = b.get(i).copied().unwrap_or(0);
            left.cmp(&right)
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Inclusive range check. Empty bounds are unbounded; a host version that
/// does not parse fails any bounded range.
pub fn version_in_range(min: &str, max: &str, actual: &str) -> bool {
    if min.is_empty() && max.is_empty() {
        return true;
    }
    let Some(actual) = parse_version(actual) else {
        return false;
    };

    let within = |bound: &str, rejected: Ordering| {
        if bound.is_empty() {
            return true;
        }
        match parse_version(bound) {
            Some(bound) => compare_versions(&actual, &bound) != rejected,
            // Malformed bounds are rejected by profile validation.
            None => false,
        }
    };

    within(min, Ordering::Less) && within(max, Ordering::Greater)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crds::{Bios, HostBios};

    fn host(vendor: &str, version: &str) -> HostFirmware {
        HostFirmware {
            bios: HostBios {
                vendor: vendor.to_string(),
                version: version.to_string(),
                ..Default::default()
            },
        }
    }

    fn rule(bios: Bios) -> Firmware {
        Firmware { bios }
    }

    #[test]
    fn test_vendor() {
        let dell = rule(Bios {
            vendor: "Dell Inc.".to_string(),
            ..Default::default()
        });
        assert!(check(Some(&dell), &host("Dell Inc.", "2.8.2")).is_ok());
        assert!(matches!(
            check(Some(&dell), &host("HPE", "U30")),
            Err(Mismatch::BiosVendor { .. })
        ));
        assert!(check(Some(&Firmware::default()), &host("HPE", "U30")).is_ok());
    }

    #[test]
    fn test_exact_version() {
        let pinned = rule(Bios {
            version: "2.8.2".to_string(),
            ..Default::default()
        });
        assert!(check(Some(&pinned), &host("Dell Inc.", "2.8.2")).is_ok());
        assert!(matches!(
            check(Some(&pinned), &host("Dell Inc.", "2.8.3")),
            Err(Mismatch::BiosVersion { .. })
        ));
    }

    #[test]
    fn test_version_range_table() {
        let cases = [
            ("unbounded", "", "", "2.8.2", true),
            ("within", "2.0", "3.0", "2.8.2", true),
            ("at-min", "2.8.2", "", "2.8.2", true),
            ("at-max-padded", "", "2.8", "2.8.0", true),
            ("under-min", "2.9", "", "2.8.2", false),
            ("over-max", "", "2.8.1", "2.8.2", false),
            ("numeric-not-lexical", "2.9", "", "2.10", true),
            ("unparsable-host", "1.0", "", "U30", false),
            ("unparsable-host-unbounded", "", "", "U30", true),
        ];
        for (scenario, min, max, actual, expected) in cases {
            assert_eq!(version_in_range(min, max, actual), expected, "{scenario}");
        }
    }

    #[test]
    fn test_range_through_check() {
        let ranged = rule(Bios {
            minimum_version: "1.5".to_string(),
            maximum_version: "2.0".to_string(),
            ..Default::default()
        });
        assert!(check(Some(&ranged), &host("Dell Inc.", "1.10.0")).is_ok());
        assert_eq!(
            check(Some(&ranged), &host("Dell Inc.", "2.0.1")),
            Err(Mismatch::BiosVersionRange {
                min: "1.5".to_string(),
                max: "2.0".to_string(),
                actual: "2.0.1".to_string()
            })
        );
    }

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("2.8.2"), Some(vec![2, 8, 2]));
        assert_eq!(parse_version("10"), Some(vec![10]));
        assert_eq!(parse_version("2.x"), None);
        assert_eq!(parse_version(""), None);
    }
}
