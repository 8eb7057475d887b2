//! CPU dimension: architecture, count, clock speed.

use crate::{Mismatch, in_range};
use crds::{Cpu, HostCpu};

pub fn check(cpu: Option<&Cpu>, host: &HostCpu) -> Result<(), Mismatch> {
    let Some(cpu) = cpu else {
        return Ok(());
    };

    if !cpu.architecture.is_empty() && cpu.architecture != host.arch {
        return Err(Mismatch::CpuArchitecture {
            expected: cpu.architecture.clone(),
            actual: host.arch.clone(),
        });
    }

    if !in_range(cpu.minimum_count, cpu.maximum_count, host.count) {
        return Err(Mismatch::CpuCount {
            min: cpu.minimum_count,
            max: cpu.maximum_count,
            actual: host.count,
        });
    }

    // Inspection reports fractional MHz, so compare as floats.
    let min = f64::from(cpu.minimum_speed_mhz);
    let max = f64::from(cpu.maximum_speed_mhz);
    if !in_range(min, max, host.clock_megahertz) {
        return Err(Mismatch::CpuSpeed {
            min: cpu.minimum_speed_mhz,
            max: cpu.maximum_speed_mhz,
            actual: host.clock_megahertz,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host_cpu(arch: &str, count: u32, clock_megahertz: f64) -> HostCpu {
        HostCpu {
            arch: arch.to_string(),
            count,
            clock_megahertz,
            ..Default::default()
        }
    }

    #[test]
    fn test_absent_block_passes() {
        assert!(check(None, &host_cpu("x86_64", 8, 99.0)).is_ok());
    }

    #[test]
    fn test_count_table() {
        let cases = [
            ("no-min-max", 0, 0, true),
            ("within-max", 0, 100, true),
            ("within-min", 1, 0, true),
            ("under-min", 100, 0, false),
            ("over-max", 0, 4, false),
        ];
        for (scenario, min, max, expected) in cases {
            let rule = Cpu {
                minimum_count: min,
                maximum_count: max,
                ..Default::default()
            };
            assert_eq!(
                check(Some(&rule), &host_cpu("x86_64", 8, 2400.0)).is_ok(),
                expected,
                "{scenario}"
            );
        }
    }

    #[test]
    fn test_speed_table() {
        let cases = [
            ("no-min-max", 0, 0, true),
            ("within-max", 0, 100, true),
            ("within-min", 1, 0, true),
            ("under-min", 100, 0, false),
            ("over-max", 0, 9, false),
        ];
        for (scenario, min, max, expected) in cases {
            let rule = Cpu {
                minimum_speed_mhz: min,
                maximum_speed_mhz: max,
                ..Default::default()
            };
            assert_eq!(
                check(Some(&rule), &host_cpu("x86_64", 8, 99.0)).is_ok(),
                expected,
                "{scenario}"
            );
        }
    }

    #[test]
    fn test_fractional_clock_against_integer_bound() {
        let rule = Cpu {
            minimum_speed_mhz: 2600,
            ..Default::default()
        };
        assert!(check(Some(&rule), &host_cpu("x86_64", 8, 2600.5)).is_ok());
        assert_eq!(
            check(Some(&rule), &host_cpu("x86_64", 8, 2599.9)),
            Err(Mismatch::CpuSpeed {
                min: 2600,
                max: 0,
                actual: 2599.9
            })
        );
    }

    #[test]
    fn test_architecture() {
        let rule = Cpu {
            architecture: "aarch64".to_string(),
            ..Default::default()
        };
        assert!(check(Some(&rule), &host_cpu("aarch64", 8, 2400.0)).is_ok());
        assert!(matches!(
            check(Some(&rule), &host_cpu("x86_64", 8, 2400.0)),
            Err(Mismatch::CpuArchitecture { .. })
        ));

        // Empty architecture accepts any.
        assert!(check(Some(&Cpu::default()), &host_cpu("ppc64le", 8, 2400.0)).is_ok());
    }
}
