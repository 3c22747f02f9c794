//! Host-level resource probes
//!
//! System gauges come from the sysinfo crate behind shared statics, the same
//! shape the gateway uses for its own resource metrics. The probe is a
//! capability trait so deployments and tests can substitute their own
//! source; each accessor returns `None` when its source is unavailable
//! rather than failing the whole probe.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use sysinfo::{Disks, System};

static SYSTEM: Lazy<Mutex<System>> = Lazy::new(|| Mutex::new(System::new_all()));

static DISKS: Lazy<Mutex<Disks>> = Lazy::new(|| Mutex::new(Disks::new_with_refreshed_list()));

/// Source of host-level resource gauges, each on a 0-100 scale
pub trait HostProbe: Send + Sync + std::fmt::Debug {
    /// Global CPU utilization percentage
    fn cpu_percent(&self) -> Option<f64>;

    /// Memory utilization percentage
    fn memory_percent(&self) -> Option<f64>;

    /// Disk utilization percentage across all mounted disks
    fn disk_percent(&self) -> Option<f64>;
}

/// [`HostProbe`] backed by sysinfo
#[derive(Debug, Default)]
pub struct SysinfoProbe;

impl SysinfoProbe {
    /// Create a probe over the process-wide sysinfo handles
    pub fn new() -> Self {
        Self
    }
}

impl HostProbe for SysinfoProbe {
    fn cpu_percent(&self) -> Option<f64> {
        let mut sys = SYSTEM.lock();
        sys.refresh_cpu_usage();
        let usage = sys.global_cpu_usage() as f64;
        usage.is_finite().then_some(usage.clamp(0.0, 100.0))
    }

    fn memory_percent(&self) -> Option<f64> {
        let mut sys = SYSTEM.lock();
        sys.refresh_memory();
        let total = sys.total_memory();
        if total == 0 {
            return None;
        }
        Some((sys.used_memory() as f64 / total as f64 * 100.0).clamp(0.0, 100.0))
    }

    fn disk_percent(&self) -> Option<f64> {
        let mut disks = DISKS.lock();
        disks.refresh_list();
        let (mut total, mut available) = (0u64, 0u64);
        for disk in disks.iter() {
            total += disk.total_space();
            available += disk.available_space();
        }
        if total == 0 {
            return None;
        }
        let used = total - available;
        Some((used as f64 / total as f64 * 100.0).clamp(0.0, 100.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sysinfo_gauges_in_range() {
        let probe = SysinfoProbe::new();
        for gauge in [
            probe.cpu_percent(),
            probe.memory_percent(),
            probe.disk_percent(),
        ]
        .into_iter()
        .flatten()
        {
            assert!((0.0..=100.0).contains(&gauge));
        }
    }
}
