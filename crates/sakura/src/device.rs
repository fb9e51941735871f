//! Host device classification for the petal field's degradation policy.

use log::debug;
use sysinfo::System;

/// Machines at or below this many logical CPUs count as low-powered.
const LOW_POWER_MAX_CPUS: usize = 4;

/// Machines with less total memory than this count as low-powered.
const LOW_POWER_MIN_MEMORY: u64 = 4 * 1024 * 1024 * 1024;

/// Hardware summary used to pick a default low-power mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceProfile {
    /// Logical CPU count.
    pub cpus: usize,
    /// Total memory in bytes.
    pub total_memory: u64,
}

impl DeviceProfile {
    /// Probe the running machine.
    pub fn detect() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_all();
        sys.refresh_memory();

        let profile = Self {
            cpus: sys.cpus().len(),
            total_memory: sys.total_memory(),
        };
        debug!(
            "device: {} cpus, {} MiB memory",
            profile.cpus,
            profile.total_memory / (1024 * 1024)
        );
        profile
    }

    /// Whether the petal field should degrade to the minimal tier on fast
    /// scrolls. Unknown values (zero) are not treated as low-powered.
    pub fn is_low_powered(&self) -> bool {
        (self.cpus > 0 && self.cpus <= LOW_POWER_MAX_CPUS)
            || (self.total_memory > 0 && self.total_memory < LOW_POWER_MIN_MEMORY)
    }
}

/// Resolve low-power mode: an explicit override wins, otherwise detect the device.
pub fn resolve_low_power(forced: Option<bool>) -> bool {
    forced.unwrap_or_else(|| DeviceProfile::detect().is_low_powered())
}
