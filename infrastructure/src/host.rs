use chrono::Duration;
use domain::ports::host::{HostInfo, HostInfoPort};
use std::sync::Mutex;
use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};
use tracing::instrument;

pub struct SysinfoAdapter {
    system: Mutex<System>,
}

impl SysinfoAdapter {
    #[instrument(level = "trace")]
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new_with_specifics(refresh_kind())),
        }
    }
}

impl Default for SysinfoAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn refresh_kind() -> RefreshKind {
    RefreshKind::nothing()
        .with_cpu(CpuRefreshKind::nothing().with_frequency())
        .with_memory(MemoryRefreshKind::nothing().with_ram())
}

impl HostInfoPort for SysinfoAdapter {
    #[instrument(level = "debug", skip(self))]
    fn host_info(&self) -> HostInfo {
        let mut system = self
            .system
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        system.refresh_specifics(refresh_kind());

        let cpus = system.cpus();
        HostInfo {
            os: System::long_os_version().unwrap_or_else(|| "Unknown".to_string()),
            cpu: cpus
                .first()
                .map(|cpu| cpu.brand().trim().to_string())
                .filter(|brand| !brand.is_empty())
                .unwrap_or_else(|| "Unknown".to_string()),
            cores: cpus.len(),
            cpu_mhz: cpus.first().map_or(0, |cpu| cpu.frequency()),
            used_memory_bytes: system.used_memory(),
            total_memory_bytes: system.total_memory(),
            uptime: Duration::seconds(i64::try_from(System::uptime()).unwrap_or(i64::MAX)),
        }
    }
}
