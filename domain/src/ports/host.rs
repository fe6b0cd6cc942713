use chrono::Duration;

/// What the machine running the bot looks like right now.
#[derive(Debug, Clone, PartialEq)]
pub struct HostInfo {
    pub os: String,
    pub cpu: String,
    pub cores: usize,
    /// Frequency of the first core, in MHz.
    pub cpu_mhz: u64,
    pub used_memory_bytes: u64,
    pub total_memory_bytes: u64,
    pub uptime: Duration,
}

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait HostInfoPort {
    fn host_info(&self) -> HostInfo;
}
