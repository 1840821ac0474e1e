use crate::directories::PidCwdCache;
use crate::history::HistoryBuffer;
use crate::rate::RateCalculator;
use serde::Serialize;
use std::collections::BTreeMap;

/// Long-lived monitoring state, mutated once per cycle by the sampler.
#[derive(Debug, Clone)]
pub struct MonitorState {
    pub started_at_unix: i64,
    pub cycles: u64,
    pub cpu_history: HistoryBuffer<f64>,
    pub ram_history: HistoryBuffer<f64>,
    pub net_sent_history: HistoryBuffer<f64>,
    pub net_recv_history: HistoryBuffer<f64>,
    pub net_rate: RateCalculator,
    pub cwd_cache: PidCwdCache,
}

impl MonitorState {
    pub fn new(now_unix: i64, history_len: usize) -> Self {
        Self {
            started_at_unix: now_unix,
            cycles: 0,
            cpu_history: HistoryBuffer::new(history_len),
            ram_history: HistoryBuffer::new(history_len),
            net_sent_history: HistoryBuffer::new(history_len),
            net_recv_history: HistoryBuffer::new(history_len),
            net_rate: RateCalculator::new(),
            cwd_cache: PidCwdCache::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessRecord {
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f32,
    pub mem_percent: f32,
    pub status: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MemoryStat {
    pub used_bytes: u64,
    pub total_bytes: u64,
    pub percent: f64,
}

impl MemoryStat {
    pub fn from_bytes(used_bytes: u64, total_bytes: u64) -> Self {
        Self {
            used_bytes,
            total_bytes,
            percent: percent_of(used_bytes, total_bytes),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiskUsageStat {
    pub mount: String,
    pub used_bytes: u64,
    pub total_bytes: u64,
    pub percent: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiskIoStat {
    pub read_bytes: u64,
    pub write_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoadAverage {
    pub one_min: f64,
    pub five_min: f64,
    pub fifteen_min: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HostInfo {
    pub host_name: Option<String>,
    pub os_name: Option<String>,
    pub os_version: Option<String>,
    pub kernel_version: Option<String>,
    pub uptime_seconds: u64,
    pub load_average: Option<LoadAverage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentFile {
    pub path: String,
    pub name: String,
    pub modified_unix: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Connection {
    pub local: String,
    pub remote: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectoryUsage {
    pub path: String,
    pub cpu_percent: f64,
    pub mem_percent: f64,
}

/// Everything the renderer needs for one cycle.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub cycle: u64,
    pub collected_at_unix: i64,
    pub host: HostInfo,
    pub cpu_per_core: Vec<f32>,
    pub cpu_total: f64,
    pub ram: MemoryStat,
    pub swap: MemoryStat,
    pub top_processes: Vec<ProcessRecord>,
    pub net_sent_rate: f64,
    pub net_recv_rate: f64,
    pub cpu_history: Vec<f64>,
    pub ram_history: Vec<f64>,
    pub net_sent_history: Vec<f64>,
    pub net_recv_history: Vec<f64>,
    pub temperatures: BTreeMap<String, f64>,
    pub disk_io: Option<DiskIoStat>,
    pub disk_usage: Option<DiskUsageStat>,
    pub heavy_directories: Vec<DirectoryUsage>,
    pub skipped_directory_lookups: usize,
    pub recent_files: Vec<RecentFile>,
    pub connections: Vec<Connection>,
}

pub fn percent_of(used: u64, total: u64) -> f64 {
    if total > 0 {
        (used as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_percent_handles_zero_total() {
        assert_eq!(MemoryStat::from_bytes(10, 0).percent, 0.0);
        assert_eq!(MemoryStat::from_bytes(1, 4).percent, 25.0);
    }

    #[test]
    fn new_state_uses_configured_history_len() {
        let state = MonitorState::new(42, 12);
        assert_eq!(state.started_at_unix, 42);
        assert_eq!(state.cpu_history.capacity(), 12);
        assert_eq!(state.net_recv_history.capacity(), 12);
        assert!(state.cwd_cache.is_empty());
        assert!(!state.net_rate.is_seeded());
    }
}
