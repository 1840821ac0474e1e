pub mod connections;
pub mod diskstats;
pub mod files;
pub mod system;

use crate::state::{
    Connection, DiskIoStat, DiskUsageStat, HostInfo, MemoryStat, ProcessRecord, RecentFile,
};
use std::collections::BTreeMap;

/// Raw readings of one cycle, before any derived state is applied.
#[derive(Debug, Clone, Default)]
pub struct SystemSnapshot {
    pub host: HostInfo,
    pub cpu_per_core: Vec<f32>,
    pub cpu_total: f64,
    pub ram: MemoryStat,
    pub swap: MemoryStat,
    pub processes: Vec<ProcessRecord>,
    pub net_sent_total: u64,
    pub net_recv_total: u64,
    pub disk_io: Option<DiskIoStat>,
    pub disk_usage: Option<DiskUsageStat>,
    pub temperatures: BTreeMap<String, f64>,
    pub recent_files: Vec<RecentFile>,
    pub connections: Vec<Connection>,
}
