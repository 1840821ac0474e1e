use crate::collectors::SystemSnapshot;
use crate::directories::{aggregate_directories, CwdResolver};
use crate::ranking::rank_processes;
use crate::state::{Dashboard, MonitorState};
use tracing::debug;

const BYTES_PER_KB: f64 = 1024.0;

#[derive(Debug, Clone, Copy)]
pub struct CycleLimits {
    pub top_processes: usize,
    pub top_directories: usize,
}

/// Records the network baseline ahead of the first cycle so that cycle
/// already reports a rate.
pub fn seed_network(state: &mut MonitorState, sent: u64, recv: u64, now_secs: f64) {
    if state.net_rate.sample(sent, recv, now_secs).is_some() {
        debug!("network baseline was already seeded");
    }
}

/// Applies one cycle of raw readings to `state` and builds the dashboard.
pub fn run_cycle(
    state: &mut MonitorState,
    raw: SystemSnapshot,
    resolver: &impl CwdResolver,
    now_secs: f64,
    limits: CycleLimits,
) -> Dashboard {
    state.cycles += 1;

    state.cpu_history.push(raw.cpu_total);
    state.ram_history.push(raw.ram.percent);

    let (net_sent_rate, net_recv_rate) =
        match state
            .net_rate
            .sample(raw.net_sent_total, raw.net_recv_total, now_secs)
        {
            Some(rates) => {
                state.net_sent_history.push(rates.sent_per_sec / BYTES_PER_KB);
                state.net_recv_history.push(rates.recv_per_sec / BYTES_PER_KB);
                (rates.sent_per_sec, rates.recv_per_sec)
            }
            None => (0.0, 0.0),
        };

    let top_processes = rank_processes(&raw.processes, limits.top_processes);
    let directories = aggregate_directories(
        &raw.processes,
        &mut state.cwd_cache,
        resolver,
        limits.top_directories,
    );

    debug!(
        cycle = state.cycles,
        processes = raw.processes.len(),
        cwd_cache = state.cwd_cache.len(),
        cwd_evicted = directories.evicted,
        cwd_skipped = directories.skipped.len(),
        "cycle sampled"
    );

    Dashboard {
        cycle: state.cycles,
        collected_at_unix: now_secs as i64,
        host: raw.host,
        cpu_per_core: raw.cpu_per_core,
        cpu_total: raw.cpu_total,
        ram: raw.ram,
        swap: raw.swap,
        top_processes,
        net_sent_rate,
        net_recv_rate,
        cpu_history: state.cpu_history.snapshot(),
        ram_history: state.ram_history.snapshot(),
        net_sent_history: state.net_sent_history.snapshot(),
        net_recv_history: state.net_recv_history.snapshot(),
        temperatures: raw.temperatures,
        disk_io: raw.disk_io,
        disk_usage: raw.disk_usage,
        skipped_directory_lookups: directories.skipped.len(),
        heavy_directories: directories.top,
        recent_files: raw.recent_files,
        connections: raw.connections,
    }
}
