use crate::collectors::connections::established_connections;
use crate::collectors::diskstats::read_disk_io;
use crate::collectors::files::recent_files;
use crate::collectors::SystemSnapshot;
use crate::directories::{CwdResolver, SkipReason};
use crate::state::{DiskUsageStat, HostInfo, LoadAverage, MemoryStat, ProcessRecord};
use std::collections::BTreeMap;
#[cfg(target_os = "linux")]
use std::fs;
use std::path::{Path, PathBuf};
use sysinfo::{
    ComponentExt, CpuExt, DiskExt, NetworkExt, NetworksExt, Pid, PidExt, Process, ProcessExt,
    ProcessStatus, System, SystemExt,
};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct CollectOptions {
    pub watch_dir: PathBuf,
    pub recent_files: usize,
    pub connections_limit: usize,
}

/// First refresh so that the next one has a baseline for CPU usage and
/// network counters.
pub fn prime(system: &mut System) {
    system.refresh_cpu();
    system.refresh_processes();
    system.refresh_networks_list();
    system.refresh_networks();
}

/// Cumulative (sent, received) bytes over all interfaces.
pub fn network_totals(system: &System) -> (u64, u64) {
    system
        .networks()
        .iter()
        .fold((0_u64, 0_u64), |(tx, rx), (_, data)| {
            (
                tx.saturating_add(data.total_transmitted()),
                rx.saturating_add(data.total_received()),
            )
        })
}

pub fn collect_system(system: &mut System, opts: &CollectOptions) -> SystemSnapshot {
    system.refresh_cpu();
    system.refresh_memory();
    system.refresh_processes();
    system.refresh_disks_list();
    system.refresh_disks();
    system.refresh_networks_list();
    system.refresh_networks();
    system.refresh_components_list();
    system.refresh_components();

    let cpu_per_core: Vec<f32> = system.cpus().iter().map(|c| c.cpu_usage()).collect();
    let cpu_total = f64::from(system.global_cpu_info().cpu_usage());

    let ram = MemoryStat::from_bytes(system.used_memory(), system.total_memory());
    let swap = MemoryStat::from_bytes(system.used_swap(), system.total_swap());

    let processes = collect_processes(system);

    let (net_sent_total, net_recv_total) = network_totals(system);

    let temperatures = collect_temps(system);

    SystemSnapshot {
        host: collect_host(system),
        cpu_per_core,
        cpu_total,
        ram,
        swap,
        processes,
        net_sent_total,
        net_recv_total,
        disk_io: read_disk_io(),
        disk_usage: root_disk_usage(system),
        temperatures,
        recent_files: recent_files(&opts.watch_dir, opts.recent_files),
        connections: established_connections(opts.connections_limit),
    }
}

fn collect_host(system: &System) -> HostInfo {
    HostInfo {
        host_name: system.host_name(),
        os_name: system.name(),
        os_version: system.os_version(),
        kernel_version: system.kernel_version(),
        uptime_seconds: system.uptime(),
        load_average: load_average(system),
    }
}

#[cfg(unix)]
fn load_average(system: &System) -> Option<LoadAverage> {
    let load = system.load_average();
    Some(LoadAverage {
        one_min: load.one,
        five_min: load.five,
        fifteen_min: load.fifteen,
    })
}

#[cfg(not(unix))]
fn load_average(_system: &System) -> Option<LoadAverage> {
    None
}

fn collect_processes(system: &System) -> Vec<ProcessRecord> {
    let total_memory = system.total_memory();
    let mut processes: Vec<ProcessRecord> = system
        .processes()
        .iter()
        .map(|(pid, process)| ProcessRecord {
            pid: pid.as_u32(),
            name: process.name().to_string(),
            cpu_percent: process.cpu_usage(),
            mem_percent: if total_memory > 0 {
                (process.memory() as f64 / total_memory as f64 * 100.0) as f32
            } else {
                0.0
            },
            status: status_label(process.status()),
        })
        .collect();
    // the process table is a hash map; pid order gives a stable enumeration
    processes.sort_by_key(|p| p.pid);
    processes
}

fn status_label(status: ProcessStatus) -> String {
    match status {
        ProcessStatus::Run => "running".to_string(),
        ProcessStatus::Sleep => "sleeping".to_string(),
        ProcessStatus::Idle => "idle".to_string(),
        ProcessStatus::Stop => "stopped".to_string(),
        ProcessStatus::Zombie => "zombie".to_string(),
        ProcessStatus::Dead => "dead".to_string(),
        other => other.to_string().to_lowercase(),
    }
}

fn root_disk_usage(system: &System) -> Option<DiskUsageStat> {
    let disks = system.disks();
    let disk = disks
        .iter()
        .find(|d| d.mount_point() == Path::new("/"))
        .or_else(|| disks.first())?;
    let total = disk.total_space();
    let used = total.saturating_sub(disk.available_space());
    Some(DiskUsageStat {
        mount: disk.mount_point().to_string_lossy().to_string(),
        used_bytes: used,
        total_bytes: total,
        percent: crate::state::percent_of(used, total),
    })
}

fn collect_temps(system: &System) -> BTreeMap<String, f64> {
    let mut temps = BTreeMap::new();
    for component in system.components() {
        let celsius = f64::from(component.temperature());
        if celsius.is_finite() && celsius > 0.0 {
            insert_unique(&mut temps, component.label(), celsius);
        }
    }

    let sys_count = temps.len();
    let lin = collect_linux_temps();
    debug!(
        sysinfo_temps = sys_count,
        linux_temps = lin.len(),
        "temperature sources"
    );
    for (key, celsius) in lin {
        insert_unique(&mut temps, &key, celsius);
    }
    temps
}

/// Sensors sharing a label get a ` #2`, ` #3`, ... suffix instead of replacing
/// each other.
fn insert_unique(temps: &mut BTreeMap<String, f64>, label: &str, celsius: f64) {
    let mut key = label.to_string();
    let mut n = 1;
    while temps.contains_key(&key) {
        n += 1;
        key = format!("{label} #{n}");
    }
    temps.insert(key, celsius);
}

#[cfg(target_os = "linux")]
fn collect_linux_temps() -> Vec<(String, f64)> {
    let Ok(entries) = fs::read_dir("/sys/class/thermal") else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|v| v.to_str()) else {
            continue;
        };
        if !name.starts_with("thermal_zone") {
            continue;
        }

        let typ = fs::read_to_string(path.join("type"))
            .ok()
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| name.to_string());
        let Ok(temp_raw) = fs::read_to_string(path.join("temp")) else {
            continue;
        };
        let Ok(v) = temp_raw.trim().parse::<f64>() else {
            continue;
        };
        // millidegrees on most kernels
        let celsius = if v > 1000.0 { v / 1000.0 } else { v };
        if celsius > 0.0 {
            out.push((format!("{typ}/{name}"), celsius));
        }
    }

    out
}

#[cfg(not(target_os = "linux"))]
fn collect_linux_temps() -> Vec<(String, f64)> {
    Vec::new()
}

/// Resolves working directories against the last refreshed process table.
pub struct SysinfoCwdResolver<'a> {
    system: &'a System,
}

impl<'a> SysinfoCwdResolver<'a> {
    pub fn new(system: &'a System) -> Self {
        Self { system }
    }
}

impl CwdResolver for SysinfoCwdResolver<'_> {
    fn resolve_cwd(&self, pid: u32) -> Result<PathBuf, SkipReason> {
        let process = self
            .system
            .process(Pid::from_u32(pid))
            .ok_or(SkipReason::Vanished)?;
        if process.status() == ProcessStatus::Zombie {
            return Err(SkipReason::Zombie);
        }
        read_cwd(pid, process)
    }
}

#[cfg(target_os = "linux")]
fn read_cwd(pid: u32, _process: &Process) -> Result<PathBuf, SkipReason> {
    fs::read_link(format!("/proc/{pid}/cwd")).map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => SkipReason::Vanished,
        _ => SkipReason::AccessDenied,
    })
}

#[cfg(not(target_os = "linux"))]
fn read_cwd(_pid: u32, process: &Process) -> Result<PathBuf, SkipReason> {
    let cwd = process.cwd();
    if cwd.as_os_str().is_empty() {
        return Err(SkipReason::AccessDenied);
    }
    Ok(cwd.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_labels_are_lowercase() {
        assert_eq!(status_label(ProcessStatus::Run), "running");
        assert_eq!(status_label(ProcessStatus::Sleep), "sleeping");
        assert_eq!(status_label(ProcessStatus::Zombie), "zombie");
    }

    #[test]
    fn duplicate_sensor_labels_are_kept_apart() {
        let mut temps = BTreeMap::new();
        insert_unique(&mut temps, "Composite", 41.0);
        insert_unique(&mut temps, "Composite", 47.0);
        insert_unique(&mut temps, "Composite", 52.0);
        insert_unique(&mut temps, "Package id 0", 60.0);

        assert_eq!(temps.len(), 4);
        assert_eq!(temps["Composite"], 41.0);
        assert_eq!(temps["Composite #2"], 47.0);
        assert_eq!(temps["Composite #3"], 52.0);
        assert_eq!(temps["Package id 0"], 60.0);
    }

    #[test]
    fn unknown_pid_is_vanished() {
        let system = System::new();
        let resolver = SysinfoCwdResolver::new(&system);
        assert_eq!(resolver.resolve_cwd(u32::MAX - 1), Err(SkipReason::Vanished));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn resolves_own_cwd() {
        let mut system = System::new();
        system.refresh_processes();
        let resolver = SysinfoCwdResolver::new(&system);
        let cwd = resolver
            .resolve_cwd(std::process::id())
            .expect("own cwd is readable");
        assert_eq!(cwd, std::env::current_dir().expect("current dir"));
    }
}
