//! Per-directory CPU and memory share.
//!
//! Every process is mapped to its working directory and the directory totals
//! are the plain sum of the member processes' shares, so they can exceed 100.
//! Working directories are cached by pid and assumed not to change while the
//! pid is alive; entries are dropped once their pid disappears from the
//! enumeration.

use crate::ranking::by_cpu_desc;
use crate::state::{DirectoryUsage, ProcessRecord};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::trace;

pub const DEFAULT_TOP_DIRECTORIES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Vanished,
    AccessDenied,
    Zombie,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::Vanished => "process vanished",
            SkipReason::AccessDenied => "access denied",
            SkipReason::Zombie => "zombie process",
        };
        f.write_str(text)
    }
}

pub trait CwdResolver {
    fn resolve_cwd(&self, pid: u32) -> Result<PathBuf, SkipReason>;
}

#[derive(Debug, Clone, Default)]
pub struct PidCwdCache {
    entries: HashMap<u32, PathBuf>,
}

impl PidCwdCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, pid: u32) -> Option<&Path> {
        self.entries.get(&pid).map(PathBuf::as_path)
    }

    pub fn insert(&mut self, pid: u32, cwd: PathBuf) {
        self.entries.insert(pid, cwd);
    }

    pub fn contains(&self, pid: u32) -> bool {
        self.entries.contains_key(&pid)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops entries for pids outside `live`, returns how many were removed.
    pub fn retain_live(&mut self, live: &HashSet<u32>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|pid, _| live.contains(pid));
        before - self.entries.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DirectoryReport {
    pub top: Vec<DirectoryUsage>,
    pub skipped: Vec<(u32, SkipReason)>,
    pub evicted: usize,
}

impl DirectoryReport {
    pub fn skipped_by(&self, reason: SkipReason) -> usize {
        self.skipped.iter().filter(|(_, r)| *r == reason).count()
    }
}

pub fn aggregate_directories(
    processes: &[ProcessRecord],
    cache: &mut PidCwdCache,
    resolver: &impl CwdResolver,
    top_n: usize,
) -> DirectoryReport {
    let mut usage: Vec<DirectoryUsage> = Vec::new();
    let mut index: HashMap<PathBuf, usize> = HashMap::new();
    let mut live = HashSet::with_capacity(processes.len());
    let mut skipped = Vec::new();

    for process in processes {
        live.insert(process.pid);

        let cwd = match cache.get(process.pid) {
            Some(cached) => cached.to_path_buf(),
            None => match resolver.resolve_cwd(process.pid) {
                Ok(cwd) => {
                    cache.insert(process.pid, cwd.clone());
                    cwd
                }
                Err(reason) => {
                    trace!(pid = process.pid, %reason, "cwd lookup skipped");
                    skipped.push((process.pid, reason));
                    continue;
                }
            },
        };

        let slot = match index.get(&cwd) {
            Some(&i) => i,
            None => {
                usage.push(DirectoryUsage {
                    path: cwd.to_string_lossy().into_owned(),
                    cpu_percent: 0.0,
                    mem_percent: 0.0,
                });
                index.insert(cwd, usage.len() - 1);
                usage.len() - 1
            }
        };
        usage[slot].cpu_percent += f64::from(process.cpu_percent);
        usage[slot].mem_percent += f64::from(process.mem_percent);
    }

    let evicted = cache.retain_live(&live);

    // stable: equal totals keep first-seen order
    usage.sort_by(|a, b| by_cpu_desc(a.cpu_percent, b.cpu_percent));
    usage.truncate(top_n);

    DirectoryReport {
        top: usage,
        skipped,
        evicted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Default)]
    struct FakeResolver {
        cwds: HashMap<u32, Result<PathBuf, SkipReason>>,
        calls: Cell<usize>,
    }

    impl FakeResolver {
        fn with(mut self, pid: u32, cwd: &str) -> Self {
            self.cwds.insert(pid, Ok(PathBuf::from(cwd)));
            self
        }

        fn failing(mut self, pid: u32, reason: SkipReason) -> Self {
            self.cwds.insert(pid, Err(reason));
            self
        }
    }

    impl CwdResolver for FakeResolver {
        fn resolve_cwd(&self, pid: u32) -> Result<PathBuf, SkipReason> {
            self.calls.set(self.calls.get() + 1);
            self.cwds
                .get(&pid)
                .cloned()
                .unwrap_or(Err(SkipReason::Vanished))
        }
    }

    fn proc(pid: u32, cpu: f32, mem: f32) -> ProcessRecord {
        ProcessRecord {
            pid,
            name: format!("p{pid}"),
            cpu_percent: cpu,
            mem_percent: mem,
            status: "running".to_string(),
        }
    }

    fn paths(report: &DirectoryReport) -> Vec<&str> {
        report.top.iter().map(|d| d.path.as_str()).collect()
    }

    #[test]
    fn sums_processes_sharing_a_directory() {
        let resolver = FakeResolver::default().with(1, "/a").with(2, "/a");
        let mut cache = PidCwdCache::new();
        let report = aggregate_directories(
            &[proc(1, 10.0, 1.5), proc(2, 20.0, 2.5)],
            &mut cache,
            &resolver,
            DEFAULT_TOP_DIRECTORIES,
        );
        assert_eq!(report.top.len(), 1);
        assert_eq!(report.top[0].path, "/a");
        assert_eq!(report.top[0].cpu_percent, 30.0);
        assert_eq!(report.top[0].mem_percent, 4.0);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn totals_are_not_normalized() {
        let resolver = FakeResolver::default().with(1, "/w").with(2, "/w").with(3, "/w");
        let mut cache = PidCwdCache::new();
        let report = aggregate_directories(
            &[proc(1, 90.0, 0.0), proc(2, 80.0, 0.0), proc(3, 70.0, 0.0)],
            &mut cache,
            &resolver,
            5,
        );
        assert_eq!(report.top[0].cpu_percent, 240.0);
    }

    #[test]
    fn vanished_pid_is_evicted_next_cycle() {
        let resolver = FakeResolver::default().with(1, "/a").with(2, "/a");
        let mut cache = PidCwdCache::new();
        aggregate_directories(&[proc(1, 10.0, 0.0), proc(2, 20.0, 0.0)], &mut cache, &resolver, 5);
        assert!(cache.contains(2));

        let report = aggregate_directories(&[proc(1, 10.0, 0.0)], &mut cache, &resolver, 5);
        assert_eq!(report.evicted, 1);
        assert!(!cache.contains(2));
        assert_eq!(cache.get(2), None);
        assert_eq!(cache.len(), 1);
        assert_eq!(report.top[0].cpu_percent, 10.0);
    }

    #[test]
    fn cached_pid_is_not_resolved_again() {
        let resolver = FakeResolver::default().with(1, "/a");
        let mut cache = PidCwdCache::new();
        aggregate_directories(&[proc(1, 1.0, 0.0)], &mut cache, &resolver, 5);
        aggregate_directories(&[proc(1, 1.0, 0.0)], &mut cache, &resolver, 5);
        assert_eq!(resolver.calls.get(), 1);
    }

    #[test]
    fn evicted_pid_is_resolved_fresh_when_it_returns() {
        let resolver = FakeResolver::default().with(1, "/a");
        let mut cache = PidCwdCache::new();
        aggregate_directories(&[proc(1, 1.0, 0.0)], &mut cache, &resolver, 5);
        aggregate_directories(&[], &mut cache, &resolver, 5);
        assert!(cache.is_empty());
        aggregate_directories(&[proc(1, 1.0, 0.0)], &mut cache, &resolver, 5);
        assert_eq!(resolver.calls.get(), 2);
    }

    #[test]
    fn failed_lookups_are_skipped_with_reason() {
        let resolver = FakeResolver::default()
            .with(1, "/a")
            .failing(2, SkipReason::AccessDenied)
            .failing(3, SkipReason::Zombie)
            .failing(4, SkipReason::AccessDenied);
        let mut cache = PidCwdCache::new();
        let report = aggregate_directories(
            &[
                proc(1, 5.0, 0.0),
                proc(2, 50.0, 0.0),
                proc(3, 60.0, 0.0),
                proc(4, 70.0, 0.0),
                proc(5, 80.0, 0.0),
            ],
            &mut cache,
            &resolver,
            5,
        );
        assert_eq!(paths(&report), vec!["/a"]);
        assert_eq!(report.top[0].cpu_percent, 5.0);
        assert_eq!(report.skipped.len(), 4);
        assert_eq!(report.skipped_by(SkipReason::AccessDenied), 2);
        assert_eq!(report.skipped_by(SkipReason::Zombie), 1);
        assert_eq!(report.skipped_by(SkipReason::Vanished), 1);
        assert_eq!(cache.len(), 1);
        assert!(!cache.contains(2));
    }

    #[test]
    fn sorted_by_cpu_and_truncated() {
        let resolver = FakeResolver::default()
            .with(1, "/low")
            .with(2, "/high")
            .with(3, "/mid")
            .with(4, "/tie");
        let mut cache = PidCwdCache::new();
        let procs = [
            proc(1, 1.0, 0.0),
            proc(2, 40.0, 0.0),
            proc(3, 20.0, 0.0),
            proc(4, 20.0, 0.0),
        ];
        let report = aggregate_directories(&procs, &mut cache, &resolver, 3);
        assert_eq!(paths(&report), vec!["/high", "/mid", "/tie"]);
    }

    #[test]
    fn nan_directory_ranks_after_finite_ones() {
        let resolver = FakeResolver::default().with(1, "/d1").with(2, "/d2");
        let mut cache = PidCwdCache::new();
        let procs = [proc(1, 50.0, 0.0), proc(2, f32::NAN, 0.0)];
        let report = aggregate_directories(&procs, &mut cache, &resolver, 5);
        assert_eq!(paths(&report), vec!["/d1", "/d2"]);

        let report = aggregate_directories(&procs, &mut cache, &resolver, 1);
        assert_eq!(paths(&report), vec!["/d1"]);
    }

    #[test]
    fn aggregation_is_repeatable() {
        let resolver = FakeResolver::default()
            .with(1, "/x")
            .with(2, "/y")
            .with(3, "/x")
            .failing(4, SkipReason::Zombie);
        let mut cache = PidCwdCache::new();
        let procs = [
            proc(1, 3.0, 1.0),
            proc(2, 4.0, 1.0),
            proc(3, 3.0, 1.0),
            proc(4, 9.0, 1.0),
        ];
        let first = aggregate_directories(&procs, &mut cache, &resolver, 5);
        let second = aggregate_directories(&procs, &mut cache, &resolver, 5);
        assert_eq!(first.top, second.top);
        assert_eq!(paths(&first), vec!["/x", "/y"]);
    }
}
