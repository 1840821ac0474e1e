use crate::state::ProcessRecord;
use std::cmp::Ordering;

pub const DEFAULT_TOP_PROCESSES: usize = 8;

/// Top `k` processes by CPU share, highest first.
///
/// Equal shares keep their enumeration order; NaN readings rank last.
pub fn rank_processes(processes: &[ProcessRecord], k: usize) -> Vec<ProcessRecord> {
    let mut order: Vec<&ProcessRecord> = processes.iter().collect();
    // stable sort: ties stay in enumeration order
    order.sort_by(|a, b| by_cpu_desc(f64::from(a.cpu_percent), f64::from(b.cpu_percent)));
    order.into_iter().take(k).cloned().collect()
}

/// Descending CPU order with NaN after every finite value.
pub(crate) fn by_cpu_desc(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}
