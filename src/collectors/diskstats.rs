use crate::state::DiskIoStat;
#[cfg(target_os = "linux")]
use std::fs;
#[cfg(target_os = "linux")]
use std::path::Path;

const SECTOR_BYTES: u64 = 512;

/// Cumulative read/write bytes over whole block devices.
#[cfg(target_os = "linux")]
pub fn read_disk_io() -> Option<DiskIoStat> {
    let text = fs::read_to_string("/proc/diskstats").ok()?;
    let sys_block = Path::new("/sys/block");
    Some(parse_diskstats(&text, |name| sys_block.join(name).exists()))
}

#[cfg(not(target_os = "linux"))]
pub fn read_disk_io() -> Option<DiskIoStat> {
    None
}

/// Format: "major minor name reads merged sectors_read ms writes merged sectors_written ..."
pub fn parse_diskstats(text: &str, is_whole_disk: impl Fn(&str) -> bool) -> DiskIoStat {
    let mut total = DiskIoStat::default();

    for line in text.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 10 {
            continue;
        }
        let name = parts[2];
        if name.starts_with("loop") || name.starts_with("ram") || !is_whole_disk(name) {
            continue;
        }
        let (Ok(sectors_read), Ok(sectors_written)) =
            (parts[5].parse::<u64>(), parts[9].parse::<u64>())
        else {
            continue;
        };
        total.read_bytes = total
            .read_bytes
            .saturating_add(sectors_read.saturating_mul(SECTOR_BYTES));
        total.write_bytes = total
            .write_bytes
            .saturating_add(sectors_written.saturating_mul(SECTOR_BYTES));
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
   7       0 loop0 50 0 400 10 0 0 0 0 0 10 10 0 0 0 0
   8       0 sda 1000 20 2000 300 500 10 4000 200 0 400 500 0 0 0 0
   8       1 sda1 900 20 1800 280 450 10 3600 190 0 380 470 0 0 0 0
 259       0 nvme0n1 10 0 8 1 2 0 16 1 0 2 2 0 0 0 0
   1       0 ram0 5 0 10 0 0 0 0 0 0 0 0
 broken line
";

    fn whole_disk(name: &str) -> bool {
        matches!(name, "sda" | "nvme0n1" | "loop0" | "ram0")
    }

    #[test]
    fn sums_whole_disks_only() {
        let io = parse_diskstats(SAMPLE, whole_disk);
        assert_eq!(io.read_bytes, (2000 + 8) * 512);
        assert_eq!(io.write_bytes, (4000 + 16) * 512);
    }

    #[test]
    fn empty_input_is_zero() {
        assert_eq!(parse_diskstats("", |_| true), DiskIoStat::default());
    }
}
