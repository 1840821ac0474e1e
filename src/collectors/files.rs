use crate::state::RecentFile;
use std::fs;
use std::path::Path;
use std::time::UNIX_EPOCH;
use tracing::debug;

pub const DEFAULT_RECENT_FILES: usize = 6;

/// Regular files directly under `dir`, most recently modified first.
///
/// An unreadable directory yields an empty list; entries that fail to stat
/// are skipped. Symlinks are not followed.
pub fn recent_files(dir: &Path, limit: usize) -> Vec<RecentFile> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!(dir = %dir.display(), error = %err, "watch dir not readable");
            return Vec::new();
        }
    };

    let mut files: Vec<RecentFile> = entries
        .flatten()
        .filter_map(|entry| {
            let file_type = entry.file_type().ok()?;
            if !file_type.is_file() {
                return None;
            }
            let modified = entry.metadata().ok()?.modified().ok()?;
            let modified_unix = match modified.duration_since(UNIX_EPOCH) {
                Ok(d) => d.as_secs() as i64,
                Err(err) => -(err.duration().as_secs() as i64),
            };
            Some(RecentFile {
                path: entry.path().to_string_lossy().into_owned(),
                name: entry.file_name().to_string_lossy().into_owned(),
                modified_unix,
            })
        })
        .collect();

    files.sort_by(|a, b| b.modified_unix.cmp(&a.modified_unix));
    files.truncate(limit);
    files
}
