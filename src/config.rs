use crate::collectors::files::DEFAULT_RECENT_FILES;
use crate::directories::DEFAULT_TOP_DIRECTORIES;
use crate::history::DEFAULT_HISTORY_LEN;
use crate::ranking::DEFAULT_TOP_PROCESSES;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_warmup_ms")]
    pub warmup_ms: u64,
    #[serde(default = "default_history_len")]
    pub history_len: usize,
    #[serde(default = "default_top_processes")]
    pub top_processes: usize,
    #[serde(default = "default_top_directories")]
    pub top_directories: usize,
    #[serde(default = "default_recent_files")]
    pub recent_files: usize,
    #[serde(default = "default_connections_limit")]
    pub connections_limit: usize,
    #[serde(default = "default_watch_dir")]
    pub watch_dir: String,
    #[serde(default)]
    pub log_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            warmup_ms: default_warmup_ms(),
            history_len: default_history_len(),
            top_processes: default_top_processes(),
            top_directories: default_top_directories(),
            recent_files: default_recent_files(),
            connections_limit: default_connections_limit(),
            watch_dir: default_watch_dir(),
            log_file: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse YAML in {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },
    #[error("invalid configuration: {0}")]
    Validation(String),
}

impl Config {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let path_display = path_ref.display().to_string();
        let text = fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
            path: path_display.clone(),
            source,
        })?;

        let cfg: Config = serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path_display,
            source,
        })?;

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_secs < 1 {
            return Err(ConfigError::Validation(
                "interval_secs must be >= 1".to_string(),
            ));
        }
        if self.history_len < 1 {
            return Err(ConfigError::Validation(
                "history_len must be >= 1".to_string(),
            ));
        }
        if self.top_processes < 1 {
            return Err(ConfigError::Validation(
                "top_processes must be >= 1".to_string(),
            ));
        }
        if self.top_directories < 1 {
            return Err(ConfigError::Validation(
                "top_directories must be >= 1".to_string(),
            ));
        }
        if self.watch_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "watch_dir must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// `watch_dir` with a leading `~` expanded to the home directory.
    pub fn watch_dir_path(&self) -> PathBuf {
        expand_home(&self.watch_dir, dirs::home_dir())
    }

    pub fn example_yaml() -> &'static str {
        include_str!("../config.yaml.example")
    }
}

fn expand_home(raw: &str, home: Option<PathBuf>) -> PathBuf {
    let raw = raw.trim();
    match (raw, home) {
        ("~", Some(home)) => home,
        (_, Some(home)) if raw.starts_with("~/") => home.join(&raw[2..]),
        _ => PathBuf::from(raw),
    }
}

const fn default_interval_secs() -> u64 {
    1
}

const fn default_warmup_ms() -> u64 {
    800
}

const fn default_history_len() -> usize {
    DEFAULT_HISTORY_LEN
}

const fn default_top_processes() -> usize {
    DEFAULT_TOP_PROCESSES
}

const fn default_top_directories() -> usize {
    DEFAULT_TOP_DIRECTORIES
}

const fn default_recent_files() -> usize {
    DEFAULT_RECENT_FILES
}

const fn default_connections_limit() -> usize {
    8
}

fn default_watch_dir() -> String {
    "~".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = Config::default();
        cfg.validate().expect("default config must validate");
        assert_eq!(cfg.history_len, 40);
        assert_eq!(cfg.top_processes, 8);
        assert_eq!(cfg.top_directories, 5);
        assert_eq!(cfg.recent_files, 6);
    }

    #[test]
    fn example_yaml_parses_and_validates() {
        let cfg: Config = serde_yaml::from_str(Config::example_yaml()).expect("example parses");
        cfg.validate().expect("example validates");
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let cfg: Config = serde_yaml::from_str("history_len: 10\n").expect("parse");
        assert_eq!(cfg.history_len, 10);
        assert_eq!(cfg.interval_secs, 1);
        assert_eq!(cfg.watch_dir, "~");
    }

    #[test]
    fn rejects_zero_interval_and_history() {
        let cfg = Config {
            interval_secs: 0,
            ..Config::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Validation(_))));

        let cfg = Config {
            history_len: 0,
            ..Config::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = Config::load_from_file(dir.path().join("missing.yaml"))
            .expect_err("missing file must fail");
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn load_reports_bad_yaml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.yaml");
        fs::write(&path, "interval_secs: [not, a, number]\n").expect("write");
        let err = Config::load_from_file(&path).expect_err("bad yaml must fail");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn expands_home_prefix() {
        let home = Some(PathBuf::from("/home/me"));
        assert_eq!(expand_home("~", home.clone()), PathBuf::from("/home/me"));
        assert_eq!(
            expand_home("~/notes", home.clone()),
            PathBuf::from("/home/me/notes")
        );
        assert_eq!(expand_home("/tmp", home), PathBuf::from("/tmp"));
        assert_eq!(expand_home("~", None), PathBuf::from("~"));
    }
}
