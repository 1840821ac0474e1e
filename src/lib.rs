pub mod collectors;
pub mod config;
pub mod directories;
pub mod history;
pub mod ranking;
pub mod rate;
pub mod sampler;
pub mod sparkline;
pub mod state;
pub mod ui;
