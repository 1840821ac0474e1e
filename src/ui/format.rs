use chrono::{DateTime, Local};
use ratatui::style::Color;

const RATE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

pub fn format_rate(bytes_per_sec: f64) -> String {
    let mut value = bytes_per_sec;
    for unit in RATE_UNITS {
        if value < 1024.0 {
            return format!("{value:.1} {unit}/s");
        }
        value /= 1024.0;
    }
    format!("{value:.1} PB/s")
}

pub fn format_gb(bytes: u64) -> String {
    format!("{:.2} GB", bytes as f64 / 1e9)
}

pub fn format_uptime(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if days > 0 {
        format!("{days}d {hours:02}:{mins:02}:{secs:02}")
    } else {
        format!("{hours:02}:{mins:02}:{secs:02}")
    }
}

const LOCAL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Unix seconds as wall-clock time in the local timezone.
pub fn format_local(ts: i64) -> String {
    match DateTime::from_timestamp(ts, 0) {
        Some(utc) => utc.with_timezone(&Local).format(LOCAL_TIME_FORMAT).to_string(),
        None => "-".to_string(),
    }
}

pub fn percent_color(value: f64) -> Color {
    if value > 80.0 {
        Color::Red
    } else if value > 50.0 {
        Color::Yellow
    } else {
        Color::Green
    }
}

pub fn temp_color(celsius: f64) -> Color {
    if celsius > 80.0 {
        Color::Red
    } else if celsius > 60.0 {
        Color::Yellow
    } else {
        Color::Cyan
    }
}

/// Text progress bar of `width` cells.
pub fn bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    let mut out = String::with_capacity(width * 3);
    out.extend(std::iter::repeat('█').take(filled));
    out.extend(std::iter::repeat('░').take(width - filled));
    out
}

pub fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
