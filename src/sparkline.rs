//! Sparkline encoding for history windows.
//!
//! Values are quantized onto the 8-level block ramp and the output is always
//! exactly as wide as requested, left-padded with blanks.

pub const RAMP: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
pub const BLANK: char = ' ';

pub fn encode<I>(values: I, width: usize, vmin: f64, vmax: f64) -> String
where
    I: IntoIterator<Item = f64>,
    I::IntoIter: DoubleEndedIterator,
{
    let range = match vmax - vmin {
        r if r == 0.0 => 1.0,
        r => r,
    };
    let top = (RAMP.len() - 1) as f64;

    let mut recent: Vec<char> = values
        .into_iter()
        .rev()
        .take(width)
        .map(|v| {
            let scaled = ((v - vmin) / range * top).floor();
            let level = if scaled.is_finite() {
                scaled.clamp(0.0, top) as usize
            } else {
                0
            };
            RAMP[level]
        })
        .collect();
    recent.reverse();

    let mut out = String::with_capacity(width * 3);
    out.extend(std::iter::repeat(BLANK).take(width - recent.len()));
    out.extend(recent);
    out
}

/// Fixed 0..100 range, used for CPU and RAM percentages.
pub fn encode_percent(history: &[f64], width: usize) -> String {
    encode(history.iter().copied(), width, 0.0, 100.0)
}

/// Range 0..max(history), recomputed on every call. An empty window or one
/// whose maximum is not positive falls back to 0..1.
pub fn encode_auto(history: &[f64], width: usize) -> String {
    let vmax = history
        .iter()
        .copied()
        .reduce(f64::max)
        .filter(|m| *m > 0.0)
        .unwrap_or(1.0);
    encode(history.iter().copied(), width, 0.0, vmax)
}
