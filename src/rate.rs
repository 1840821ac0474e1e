use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rates {
    pub sent_per_sec: f64,
    pub recv_per_sec: f64,
}

#[derive(Debug, Clone, Copy)]
struct Baseline {
    sent: u64,
    recv: u64,
    at_secs: f64,
}

/// Turns cumulative sent/received byte counters into bytes-per-second.
///
/// Counters are assumed to be monotonic. When the OS resets them the next
/// sample reports one negative or oversized rate; that reading is passed
/// through unchanged.
#[derive(Debug, Clone, Default)]
pub struct RateCalculator {
    baseline: Option<Baseline>,
}

impl RateCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `None` on the seeding call, which only records the baseline.
    pub fn sample(&mut self, sent: u64, recv: u64, now_secs: f64) -> Option<Rates> {
        let current = Baseline {
            sent,
            recv,
            at_secs: now_secs,
        };
        let prev = self.baseline.replace(current)?;

        let mut elapsed = now_secs - prev.at_secs;
        if elapsed.is_nan() || elapsed <= 0.0 {
            debug!(elapsed, "non-positive sample interval, using 1s");
            elapsed = 1.0;
        }

        Some(Rates {
            sent_per_sec: (sent as f64 - prev.sent as f64) / elapsed,
            recv_per_sec: (recv as f64 - prev.recv as f64) / elapsed,
        })
    }

    pub fn is_seeded(&self) -> bool {
        self.baseline.is_some()
    }

    pub fn reset(&mut self) {
        self.baseline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_only_seeds() {
        let mut calc = RateCalculator::new();
        assert!(!calc.is_seeded());
        assert_eq!(calc.sample(5_000, 9_000, 100.0), None);
        assert!(calc.is_seeded());
    }

    #[test]
    fn second_sample_yields_bytes_per_second() {
        let mut calc = RateCalculator::new();
        calc.sample(5_000, 9_000, 100.0);
        let rates = calc
            .sample(5_000 + 1024, 9_000 + 2048, 101.0)
            .expect("rates after baseline");
        assert_eq!(rates.sent_per_sec, 1024.0);
        assert_eq!(rates.recv_per_sec, 2048.0);
    }

    #[test]
    fn divides_by_elapsed_time() {
        let mut calc = RateCalculator::new();
        calc.sample(0, 0, 10.0);
        let rates = calc.sample(4096, 1000, 14.0).expect("rates");
        assert_eq!(rates.sent_per_sec, 1024.0);
        assert_eq!(rates.recv_per_sec, 250.0);
    }

    #[test]
    fn zero_or_negative_elapsed_uses_one_second() {
        let mut calc = RateCalculator::new();
        calc.sample(0, 0, 50.0);
        let rates = calc.sample(300, 600, 50.0).expect("rates");
        assert!(rates.sent_per_sec.is_finite());
        assert_eq!(rates.sent_per_sec, 300.0);
        assert_eq!(rates.recv_per_sec, 600.0);

        let rates = calc.sample(400, 700, 49.0).expect("rates");
        assert_eq!(rates.sent_per_sec, 100.0);
        assert_eq!(rates.recv_per_sec, 100.0);
    }

    #[test]
    fn counter_reset_reports_negative_rate() {
        let mut calc = RateCalculator::new();
        calc.sample(10_000, 10_000, 0.0);
        let rates = calc.sample(0, 20_000, 1.0).expect("rates");
        assert_eq!(rates.sent_per_sec, -10_000.0);
        assert_eq!(rates.recv_per_sec, 10_000.0);
    }

    #[test]
    fn baseline_advances_each_sample() {
        let mut calc = RateCalculator::new();
        calc.sample(0, 0, 0.0);
        calc.sample(100, 100, 1.0);
        let rates = calc.sample(300, 150, 2.0).expect("rates");
        assert_eq!(rates.sent_per_sec, 200.0);
        assert_eq!(rates.recv_per_sec, 50.0);
    }

    #[test]
    fn reset_drops_baseline() {
        let mut calc = RateCalculator::new();
        calc.sample(1, 1, 1.0);
        calc.reset();
        assert_eq!(calc.sample(2, 2, 2.0), None);
    }
}
