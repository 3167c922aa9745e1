//! Phase-scoped progress counters and the host-facing progress surface.
//!
//! The tracker is reset only at the start of a non-empty phase batch, so a
//! phase with zero eligible symbols never reports a vacuous 0/0 state, and
//! stale totals from an earlier phase are never surfaced: reports only ever
//! happen from inside a batch loop.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use log::warn;

/// Host progress surface.
pub trait ProgressSink {
    /// Receive a progress fraction in `[0, 1]` and a status line.
    fn report(&mut self, fraction: f64, text: &str);
}

/// Host cancellation signal, polled between symbols.
pub trait CancelToken {
    fn is_cancelled(&self) -> bool;
}

/// Shareable atomic cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    flag: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }
}

impl CancelToken for CancelFlag {
    fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Sink that forwards status lines to the logger.
#[derive(Debug, Default)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn report(&mut self, fraction: f64, text: &str) {
        log::info!("[{:>3.0}%] {text}", fraction * 100.0);
    }
}

/// Phase-scoped progress counters driving a [`ProgressSink`].
pub struct ProgressTracker<'a> {
    sink: &'a mut dyn ProgressSink,
    operation: &'static str,
    count: usize,
    total: usize,
    label: String,
}

impl std::fmt::Debug for ProgressTracker<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("operation", &self.operation)
            .field("count", &self.count)
            .field("total", &self.total)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl<'a> ProgressTracker<'a> {
    pub fn new(operation: &'static str, sink: &'a mut dyn ProgressSink) -> Self {
        Self {
            sink,
            operation,
            count: 0,
            total: 0,
            label: String::new(),
        }
    }

    /// Report the job start before any phase has begun.
    pub fn begin(&mut self) {
        self.sink.report(0.0, &format!("Refactor {}...", self.operation));
    }

    /// Zero the counter for a new non-empty phase batch.
    pub fn reset(&mut self, total: usize, label: &str) {
        debug_assert!(total > 0, "empty phases must not reset the tracker");
        self.count = 0;
        self.total = total;
        self.label = label.to_owned();
    }

    /// Count one processed symbol and surface the new fraction and status.
    ///
    /// Calling this more often than `total` within one phase is a logic
    /// error; release builds clamp instead of overflowing.
    pub fn increment(&mut self) {
        debug_assert!(
            self.count < self.total,
            "increment past total in phase {}",
            self.label
        );
        if self.count >= self.total {
            warn!("progress overflow in phase {}", self.label);
            return;
        }
        self.count += 1;
        let fraction = self.count as f64 / self.total as f64;
        let text = format!(
            "{} {} of {} [{}]",
            self.operation, self.count, self.total, self.label
        );
        self.sink.report(fraction, &text);
    }

    /// True once every symbol of the current phase has been counted.
    pub fn phase_complete(&self) -> bool {
        self.count == self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recording {
        reports: Vec<(f64, String)>,
    }

    impl ProgressSink for Recording {
        fn report(&mut self, fraction: f64, text: &str) {
            self.reports.push((fraction, text.to_owned()));
        }
    }

    #[test]
    fn test_fractions_are_monotone_and_end_at_one() {
        let mut sink = Recording::default();
        {
            let mut tracker = ProgressTracker::new("Resource", &mut sink);
            tracker.reset(4, "IdResource");
            for _ in 0..4 {
                tracker.increment();
            }
            assert!(tracker.phase_complete());
        }
        let fractions: Vec<f64> = sink.reports.iter().map(|(f, _)| *f).collect();
        assert_eq!(fractions, vec![0.25, 0.5, 0.75, 1.0]);
        assert!(fractions.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_status_text_format() {
        let mut sink = Recording::default();
        {
            let mut tracker = ProgressTracker::new("Resource", &mut sink);
            tracker.begin();
            tracker.reset(2, "LayoutResource");
            tracker.increment();
        }
        assert_eq!(sink.reports[0].1, "Refactor Resource...");
        assert_eq!(sink.reports[1].1, "Resource 1 of 2 [LayoutResource]");
    }

    #[test]
    fn test_reset_restarts_counts_between_phases() {
        let mut sink = Recording::default();
        {
            let mut tracker = ProgressTracker::new("Resource", &mut sink);
            tracker.reset(1, "IdResource");
            tracker.increment();
            tracker.reset(2, "Resource");
            tracker.increment();
            assert!(!tracker.phase_complete());
            tracker.increment();
            assert!(tracker.phase_complete());
        }
        let fractions: Vec<f64> = sink.reports.iter().map(|(f, _)| *f).collect();
        assert_eq!(fractions, vec![1.0, 0.5, 1.0]);
    }

    #[test]
    fn test_cancel_flag_is_shared() {
        let flag = CancelFlag::new();
        let other = flag.clone();
        assert!(!flag.is_cancelled());
        other.cancel();
        assert!(flag.is_cancelled());
    }
}
