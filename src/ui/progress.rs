use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

/// Receives per-ticker progress from the collection loops.
pub trait ProgressReporter {
    /// Called before fetching the ticker at `index` (1-based) of `total`.
    fn advance(&self, index: usize, total: usize, ticker: &str);

    /// Called once the loop is done.
    fn finish(&self) {}
}

/// Logs a progress line every `every` tickers and on the last one.
pub struct LogProgress {
    label: &'static str,
    every: usize,
}

impl LogProgress {
    pub fn new(label: &'static str, every: usize) -> Self {
        Self {
            label,
            every: every.max(1),
        }
    }

    /// Whether the ticker at `index` of `total` gets a progress line.
    pub fn should_report(&self, index: usize, total: usize) -> bool {
        index % self.every == 0 || index == total
    }
}

impl ProgressReporter for LogProgress {
    fn advance(&self, index: usize, total: usize, _ticker: &str) {
        if self.should_report(index, total) {
            let pct = index as f64 / total as f64 * 100.0;
            info!(
                "{} progress: {}/{} tickers ({:.1}%)",
                self.label, index, total, pct
            );
        }
    }
}

/// Terminal progress bar for interactive runs.
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new(label: &str, total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::with_template(
            "{prefix} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        ) {
            bar.set_style(style.progress_chars("=> "));
        }
        bar.set_prefix(label.to_string());
        Self { bar }
    }
}

impl ProgressReporter for BarProgress {
    fn advance(&self, index: usize, _total: usize, ticker: &str) {
        self.bar.set_position(index.saturating_sub(1) as u64);
        self.bar.set_message(ticker.to_string());
    }

    fn finish(&self) {
        self.bar.finish_with_message("done");
    }
}

/// Reports nothing.
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn advance(&self, _index: usize, _total: usize, _ticker: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_progress_reports_every_n_and_last() {
        let progress = LogProgress::new("Dividends", 10);
        assert!(!progress.should_report(1, 25));
        assert!(progress.should_report(10, 25));
        assert!(progress.should_report(20, 25));
        assert!(!progress.should_report(24, 25));
        assert!(progress.should_report(25, 25));
    }

    #[test]
    fn test_log_progress_zero_interval_reports_everything() {
        let progress = LogProgress::new("Quotes", 0);
        assert!(progress.should_report(1, 3));
        assert!(progress.should_report(2, 3));
    }

    #[test]
    fn test_bar_progress_tracks_position() {
        let progress = BarProgress::new("Quotes", 3);
        progress.advance(1, 3, "PETR4");
        progress.advance(2, 3, "VALE3");
        assert_eq!(progress.bar.position(), 1);
        progress.finish();
        assert!(progress.bar.is_finished());
    }
}
