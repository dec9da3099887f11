//! Crawl progress reporting.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const BAR_TEMPLATE: &str = "Repos: {pos} / {len} [{bar:40.cyan/blue}] {percent:>3}%";

/// Counts completed repositories and optionally drives a terminal progress bar.
///
/// Clones share the same counter and bar, so every worker can hold its own handle.
#[derive(Clone)]
pub struct Progress {
    completed: Arc<AtomicUsize>,
    bar: Option<ProgressBar>,
}

impl Progress {
    /// Creates a counter without any terminal output.
    #[must_use]
    pub fn hidden() -> Self {
        Self {
            completed: Arc::new(AtomicUsize::new(0)),
            bar: None,
        }
    }

    /// Creates a counter whose bar is drawn by `bars`.
    ///
    /// Log output that goes through [`MultiProgress::suspend`] on the same `bars` is
    /// printed above the bar instead of tearing it.
    #[must_use]
    pub fn with_bar(bars: &MultiProgress, total: usize) -> Self {
        let style = ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("▌▌░");
        let bar = bars.add(ProgressBar::new(total as u64).with_style(style));
        Self {
            completed: Arc::new(AtomicUsize::new(0)),
            bar: Some(bar),
        }
    }

    /// Records one completed repository.
    pub fn increment(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    /// Number of repositories completed so far.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    /// Stops rendering the bar.
    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish();
        }
    }
}

impl fmt::Debug for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Progress")
            .field("completed", &self.completed())
            .field("bar", &self.bar.is_some())
            .finish()
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::hidden()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_counter() {
        let progress = Progress::hidden();
        let handle = progress.clone();

        progress.increment();
        handle.increment();

        assert_eq!(progress.completed(), 2);
        assert_eq!(handle.completed(), 2);
    }

    #[test]
    fn bar_counter_matches() {
        let bars = MultiProgress::with_draw_target(indicatif::ProgressDrawTarget::hidden());
        let progress = Progress::with_bar(&bars, 3);
        progress.increment();
        progress.finish();
        assert_eq!(progress.completed(), 1);
    }
}
