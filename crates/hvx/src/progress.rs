//! 📊 Per-dataset progress display — "are we there yet?", but with numbers.
//!
//! One bar per dataset collection, multiplexed through a shared
//! `MultiProgress` so concurrently running datasets don't fight over the
//! terminal. The request rate is computed over a 5-second sliding window,
//! so the jitter between individual requests doesn't make the number flap.
//!
//! ⚠️ Warning: watching the bar will not make the throttle shorter.
//! We checked. Repeatedly.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

const RATE_WINDOW: Duration = Duration::from_secs(5);

pub(crate) struct ProgressMetrics {
    dataset: String,
    attempted: u64,
    succeeded: u64,
    failed: u64,
    bar: ProgressBar,
    /// 🪟 Sliding window of (timestamp, attempted) samples.
    rate_samples: VecDeque<(Instant, u64)>,
}

impl std::fmt::Debug for ProgressMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // -- ProgressBar has no Debug impl, so we introduce everyone ourselves
        f.debug_struct("ProgressMetrics")
            .field("dataset", &self.dataset)
            .field("attempted", &self.attempted)
            .field("succeeded", &self.succeeded)
            .field("failed", &self.failed)
            .finish()
    }
}

impl ProgressMetrics {
    pub(crate) fn new(multi: &MultiProgress, dataset: &str, total: usize) -> Self {
        let bar = multi.add(ProgressBar::new(total as u64));
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{msg}\n| [{bar:40.cyan/blue}] {pos}/{len}")
                .expect("💀 The progress template is static. If this breaks, physics broke.")
                .progress_chars("=>-"),
        );
        bar.set_message(dataset.to_string());

        let mut rate_samples = VecDeque::new();
        rate_samples.push_back((Instant::now(), 0));

        Self {
            dataset: dataset.to_string(),
            attempted: 0,
            succeeded: 0,
            failed: 0,
            bar,
            rate_samples,
        }
    }

    /// 🔢 Records one finished unit of work and re-renders.
    pub(crate) fn update(&mut self, succeeded: bool) {
        self.attempted += 1;
        if succeeded {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }

        let rate = self.current_rate();
        self.bar.set_message(format!(
            "{}  ok {}  failed {}  {:.1} req/s",
            self.dataset, self.succeeded, self.failed, rate
        ));
        self.bar.set_position(self.attempted);
    }

    pub(crate) fn finish(&self) {
        self.bar.finish();
    }

    fn current_rate(&mut self) -> f64 {
        let now = Instant::now();
        // -- 🧹 sweep out samples older than the window before reading it
        while let Some(&(timestamp, _)) = self.rate_samples.front() {
            if now.duration_since(timestamp) > RATE_WINDOW {
                self.rate_samples.pop_front();
            } else {
                break;
            }
        }
        self.rate_samples.push_back((now, self.attempted));

        if let Some(&(oldest_time, oldest_attempted)) = self.rate_samples.front() {
            let elapsed = now.duration_since(oldest_time).as_secs_f64();
            if elapsed > 0.0 {
                return self.attempted.saturating_sub(oldest_attempted) as f64 / elapsed;
            }
        }
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_one_where_the_counts_partition_cleanly() {
        let multi = MultiProgress::new();
        let mut metrics = ProgressMetrics::new(&multi, "chemistry: pH", 4);
        metrics.update(true);
        metrics.update(false);
        metrics.update(true);
        assert_eq!(metrics.attempted, 3);
        assert_eq!(metrics.succeeded, 2);
        assert_eq!(metrics.failed, 1);
        metrics.finish();
    }
}
