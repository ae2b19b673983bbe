// file: src/pipeline/progress.rs
// description: progress tracking and statistics reporting for enrichment runs
// reference: uses indicatif for progress bars and tracks processing metrics

use crate::pipeline::orchestrator::EnrichmentOutcome;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnrichmentStats {
    pub enriched: usize,
    pub failed: usize,
    pub timed_out: usize,
    pub duration_secs: u64,
}

impl EnrichmentStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> usize {
        self.enriched + self.failed + self.timed_out
    }

    pub fn incidents_per_second(&self) -> f64 {
        if self.duration_secs == 0 {
            return 0.0;
        }
        self.total() as f64 / self.duration_secs as f64
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.enriched as f64 / total as f64) * 100.0
    }
}

pub struct ProgressTracker {
    main_bar: ProgressBar,
    detail_bar: ProgressBar,
    enriched: Arc<AtomicUsize>,
    failed: Arc<AtomicUsize>,
    timed_out: Arc<AtomicUsize>,
    start_time: Instant,
}

impl ProgressTracker {
    /// An invisible tracker still counts outcomes but draws nothing.
    pub fn with_visibility(total_incidents: usize, visible: bool) -> Self {
        let (main_bar, detail_bar) = if visible {
            let multi_progress = MultiProgress::new();
            (
                create_progress_bar(&multi_progress, total_incidents as u64),
                create_detail_bar(&multi_progress),
            )
        } else {
            (
                ProgressBar::hidden(),
                ProgressBar::hidden(),
            )
        };

        Self {
            main_bar,
            detail_bar,
            enriched: Arc::new(AtomicUsize::new(0)),
            failed: Arc::new(AtomicUsize::new(0)),
            timed_out: Arc::new(AtomicUsize::new(0)),
            start_time: Instant::now(),
        }
    }

    pub fn record(&self, outcome: &EnrichmentOutcome) {
        let counter = match outcome {
            EnrichmentOutcome::Enriched(_) => &self.enriched,
            EnrichmentOutcome::Failed { .. } => &self.failed,
            EnrichmentOutcome::TimedOut(_) => &self.timed_out,
        };
        counter.fetch_add(1, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn set_message(&self, message: String) {
        self.detail_bar.set_message(message);
    }

    pub fn finish(&self) {
        self.main_bar.finish_with_message("Enrichment complete");
        self.detail_bar.finish_and_clear();
    }

    pub fn get_stats(&self) -> EnrichmentStats {
        EnrichmentStats {
            enriched: self.enriched.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
            timed_out: self.timed_out.load(Ordering::SeqCst),
            duration_secs: self.start_time.elapsed().as_secs(),
        }
    }

    fn update_detail_bar(&self) {
        let message = format!(
            "Enriched: {} | Failed: {} | Timed out: {}",
            self.enriched.load(Ordering::SeqCst),
            self.failed.load(Ordering::SeqCst),
            self.timed_out.load(Ordering::SeqCst)
        );

        self.detail_bar.set_message(message);
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.finish();
    }
}

fn create_progress_bar(multi_progress: &MultiProgress, total: u64) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(total));
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░");
    bar.set_style(style);
    bar
}

fn create_detail_bar(multi_progress: &MultiProgress) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(0));
    let style = ProgressStyle::default_bar()
        .template("{msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar
}
