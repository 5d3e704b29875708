// File: profile.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use crate::config::ConfigParameter;
use crate::http::Http;
use crate::quickselect;
use crate::target::Target;
use indicatif::{ProgressBar, ProgressState, ProgressStyle};
use log::{debug, warn};
use std::collections::HashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Running statistics over one profile run. One latency sample is kept
/// per successful request (the median needs them); everything else is
/// folded in as it arrives.
#[derive(Debug)]
pub struct ProfileResults {
    requests: u64,
    failed_requests: u64,
    fastest: Option<Duration>,
    slowest: Option<Duration>,
    mean_nanos: f64,
    median: Option<Duration>,
    median_current: bool,
    smallest_bytes: Option<u64>,
    largest_bytes: Option<u64>,
    status_counts: HashMap<u16, u64>,
    samples: Vec<Duration>,
}

impl ProfileResults {
    pub fn new(expected_requests: usize) -> Self {
        Self {
            requests: 0,
            failed_requests: 0,
            fastest: None,
            slowest: None,
            mean_nanos: 0.0,
            median: None,
            median_current: false,
            smallest_bytes: None,
            largest_bytes: None,
            status_counts: HashMap::new(),
            samples: Vec::with_capacity(expected_requests),
        }
    }

    /// Folds in one completed request. A status of 400 or above still
    /// contributes its duration and byte samples but counts as failed.
    pub fn record_success(&mut self, status: u16, elapsed: Duration, bytes_read: u64) {
        self.requests += 1;
        if status >= 400 {
            self.failed_requests += 1;
        }

        let nanos = elapsed.as_nanos() as f64;
        let n = (self.samples.len() + 1) as f64;
        self.mean_nanos += (nanos - self.mean_nanos) / n;

        self.fastest = Some(self.fastest.map_or(elapsed, |f| f.min(elapsed)));
        self.slowest = Some(self.slowest.map_or(elapsed, |s| s.max(elapsed)));
        self.smallest_bytes = Some(self.smallest_bytes.map_or(bytes_read, |b| b.min(bytes_read)));
        self.largest_bytes = Some(self.largest_bytes.map_or(bytes_read, |b| b.max(bytes_read)));

        *self.status_counts.entry(status).or_insert(0) += 1;
        self.samples.push(elapsed);
        self.median_current = false;
    }

    /// Folds in one attempt that produced no usable status. Only the two
    /// counters move; duration and byte extremes never see the attempt.
    pub fn record_failure(&mut self) {
        self.requests += 1;
        self.failed_requests += 1;
    }

    pub fn requests(&self) -> u64 {
        self.requests
    }

    pub fn failed_requests(&self) -> u64 {
        self.failed_requests
    }

    pub fn fastest(&self) -> Option<Duration> {
        self.fastest
    }

    pub fn slowest(&self) -> Option<Duration> {
        self.slowest
    }

    pub fn mean(&self) -> Option<Duration> {
        if self.samples.is_empty() {
            None
        } else {
            Some(Duration::from_nanos(self.mean_nanos as u64))
        }
    }

    /// Exact median of the recorded samples, selected without sorting.
    /// The value is cached and recomputed only after new samples arrive;
    /// selection reorders the stored samples in place.
    pub fn median(&mut self) -> Option<Duration> {
        if self.samples.is_empty() {
            return None;
        }
        if !self.median_current {
            self.median = quickselect::median(&mut self.samples).ok();
            self.median_current = true;
        }
        self.median
    }

    pub fn smallest_response_bytes(&self) -> Option<u64> {
        self.smallest_bytes
    }

    pub fn largest_response_bytes(&self) -> Option<u64> {
        self.largest_bytes
    }

    pub fn status_counts(&self) -> &HashMap<u16, u64> {
        &self.status_counts
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

/// Drives up to `repetitions` sequential requests against `target`,
/// discarding response bodies, and returns the accumulated statistics.
/// The stop flag is checked between iterations; a set flag ends the run
/// early with the partial results collected so far.
pub async fn run_profile(
    repetitions: u32,
    target: &Target,
    header_overrides: Option<&HashMap<String, String>>,
    config: ConfigParameter,
    stop: &AtomicBool,
) -> ProfileResults {
    let http = Http::new(config);
    let mut results = ProfileResults::new(repetitions as usize);

    let pb = ProgressBar::new(repetitions as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
        )
        .unwrap()
        .with_key("eta", |state: &ProgressState, w: &mut dyn Write| {
            write!(w, "{:.1}s", state.eta().as_secs_f64()).unwrap()
        })
        .progress_chars("█▉▊▋▌▍▎▏  "),
    );

    for iteration in 0..repetitions {
        if stop.load(Ordering::Relaxed) {
            warn!(
                "profile interrupted after {} of {} requests",
                iteration, repetitions
            );
            break;
        }

        let mut sink = tokio::io::sink();
        let start = Instant::now();
        let outcome = http
            .make_request(target, &mut sink, header_overrides, None)
            .await;
        let elapsed = start.elapsed();

        match (outcome.status, outcome.error) {
            (Some(status), None) => {
                results.record_success(status, elapsed, outcome.bytes_read)
            }
            (_, error) => {
                if let Some(error) = error {
                    debug!("request {} failed: {}", iteration + 1, error);
                }
                results.record_failure();
            }
        }
        pb.inc(1);
    }
    pb.finish();

    results
}
