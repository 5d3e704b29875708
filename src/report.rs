// File: report.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use crate::profile::ProfileResults;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::time::Duration;

/// One profile run, flattened for rendering. Latencies are milliseconds;
/// a run with no successful samples carries zeroes.
#[derive(Debug, Serialize)]
pub struct ProfileSummary {
    pub requests: u64,
    pub failed_requests: u64,
    pub percent_successful: f64,
    pub fastest_ms: f64,
    pub slowest_ms: f64,
    pub mean_ms: f64,
    pub median_ms: f64,
    pub smallest_response_bytes: u64,
    pub largest_response_bytes: u64,
    pub failing_status_counts: BTreeMap<u16, u64>,
}

impl ProfileSummary {
    /// Materializes the summary, computing the median over the stored
    /// samples. Called once per run, after the last request.
    pub fn from_results(results: &mut ProfileResults) -> Self {
        let requests = results.requests();
        let failed_requests = results.failed_requests();
        let percent_successful = if requests == 0 {
            0.0
        } else {
            (requests - failed_requests) as f64 * 100.0 / requests as f64
        };

        let failing_status_counts = results
            .status_counts()
            .iter()
            .filter(|(status, _)| **status >= 400)
            .map(|(status, count)| (*status, *count))
            .collect();

        ProfileSummary {
            requests,
            failed_requests,
            percent_successful,
            fastest_ms: to_millis(results.fastest()),
            slowest_ms: to_millis(results.slowest()),
            mean_ms: to_millis(results.mean()),
            median_ms: to_millis(results.median()),
            smallest_response_bytes: results.smallest_response_bytes().unwrap_or(0),
            largest_response_bytes: results.largest_response_bytes().unwrap_or(0),
            failing_status_counts,
        }
    }
}

fn to_millis(duration: Option<Duration>) -> f64 {
    duration.map_or(0.0, |d| d.as_secs_f64() * 1000.0)
}

pub enum ReportFormat {
    Text,
    Json,
}

pub struct ReportGenerator;

impl ReportGenerator {
    pub fn generate_report(summary: &ProfileSummary, format: ReportFormat) -> String {
        match format {
            ReportFormat::Text => Self::generate_text_report(summary),
            ReportFormat::Json => Self::generate_json_report(summary),
        }
    }

    pub fn generate_text_report(summary: &ProfileSummary) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{:<22}{}", "Requests:", summary.requests);
        let _ = writeln!(
            out,
            "{:<22}{:.2} %",
            "Successful:", summary.percent_successful
        );
        let _ = writeln!(out, "{:<22}{:.2} ms", "Fastest request:", summary.fastest_ms);
        let _ = writeln!(out, "{:<22}{:.2} ms", "Slowest request:", summary.slowest_ms);
        let _ = writeln!(out, "{:<22}{:.2} ms", "Mean time:", summary.mean_ms);
        let _ = writeln!(out, "{:<22}{:.2} ms", "Median time:", summary.median_ms);
        let _ = writeln!(
            out,
            "{:<22}{} bytes",
            "Smallest response:", summary.smallest_response_bytes
        );
        let _ = writeln!(
            out,
            "{:<22}{} bytes",
            "Largest response:", summary.largest_response_bytes
        );
        let failing = if summary.failing_status_counts.is_empty() {
            "none".to_string()
        } else {
            summary
                .failing_status_counts
                .iter()
                .map(|(status, count)| format!("{} ({})", status, count))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let _ = writeln!(out, "{:<22}{}", "Failing status codes:", failing);
        out
    }

    pub fn generate_json_report(summary: &ProfileSummary) -> String {
        let mut json = serde_json::to_string_pretty(summary).unwrap();
        json.push('\n');
        json
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_summary() -> ProfileSummary {
        ProfileSummary {
            requests: 8,
            failed_requests: 3,
            percent_successful: 62.5,
            fastest_ms: 1.25,
            slowest_ms: 18.9,
            mean_ms: 4.0,
            median_ms: 2.88,
            smallest_response_bytes: 512,
            largest_response_bytes: 2048,
            failing_status_counts: BTreeMap::from([(404, 2), (500, 1)]),
        }
    }

    #[test]
    fn text_report_lists_every_field() {
        let text = ReportGenerator::generate_text_report(&sample_summary());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Requests:             8");
        assert_eq!(lines[1], "Successful:           62.50 %");
        assert_eq!(lines[2], "Fastest request:      1.25 ms");
        assert_eq!(lines[3], "Slowest request:      18.90 ms");
        assert_eq!(lines[4], "Mean time:            4.00 ms");
        assert_eq!(lines[5], "Median time:          2.88 ms");
        assert_eq!(lines[6], "Smallest response:    512 bytes");
        assert_eq!(lines[7], "Largest response:     2048 bytes");
        assert_eq!(lines[8], "Failing status codes: 404 (2), 500 (1)");
    }

    #[test]
    fn failing_codes_render_none_when_absent() {
        let mut summary = sample_summary();
        summary.failing_status_counts.clear();
        let text = ReportGenerator::generate_text_report(&summary);
        assert!(text.contains("Failing status codes: none"));
    }

    #[test]
    fn json_report_carries_the_same_fields() {
        let json = ReportGenerator::generate_json_report(&sample_summary());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["requests"], 8);
        assert_eq!(value["failed_requests"], 3);
        assert_eq!(value["percent_successful"], 62.5);
        assert_eq!(value["smallest_response_bytes"], 512);
        assert_eq!(value["failing_status_counts"]["404"], 2);
        assert_eq!(value["failing_status_counts"]["500"], 1);
        assert!(json.ends_with('\n'));
    }

    #[test]
    fn empty_results_summarize_to_zeroes() {
        let mut results = ProfileResults::new(0);
        let summary = ProfileSummary::from_results(&mut results);
        assert_eq!(summary.requests, 0);
        assert_eq!(summary.percent_successful, 0.0);
        assert_eq!(summary.fastest_ms, 0.0);
        assert_eq!(summary.median_ms, 0.0);
        assert_eq!(summary.smallest_response_bytes, 0);
        assert!(summary.failing_status_counts.is_empty());
    }

    #[test]
    fn summary_separates_failing_codes_from_the_tally() {
        let mut results = ProfileResults::new(4);
        results.record_success(200, Duration::from_millis(10), 100);
        results.record_success(404, Duration::from_millis(20), 200);
        results.record_success(500, Duration::from_millis(30), 300);
        results.record_failure();

        let summary = ProfileSummary::from_results(&mut results);
        assert_eq!(summary.requests, 4);
        assert_eq!(summary.failed_requests, 3);
        assert_eq!(summary.percent_successful, 25.0);
        assert_eq!(summary.median_ms, 20.0);
        assert_eq!(
            summary.failing_status_counts,
            BTreeMap::from([(404, 1), (500, 1)])
        );
    }
}
