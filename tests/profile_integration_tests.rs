// File: profile_integration_tests.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

mod common;

use common::MockServer;
use rfetch::config::ConfigParameter;
use rfetch::profile::run_profile;
use rfetch::report::ProfileSummary;
use rfetch::target::Target;
use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;

#[tokio::test]
async fn status_cycle_tally_matches_the_distribution() {
    let server = MockServer::start(vec![
        b"HTTP/1.1 200 OK\r\n\r\nbody".to_vec(),
        b"HTTP/1.1 404 Not Found\r\n\r\n".to_vec(),
        b"HTTP/1.1 200 OK\r\n\r\nbody".to_vec(),
        b"HTTP/1.1 500 Internal Server Error\r\n\r\n".to_vec(),
    ])
    .await;
    let target = Target::parse(&server.url()).unwrap();
    let stop = AtomicBool::new(false);

    let results = run_profile(8, &target, None, ConfigParameter::new(), &stop).await;

    assert_eq!(results.requests(), 8);
    assert_eq!(results.failed_requests(), 4);
    assert_eq!(results.status_counts().get(&200), Some(&4));
    assert_eq!(results.status_counts().get(&404), Some(&2));
    assert_eq!(results.status_counts().get(&500), Some(&2));
    assert_eq!(results.sample_count(), 8);
}

#[tokio::test]
async fn byte_extremes_span_the_smallest_and_largest_responses() {
    let small = b"HTTP/1.1 200 OK\r\n\r\nx".to_vec();
    let large = b"HTTP/1.1 200 OK\r\n\r\na much longer body than the other one".to_vec();
    let small_len = small.len() as u64;
    let large_len = large.len() as u64;
    let server = MockServer::start(vec![small, large]).await;
    let target = Target::parse(&server.url()).unwrap();
    let stop = AtomicBool::new(false);

    let results = run_profile(4, &target, None, ConfigParameter::new(), &stop).await;

    assert_eq!(results.requests(), 4);
    assert_eq!(results.smallest_response_bytes(), Some(small_len));
    assert_eq!(results.largest_response_bytes(), Some(large_len));
    assert!(results.fastest().unwrap() <= results.slowest().unwrap());
}

#[tokio::test]
async fn all_failing_responses_still_produce_a_summary() {
    let server = MockServer::start(vec![
        b"HTTP/1.1 503 Service Unavailable\r\n\r\n".to_vec(),
    ])
    .await;
    let target = Target::parse(&server.url()).unwrap();
    let stop = AtomicBool::new(false);

    let mut results = run_profile(3, &target, None, ConfigParameter::new(), &stop).await;
    let summary = ProfileSummary::from_results(&mut results);

    assert_eq!(summary.requests, 3);
    assert_eq!(summary.failed_requests, 3);
    assert_eq!(summary.percent_successful, 0.0);
    assert_eq!(summary.failing_status_counts, BTreeMap::from([(503, 3)]));
    // Error statuses still carry latency and byte samples.
    assert!(summary.median_ms > 0.0);
    assert!(summary.smallest_response_bytes > 0);
}

#[tokio::test]
async fn transport_failures_count_without_contributing_samples() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let target = Target::parse(&format!("http://{}", addr)).unwrap();
    let stop = AtomicBool::new(false);

    let mut results = run_profile(3, &target, None, ConfigParameter::new(), &stop).await;

    assert_eq!(results.requests(), 3);
    assert_eq!(results.failed_requests(), 3);
    assert_eq!(results.sample_count(), 0);
    assert_eq!(results.smallest_response_bytes(), None);
    assert_eq!(results.median(), None);

    let summary = ProfileSummary::from_results(&mut results);
    assert_eq!(summary.percent_successful, 0.0);
    assert!(summary.failing_status_counts.is_empty());
}

#[tokio::test]
async fn preset_stop_flag_ends_the_run_before_the_first_request() {
    let server = MockServer::start(vec![b"HTTP/1.1 200 OK\r\n\r\n".to_vec()]).await;
    let target = Target::parse(&server.url()).unwrap();
    let stop = AtomicBool::new(true);

    let results = run_profile(5, &target, None, ConfigParameter::new(), &stop).await;

    assert_eq!(results.requests(), 0);
    assert!(server.received_requests().await.is_empty());
}
