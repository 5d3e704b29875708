// File: main.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use clap::Parser;
use colored::*;
use log::{info, warn};
use rfetch::cli::Cli;
use rfetch::config::ConfigParameter;
use rfetch::http::{AbortSignal, Http};
use rfetch::outcome::RequestOutcome;
use rfetch::profile::run_profile;
use rfetch::report::{ProfileSummary, ReportFormat, ReportGenerator};
use rfetch::target::Target;
use std::collections::HashMap;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = log::Level::from_str(&cli.log_level).unwrap_or(log::Level::Warn);
    if let Err(e) = simple_logger::init_with_level(level) {
        eprintln!("could not initialize logging: {}", e);
    }

    let target = match Target::parse(&cli.url) {
        Ok(target) => target,
        Err(e) => {
            print_error(&e.to_string());
            return ExitCode::from(2);
        }
    };

    let overrides = match cli.header_overrides() {
        Ok(overrides) => overrides,
        Err(e) => {
            print_error(&e.to_string());
            return ExitCode::from(2);
        }
    };

    let mut config = ConfigParameter::new();
    config.set_connect_timeout(cli.connect_timeout);
    config.set_tls_verify(cli.tls_verify);

    match cli.profile {
        Some(repetitions) => {
            profile_mode(&cli, repetitions, &target, overrides.as_ref(), config).await
        }
        None => single_mode(&cli, &target, overrides.as_ref(), config).await,
    }
}

/// Fetches the target once and streams the body to stdout or `--output`.
async fn single_mode(
    cli: &Cli,
    target: &Target,
    overrides: Option<&HashMap<String, String>>,
    config: ConfigParameter,
) -> ExitCode {
    let http = Http::new(config);
    let mut abort = cli.max_time.map(|secs| {
        arm_abort_timer(
            Duration::from_secs(secs),
            cli.grace.map(Duration::from_millis),
        )
    });

    let outcome = match &cli.output {
        Some(path) => {
            let mut file = match tokio::fs::File::create(path).await {
                Ok(file) => file,
                Err(e) => {
                    print_error(&format!("could not create {}: {}", path.display(), e));
                    return ExitCode::from(2);
                }
            };
            http.make_request(target, &mut file, overrides, abort.as_mut())
                .await
        }
        None => {
            let mut stdout = tokio::io::stdout();
            http.make_request(target, &mut stdout, overrides, abort.as_mut())
                .await
        }
    };

    report_outcome(target, &outcome)
}

/// Arms a timer that signals the abort channel after `max_time`: with a
/// grace period the value is sent over the channel, without one the
/// channel is simply closed for an immediate abort.
fn arm_abort_timer(max_time: Duration, grace: Option<Duration>) -> AbortSignal {
    let (tx, rx) = mpsc::channel(1);
    tokio::spawn(async move {
        tokio::time::sleep(max_time).await;
        if let Some(grace) = grace {
            let _ = tx.send(grace).await;
        }
    });
    rx
}

fn report_outcome(target: &Target, outcome: &RequestOutcome) -> ExitCode {
    match &outcome.error {
        None => {
            if let Some(status) = outcome.status {
                info!(
                    "{} answered with status {}, {} bytes on the wire",
                    target, status, outcome.bytes_read
                );
            }
            ExitCode::SUCCESS
        }
        Some(error) => {
            print_error(&error.to_string());
            if let Some(status) = outcome.status {
                warn!(
                    "partial response before the failure: status {}, {} bytes",
                    status, outcome.bytes_read
                );
            }
            ExitCode::FAILURE
        }
    }
}

/// Runs the profiler and prints the summary. Ctrl-C ends the run after
/// the current request; the partial statistics are still reported.
async fn profile_mode(
    cli: &Cli,
    repetitions: u32,
    target: &Target,
    overrides: Option<&HashMap<String, String>>,
    config: ConfigParameter,
) -> ExitCode {
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = Arc::clone(&stop);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping after the current request");
            stop_flag.store(true, Ordering::Relaxed);
        }
    });

    let mut results = run_profile(repetitions, target, overrides, config, &stop).await;
    let summary = ProfileSummary::from_results(&mut results);
    let format = if cli.json {
        ReportFormat::Json
    } else {
        ReportFormat::Text
    };
    print!("{}", ReportGenerator::generate_report(&summary, format));
    ExitCode::SUCCESS
}

fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}
