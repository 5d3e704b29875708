// File: cli.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use anyhow::{bail, Result};
use clap::Parser;
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = env!("CARGO_PKG_NAME"),
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = env!("CARGO_PKG_DESCRIPTION"),
)]
pub struct Cli {
    #[arg(help = "Target URL; a missing scheme defaults to http")]
    pub url: String,

    #[arg(
        short = 'p',
        long = "profile",
        value_name = "COUNT",
        value_parser = clap::value_parser!(u32).range(1..),
        help = "Issue COUNT sequential requests and report latency statistics"
    )]
    pub profile: Option<u32>,

    #[arg(
        short = 'H',
        long = "header",
        value_name = "NAME: VALUE",
        help = "Extra request header; replaces a default of the same name (repeatable)"
    )]
    pub headers: Vec<String>,

    #[arg(
        long = "connect-timeout",
        value_name = "SECS",
        default_value_t = 10,
        help = "Give up on the TCP connect after SECS seconds"
    )]
    pub connect_timeout: u64,

    #[arg(
        long = "max-time",
        value_name = "SECS",
        help = "Abort the request after SECS seconds"
    )]
    pub max_time: Option<u64>,

    #[arg(
        long = "grace",
        value_name = "MILLIS",
        requires = "max_time",
        help = "Grace period between the abort firing and the connection closing"
    )]
    pub grace: Option<u64>,

    #[arg(
        long = "tls-verify",
        help = "Validate server certificates instead of accepting any"
    )]
    pub tls_verify: bool,

    #[arg(long = "json", help = "Print the profile report as JSON")]
    pub json: bool,

    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        help = "Write the response body to FILE instead of stdout"
    )]
    pub output: Option<PathBuf>,

    #[arg(long = "log-level", default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Header overrides from the repeated `-H` options, keyed by name.
    /// A name given twice keeps its last value.
    pub fn header_overrides(&self) -> Result<Option<HashMap<String, String>>> {
        if self.headers.is_empty() {
            return Ok(None);
        }
        let mut overrides = HashMap::with_capacity(self.headers.len());
        for raw in &self.headers {
            let (name, value) = parse_header(raw)?;
            overrides.insert(name, value);
        }
        Ok(Some(overrides))
    }
}

fn parse_header(raw: &str) -> Result<(String, String)> {
    let Some((name, value)) = raw.split_once(':') else {
        bail!("invalid header {:?}: expected \"Name: Value\"", raw);
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("invalid header {:?}: empty header name", raw);
    }
    Ok((name.to_string(), value.trim().to_string()))
}
