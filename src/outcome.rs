// File: outcome.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("could not connect to {0}: {1}")]
    Connect(String, #[source] io::Error),
    #[error("connection to {0} timed out")]
    ConnectTimeout(String),
    #[error("tls handshake with {0} failed: {1}")]
    Tls(String, #[source] io::Error),
    #[error("failed to send request: {0}")]
    Write(#[source] io::Error),
    #[error("bad status line: {0}")]
    BadStatusLine(String),
    #[error("response read failed: {0}")]
    Read(#[source] io::Error),
    #[error("request aborted")]
    Aborted,
}

/// What one request produced. `status` and `bytes_read` hold whatever was
/// collected before a failure, so partial progress survives alongside
/// `error`.
#[derive(Debug)]
pub struct RequestOutcome {
    pub status: Option<u16>,
    pub bytes_read: u64,
    pub error: Option<HttpError>,
}

impl RequestOutcome {
    pub(crate) fn failed(error: HttpError) -> Self {
        Self {
            status: None,
            bytes_read: 0,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
