// File: http.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use crate::config::ConfigParameter;
use crate::connection::{self, MaybeTlsStream};
use crate::counter::CountingReader;
use crate::outcome::{HttpError, RequestOutcome};
use crate::target::Target;
use log::debug;
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use std::collections::HashMap;
use std::future;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

static STATUS_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?-u)^(?:HTTP|http)/\d\.\d (\d{3}) (?:[\x21-\x7E\x80-\xFF][\x20-\x7E\x80-\xFF]*)*$")
        .unwrap()
});

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

// 64 KiB bulk-read buffer in front of the counting reader.
const READ_BUFFER_SIZE: usize = 0x1000 * 16;

/// Cancellation handle for one in-flight request. Receiving a duration
/// grants that much grace before the connection is torn down; the sender
/// being dropped without a value tears it down immediately.
pub type AbortSignal = mpsc::Receiver<Duration>;

#[derive(Debug, Clone, Copy)]
pub struct Http {
    config: ConfigParameter,
}

impl Http {
    pub fn new(config: ConfigParameter) -> Self {
        Http { config }
    }

    /// Issues one GET request and streams the response body into `sink`.
    ///
    /// The outcome always carries whatever was collected before a
    /// failure: a status parsed ahead of a mid-body error stays set, and
    /// `bytes_read` counts every wire byte pulled up to that point. The
    /// connection is never reused; it closes on every exit path.
    pub async fn make_request<W>(
        &self,
        target: &Target,
        sink: &mut W,
        header_overrides: Option<&HashMap<String, String>>,
        abort: Option<&mut AbortSignal>,
    ) -> RequestOutcome
    where
        W: AsyncWrite + Unpin,
    {
        let connect_timeout = Duration::from_secs(self.config.connect_timeout());
        let mut conn =
            match connection::connect(target, connect_timeout, self.config.tls_verify()).await {
                Ok(conn) => conn,
                Err(e) => return RequestOutcome::failed(e),
            };

        let request = build_request(target, header_overrides);
        if let Err(e) = write_request(&mut conn, request.as_bytes()).await {
            return RequestOutcome::failed(e);
        }
        debug!("GET {} sent to {}", target.path, target.authority());

        let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, CountingReader::new(conn));
        let mut status = None;

        let error = tokio::select! {
            result = read_response(&mut reader, &mut status, sink) => result.err(),
            abort_error = watch_abort(abort) => Some(abort_error),
        };

        let bytes_read = reader.get_ref().count();
        debug!(
            "{} finished: status {:?}, {} bytes, error {}",
            target.authority(),
            status,
            bytes_read,
            error.is_some()
        );

        // The reader owns the connection; dropping it here closes the
        // socket no matter which select arm won.
        RequestOutcome {
            status,
            bytes_read,
            error,
        }
    }
}

fn default_headers(target: &Target) -> HashMap<String, String> {
    HashMap::from([
        ("Host".to_string(), target.authority()),
        ("User-Agent".to_string(), DEFAULT_USER_AGENT.to_string()),
        ("Accept".to_string(), "*/*".to_string()),
        ("Accept-Encoding".to_string(), "identity".to_string()),
        ("Connection".to_string(), "close".to_string()),
    ])
}

fn build_request(target: &Target, header_overrides: Option<&HashMap<String, String>>) -> String {
    let mut headers = default_headers(target);
    if let Some(overrides) = header_overrides {
        for (name, value) in overrides {
            headers.insert(name.clone(), value.clone());
        }
    }

    let mut request = format!("GET {} HTTP/1.1\r\n", target.path);
    for (name, value) in &headers {
        request.push_str(&format!("{}: {}\r\n", name, value));
    }
    request.push_str("\r\n");
    request
}

async fn write_request(conn: &mut MaybeTlsStream, request: &[u8]) -> Result<(), HttpError> {
    conn.write_all(request).await.map_err(HttpError::Write)?;
    conn.flush().await.map_err(HttpError::Write)
}

/// Parses status line(s) and headers, then copies the body into `sink`.
/// Interim 100 responses (status line plus their header block) are
/// consumed without ever reaching `status`.
async fn read_response<R, W>(
    reader: &mut R,
    status: &mut Option<u16>,
    sink: &mut W,
) -> Result<(), HttpError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    loop {
        let line = read_line(reader).await?;
        let code = parse_status_line(&line)?;
        if code != 100 {
            *status = Some(code);
            break;
        }
        debug!("interim 100 response, waiting for the final status line");
        skip_headers(reader).await?;
    }

    skip_headers(reader).await?;

    tokio::io::copy(reader, sink).await.map_err(HttpError::Read)?;
    Ok(())
}

async fn skip_headers<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<(), HttpError> {
    loop {
        let line = read_line(reader).await?;
        if line.is_empty() {
            return Ok(());
        }
    }
}

/// One line with the terminator stripped. A final unterminated line is
/// handed back as-is; a read past the end of the stream is an error,
/// since the response cannot legally end before the header block does.
async fn read_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<Vec<u8>, HttpError> {
    let mut line = Vec::new();
    let n = reader
        .read_until(b'\n', &mut line)
        .await
        .map_err(HttpError::Read)?;
    if n == 0 {
        return Err(HttpError::Read(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "connection closed mid-response",
        )));
    }
    if line.ends_with(b"\n") {
        line.pop();
        if line.ends_with(b"\r") {
            line.pop();
        }
    }
    Ok(line)
}

fn parse_status_line(line: &[u8]) -> Result<u16, HttpError> {
    let caps = STATUS_LINE
        .captures(line)
        .ok_or_else(|| HttpError::BadStatusLine(String::from_utf8_lossy(line).into_owned()))?;
    caps.get(1)
        .and_then(|m| std::str::from_utf8(m.as_bytes()).ok())
        .and_then(|digits| digits.parse::<u16>().ok())
        .ok_or_else(|| HttpError::BadStatusLine(String::from_utf8_lossy(line).into_owned()))
}

async fn watch_abort(signal: Option<&mut AbortSignal>) -> HttpError {
    match signal {
        Some(rx) => {
            if let Some(grace) = rx.recv().await {
                debug!("abort signalled with {}ms grace", grace.as_millis());
                tokio::time::sleep(grace).await;
            }
            HttpError::Aborted
        }
        None => future::pending().await,
    }
}
