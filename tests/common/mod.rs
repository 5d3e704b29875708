// File: common/mod.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// A raw TCP server answering with pre-designated byte-exact responses.
/// Each accepted connection has its request head read through the blank
/// line and captured, then receives the next response in the cycle after
/// the configured delay, and is closed.
pub struct MockServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
    handle: JoinHandle<()>,
}

impl MockServer {
    pub async fn start(responses: Vec<Vec<u8>>) -> Self {
        Self::start_with_delay(responses, Duration::ZERO).await
    }

    pub async fn start_with_delay(responses: Vec<Vec<u8>>, delay: Duration) -> Self {
        assert!(!responses.is_empty(), "mock server needs responses");
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        let handle = tokio::spawn(async move {
            let mut next = 0usize;
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                serve_one(stream, &responses[next], delay, &seen).await;
                next = (next + 1) % responses.len();
            }
        });

        MockServer {
            addr,
            requests,
            handle,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn authority(&self) -> String {
        self.addr.to_string()
    }

    /// Request heads received so far, one entry per connection, with the
    /// original line endings preserved.
    pub async fn received_requests(&self) -> Vec<String> {
        self.requests.lock().await.clone()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve_one(
    stream: TcpStream,
    response: &[u8],
    delay: Duration,
    seen: &Mutex<Vec<String>>,
) {
    let mut reader = BufReader::new(stream);
    let mut head = String::new();
    loop {
        let mut line = String::new();
        let n = reader.read_line(&mut line).await.unwrap_or(0);
        if n == 0 || line == "\r\n" || line == "\n" {
            break;
        }
        head.push_str(&line);
    }
    seen.lock().await.push(head);

    if delay > Duration::ZERO {
        tokio::time::sleep(delay).await;
    }

    let mut stream = reader.into_inner();
    let _ = stream.write_all(response).await;
    let _ = stream.flush().await;
    // Dropping the stream closes the connection.
}
