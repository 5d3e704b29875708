// File: connection.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use crate::outcome::HttpError;
use crate::target::{Scheme, Target};
use log::debug;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, SystemTime};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::{rustls, TlsConnector};

/// One freshly dialed connection, plain or TLS. Dropping it closes the
/// socket, which is the engine's only teardown path.
#[derive(Debug)]
pub enum MaybeTlsStream {
    Plain(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

pub async fn connect(
    target: &Target,
    connect_timeout: Duration,
    tls_verify: bool,
) -> Result<MaybeTlsStream, HttpError> {
    let authority = target.authority();
    debug!("connecting to {}", authority);

    let tcp_stream = match tokio::time::timeout(
        connect_timeout,
        TcpStream::connect(&authority),
    )
    .await
    {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => return Err(HttpError::Connect(authority, e)),
        Err(_) => return Err(HttpError::ConnectTimeout(authority)),
    };

    match target.scheme {
        Scheme::Http => Ok(MaybeTlsStream::Plain(tcp_stream)),
        Scheme::Https => {
            let config = client_tls_config(tls_verify);
            let connector = TlsConnector::from(Arc::new(config));
            // SNI takes the bare host; IPv6 literals lose their brackets.
            let sni = target.host.trim_start_matches('[').trim_end_matches(']');
            let domain = rustls::ServerName::try_from(sni).map_err(|e| {
                HttpError::Tls(
                    target.host.clone(),
                    io::Error::new(io::ErrorKind::InvalidInput, e),
                )
            })?;
            let tls_stream = connector
                .connect(domain, tcp_stream)
                .await
                .map_err(|e| HttpError::Tls(target.host.clone(), e))?;
            debug!("tls established with {}", target.host);
            Ok(MaybeTlsStream::Tls(Box::new(tls_stream)))
        }
    }
}

fn client_tls_config(tls_verify: bool) -> rustls::ClientConfig {
    if tls_verify {
        let mut root_store = rustls::RootCertStore::empty();
        root_store.add_trust_anchors(webpki_roots::TLS_SERVER_ROOTS.iter().map(|ta| {
            rustls::OwnedTrustAnchor::from_subject_spki_name_constraints(
                ta.subject,
                ta.spki,
                ta.name_constraints,
            )
        }));
        rustls::ClientConfig::builder()
            .with_safe_defaults()
            .with_root_certificates(root_store)
            .with_no_client_auth()
    } else {
        rustls::ClientConfig::builder()
            .with_safe_defaults()
            .with_custom_certificate_verifier(Arc::new(NoVerification))
            .with_no_client_auth()
    }
}

/// Accepts any server certificate. The default policy: this client talks
/// to arbitrary, often self-signed endpoints, and chain validation is
/// opt-in via the tls_verify config switch.
struct NoVerification;

impl rustls::client::ServerCertVerifier for NoVerification {
    fn verify_server_cert(
        &self,
        _end_entity: &rustls::Certificate,
        _intermediates: &[rustls::Certificate],
        _server_name: &rustls::ServerName,
        _scts: &mut dyn Iterator<Item = &[u8]>,
        _ocsp_response: &[u8],
        _now: SystemTime,
    ) -> Result<rustls::client::ServerCertVerified, rustls::Error> {
        Ok(rustls::client::ServerCertVerified::assertion())
    }
}

impl AsyncRead for MaybeTlsStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            MaybeTlsStream::Plain(s) => Pin::new(s).poll_read(cx, buf),
            MaybeTlsStream::Tls(s) => Pin::new(s.as_mut()).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for MaybeTlsStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            MaybeTlsStream::Plain(s) => Pin::new(s).poll_write(cx, buf),
            MaybeTlsStream::Tls(s) => Pin::new(s.as_mut()).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            MaybeTlsStream::Plain(s) => Pin::new(s).poll_flush(cx),
            MaybeTlsStream::Tls(s) => Pin::new(s.as_mut()).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            MaybeTlsStream::Plain(s) => Pin::new(s).poll_shutdown(cx),
            MaybeTlsStream::Tls(s) => Pin::new(s.as_mut()).poll_shutdown(cx),
        }
    }
}
