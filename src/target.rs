// File: target.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use std::fmt;
use thiserror::Error;
use url::Url;

static URL_SCHEME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([a-zA-Z]+)://").unwrap());

#[derive(Debug, Error)]
pub enum TargetError {
    #[error("invalid URL {0}: {1}")]
    Invalid(String, #[source] url::ParseError),
    #[error("incompatible URL scheme: expected http or https, got {0}")]
    UnsupportedScheme(String),
    #[error("URL {0} has no host")]
    MissingHost(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn default_port(self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::Http => write!(f, "http"),
            Scheme::Https => write!(f, "https"),
        }
    }
}

/// A normalized request target. Scheme and port are always resolved;
/// `path` carries the request-target (path plus query) written on the
/// wire. IPv6 hosts keep their brackets so `authority()` composes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl Target {
    /// Classifies a loosely-written URL string. A missing scheme is
    /// taken as http; any scheme other than http or https is rejected.
    pub fn parse(raw: &str) -> Result<Self, TargetError> {
        let candidate: Cow<'_, str> = match URL_SCHEME.captures(raw) {
            Some(caps) => {
                let scheme = caps[1].to_lowercase();
                if scheme != "http" && scheme != "https" {
                    return Err(TargetError::UnsupportedScheme(scheme));
                }
                Cow::Borrowed(raw)
            }
            None => Cow::Owned(format!("http://{}", raw)),
        };

        let url =
            Url::parse(&candidate).map_err(|e| TargetError::Invalid(raw.to_string(), e))?;

        let scheme = match url.scheme() {
            "http" => Scheme::Http,
            "https" => Scheme::Https,
            other => return Err(TargetError::UnsupportedScheme(other.to_string())),
        };

        let host = match url.host() {
            Some(url::Host::Domain(domain)) => domain.to_string(),
            Some(url::Host::Ipv4(addr)) => addr.to_string(),
            Some(url::Host::Ipv6(addr)) => format!("[{}]", addr),
            None => return Err(TargetError::MissingHost(raw.to_string())),
        };

        let port = url
            .port_or_known_default()
            .unwrap_or_else(|| scheme.default_port());

        let mut path = url.path().to_string();
        if let Some(query) = url.query() {
            path.push('?');
            path.push_str(query);
        }

        Ok(Target {
            scheme,
            host,
            port,
            path,
        })
    }

    /// `host:port`, used both for dialing and as the default Host header.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}{}", self.scheme, self.host, self.port, self.path)
    }
}
