// File: config.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

#[derive(Debug, Clone, Copy)]
pub struct ConfigParameter {
    connect_timeout: u64,
    tls_verify: bool,
}

impl ConfigParameter {
    pub fn new() -> Self {
        Self {
            connect_timeout: 10,
            tls_verify: false,
        }
    }

    pub fn set_connect_timeout(&mut self, connect_timeout: u64) {
        self.connect_timeout = connect_timeout;
    }

    pub fn connect_timeout(&self) -> u64 {
        self.connect_timeout
    }

    pub fn set_tls_verify(&mut self, tls_verify: bool) {
        self.tls_verify = tls_verify;
    }

    pub fn tls_verify(&self) -> bool {
        self.tls_verify
    }
}

impl Default for ConfigParameter {
    fn default() -> Self {
        Self::new()
    }
}
