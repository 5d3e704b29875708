// File: lib.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

#![allow(clippy::uninlined_format_args)]

pub mod cli;
pub mod config;
pub mod connection;
pub mod counter;
pub mod http;
pub mod outcome;
pub mod profile;
pub mod quickselect;
pub mod report;
pub mod target;
