// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Capturing sinks, pretty-printing, and JSON export for accretion
//! diagnostics.
//!
//! This crate provides development-time implementations of the core traits:
//!
//! - [`capture::CaptureSink`]: a [`MarkerSink`](accretion_core::sink::MarkerSink)
//!   that records every call in order behind a shared handle.
//! - [`pretty::PrettyPrintSink`]: a
//!   [`SyncTraceSink`](accretion_core::trace::SyncTraceSink) writing one
//!   human-readable line per publish decision.
//! - [`json::export`]: writes captured calls as a JSON array.

pub mod capture;
pub mod json;
pub mod pretty;
