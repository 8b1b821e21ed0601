// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Incremental synchronization of drawable primitive batches with a
//! visualization sink.
//!
//! `accretion_core` keeps a remote visualization consistent with a model that
//! grows, shrinks, and changes between updates. It is `no_std` compatible
//! (with `alloc`). Geometry is produced elsewhere; this crate only decides what
//! to send and what to retire.
//!
//! # Architecture
//!
//! Each model update (a *tick*) fans out to one synchronizer per visual
//! channel:
//!
//! ```text
//!   model snapshot ──► conversion (pure) ──► candidate Batch
//!                                               │
//!                 ┌─────────────────────────────┘
//!                 ▼
//!   IdSetChannel / CountChannel / PresenceChannel
//!        │ compares against its diff state
//!        ▼
//!   Publisher::publish_with() ──► deletions, then content ──► MarkerSink
//! ```
//!
//! **[`marker`]**: Primitives ([`Marker`](marker::Marker)) and the
//! [`Batch`](marker::Batch) that carries them to the sink.
//!
//! **[`channel`]**: [`ChannelId`](channel::ChannelId) names for every output
//! stream.
//!
//! **[`sink`]**: The [`MarkerSink`](sink::MarkerSink) trait that transports
//! implement.
//!
//! **[`publish`]**: [`Publisher`](publish::Publisher), the compute-and-publish
//! wrapper that suppresses no-op sends.
//!
//! **[`diff`]**: Per-channel memory of what went out last tick.
//!
//! **[`sync`]**: The per-channel synchronization controllers that turn
//! candidate batches into minimal deletions plus content.
//!
//! **[`time`]**: Timestamps and the shared per-tick [`Header`](time::Header).
//!
//! **[`trace`]**: [`SyncTraceSink`](trace::SyncTraceSink) hooks for
//! instrumenting publish decisions.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod channel;
pub mod diff;
pub mod marker;
pub mod publish;
pub mod sink;
pub mod sync;
pub mod time;
pub mod trace;
