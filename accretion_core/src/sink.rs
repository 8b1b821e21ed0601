// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rendering sink contract.
//!
//! The sink is whatever carries batches to a viewer: a middleware publisher,
//! a socket, a recording for later playback. The core treats it as
//! fire-and-forget: calls return nothing, and delivery is assumed to be
//! at-most-once and in issue order per channel.
//!
//! # Ordering
//!
//! Synchronizers may issue several calls for one channel within a tick
//! (deletions first, then content). A sink that forwards asynchronously must
//! preserve that order, otherwise a fresh primitive can be deleted by a stale
//! retirement that shares its key.

use alloc::boxed::Box;

use crate::channel::ChannelId;
use crate::marker::Batch;

/// Accepts batches of primitives for a named channel.
///
/// Implemented by transports and by test doubles that record calls.
pub trait MarkerSink {
    /// Sends `batch` on `channel`. Ownership of the batch moves to the sink.
    fn publish(&mut self, channel: &ChannelId, batch: Batch);
}

impl<S: MarkerSink + ?Sized> MarkerSink for &mut S {
    fn publish(&mut self, channel: &ChannelId, batch: Batch) {
        (**self).publish(channel, batch);
    }
}

impl<S: MarkerSink + ?Sized> MarkerSink for Box<S> {
    fn publish(&mut self, channel: &ChannelId, batch: Batch) {
        (**self).publish(channel, batch);
    }
}

/// A [`MarkerSink`] that drops every batch.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl MarkerSink for NullSink {
    fn publish(&mut self, channel: &ChannelId, batch: Batch) {
        _ = (channel, batch);
    }
}
