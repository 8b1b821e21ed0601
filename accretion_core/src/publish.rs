// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compute-and-publish wrapper around a [`MarkerSink`].
//!
//! [`Publisher`] runs a builder for a channel and forwards the result only if
//! the builder says it is worth sending. Two builder shapes are supported:
//!
//! - [`publish`](Publisher::publish) hands the builder a scratch [`Batch`] to
//!   fill in place; the builder returns `true` to send it (even if empty) or
//!   `false` to drop it.
//! - [`publish_with`](Publisher::publish_with) takes a builder returning
//!   `Option<Batch>`; `None` means skip, `Some` (possibly empty) means send.
//!
//! Sending an empty batch is not the same as skipping: an empty send is how a
//! channel signals a real transition to "nothing to show", and it reaches the
//! sink. A skip produces no sink call at all.
//!
//! Several calls for the same channel within one tick reach the sink as
//! separate calls in issue order.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use core::fmt;

use log::trace;

use crate::channel::ChannelId;
use crate::marker::Batch;
use crate::sink::MarkerSink;
use crate::time::Timestamp;
use crate::trace::{PublishEvent, RetireEvent, SuppressEvent, SyncTraceSink, TickEvent};

/// Running totals for one channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PublishStats {
    /// Number of sink calls issued.
    pub published: u64,
    /// Number of builder runs that declined to publish.
    pub suppressed: u64,
    /// Number of delete markers issued.
    pub deletions: u64,
}

/// Forwards builder output to a [`MarkerSink`], suppressing no-op publishes.
pub struct Publisher<S> {
    sink: S,
    trace: Option<Box<dyn SyncTraceSink>>,
    stats: BTreeMap<ChannelId, PublishStats>,
    ticks: u64,
}

impl<S: fmt::Debug> fmt::Debug for Publisher<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Publisher")
            .field("sink", &self.sink)
            .field("traced", &self.trace.is_some())
            .field("stats", &self.stats)
            .field("ticks", &self.ticks)
            .finish()
    }
}

impl<S: MarkerSink> Publisher<S> {
    /// Creates a publisher that forwards to `sink`.
    #[must_use]
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            trace: None,
            stats: BTreeMap::new(),
            ticks: 0,
        }
    }

    /// Installs a trace sink that observes every decision.
    #[must_use]
    pub fn with_trace(mut self, trace: Box<dyn SyncTraceSink>) -> Self {
        self.trace = Some(trace);
        self
    }

    /// Replaces (or removes) the installed trace sink.
    pub fn set_trace(&mut self, trace: Option<Box<dyn SyncTraceSink>>) {
        self.trace = trace;
    }

    /// Returns the wrapped sink.
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Returns the wrapped sink mutably.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consumes the publisher and returns the wrapped sink.
    #[must_use]
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Returns the totals for `channel` (all zero if it was never touched).
    #[must_use]
    pub fn stats(&self, channel: &ChannelId) -> PublishStats {
        self.stats.get(channel).copied().unwrap_or_default()
    }

    /// Returns the number of ticks started so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Marks the start of a tick. Returns the tick's index.
    pub fn begin_tick(&mut self, stamp: Timestamp) -> u64 {
        let tick_index = self.ticks;
        self.ticks += 1;
        if let Some(t) = &mut self.trace {
            t.on_tick(&TickEvent { tick_index, stamp });
        }
        tick_index
    }

    /// Runs `build` on a scratch batch and sends it if `build` returns `true`.
    ///
    /// Returns whether a sink call was made.
    pub fn publish<F>(&mut self, channel: &ChannelId, build: F) -> bool
    where
        F: FnOnce(&mut Batch) -> bool,
    {
        let mut scratch = Batch::new();
        if build(&mut scratch) {
            self.send(channel, scratch);
            true
        } else {
            self.suppress(channel);
            false
        }
    }

    /// Runs `build` and sends the batch it returns, if any.
    ///
    /// Returns whether a sink call was made.
    pub fn publish_with<F>(&mut self, channel: &ChannelId, build: F) -> bool
    where
        F: FnOnce() -> Option<Batch>,
    {
        match build() {
            Some(batch) => {
                self.send(channel, batch);
                true
            }
            None => {
                self.suppress(channel);
                false
            }
        }
    }

    /// Sends `batch` unconditionally.
    pub fn send(&mut self, channel: &ChannelId, batch: Batch) {
        let deletions = batch.iter().filter(|m| m.is_delete()).count();
        let additions = batch.len() - deletions;
        trace!("{channel}: publishing {additions} additions, {deletions} deletions");

        let stats = self.stats.entry(channel.clone()).or_default();
        stats.published += 1;
        stats.deletions += deletions as u64;

        self.sink.publish(channel, batch);
        if let Some(t) = &mut self.trace {
            t.on_publish(&PublishEvent {
                channel,
                additions,
                deletions,
            });
        }
    }

    /// Reports that `retired` primitives on `channel` were found stale.
    pub fn note_retired(&mut self, channel: &ChannelId, retired: usize) {
        if let Some(t) = &mut self.trace {
            t.on_retire(&RetireEvent { channel, retired });
        }
    }

    fn suppress(&mut self, channel: &ChannelId) {
        trace!("{channel}: nothing to publish");
        self.stats.entry(channel.clone()).or_default().suppressed += 1;
        if let Some(t) = &mut self.trace {
            t.on_suppress(&SuppressEvent { channel });
        }
    }
}
