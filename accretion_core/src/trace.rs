// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Instrumentation hooks for publish decisions.
//!
//! [`SyncTraceSink`] receives one event per decision the
//! [`Publisher`](crate::publish::Publisher) and the synchronizers make. All
//! methods default to no-ops, so implementing only the events you care about
//! is fine. A publisher without an installed trace sink skips dispatch with a
//! single `Option` branch.

use crate::channel::ChannelId;
use crate::time::Timestamp;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a tick starts fanning out to the channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickEvent {
    /// Monotonic tick counter, starting at zero.
    pub tick_index: u64,
    /// Timestamp shared by everything emitted during the tick.
    pub stamp: Timestamp,
}

/// Emitted after a batch has been handed to the sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublishEvent<'a> {
    /// Channel the batch went out on.
    pub channel: &'a ChannelId,
    /// Number of add markers in the batch.
    pub additions: usize,
    /// Number of delete markers in the batch.
    pub deletions: usize,
}

/// Emitted when a builder declined to publish.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SuppressEvent<'a> {
    /// Channel that stayed silent.
    pub channel: &'a ChannelId,
}

/// Emitted when a synchronizer retires primitives absent from the current
/// tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetireEvent<'a> {
    /// Channel the primitives were published on.
    pub channel: &'a ChannelId,
    /// Number of primitives retired.
    pub retired: usize,
}

// ---------------------------------------------------------------------------
// SyncTraceSink trait
// ---------------------------------------------------------------------------

/// Receives publish-decision events.
pub trait SyncTraceSink {
    /// Called when a tick begins.
    fn on_tick(&mut self, e: &TickEvent) {
        _ = e;
    }

    /// Called after every sink call.
    fn on_publish(&mut self, e: &PublishEvent<'_>) {
        _ = e;
    }

    /// Called when a builder returned "nothing worth sending".
    fn on_suppress(&mut self, e: &SuppressEvent<'_>) {
        _ = e;
    }

    /// Called when stale primitives are retired.
    fn on_retire(&mut self, e: &RetireEvent<'_>) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`SyncTraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl SyncTraceSink for NoopSink {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn noop_sink_accepts_everything() {
        let mut sink = NoopSink;
        sink.on_tick(&TickEvent {
            tick_index: 0,
            stamp: Timestamp(1),
        });
        sink.on_publish(&PublishEvent {
            channel: &ChannelId::GRAPH,
            additions: 1,
            deletions: 0,
        });
        sink.on_suppress(&SuppressEvent {
            channel: &ChannelId::ESDF,
        });
    }

    #[test]
    fn overriding_one_event_keeps_other_defaults() {
        struct Retirements(Vec<usize>);
        impl SyncTraceSink for Retirements {
            fn on_retire(&mut self, e: &RetireEvent<'_>) {
                self.0.push(e.retired);
            }
        }

        let mut sink = Retirements(Vec::new());
        sink.on_suppress(&SuppressEvent {
            channel: &ChannelId::GVD,
        });
        sink.on_retire(&RetireEvent {
            channel: &ChannelId::GRAPH_LABELS,
            retired: 3,
        });
        assert_eq!(sink.0, [3]);
    }
}
