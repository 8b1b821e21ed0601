// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-channel synchronization controllers.
//!
//! A synchronizer owns one channel's [diff state](crate::diff) and, once per
//! tick, turns a candidate batch into the sink calls that bring the viewer in
//! line with the model:
//!
//! 1. Nothing now, nothing before: no sink call.
//! 2. Nothing now, something before: one deletion batch retiring everything.
//! 3. Something now: a deletion batch for keys that disappeared (only if
//!    there are any), then the content batch.
//!
//! Deletions always go out in their own call, before the content. A key that
//! is retired and re-added in the same tick therefore never coexists with its
//! stale copy on the viewer.
//!
//! The state is bookkeeping private to the synchronizer. Callers see a
//! read-only "visualize this snapshot" operation; the synchronizer mutates
//! its own memory only after its decision for the tick is made.
//!
//! Three variants exist, one per [diff granularity](crate::diff):
//! [`IdSetChannel`], [`CountChannel`], and [`PresenceChannel`].

use alloc::format;
use alloc::string::String;

use log::debug;

use crate::channel::ChannelId;
use crate::diff::{CountState, IdSetState, PresenceState};
use crate::marker::{Batch, Marker, PrimitiveId};
use crate::publish::Publisher;
use crate::sink::MarkerSink;
use crate::time::Header;

/// What a synchronizer did during one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Nothing to show now or before. No sink call.
    Idle,
    /// The builder had nothing worth sending. No sink call, state untouched.
    Skipped,
    /// The source became empty; everything previously shown was retired.
    Cleared {
        /// Number of delete instructions sent.
        retired: usize,
    },
    /// Content was published, after retiring stale primitives.
    Published {
        /// Number of delete instructions sent before the content.
        retired: usize,
        /// Number of markers in the content batch.
        published: usize,
    },
}

impl SyncOutcome {
    /// Returns `true` if at least one sink call was made.
    #[must_use]
    pub const fn touched_sink(self) -> bool {
        matches!(self, Self::Cleared { .. } | Self::Published { .. })
    }
}

// ---------------------------------------------------------------------------
// IdSetChannel
// ---------------------------------------------------------------------------

/// Synchronizes a channel whose primitive ids are stable per model entity.
///
/// Retirements are the set difference between last tick's keys and this
/// tick's keys, so primitives that persist are never deleted.
#[derive(Clone, Debug)]
pub struct IdSetChannel {
    channel: ChannelId,
    state: IdSetState,
}

impl IdSetChannel {
    /// Creates a synchronizer for `channel` with nothing published.
    #[must_use]
    pub fn new(channel: ChannelId) -> Self {
        Self {
            channel,
            state: IdSetState::new(),
        }
    }

    /// Returns the channel this synchronizer publishes on.
    #[must_use]
    pub fn channel(&self) -> &ChannelId {
        &self.channel
    }

    /// Returns the keys currently shown on the viewer.
    #[must_use]
    pub fn state(&self) -> &IdSetState {
        &self.state
    }

    /// Synchronizes against a candidate batch.
    ///
    /// Every marker in `candidate` is restamped with `header`. Keys within the
    /// candidate must be unique.
    pub fn sync<S: MarkerSink>(
        &mut self,
        publisher: &mut Publisher<S>,
        header: &Header,
        candidate: Batch,
    ) -> SyncOutcome {
        let is_empty = candidate.is_empty();
        self.sync_from(publisher, header, is_empty, || candidate)
    }

    /// Synchronizes against a lazily built candidate.
    ///
    /// When `source_empty` is `true`, `build` is not called.
    pub fn sync_from<S, F>(
        &mut self,
        publisher: &mut Publisher<S>,
        header: &Header,
        source_empty: bool,
        build: F,
    ) -> SyncOutcome
    where
        S: MarkerSink,
        F: FnOnce() -> Batch,
    {
        if source_empty {
            return self.clear(publisher, header);
        }

        let mut candidate = build();
        if candidate.is_empty() {
            return self.clear(publisher, header);
        }

        let removed = self.state.retire(candidate.keys());
        let retired = removed.len();
        if retired > 0 {
            debug!("{}: retiring {retired} stale primitives", self.channel);
            publisher.note_retired(&self.channel, retired);
            publisher.send(&self.channel, Batch::deletions(header, &removed));
        }

        candidate.stamp(header);
        let published = candidate.len();
        publisher.send(&self.channel, candidate);
        SyncOutcome::Published { retired, published }
    }

    fn clear<S: MarkerSink>(&mut self, publisher: &mut Publisher<S>, header: &Header) -> SyncOutcome {
        if self.state.is_empty() {
            return SyncOutcome::Idle;
        }

        let previous = self.state.take();
        let retired = previous.len();
        debug!("{}: source empty, retiring {retired} primitives", self.channel);
        publisher.note_retired(&self.channel, retired);
        publisher.send(&self.channel, Batch::deletions(header, &previous));
        SyncOutcome::Cleared { retired }
    }
}

// ---------------------------------------------------------------------------
// CountChannel
// ---------------------------------------------------------------------------

/// Synchronizes a channel whose ids are positional (`0..n`).
///
/// Every tick retires all of last tick's ids and republishes the full
/// content, even when nothing changed. There is no "unchanged" short-circuit:
/// two calls are always made, deletions first.
#[derive(Clone, Debug)]
pub struct CountChannel {
    channel: ChannelId,
    namespace: String,
    state: CountState,
}

impl CountChannel {
    /// Creates a synchronizer whose primitives live in `namespace`.
    #[must_use]
    pub fn new(channel: ChannelId, namespace: impl Into<String>) -> Self {
        Self {
            channel,
            namespace: namespace.into(),
            state: CountState::new(),
        }
    }

    /// Returns the channel this synchronizer publishes on.
    #[must_use]
    pub fn channel(&self) -> &ChannelId {
        &self.channel
    }

    /// Returns the namespace retirements are issued in.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns how many primitives the viewer currently shows.
    #[must_use]
    pub fn state(&self) -> CountState {
        self.state
    }

    /// Retires everything from last tick, then publishes `candidate`.
    pub fn sync<S: MarkerSink>(
        &mut self,
        publisher: &mut Publisher<S>,
        header: &Header,
        mut candidate: Batch,
    ) -> SyncOutcome {
        let retire = self.state.replace(candidate.len() as u64);
        let deletions: Batch = retire
            .map(|id| Marker::delete(header, self.namespace.clone(), PrimitiveId(id)))
            .collect();
        let retired = deletions.len();
        if retired > 0 {
            publisher.note_retired(&self.channel, retired);
        }
        publisher.send(&self.channel, deletions);

        candidate.stamp(header);
        let published = candidate.len();
        publisher.send(&self.channel, candidate);
        SyncOutcome::Published { retired, published }
    }
}

// ---------------------------------------------------------------------------
// PresenceChannel
// ---------------------------------------------------------------------------

/// Synchronizes a channel that only knows whether its source is empty.
///
/// Content is drawn as one node marker in `<namespace>_nodes` and one edge
/// marker in `<namespace>_edges`, each with id `0`. Clearing issues exactly
/// those two delete instructions.
#[derive(Clone, Debug)]
pub struct PresenceChannel {
    channel: ChannelId,
    namespace: String,
    state: PresenceState,
}

impl PresenceChannel {
    /// Creates a synchronizer for content under `namespace`.
    #[must_use]
    pub fn new(channel: ChannelId, namespace: impl Into<String>) -> Self {
        Self {
            channel,
            namespace: namespace.into(),
            state: PresenceState::new(),
        }
    }

    /// Returns the channel this synchronizer publishes on.
    #[must_use]
    pub fn channel(&self) -> &ChannelId {
        &self.channel
    }

    /// Returns the namespace prefix of the node and edge markers.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the namespace of the node marker.
    #[must_use]
    pub fn node_namespace(&self) -> String {
        format!("{}_nodes", self.namespace)
    }

    /// Returns the namespace of the edge marker.
    #[must_use]
    pub fn edge_namespace(&self) -> String {
        format!("{}_edges", self.namespace)
    }

    /// Returns `true` if the viewer currently shows this channel's content.
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.state.is_published()
    }

    /// Synchronizes against a source that reports `source_empty`.
    ///
    /// `build` is only called for a non-empty source. If it returns an empty
    /// batch, nothing is sent and the state is left as it was.
    pub fn sync<S, F>(
        &mut self,
        publisher: &mut Publisher<S>,
        header: &Header,
        source_empty: bool,
        build: F,
    ) -> SyncOutcome
    where
        S: MarkerSink,
        F: FnOnce() -> Batch,
    {
        if source_empty {
            if !self.state.clear() {
                return SyncOutcome::Idle;
            }
            debug!("{}: source empty, clearing {}", self.channel, self.namespace);
            let mut deletions = Batch::new();
            deletions.push(Marker::delete(header, self.node_namespace(), PrimitiveId(0)));
            deletions.push(Marker::delete(header, self.edge_namespace(), PrimitiveId(0)));
            publisher.note_retired(&self.channel, deletions.len());
            publisher.send(&self.channel, deletions);
            return SyncOutcome::Cleared { retired: 2 };
        }

        let mut published = 0;
        let sent = publisher.publish_with(&self.channel, || {
            let mut batch = build();
            if batch.is_empty() {
                return None;
            }
            batch.stamp(header);
            published = batch.len();
            Some(batch)
        });
        if !sent {
            return SyncOutcome::Skipped;
        }

        self.state.mark_published();
        SyncOutcome::Published {
            retired: 0,
            published,
        }
    }
}
