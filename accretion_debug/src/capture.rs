// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory recording of sink calls.
//!
//! [`CaptureSink`] stores every `(channel, batch)` pair it receives. Clones
//! share the same storage, so a test can hand one clone to a publisher (even
//! as a `Box<dyn MarkerSink>`) and inspect the calls through another.

use std::cell::RefCell;
use std::rc::Rc;

use accretion_core::channel::ChannelId;
use accretion_core::marker::Batch;
use accretion_core::sink::MarkerSink;

/// One recorded sink call.
#[derive(Clone, Debug, PartialEq)]
pub struct Captured {
    /// Channel the batch was published on.
    pub channel: ChannelId,
    /// The batch as received.
    pub batch: Batch,
}

impl Captured {
    /// Returns the number of delete markers in the batch.
    #[must_use]
    pub fn deletions(&self) -> usize {
        self.batch.iter().filter(|m| m.is_delete()).count()
    }

    /// Returns the number of add markers in the batch.
    #[must_use]
    pub fn additions(&self) -> usize {
        self.batch.len() - self.deletions()
    }
}

/// A [`MarkerSink`] that records calls into shared storage.
#[derive(Clone, Debug, Default)]
pub struct CaptureSink {
    calls: Rc<RefCell<Vec<Captured>>>,
}

impl CaptureSink {
    /// Creates a sink with no recorded calls.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every call recorded so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<Captured> {
        self.calls.borrow().clone()
    }

    /// Returns the calls made on `channel`, in order.
    #[must_use]
    pub fn on_channel(&self, channel: &ChannelId) -> Vec<Batch> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| &c.channel == channel)
            .map(|c| c.batch.clone())
            .collect()
    }

    /// Returns the number of recorded calls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.borrow().len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.borrow().is_empty()
    }

    /// Removes and returns every recorded call.
    pub fn take(&self) -> Vec<Captured> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }
}

impl MarkerSink for CaptureSink {
    fn publish(&mut self, channel: &ChannelId, batch: Batch) {
        self.calls.borrow_mut().push(Captured {
            channel: channel.clone(),
            batch,
        });
    }
}
