// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property tests for the synchronizers.
//!
//! A simulated viewer applies every sink call in order. After each tick the
//! viewer must show exactly the current candidate's keys, and the
//! synchronizer's diff state must equal that same set.

use std::collections::{BTreeMap, BTreeSet};

use accretion_core::channel::ChannelId;
use accretion_core::marker::{Batch, Marker, MarkerKey, MarkerKind, PrimitiveId};
use accretion_core::publish::Publisher;
use accretion_core::sink::MarkerSink;
use accretion_core::sync::{CountChannel, IdSetChannel};
use accretion_core::time::{Header, Timestamp};
use proptest::prelude::*;

/// Applies calls to a key set, remembering the order of operations per tick.
#[derive(Debug, Default)]
struct Viewer {
    shown: BTreeSet<MarkerKey>,
    /// `(call index, is_delete)` per key for the current tick.
    ops: BTreeMap<MarkerKey, Vec<(usize, bool)>>,
    calls: usize,
}

impl MarkerSink for Viewer {
    fn publish(&mut self, _channel: &ChannelId, batch: Batch) {
        let call = self.calls;
        self.calls += 1;
        for marker in batch {
            let key = marker.key();
            self.ops
                .entry(key.clone())
                .or_default()
                .push((call, marker.is_delete()));
            if marker.is_delete() {
                self.shown.remove(&key);
            } else {
                self.shown.insert(key);
            }
        }
    }
}

fn candidate(ids: &BTreeSet<u8>, with_edges: bool) -> Batch {
    let mut batch: Batch = ids
        .iter()
        .map(|&id| Marker::new(MarkerKind::Sphere, "nodes", PrimitiveId(u64::from(id))))
        .collect();
    if with_edges && !ids.is_empty() {
        batch.push(Marker::new(MarkerKind::LineList, "edges", PrimitiveId(0)));
    }
    batch
}

fn ticks() -> impl Strategy<Value = Vec<(BTreeSet<u8>, bool)>> {
    prop::collection::vec(
        (prop::collection::btree_set(0u8..16, 0..8), any::<bool>()),
        1..12,
    )
}

proptest! {
    #[test]
    fn id_set_viewer_matches_model(ticks in ticks()) {
        let mut publisher = Publisher::new(Viewer::default());
        let mut channel = IdSetChannel::new(ChannelId::GRAPH);

        for (t, (ids, with_edges)) in ticks.iter().enumerate() {
            publisher.sink_mut().ops.clear();
            let header = Header::new("world", Timestamp(t as u64));
            let batch = candidate(ids, *with_edges);
            let expected = batch.keys();
            channel.sync(&mut publisher, &header, batch);

            prop_assert_eq!(&publisher.sink().shown, &expected);
            prop_assert_eq!(channel.state().keys(), &expected);

            // A key touched by both a delete and an add this tick must see the
            // delete first.
            for ops in publisher.sink().ops.values() {
                let first_add = ops.iter().find(|(_, del)| !del).map(|(i, _)| *i);
                let last_delete = ops.iter().rev().find(|(_, del)| *del).map(|(i, _)| *i);
                if let (Some(add), Some(delete)) = (first_add, last_delete) {
                    prop_assert!(delete < add);
                }
            }
        }
    }

    #[test]
    fn id_set_never_deletes_persisting_keys(ticks in ticks()) {
        let mut publisher = Publisher::new(Viewer::default());
        let mut channel = IdSetChannel::new(ChannelId::GRAPH_LABELS);
        let mut previous = BTreeSet::new();

        for (t, (ids, _)) in ticks.iter().enumerate() {
            publisher.sink_mut().ops.clear();
            let batch = candidate(ids, false);
            let current = batch.keys();
            channel.sync(&mut publisher, &Header::new("world", Timestamp(t as u64)), batch);

            for key in previous.intersection(&current) {
                let ops = &publisher.sink().ops[key];
                prop_assert!(ops.iter().all(|(_, del)| !del), "persisting key {:?} was deleted", key);
            }
            previous = current;
        }
    }

    #[test]
    fn empty_ticks_after_empty_are_silent(n in 1usize..6) {
        let mut publisher = Publisher::new(Viewer::default());
        let mut channel = IdSetChannel::new(ChannelId::FREESPACE_GRAPH);
        for t in 0..n {
            channel.sync(&mut publisher, &Header::new("world", Timestamp(t as u64)), Batch::new());
        }
        prop_assert_eq!(publisher.sink().calls, 0);
    }

    #[test]
    fn count_viewer_matches_model(counts in prop::collection::vec(0u64..10, 1..10)) {
        let mut publisher = Publisher::new(Viewer::default());
        let mut channel = CountChannel::new(ChannelId::FREESPACE, "spheres");

        for (t, &n) in counts.iter().enumerate() {
            let batch: Batch = (0..n)
                .map(|id| Marker::new(MarkerKind::Sphere, "spheres", PrimitiveId(id)))
                .collect();
            let expected = batch.keys();
            let calls_before = publisher.sink().calls;
            channel.sync(&mut publisher, &Header::new("world", Timestamp(t as u64)), batch);

            prop_assert_eq!(publisher.sink().calls - calls_before, 2);
            prop_assert_eq!(&publisher.sink().shown, &expected);
            prop_assert_eq!(channel.state().previous(), n);
        }
    }
}
