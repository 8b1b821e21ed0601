// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Point-cloud view of mesh segmentation.
//!
//! [`ObjectVisualizer`] receives every segmentation result through
//! [`SegmenterSink`] and publishes:
//!
//! - the vertices touched by the last integration step on
//!   `<module_ns>/active_vertices`, and
//! - one cloud per semantic label on `<module_ns>/label_<n>`.
//!
//! Label channels are synchronized: a label that disappears from the
//! segmentation gets a delete instruction on its own channel, after which
//! the visualizer forgets it until it shows up again.

use std::collections::BTreeMap;

use accretion_core::channel::ChannelId;
use accretion_core::marker::{Batch, PrimitiveId};
use accretion_core::publish::Publisher;
use accretion_core::sink::MarkerSink;
use accretion_core::sync::{IdSetChannel, SyncOutcome};
use accretion_core::time::{Header, Timestamp};
use log::{debug, info};

use crate::config::ObjectVisualizerConfig;
use crate::markers;
use crate::model::{LabelIndices, MeshDelta};

/// Receiver of mesh segmentation results.
pub trait SegmenterSink {
    /// Returns a human-readable description of the sink and its settings.
    fn print_info(&self) -> String;

    /// Handles the result of one segmentation step.
    ///
    /// `active` and `label_indices` hold global vertex indices into `delta`.
    fn call(
        &mut self,
        timestamp_ns: u64,
        delta: &MeshDelta,
        active: &[usize],
        label_indices: &LabelIndices,
    );
}

/// Publishes segmentation results as point clouds.
#[derive(Debug)]
pub struct ObjectVisualizer<S> {
    config: ObjectVisualizerConfig,
    publisher: Publisher<S>,
    active_channel: ChannelId,
    labels: BTreeMap<u32, IdSetChannel>,
}

impl<S> ObjectVisualizer<S> {
    /// Tag the object visualizer is registered under.
    pub const TYPE_TAG: &'static str = "ObjectVisualizer";
}

impl<S: MarkerSink> ObjectVisualizer<S> {
    /// Creates a visualizer publishing to `sink`.
    #[must_use]
    pub fn new(config: ObjectVisualizerConfig, sink: S) -> Self {
        let active_channel = ChannelId::new(format!("{}/active_vertices", config.module_ns));
        Self {
            config,
            publisher: Publisher::new(sink),
            active_channel,
            labels: BTreeMap::new(),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ObjectVisualizerConfig {
        &self.config
    }

    /// Returns the publisher.
    #[must_use]
    pub fn publisher(&self) -> &Publisher<S> {
        &self.publisher
    }

    /// Returns the channel of the active-vertex cloud.
    #[must_use]
    pub fn active_channel(&self) -> &ChannelId {
        &self.active_channel
    }

    /// Returns the channel of the cloud for `label`.
    #[must_use]
    pub fn label_channel(&self, label: u32) -> ChannelId {
        ChannelId::new(format!("{}/label_{label}", self.config.module_ns))
    }

    fn publish_active_vertices(&mut self, header: &Header, delta: &MeshDelta, active: &[usize]) {
        let config = &self.config;
        self.publisher.publish(&self.active_channel, |scratch| {
            let mut marker = markers::vertex_cloud_marker(
                delta,
                active,
                "active_vertices",
                PrimitiveId(0),
                config.point_scale,
                config.point_alpha,
                config.use_spheres,
            );
            if marker.points.is_empty() {
                info!("no active vertices to visualize");
                return false;
            }
            marker.header = header.clone();
            scratch.push(marker);
            true
        });
    }

    fn publish_object_clouds(&mut self, header: &Header, delta: &MeshDelta, labels: &LabelIndices) {
        for &label in labels.keys() {
            if !self.labels.contains_key(&label) {
                let channel = self.label_channel(label);
                self.labels.insert(label, IdSetChannel::new(channel));
            }
        }

        let config = &self.config;
        let mut retired = Vec::new();
        for (&label, channel) in &mut self.labels {
            let indices = labels.get(&label).map_or(&[][..], Vec::as_slice);
            let marker = markers::vertex_cloud_marker(
                delta,
                indices,
                "objects",
                PrimitiveId(u64::from(label)),
                config.point_scale,
                config.point_alpha,
                config.use_spheres,
            );
            let candidate = if marker.points.is_empty() {
                Batch::new()
            } else {
                Batch::single(marker)
            };
            match channel.sync(&mut self.publisher, header, candidate) {
                SyncOutcome::Cleared { .. } => {
                    debug!("label {label} disappeared, cleared {}", channel.channel());
                    retired.push(label);
                }
                SyncOutcome::Idle => retired.push(label),
                _ => {}
            }
        }
        for label in retired {
            self.labels.remove(&label);
        }
    }
}

impl<S: MarkerSink> SegmenterSink for ObjectVisualizer<S> {
    fn print_info(&self) -> String {
        match toml::to_string_pretty(&self.config) {
            Ok(text) => format!("ObjectVisualizer\n{text}"),
            Err(err) => format!("ObjectVisualizer {:?} ({err})", self.config),
        }
    }

    fn call(
        &mut self,
        timestamp_ns: u64,
        delta: &MeshDelta,
        active: &[usize],
        label_indices: &LabelIndices,
    ) {
        let header = Header::new(self.config.world_frame.clone(), Timestamp::from_nanos(timestamp_ns));
        self.publisher.begin_tick(header.stamp);
        if self.config.enable_active_mesh_pub {
            self.publish_active_vertices(&header, delta, active);
        }
        if self.config.enable_segmented_mesh_pub {
            self.publish_object_clouds(&header, delta, label_indices);
        }
    }
}
