// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-tick visualization of the reconstruction: voxel field, place graph,
//! GVD graph, block outlines, and GVD clusters.
//!
//! [`ReconstructionVisualizer::visualize`] is the tick driver. One call runs
//! these steps in order, all sharing one header:
//!
//! 1. voxel field slices (`esdf_viz`, `gvd_viz`, `surface_viz`),
//! 2. if an extractor is given: the place graph (`graph_viz`), its free-space
//!    spheres (`freespace_viz`), the free-space graph
//!    (`freespace_graph_viz`), and node labels (`graph_label_viz`),
//! 3. if an extractor is given: the GVD graph (`gvd_graph_viz`),
//! 4. if enabled: block outlines (`voxel_block_viz`),
//! 5. if the extractor compresses clusters: the clusters
//!    (`gvd_cluster_viz`).
//!
//! Steps are independent. A skipped step publishes nothing for its channels
//! and leaves their diff state alone.
//!
//! The visualizer looks read-only from the caller's side (it only borrows
//! the snapshots) but owns the per-channel diff state of every synchronized
//! channel, so ticking it takes `&mut self`.

use accretion_core::channel::ChannelId;
use accretion_core::marker::{Color, Marker};
use accretion_core::publish::Publisher;
use accretion_core::sink::MarkerSink;
use accretion_core::sync::{CountChannel, IdSetChannel, PresenceChannel, SyncOutcome};
use accretion_core::time::{Header, Timestamp};
use log::{debug, info};

use crate::config::{ConfigUpdate, LayerConfig, ReconstructionVisualizerConfig};
use crate::markers;
use crate::model::{CompressedGraphExtractor, GraphExtractor, GvdGraph, GvdLayer, SceneGraphLayer};

const SLICE_NS: &str = "gvd_visualizer";
const BLOCKS_NS: &str = "topology_server_blocks";
const ERROR_NS: &str = "error";
const GVD_CLUSTER_NS: &str = "gvd_cluster_graph";

/// Synchronizes the reconstruction model with a [`MarkerSink`].
#[derive(Debug)]
pub struct ReconstructionVisualizer<S> {
    config: ReconstructionVisualizerConfig,
    publisher: Publisher<S>,
    graph: IdSetChannel,
    freespace: CountChannel,
    freespace_graph: IdSetChannel,
    labels: IdSetChannel,
    gvd_graph: PresenceChannel,
    clusters: PresenceChannel,
}

impl<S: MarkerSink> ReconstructionVisualizer<S> {
    /// Creates a visualizer publishing to `sink`.
    ///
    /// The place layer is always drawn flat and shaded by distance, whatever
    /// `config` says.
    #[must_use]
    pub fn new(config: ReconstructionVisualizerConfig, sink: S) -> Self {
        Self::with_publisher(config, Publisher::new(sink))
    }

    /// Creates a visualizer around an existing publisher (for example one
    /// with a trace sink installed).
    #[must_use]
    pub fn with_publisher(mut config: ReconstructionVisualizerConfig, publisher: Publisher<S>) -> Self {
        config.force_flat_places();
        let ns = config.topology_marker_ns.clone();
        Self {
            config,
            publisher,
            graph: IdSetChannel::new(ChannelId::GRAPH),
            freespace: CountChannel::new(ChannelId::FREESPACE, format!("{ns}_freespace")),
            freespace_graph: IdSetChannel::new(ChannelId::FREESPACE_GRAPH),
            labels: IdSetChannel::new(ChannelId::GRAPH_LABELS),
            gvd_graph: PresenceChannel::new(ChannelId::GVD_GRAPH, format!("{ns}_gvd_graph")),
            clusters: PresenceChannel::new(ChannelId::GVD_CLUSTERS, GVD_CLUSTER_NS),
        }
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &ReconstructionVisualizerConfig {
        &self.config
    }

    /// Returns the publisher, for its sink and per-channel statistics.
    #[must_use]
    pub fn publisher(&self) -> &Publisher<S> {
        &self.publisher
    }

    /// Returns the publisher mutably.
    pub fn publisher_mut(&mut self) -> &mut Publisher<S> {
        &mut self.publisher
    }

    /// Replaces one live-updatable configuration section.
    pub fn apply_update(&mut self, update: ConfigUpdate) {
        debug!("applying config update: {update:?}");
        self.config.apply(update);
    }

    /// Returns a human-readable dump of the active configuration.
    #[must_use]
    pub fn print_info(&self) -> String {
        match self.config.to_toml_string() {
            Ok(text) => text,
            Err(err) => format!("{:#?} ({err})", self.config),
        }
    }

    fn header(&self, timestamp_ns: u64) -> Header {
        Header::new(self.config.world_frame.clone(), Timestamp::from_nanos(timestamp_ns))
    }

    /// Runs one tick.
    pub fn visualize(
        &mut self,
        timestamp_ns: u64,
        gvd: &GvdLayer,
        extractor: Option<&dyn GraphExtractor>,
    ) {
        let header = self.header(timestamp_ns);
        self.publisher.begin_tick(header.stamp);

        self.visualize_gvd(&header, gvd);

        match extractor {
            Some(extractor) => {
                self.visualize_graph(&header, extractor.graph());
                self.visualize_gvd_graph(&header, extractor.gvd_graph());
            }
            None => info!("no graph extractor, skipping graph visualization"),
        }

        if self.config.show_block_outlines {
            self.visualize_blocks(&header, gvd);
        }

        match extractor.and_then(|e| e.as_compressed()) {
            Some(compressed) => {
                self.visualize_clusters(&header, compressed);
            }
            None => debug!("extractor does not compress clusters, skipping cluster visualization"),
        }
    }

    /// Publishes the ESDF slice, GVD voxels, and surface voxels.
    ///
    /// Each channel is suppressed when its marker would be empty.
    pub fn visualize_gvd(&mut self, header: &Header, gvd: &GvdLayer) {
        let config = &self.config;
        let slices = [
            (
                ChannelId::ESDF,
                markers::esdf_slice_marker(&config.gvd, &config.colormap, gvd),
            ),
            (
                ChannelId::GVD,
                markers::gvd_marker(&config.gvd, &config.colormap, gvd),
            ),
            (ChannelId::SURFACE, markers::surface_marker(&config.gvd, gvd)),
        ];

        for (channel, marker) in slices {
            self.publisher.publish(&channel, |scratch| {
                if marker.points.is_empty() {
                    info!("visualizing empty {channel}");
                    return false;
                }
                scratch.push(stamped(marker, header, SLICE_NS));
                true
            });
        }
    }

    /// Publishes the place graph and everything derived from it.
    pub fn visualize_graph(&mut self, header: &Header, graph: &SceneGraphLayer) {
        if graph.is_empty() {
            info!("visualizing empty graph");
        }

        let config = &self.config;
        let node_ns = format!("{}_nodes", config.topology_marker_ns);
        let edge_ns = format!("{}_edges", config.topology_marker_ns);
        self.graph
            .sync_from(&mut self.publisher, header, graph.is_empty(), || {
                let mut batch = markers::node_markers(
                    &config.graph_layer,
                    &config.graph,
                    graph,
                    &node_ns,
                    |node| place_color(config, node.distance),
                );
                batch.extend(markers::edge_marker(
                    &config.graph_layer,
                    &config.graph,
                    graph,
                    &edge_ns,
                    Color::BLACK,
                ));
                batch
            });

        self.visualize_freespace(header, graph);
        self.visualize_freespace_graph(header, graph);
        self.visualize_labels(header, graph);
    }

    fn visualize_freespace(&mut self, header: &Header, graph: &SceneGraphLayer) -> SyncOutcome {
        let spheres = markers::place_spheres(graph, self.freespace.namespace(), markers::FREESPACE_COLOR);
        self.freespace.sync(&mut self.publisher, header, spheres)
    }

    fn visualize_freespace_graph(&mut self, header: &Header, graph: &SceneGraphLayer) -> SyncOutcome {
        let config = &self.config;
        let layer = LayerConfig {
            use_sphere_marker: false,
            marker_scale: 0.08,
            marker_alpha: 0.5,
            ..config.graph_layer.clone()
        };
        let node_ns = format!("{}_freespace_nodes", config.topology_marker_ns);
        let edge_ns = format!("{}_freespace_edges", config.topology_marker_ns);
        self.freespace_graph
            .sync_from(&mut self.publisher, header, graph.is_empty(), || {
                let mut batch = markers::node_markers(&layer, &config.graph, graph, &node_ns, |_| {
                    Color::BLACK
                });
                batch.extend(markers::edge_marker(
                    &layer,
                    &config.graph,
                    graph,
                    &edge_ns,
                    Color::BLACK,
                ));
                batch
            })
    }

    fn visualize_labels(&mut self, header: &Header, graph: &SceneGraphLayer) -> SyncOutcome {
        let config = &self.config;
        if !config.graph_layer.use_label {
            return SyncOutcome::Idle;
        }
        let ns = format!("{}_labels", config.topology_marker_ns);
        self.labels
            .sync_from(&mut self.publisher, header, graph.is_empty(), || {
                graph
                    .nodes()
                    .map(|node| markers::text_marker(&config.graph_layer, &config.graph, node, &ns))
                    .collect()
            })
    }

    /// Publishes the raw GVD graph, or clears it when the graph is empty.
    pub fn visualize_gvd_graph(&mut self, header: &Header, graph: &GvdGraph) -> SyncOutcome {
        let config = &self.config;
        let ns = self.gvd_graph.namespace().to_owned();
        self.gvd_graph
            .sync(&mut self.publisher, header, graph.is_empty(), || {
                markers::gvd_graph_markers(&config.gvd, &config.colormap, graph, &ns)
            })
    }

    /// Publishes the outline of every allocated block.
    ///
    /// Not synchronized: the full outline goes out every call.
    pub fn visualize_blocks(&mut self, header: &Header, gvd: &GvdLayer) {
        let config = &self.config;
        self.publisher.publish(&ChannelId::VOXEL_BLOCKS, |scratch| {
            let marker = markers::block_outline_marker(
                &config.gvd,
                gvd,
                config.use_gvd_block_outlines,
                config.outline_scale,
            );
            scratch.push(stamped(marker, header, BLOCKS_NS));
            true
        });
    }

    /// Publishes the GVD graph colored by cluster, or clears it when the
    /// graph is empty.
    pub fn visualize_clusters(
        &mut self,
        header: &Header,
        extractor: &dyn CompressedGraphExtractor,
    ) -> SyncOutcome {
        let config = &self.config;
        let graph = extractor.gvd_graph();
        self.clusters
            .sync(&mut self.publisher, header, graph.is_empty(), || {
                markers::gvd_cluster_markers(
                    &config.gvd,
                    &config.colormap,
                    graph,
                    extractor.compressed_node_info(),
                    extractor.compressed_remapping(),
                    GVD_CLUSTER_NS,
                )
            })
    }

    /// Publishes the voxels where two fields disagree by more than
    /// `threshold`.
    ///
    /// Suppressed when no voxel exceeds the threshold. Returns whether
    /// anything was published.
    pub fn visualize_error(
        &mut self,
        timestamp_ns: u64,
        lhs: &GvdLayer,
        rhs: &GvdLayer,
        threshold: f64,
    ) -> bool {
        let header = self.header(timestamp_ns);
        let config = &self.config;
        self.publisher.publish(&ChannelId::ERROR, |scratch| {
            let marker = markers::error_marker(&config.gvd, &config.colormap, lhs, rhs, threshold);
            if marker.points.is_empty() {
                info!("no voxel error above {threshold}");
                return false;
            }
            scratch.push(stamped(marker, &header, ERROR_NS));
            true
        })
    }
}

fn place_color(config: &ReconstructionVisualizerConfig, distance: f64) -> Color {
    if !config.graph.color_places_by_distance {
        return markers::PLACE_COLOR;
    }
    config.colormap.distance_color(
        distance,
        config.graph.places_colormap_min_distance,
        config.graph.places_colormap_max_distance,
    )
}

fn stamped(mut marker: Marker, header: &Header, ns: &str) -> Marker {
    marker.header = header.clone();
    marker.ns = ns.to_owned();
    marker
}
