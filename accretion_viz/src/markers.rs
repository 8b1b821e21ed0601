// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stateless conversion from model snapshots to markers.
//!
//! Nothing here knows about channels or diff state. Functions return bare
//! markers with an empty header; the synchronizers stamp them when they go
//! out. Ids are chosen so that diffing works:
//!
//! - place nodes and labels use the node id,
//! - list-style markers (slices, outlines, GVD graph) use id `0`,
//! - free-space spheres are numbered `0..n` in node order.

use std::collections::{BTreeMap, HashMap};

use accretion_core::marker::{Batch, Color, Marker, MarkerKind, Point3, PrimitiveId};

use crate::colormap::ColormapConfig;
use crate::config::{GraphVisualConfig, GvdVisualizerConfig, LayerConfig};
use crate::model::{
    CompressedNode, GvdGraph, GvdLayer, GvdVoxel, MeshDelta, NodeId, SceneGraphLayer,
    SceneGraphNode, VoxelIndex,
};

/// Color of place nodes when distance shading is off.
pub const PLACE_COLOR: Color = Color::rgba(0.35, 0.35, 0.8, 1.0);

/// Color of free-space spheres.
pub const FREESPACE_COLOR: Color = Color::rgba(0.6, 0.8, 0.6, 0.15);

/// Color of surface voxels.
pub const SURFACE_COLOR: Color = Color::rgba(0.9, 0.6, 0.1, 1.0);

fn layer_offset(layer: &LayerConfig, visual: &GraphVisualConfig) -> Point3 {
    Point3::new(0.0, 0.0, visual.layer_z_step * layer.z_offset_scale)
}

/// Returns one marker per node, with the node id as primitive id.
pub fn node_markers(
    layer: &LayerConfig,
    visual: &GraphVisualConfig,
    graph: &SceneGraphLayer,
    ns: &str,
    color: impl Fn(&SceneGraphNode) -> Color,
) -> Batch {
    let offset = layer_offset(layer, visual);
    let kind = if layer.use_sphere_marker {
        MarkerKind::Sphere
    } else {
        MarkerKind::Cube
    };
    graph
        .nodes()
        .map(|node| {
            let mut marker = Marker::new(kind, ns, PrimitiveId(node.id));
            marker.position = node.position.offset(offset);
            marker.scale = Point3::splat(layer.marker_scale);
            marker.color = color(node).with_alpha(layer.marker_alpha);
            marker
        })
        .collect()
}

/// Returns a line list with one segment per edge, or `None` when the layer
/// has no drawable edges.
pub fn edge_marker(
    layer: &LayerConfig,
    visual: &GraphVisualConfig,
    graph: &SceneGraphLayer,
    ns: &str,
    color: Color,
) -> Option<Marker> {
    let offset = layer_offset(layer, visual);
    let mut marker = Marker::new(MarkerKind::LineList, ns, PrimitiveId(0));
    for edge in graph.edges() {
        let (Some(source), Some(target)) = (graph.node(edge.source), graph.node(edge.target))
        else {
            continue;
        };
        marker.points.push(source.position.offset(offset));
        marker.points.push(target.position.offset(offset));
    }
    if marker.points.is_empty() {
        return None;
    }
    marker.scale = Point3::new(layer.edge_scale, 0.0, 0.0);
    marker.color = color.with_alpha(layer.edge_alpha);
    Some(marker)
}

/// Returns a text marker floating above `node`.
pub fn text_marker(
    layer: &LayerConfig,
    visual: &GraphVisualConfig,
    node: &SceneGraphNode,
    ns: &str,
) -> Marker {
    let mut marker = Marker::new(MarkerKind::Text, ns, PrimitiveId(node.id));
    marker.position = node
        .position
        .offset(layer_offset(layer, visual))
        .offset(Point3::new(0.0, 0.0, layer.label_height));
    marker.scale = Point3::new(0.0, 0.0, layer.label_scale);
    marker.color = Color::BLACK;
    marker.text = match &node.name {
        Some(name) => name.clone(),
        None => node.id.to_string(),
    };
    marker
}

/// Returns one sphere per node showing its free-space radius.
///
/// Ids are positional (`0..n` in node order) and carry no identity.
pub fn place_spheres(graph: &SceneGraphLayer, ns: &str, color: Color) -> Batch {
    graph
        .nodes()
        .enumerate()
        .map(|(i, node)| {
            let mut marker = Marker::new(MarkerKind::Sphere, ns, PrimitiveId(i as u64));
            marker.position = node.position;
            marker.scale = Point3::splat(2.0 * node.distance.max(0.0));
            marker.color = color;
            marker
        })
        .collect()
}

fn voxel_cloud(
    layer: &GvdLayer,
    filter: impl Fn(VoxelIndex, &GvdVoxel) -> bool,
    color: impl Fn(&GvdVoxel) -> Color,
) -> Marker {
    let mut marker = Marker::new(MarkerKind::CubeList, "", PrimitiveId(0));
    marker.scale = Point3::splat(layer.voxel_size());
    for (index, voxel) in layer.iter().filter(|(i, v)| filter(*i, *v)) {
        marker.points.push(layer.voxel_center(index));
        marker.colors.push(color(voxel));
    }
    marker
}

/// Returns the observed voxels intersecting the horizontal plane at
/// `config.slice_height`, shaded by distance.
pub fn esdf_slice_marker(
    config: &GvdVisualizerConfig,
    colormap: &ColormapConfig,
    layer: &GvdLayer,
) -> Marker {
    let half = 0.5 * layer.voxel_size();
    voxel_cloud(
        layer,
        move |index, voxel| {
            voxel.observed && (layer.voxel_center(index).z - config.slice_height).abs() <= half
        },
        move |voxel| {
            colormap
                .distance_color(voxel.distance, config.gvd_min_distance, config.gvd_max_distance)
                .with_alpha(config.esdf_alpha)
        },
    )
}

/// Returns every voxel on the GVD (at least `basis_threshold` extra basis
/// points), shaded by distance.
pub fn gvd_marker(config: &GvdVisualizerConfig, colormap: &ColormapConfig, layer: &GvdLayer) -> Marker {
    voxel_cloud(
        layer,
        |_, voxel| voxel.observed && is_gvd(config, voxel),
        move |voxel| {
            colormap
                .distance_color(voxel.distance, config.gvd_min_distance, config.gvd_max_distance)
                .with_alpha(config.gvd_alpha)
        },
    )
}

/// Returns every voxel flagged as lying on a surface.
pub fn surface_marker(config: &GvdVisualizerConfig, layer: &GvdLayer) -> Marker {
    voxel_cloud(
        layer,
        |_, voxel| voxel.on_surface,
        move |_| SURFACE_COLOR.with_alpha(config.surface_alpha),
    )
}

fn is_gvd(config: &GvdVisualizerConfig, voxel: &GvdVoxel) -> bool {
    voxel.num_extra_basis >= config.basis_threshold.max(1)
}

/// Returns the wireframe of allocated blocks.
///
/// With `gvd_only`, only blocks holding at least one GVD voxel are drawn.
pub fn block_outline_marker(
    config: &GvdVisualizerConfig,
    layer: &GvdLayer,
    gvd_only: bool,
    line_width: f64,
) -> Marker {
    let blocks = if gvd_only {
        layer.blocks_where(|voxel| voxel.observed && is_gvd(config, voxel))
    } else {
        layer.blocks_where(|_| true)
    };

    let mut marker = Marker::new(MarkerKind::LineList, "", PrimitiveId(0));
    marker.scale = Point3::new(line_width, 0.0, 0.0);
    marker.color = Color::BLACK;
    let size = layer.block_size();
    for block in blocks {
        let o = layer.block_origin(block);
        let corner = |dx: f64, dy: f64, dz: f64| {
            Point3::new(o.x + dx * size, o.y + dy * size, o.z + dz * size)
        };
        for &(a, b) in &CUBE_EDGES {
            marker.points.push(corner(a.0, a.1, a.2));
            marker.points.push(corner(b.0, b.1, b.2));
        }
    }
    marker
}

type Corner = (f64, f64, f64);

const CUBE_EDGES: [(Corner, Corner); 12] = [
    ((0., 0., 0.), (1., 0., 0.)),
    ((0., 1., 0.), (1., 1., 0.)),
    ((0., 0., 1.), (1., 0., 1.)),
    ((0., 1., 1.), (1., 1., 1.)),
    ((0., 0., 0.), (0., 1., 0.)),
    ((1., 0., 0.), (1., 1., 0.)),
    ((0., 0., 1.), (0., 1., 1.)),
    ((1., 0., 1.), (1., 1., 1.)),
    ((0., 0., 0.), (0., 0., 1.)),
    ((1., 0., 0.), (1., 0., 1.)),
    ((0., 1., 0.), (0., 1., 1.)),
    ((1., 1., 0.), (1., 1., 1.)),
];

/// Returns the voxels observed in both layers whose distances differ by more
/// than `threshold`, shaded by the size of the difference.
pub fn error_marker(
    config: &GvdVisualizerConfig,
    colormap: &ColormapConfig,
    lhs: &GvdLayer,
    rhs: &GvdLayer,
    threshold: f64,
) -> Marker {
    let mut errors = Vec::new();
    let mut max_error = threshold;
    for (index, left) in lhs.iter() {
        let Some(right) = rhs.get(index) else {
            continue;
        };
        if !left.observed || !right.observed {
            continue;
        }
        let error = (left.distance - right.distance).abs();
        if error > threshold {
            max_error = max_error.max(error);
            errors.push((lhs.voxel_center(index), error));
        }
    }

    let mut marker = Marker::new(MarkerKind::CubeList, "", PrimitiveId(0));
    marker.scale = Point3::splat(config.error_scale);
    for (position, error) in errors {
        marker.points.push(position);
        marker
            .colors
            .push(colormap.distance_color(error, threshold, max_error));
    }
    marker
}

/// Returns the GVD graph as a node marker in `<ns>_nodes` and an edge marker
/// in `<ns>_edges`, both with id `0`.
///
/// An empty graph yields an empty batch.
pub fn gvd_graph_markers(
    config: &GvdVisualizerConfig,
    colormap: &ColormapConfig,
    graph: &GvdGraph,
    ns: &str,
) -> Batch {
    graph_markers(config, graph, ns, |_, node_distance| {
        colormap.distance_color(node_distance, config.gvd_min_distance, config.gvd_max_distance)
    })
}

/// Returns the GVD graph with every node colored by its cluster.
///
/// Nodes missing from `remapping` (or mapped to an unknown cluster) are
/// drawn black.
pub fn gvd_cluster_markers(
    config: &GvdVisualizerConfig,
    colormap: &ColormapConfig,
    graph: &GvdGraph,
    clusters: &BTreeMap<NodeId, CompressedNode>,
    remapping: &HashMap<NodeId, NodeId>,
    ns: &str,
) -> Batch {
    graph_markers(config, graph, ns, |id, _| {
        match remapping.get(&id).filter(|cluster| clusters.contains_key(*cluster)) {
            Some(&cluster) => colormap.id_color(cluster),
            None => Color::BLACK,
        }
    })
}

fn graph_markers(
    config: &GvdVisualizerConfig,
    graph: &GvdGraph,
    ns: &str,
    color: impl Fn(NodeId, f64) -> Color,
) -> Batch {
    if graph.is_empty() {
        return Batch::new();
    }

    let mut nodes = Marker::new(MarkerKind::SphereList, format!("{ns}_nodes"), PrimitiveId(0));
    nodes.scale = Point3::splat(config.gvd_graph_scale);
    for (id, node) in graph.nodes() {
        nodes.points.push(node.position);
        nodes
            .colors
            .push(color(id, node.distance).with_alpha(config.gvd_graph_alpha));
    }

    let mut edges = Marker::new(MarkerKind::LineList, format!("{ns}_edges"), PrimitiveId(0));
    edges.scale = Point3::new(config.gvd_edge_scale, 0.0, 0.0);
    edges.color = Color::BLACK.with_alpha(config.gvd_graph_alpha);
    for (a, b) in graph.edges() {
        let (Some(a), Some(b)) = (graph.node(a), graph.node(b)) else {
            continue;
        };
        edges.points.push(a.position);
        edges.points.push(b.position);
    }

    let mut batch = Batch::new();
    batch.push(nodes);
    batch.push(edges);
    batch
}

/// Returns a point cloud of the mesh vertices at `indices`.
///
/// Indices outside the delta are skipped.
pub fn vertex_cloud_marker(
    delta: &MeshDelta,
    indices: &[usize],
    ns: &str,
    id: PrimitiveId,
    scale: f64,
    alpha: f32,
    use_spheres: bool,
) -> Marker {
    let kind = if use_spheres {
        MarkerKind::SphereList
    } else {
        MarkerKind::Points
    };
    let mut marker = Marker::new(kind, ns, id);
    marker.scale = Point3::splat(scale);
    for vertex in indices.iter().filter_map(|&i| delta.vertex(i)) {
        marker.points.push(vertex.position);
        marker.colors.push(vertex.color.with_alpha(alpha));
    }
    marker
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MeshVertex;

    fn graph(ids: &[NodeId]) -> SceneGraphLayer {
        let mut graph = SceneGraphLayer::new();
        for &id in ids {
            graph.insert_node(SceneGraphNode::new(id, Point3::new(id as f64, 0.0, 0.0), 0.5));
        }
        graph
    }

    #[test]
    fn node_ids_become_primitive_ids() {
        let batch = node_markers(
            &LayerConfig::default(),
            &GraphVisualConfig::default(),
            &graph(&[7, 3]),
            "places",
            |_| PLACE_COLOR,
        );
        let ids: Vec<u64> = batch.iter().map(|m| m.id.0).collect();
        assert_eq!(ids, [7, 3]);
        assert!(batch.iter().all(|m| m.ns == "places"));
    }

    #[test]
    fn z_step_lifts_nodes() {
        let visual = GraphVisualConfig {
            layer_z_step: 2.0,
            ..GraphVisualConfig::default()
        };
        let batch = node_markers(&LayerConfig::default(), &visual, &graph(&[1]), "p", |_| {
            PLACE_COLOR
        });
        assert_eq!(batch.markers[0].position.z, 2.0);
    }

    #[test]
    fn no_edges_no_edge_marker() {
        let g = graph(&[1, 2]);
        let layer = LayerConfig::default();
        let visual = GraphVisualConfig::default();
        assert!(edge_marker(&layer, &visual, &g, "e", Color::BLACK).is_none());

        let mut g = g;
        assert!(g.insert_edge(1, 2));
        let marker = edge_marker(&layer, &visual, &g, "e", Color::BLACK).expect("one edge");
        assert_eq!(marker.points.len(), 2);
        assert_eq!(marker.id, PrimitiveId(0));
    }

    #[test]
    fn labels_fall_back_to_id() {
        let mut node = SceneGraphNode::new(42, Point3::ZERO, 1.0);
        let layer = LayerConfig::default();
        let visual = GraphVisualConfig::default();
        assert_eq!(text_marker(&layer, &visual, &node, "l").text, "42");
        node.name = Some("kitchen".to_owned());
        let marker = text_marker(&layer, &visual, &node, "l");
        assert_eq!(marker.text, "kitchen");
        assert_eq!(marker.position.z, visual.layer_z_step + layer.label_height);
    }

    #[test]
    fn place_spheres_are_positional() {
        let batch = place_spheres(&graph(&[9, 4, 6]), "fs", FREESPACE_COLOR);
        let ids: Vec<u64> = batch.iter().map(|m| m.id.0).collect();
        assert_eq!(ids, [0, 1, 2]);
        assert_eq!(batch.markers[0].scale, Point3::splat(1.0));
    }

    fn layer() -> GvdLayer {
        let mut layer = GvdLayer::new(1.0, 2);
        let observed = |distance, basis, surface| GvdVoxel {
            observed: true,
            distance,
            num_extra_basis: basis,
            on_surface: surface,
        };
        layer.insert([0, 0, 0], observed(1.0, 0, true));
        layer.insert([1, 0, 0], observed(2.0, 2, false));
        layer.insert([4, 0, 0], observed(0.5, 0, false));
        layer.insert([0, 0, 3], observed(3.0, 3, false));
        layer.insert([1, 1, 0], GvdVoxel::default());
        layer
    }

    #[test]
    fn esdf_slice_keeps_observed_voxels_near_height() {
        let config = GvdVisualizerConfig {
            slice_height: 0.5,
            ..GvdVisualizerConfig::default()
        };
        let marker = esdf_slice_marker(&config, &ColormapConfig::default(), &layer());
        assert_eq!(marker.points.len(), 3);
        assert_eq!(marker.colors.len(), 3);
    }

    #[test]
    fn gvd_and_surface_filters() {
        let config = GvdVisualizerConfig {
            basis_threshold: 2,
            ..GvdVisualizerConfig::default()
        };
        let gvd = gvd_marker(&config, &ColormapConfig::default(), &layer());
        assert_eq!(gvd.points.len(), 2);
        let surface = surface_marker(&config, &layer());
        assert_eq!(surface.points.len(), 1);
    }

    #[test]
    fn outlines_can_be_limited_to_gvd_blocks() {
        let config = GvdVisualizerConfig::default();
        let all = block_outline_marker(&config, &layer(), false, 0.01);
        assert_eq!(all.points.len(), 3 * 24);
        let gvd = block_outline_marker(&config, &layer(), true, 0.01);
        assert_eq!(gvd.points.len(), 2 * 24);
    }

    #[test]
    fn error_marker_only_reports_large_differences() {
        let lhs = layer();
        let mut rhs = layer();
        rhs.insert(
            [1, 0, 0],
            GvdVoxel {
                observed: true,
                distance: 2.05,
                ..GvdVoxel::default()
            },
        );
        rhs.insert(
            [4, 0, 0],
            GvdVoxel {
                observed: true,
                distance: 1.5,
                ..GvdVoxel::default()
            },
        );
        let marker = error_marker(
            &GvdVisualizerConfig::default(),
            &ColormapConfig::default(),
            &lhs,
            &rhs,
            0.1,
        );
        assert_eq!(marker.points, [lhs.voxel_center([4, 0, 0])]);
    }

    #[test]
    fn gvd_graph_has_node_and_edge_markers() {
        let config = GvdVisualizerConfig::default();
        let map = ColormapConfig::default();
        assert!(gvd_graph_markers(&config, &map, &GvdGraph::new(), "gvd").is_empty());

        let mut g = GvdGraph::new();
        g.insert_node(1, Point3::ZERO, 1.0, 3);
        g.insert_node(2, Point3::splat(1.0), 1.0, 3);
        g.insert_edge(1, 2);
        let batch = gvd_graph_markers(&config, &map, &g, "gvd");
        let namespaces: Vec<&str> = batch.iter().map(|m| m.ns.as_str()).collect();
        assert_eq!(namespaces, ["gvd_nodes", "gvd_edges"]);
        assert_eq!(batch.markers[0].points.len(), 2);
        assert_eq!(batch.markers[1].points.len(), 2);
    }

    #[test]
    fn unmapped_cluster_nodes_are_black() {
        let mut g = GvdGraph::new();
        g.insert_node(1, Point3::ZERO, 1.0, 3);
        g.insert_node(2, Point3::ZERO, 1.0, 3);
        let clusters = BTreeMap::from([(10, CompressedNode::default())]);
        let remapping = HashMap::from([(1, 10), (2, 99)]);
        let config = GvdVisualizerConfig::default();
        let map = ColormapConfig::default();
        let batch = gvd_cluster_markers(&config, &map, &g, &clusters, &remapping, "c");
        let colors = &batch.markers[0].colors;
        assert_eq!(colors[0], map.id_color(10).with_alpha(config.gvd_graph_alpha));
        assert_eq!(colors[1], Color::BLACK.with_alpha(config.gvd_graph_alpha));
    }

    #[test]
    fn vertex_cloud_skips_unknown_indices() {
        let delta = MeshDelta {
            vertex_start: 5,
            vertices: vec![
                MeshVertex {
                    position: Point3::splat(1.0),
                    color: Color::WHITE,
                };
                3
            ],
        };
        let marker = vertex_cloud_marker(&delta, &[4, 5, 7, 8], "o", PrimitiveId(1), 0.1, 0.5, true);
        assert_eq!(marker.kind, MarkerKind::SphereList);
        assert_eq!(marker.points.len(), 2);
        assert_eq!(marker.colors[0].a, 0.5);
    }
}
