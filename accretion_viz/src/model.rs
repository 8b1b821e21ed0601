// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Model snapshots consumed by the visualizers.
//!
//! These are the read-only views a perception pipeline hands over once per
//! tick: a sparse voxel field with distance and Voronoi information, a place
//! graph layer, the raw GVD graph, and (for the object visualizer) a mesh
//! delta with per-label vertex indices. The visualizers borrow them for the
//! duration of one call and never keep them.
//!
//! Graph extraction is abstracted behind [`GraphExtractor`]. Extractors that
//! also compress the GVD graph into clusters expose that capability through
//! [`GraphExtractor::as_compressed`] rather than through a type check.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use accretion_core::marker::{Color, Point3};

/// Identifier of a graph node.
pub type NodeId = u64;

/// Integer coordinates of a voxel in the global voxel grid.
pub type VoxelIndex = [i64; 3];

/// Integer coordinates of a block (a cube of `voxels_per_side³` voxels).
pub type BlockIndex = [i64; 3];

// ---------------------------------------------------------------------------
// Voxel field
// ---------------------------------------------------------------------------

/// One voxel of the distance / Voronoi field.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GvdVoxel {
    /// Whether the voxel has been observed.
    pub observed: bool,
    /// Distance to the nearest obstacle, in meters.
    pub distance: f64,
    /// Number of additional equidistant obstacle points. A voxel with at
    /// least one extra basis point lies on the Voronoi diagram.
    pub num_extra_basis: u8,
    /// Whether the voxel lies on an obstacle surface.
    pub on_surface: bool,
}

/// A sparse voxel field, allocated in blocks.
#[derive(Clone, Debug, PartialEq)]
pub struct GvdLayer {
    voxel_size: f64,
    voxels_per_side: usize,
    voxels: BTreeMap<VoxelIndex, GvdVoxel>,
}

impl GvdLayer {
    /// Creates an empty layer.
    ///
    /// `voxels_per_side` is clamped to at least one.
    #[must_use]
    pub fn new(voxel_size: f64, voxels_per_side: usize) -> Self {
        Self {
            voxel_size,
            voxels_per_side: voxels_per_side.max(1),
            voxels: BTreeMap::new(),
        }
    }

    /// Returns the edge length of a voxel.
    #[must_use]
    pub fn voxel_size(&self) -> f64 {
        self.voxel_size
    }

    /// Returns the number of voxels along one edge of a block.
    #[must_use]
    pub fn voxels_per_side(&self) -> usize {
        self.voxels_per_side
    }

    /// Returns the edge length of a block.
    #[must_use]
    pub fn block_size(&self) -> f64 {
        self.voxel_size * self.voxels_per_side as f64
    }

    /// Stores a voxel, replacing any previous value at `index`.
    pub fn insert(&mut self, index: VoxelIndex, voxel: GvdVoxel) {
        self.voxels.insert(index, voxel);
    }

    /// Returns the voxel at `index`, if allocated.
    #[must_use]
    pub fn get(&self, index: VoxelIndex) -> Option<&GvdVoxel> {
        self.voxels.get(&index)
    }

    /// Iterates over allocated voxels in index order.
    pub fn iter(&self) -> impl Iterator<Item = (VoxelIndex, &GvdVoxel)> {
        self.voxels.iter().map(|(index, voxel)| (*index, voxel))
    }

    /// Returns the number of allocated voxels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    /// Returns `true` if no voxel is allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    /// Returns the world position of a voxel's center.
    #[must_use]
    pub fn voxel_center(&self, index: VoxelIndex) -> Point3 {
        let s = self.voxel_size;
        Point3::new(
            (index[0] as f64 + 0.5) * s,
            (index[1] as f64 + 0.5) * s,
            (index[2] as f64 + 0.5) * s,
        )
    }

    /// Returns the block containing `index`.
    #[must_use]
    pub fn block_of(&self, index: VoxelIndex) -> BlockIndex {
        let n = self.voxels_per_side as i64;
        [
            index[0].div_euclid(n),
            index[1].div_euclid(n),
            index[2].div_euclid(n),
        ]
    }

    /// Returns the indices of every block holding at least one voxel that
    /// satisfies `filter`.
    #[must_use]
    pub fn blocks_where(&self, filter: impl Fn(&GvdVoxel) -> bool) -> BTreeSet<BlockIndex> {
        self.voxels
            .iter()
            .filter(|(_, voxel)| filter(voxel))
            .map(|(index, _)| self.block_of(*index))
            .collect()
    }

    /// Returns the world position of a block's minimum corner.
    #[must_use]
    pub fn block_origin(&self, block: BlockIndex) -> Point3 {
        let s = self.block_size();
        Point3::new(
            block[0] as f64 * s,
            block[1] as f64 * s,
            block[2] as f64 * s,
        )
    }
}

// ---------------------------------------------------------------------------
// Place graph
// ---------------------------------------------------------------------------

/// A node of a place graph layer.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneGraphNode {
    /// Node identifier, unique within the layer.
    pub id: NodeId,
    /// Position of the node in the world frame.
    pub position: Point3,
    /// Free-space radius around the node.
    pub distance: f64,
    /// Optional display name; labels fall back to the id.
    pub name: Option<String>,
}

impl SceneGraphNode {
    /// Creates an unnamed node.
    #[must_use]
    pub fn new(id: NodeId, position: Point3, distance: f64) -> Self {
        Self {
            id,
            position,
            distance,
            name: None,
        }
    }
}

/// An undirected edge between two place nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SceneGraphEdge {
    /// One endpoint.
    pub source: NodeId,
    /// The other endpoint.
    pub target: NodeId,
}

/// A layer of the scene graph, with nodes kept in insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneGraphLayer {
    nodes: Vec<SceneGraphNode>,
    index: HashMap<NodeId, usize>,
    edges: BTreeSet<SceneGraphEdge>,
}

impl SceneGraphLayer {
    /// Creates an empty layer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a node, or replaces the node with the same id in place.
    pub fn insert_node(&mut self, node: SceneGraphNode) {
        match self.index.get(&node.id) {
            Some(&slot) => self.nodes[slot] = node,
            None => {
                self.index.insert(node.id, self.nodes.len());
                self.nodes.push(node);
            }
        }
    }

    /// Removes a node and every edge touching it. Returns the node if it
    /// existed.
    pub fn remove_node(&mut self, id: NodeId) -> Option<SceneGraphNode> {
        let slot = self.index.remove(&id)?;
        let node = self.nodes.remove(slot);
        for later in &self.nodes[slot..] {
            if let Some(s) = self.index.get_mut(&later.id) {
                *s -= 1;
            }
        }
        self.edges.retain(|e| e.source != id && e.target != id);
        Some(node)
    }

    /// Adds an edge between two existing nodes.
    ///
    /// Returns `false` (and adds nothing) if either endpoint is missing or
    /// both endpoints are the same node.
    pub fn insert_edge(&mut self, source: NodeId, target: NodeId) -> bool {
        if source == target || !self.has_node(source) || !self.has_node(target) {
            return false;
        }
        let (source, target) = if source < target {
            (source, target)
        } else {
            (target, source)
        };
        self.edges.insert(SceneGraphEdge { source, target })
    }

    /// Returns `true` if a node with `id` exists.
    #[must_use]
    pub fn has_node(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    /// Returns the node with `id`, if any.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&SceneGraphNode> {
        self.index.get(&id).map(|&slot| &self.nodes[slot])
    }

    /// Iterates over nodes in insertion order.
    pub fn nodes(&self) -> impl ExactSizeIterator<Item = &SceneGraphNode> {
        self.nodes.iter()
    }

    /// Iterates over edges in endpoint order.
    pub fn edges(&self) -> impl ExactSizeIterator<Item = &SceneGraphEdge> {
        self.edges.iter()
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the layer has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

// ---------------------------------------------------------------------------
// GVD graph
// ---------------------------------------------------------------------------

/// A node of the raw GVD graph.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GvdGraphNode {
    /// Position of the node.
    pub position: Point3,
    /// Distance to the nearest obstacle.
    pub distance: f64,
    /// Number of obstacle points equidistant to this node.
    pub num_basis_points: usize,
    /// Adjacent nodes.
    pub siblings: BTreeSet<NodeId>,
}

/// The graph traced along the generalized Voronoi diagram.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GvdGraph {
    nodes: BTreeMap<NodeId, GvdGraphNode>,
}

impl GvdGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a node. Existing adjacency is kept.
    pub fn insert_node(&mut self, id: NodeId, position: Point3, distance: f64, num_basis_points: usize) {
        let node = self.nodes.entry(id).or_default();
        node.position = position;
        node.distance = distance;
        node.num_basis_points = num_basis_points;
    }

    /// Connects two existing nodes. Returns `false` if either is missing.
    pub fn insert_edge(&mut self, a: NodeId, b: NodeId) -> bool {
        if a == b || !self.nodes.contains_key(&a) || !self.nodes.contains_key(&b) {
            return false;
        }
        if let Some(node) = self.nodes.get_mut(&a) {
            node.siblings.insert(b);
        }
        if let Some(node) = self.nodes.get_mut(&b) {
            node.siblings.insert(a);
        }
        true
    }

    /// Removes a node and its adjacency.
    pub fn remove_node(&mut self, id: NodeId) -> Option<GvdGraphNode> {
        let node = self.nodes.remove(&id)?;
        for sibling in &node.siblings {
            if let Some(other) = self.nodes.get_mut(sibling) {
                other.siblings.remove(&id);
            }
        }
        Some(node)
    }

    /// Returns the node with `id`, if any.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&GvdGraphNode> {
        self.nodes.get(&id)
    }

    /// Iterates over nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &GvdGraphNode)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    /// Iterates over each undirected edge once, as `(smaller, larger)`.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.nodes.iter().flat_map(|(&id, node)| {
            node.siblings
                .iter()
                .filter(move |&&other| id < other)
                .map(move |&other| (id, other))
        })
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Extractors
// ---------------------------------------------------------------------------

/// Summary of one compressed cluster of GVD nodes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompressedNode {
    /// Representative position of the cluster.
    pub position: Point3,
    /// Whether the cluster is still being updated.
    pub active: bool,
}

/// Source of the place graph and GVD graph for a tick.
pub trait GraphExtractor {
    /// Returns the extracted place graph.
    fn graph(&self) -> &SceneGraphLayer;

    /// Returns the raw GVD graph.
    fn gvd_graph(&self) -> &GvdGraph;

    /// Returns `true` if nothing has been extracted.
    fn is_empty(&self) -> bool {
        self.graph().is_empty() && self.gvd_graph().is_empty()
    }

    /// Returns the cluster-compression capability, if this extractor has it.
    fn as_compressed(&self) -> Option<&dyn CompressedGraphExtractor> {
        None
    }
}

/// An extractor that additionally groups GVD nodes into clusters.
pub trait CompressedGraphExtractor: GraphExtractor {
    /// Returns the clusters by cluster id.
    fn compressed_node_info(&self) -> &BTreeMap<NodeId, CompressedNode>;

    /// Returns the mapping from GVD node id to cluster id.
    fn compressed_remapping(&self) -> &HashMap<NodeId, NodeId>;
}

/// A plain extractor snapshot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphSnapshot {
    /// The place graph.
    pub graph: SceneGraphLayer,
    /// The raw GVD graph.
    pub gvd_graph: GvdGraph,
}

impl GraphExtractor for GraphSnapshot {
    fn graph(&self) -> &SceneGraphLayer {
        &self.graph
    }

    fn gvd_graph(&self) -> &GvdGraph {
        &self.gvd_graph
    }
}

/// An extractor snapshot that carries cluster compression results.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompressedGraphSnapshot {
    /// The place graph.
    pub graph: SceneGraphLayer,
    /// The raw GVD graph.
    pub gvd_graph: GvdGraph,
    /// Clusters by cluster id.
    pub clusters: BTreeMap<NodeId, CompressedNode>,
    /// GVD node id to cluster id.
    pub remapping: HashMap<NodeId, NodeId>,
}

impl GraphExtractor for CompressedGraphSnapshot {
    fn graph(&self) -> &SceneGraphLayer {
        &self.graph
    }

    fn gvd_graph(&self) -> &GvdGraph {
        &self.gvd_graph
    }

    fn as_compressed(&self) -> Option<&dyn CompressedGraphExtractor> {
        Some(self)
    }
}

impl CompressedGraphExtractor for CompressedGraphSnapshot {
    fn compressed_node_info(&self) -> &BTreeMap<NodeId, CompressedNode> {
        &self.clusters
    }

    fn compressed_remapping(&self) -> &HashMap<NodeId, NodeId> {
        &self.remapping
    }
}

// ---------------------------------------------------------------------------
// Mesh delta
// ---------------------------------------------------------------------------

/// A colored mesh vertex.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeshVertex {
    /// Vertex position.
    pub position: Point3,
    /// Vertex color.
    pub color: Color,
}

/// The vertices added or updated by one mesh integration step.
///
/// Vertex indices are global: the first vertex of the delta has index
/// `vertex_start`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshDelta {
    /// Global index of the first vertex in [`vertices`](Self::vertices).
    pub vertex_start: usize,
    /// Vertices in global index order.
    pub vertices: Vec<MeshVertex>,
}

impl MeshDelta {
    /// Returns the vertex with global index `index`, if it is in the delta.
    #[must_use]
    pub fn vertex(&self, index: usize) -> Option<&MeshVertex> {
        index
            .checked_sub(self.vertex_start)
            .and_then(|local| self.vertices.get(local))
    }
}

/// Global vertex indices grouped by semantic label.
pub type LabelIndices = BTreeMap<u32, Vec<usize>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_graph_keeps_insertion_order() {
        let mut layer = SceneGraphLayer::new();
        for id in [5, 1, 3] {
            layer.insert_node(SceneGraphNode::new(id, Point3::ZERO, 1.0));
        }
        layer.insert_node(SceneGraphNode::new(1, Point3::new(1.0, 0.0, 0.0), 2.0));

        let ids: Vec<NodeId> = layer.nodes().map(|n| n.id).collect();
        assert_eq!(ids, [5, 1, 3]);
        assert_eq!(layer.node(1).map(|n| n.distance), Some(2.0));
    }

    #[test]
    fn removing_node_drops_edges_and_reindexes() {
        let mut layer = SceneGraphLayer::new();
        for id in [1, 2, 3] {
            layer.insert_node(SceneGraphNode::new(id, Point3::ZERO, 1.0));
        }
        assert!(layer.insert_edge(2, 1));
        assert!(layer.insert_edge(2, 3));
        assert!(!layer.insert_edge(2, 9), "missing endpoint");

        assert!(layer.remove_node(1).is_some());
        assert_eq!(layer.edges().len(), 1);
        assert_eq!(layer.node(3).map(|n| n.id), Some(3));
        assert!(layer.remove_node(1).is_none());
    }

    #[test]
    fn gvd_graph_edges_listed_once() {
        let mut graph = GvdGraph::new();
        for id in 0..3 {
            graph.insert_node(id, Point3::ZERO, 1.0, 3);
        }
        assert!(graph.insert_edge(0, 1));
        assert!(graph.insert_edge(2, 1));
        let edges: Vec<_> = graph.edges().collect();
        assert_eq!(edges, [(0, 1), (1, 2)]);

        graph.remove_node(1);
        assert_eq!(graph.edges().count(), 0);
    }

    #[test]
    fn blocks_use_floor_division() {
        let layer = GvdLayer::new(0.1, 4);
        assert_eq!(layer.block_of([3, 4, -1]), [0, 1, -1]);
        let origin = layer.block_origin([1, 0, -1]);
        assert!((origin.x - 0.4).abs() < 1e-9, "got {origin:?}");
        assert!((origin.z + 0.4).abs() < 1e-9, "got {origin:?}");
    }

    #[test]
    fn mesh_delta_uses_global_indices() {
        let delta = MeshDelta {
            vertex_start: 10,
            vertices: vec![MeshVertex::default(); 2],
        };
        assert!(delta.vertex(9).is_none());
        assert!(delta.vertex(11).is_some());
        assert!(delta.vertex(12).is_none());
    }

    #[test]
    fn only_compressed_snapshot_exposes_clusters() {
        let plain = GraphSnapshot::default();
        let compressed = CompressedGraphSnapshot::default();
        assert!(plain.as_compressed().is_none());
        assert!(compressed.as_compressed().is_some());
        assert!(plain.is_empty());
    }
}
