// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visual output channel identification.
//!
//! A channel is a named, independently diffed output stream. [`ChannelId`]
//! is opaque to the core: the sink interprets the name (as a topic, a layer
//! name, a file, ...). The well-known channel names used by the reconstruction
//! and object visualizers are provided as constants.

use alloc::borrow::Cow;
use alloc::string::String;
use core::fmt;

/// Names one visual output stream.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChannelId(Cow<'static, str>);

impl ChannelId {
    /// Signed-distance slice.
    pub const ESDF: Self = Self::from_static("esdf_viz");
    /// Generalized Voronoi diagram slice.
    pub const GVD: Self = Self::from_static("gvd_viz");
    /// Surface voxel slice.
    pub const SURFACE: Self = Self::from_static("surface_viz");
    /// Allocated block outlines.
    pub const VOXEL_BLOCKS: Self = Self::from_static("voxel_block_viz");
    /// Full place graph (nodes and edges).
    pub const GRAPH: Self = Self::from_static("graph_viz");
    /// Free-space spheres around places.
    pub const FREESPACE: Self = Self::from_static("freespace_viz");
    /// Place graph drawn in the free-space style.
    pub const FREESPACE_GRAPH: Self = Self::from_static("freespace_graph_viz");
    /// Text labels for place graph nodes.
    pub const GRAPH_LABELS: Self = Self::from_static("graph_label_viz");
    /// Raw GVD graph.
    pub const GVD_GRAPH: Self = Self::from_static("gvd_graph_viz");
    /// Compressed GVD cluster graph.
    pub const GVD_CLUSTERS: Self = Self::from_static("gvd_cluster_viz");
    /// Distance-error comparison between two voxel fields.
    pub const ERROR: Self = Self::from_static("error_viz");

    /// Creates a channel id from a static name without allocating.
    #[inline]
    #[must_use]
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Creates a channel id from an owned name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// Returns the channel name.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChannelId({:?})", self.as_str())
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&'static str> for ChannelId {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

impl From<String> for ChannelId {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn static_and_owned_ids_compare_equal() {
        let owned = ChannelId::new(String::from("graph_viz"));
        assert_eq!(owned, ChannelId::GRAPH);
        assert_eq!(format!("{}", ChannelId::GRAPH), "graph_viz");
    }
}
