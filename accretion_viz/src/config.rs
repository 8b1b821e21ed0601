// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visualizer configuration.
//!
//! Every struct deserializes with `#[serde(default)]`, so a TOML file only
//! needs the keys it wants to override. Three sections of
//! [`ReconstructionVisualizerConfig`] can be replaced at runtime through
//! [`ConfigUpdate`]; the rest is fixed at construction.
//!
//! ```toml
//! world_frame = "map"
//! show_block_outlines = true
//!
//! [graph_layer]
//! use_label = false
//! marker_scale = 0.2
//!
//! [gvd]
//! gvd_max_distance = 3.0
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::colormap::ColormapConfig;
use crate::error::ConfigError;

/// Styling of one scene-graph layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    /// Draw nodes as spheres instead of cubes.
    pub use_sphere_marker: bool,
    /// Edge length (or diameter) of node markers.
    pub marker_scale: f64,
    /// Opacity of node markers.
    pub marker_alpha: f32,
    /// Draw a text label above every node.
    pub use_label: bool,
    /// Height of labels above their node.
    pub label_height: f64,
    /// Text height of labels.
    pub label_scale: f64,
    /// Line width of edges.
    pub edge_scale: f64,
    /// Opacity of edges.
    pub edge_alpha: f32,
    /// Multiplier applied to [`GraphVisualConfig::layer_z_step`].
    pub z_offset_scale: f64,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            use_sphere_marker: true,
            marker_scale: 0.15,
            marker_alpha: 0.8,
            use_label: true,
            label_height: 1.0,
            label_scale: 0.5,
            edge_scale: 0.01,
            edge_alpha: 0.5,
            z_offset_scale: 1.0,
        }
    }
}

/// Scene-graph-wide drawing options.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphVisualConfig {
    /// Vertical spacing between layers.
    pub layer_z_step: f64,
    /// Shade place nodes by their free-space distance.
    pub color_places_by_distance: bool,
    /// Distance mapped to the start of the colormap.
    pub places_colormap_min_distance: f64,
    /// Distance mapped to the end of the colormap.
    pub places_colormap_max_distance: f64,
}

impl Default for GraphVisualConfig {
    fn default() -> Self {
        Self {
            layer_z_step: 5.0,
            color_places_by_distance: false,
            places_colormap_min_distance: 0.0,
            places_colormap_max_distance: 2.5,
        }
    }
}

/// Styling of the voxel field and GVD graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GvdVisualizerConfig {
    /// Height of the horizontal ESDF slice.
    pub slice_height: f64,
    /// Opacity of the ESDF slice.
    pub esdf_alpha: f32,
    /// Opacity of GVD voxels.
    pub gvd_alpha: f32,
    /// Opacity of surface voxels.
    pub surface_alpha: f32,
    /// Distance mapped to the start of the colormap.
    pub gvd_min_distance: f64,
    /// Distance mapped to the end of the colormap.
    pub gvd_max_distance: f64,
    /// Minimum number of extra basis points for a voxel to count as GVD.
    pub basis_threshold: u8,
    /// Diameter of GVD graph nodes.
    pub gvd_graph_scale: f64,
    /// Line width of GVD graph edges.
    pub gvd_edge_scale: f64,
    /// Opacity of GVD graph markers.
    pub gvd_graph_alpha: f32,
    /// Size of points in the error visualization.
    pub error_scale: f64,
}

impl Default for GvdVisualizerConfig {
    fn default() -> Self {
        Self {
            slice_height: 1.0,
            esdf_alpha: 0.6,
            gvd_alpha: 0.6,
            surface_alpha: 0.5,
            gvd_min_distance: 0.2,
            gvd_max_distance: 5.0,
            basis_threshold: 1,
            gvd_graph_scale: 0.1,
            gvd_edge_scale: 0.01,
            gvd_graph_alpha: 0.8,
            error_scale: 0.05,
        }
    }
}

/// Configuration of
/// [`ReconstructionVisualizer`](crate::reconstruction::ReconstructionVisualizer).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructionVisualizerConfig {
    /// Frame every primitive is expressed in.
    pub world_frame: String,
    /// Namespace prefix of topology markers.
    pub topology_marker_ns: String,
    /// Publish voxel block outlines every tick.
    pub show_block_outlines: bool,
    /// Outline only blocks that contain GVD voxels.
    pub use_gvd_block_outlines: bool,
    /// Line width of block outlines.
    pub outline_scale: f64,
    /// Scene-graph-wide options.
    pub graph: GraphVisualConfig,
    /// Styling of the place layer.
    pub graph_layer: LayerConfig,
    /// Colormap shared by every distance shading.
    pub colormap: ColormapConfig,
    /// Voxel field and GVD graph styling.
    pub gvd: GvdVisualizerConfig,
}

impl Default for ReconstructionVisualizerConfig {
    fn default() -> Self {
        Self {
            world_frame: "world".to_owned(),
            topology_marker_ns: "topology_graph".to_owned(),
            show_block_outlines: false,
            use_gvd_block_outlines: false,
            outline_scale: 0.01,
            graph: GraphVisualConfig::default(),
            graph_layer: LayerConfig::default(),
            colormap: ColormapConfig::default(),
            gvd: GvdVisualizerConfig::default(),
        }
    }
}

impl ReconstructionVisualizerConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Loads a configuration file.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Renders the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Applies the settings the reconstruction visualizer always overrides:
    /// the place layer is drawn flat and shaded by distance.
    pub(crate) fn force_flat_places(&mut self) {
        self.graph.layer_z_step = 0.0;
        self.graph.color_places_by_distance = true;
    }

    /// Replaces one live-updatable section. Last write wins.
    pub fn apply(&mut self, update: ConfigUpdate) {
        match update {
            ConfigUpdate::GraphLayer(layer) => self.graph_layer = layer,
            ConfigUpdate::Colormap(colormap) => self.colormap = colormap,
            ConfigUpdate::Gvd(gvd) => {
                self.graph.places_colormap_min_distance = gvd.gvd_min_distance;
                self.graph.places_colormap_max_distance = gvd.gvd_max_distance;
                self.gvd = gvd;
            }
        }
    }
}

/// A runtime replacement of one configuration section.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigUpdate {
    /// New place-layer styling.
    GraphLayer(LayerConfig),
    /// New colormap.
    Colormap(ColormapConfig),
    /// New GVD styling. Its distance range also becomes the place colormap
    /// range.
    Gvd(GvdVisualizerConfig),
}

/// Configuration of [`ObjectVisualizer`](crate::objects::ObjectVisualizer).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectVisualizerConfig {
    /// Prefix of every channel the visualizer publishes on.
    pub module_ns: String,
    /// Frame the points are expressed in.
    pub world_frame: String,
    /// Publish the vertices touched by the last integration step.
    pub enable_active_mesh_pub: bool,
    /// Publish one point cloud per semantic label.
    pub enable_segmented_mesh_pub: bool,
    /// Point size.
    pub point_scale: f64,
    /// Point opacity.
    pub point_alpha: f32,
    /// Draw points as spheres.
    pub use_spheres: bool,
}

impl Default for ObjectVisualizerConfig {
    fn default() -> Self {
        Self {
            module_ns: "objects".to_owned(),
            world_frame: "world".to_owned(),
            enable_active_mesh_pub: true,
            enable_segmented_mesh_pub: true,
            point_scale: 0.1,
            point_alpha: 0.7,
            use_spheres: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = ReconstructionVisualizerConfig::from_toml_str(
            r#"
            world_frame = "map"

            [graph_layer]
            use_label = false

            [gvd]
            gvd_max_distance = 3.0
            "#,
        )
        .expect("valid config");

        assert_eq!(config.world_frame, "map");
        assert_eq!(config.topology_marker_ns, "topology_graph");
        assert!(!config.graph_layer.use_label);
        assert_eq!(config.graph_layer.marker_scale, LayerConfig::default().marker_scale);
        assert_eq!(config.gvd.gvd_max_distance, 3.0);
        assert_eq!(config.gvd.gvd_min_distance, 0.2);
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = ReconstructionVisualizerConfig::from_toml_str("world_frame = [")
            .expect_err("must fail");
        assert!(matches!(err, ConfigError::Parse(_)), "got {err:?}");
    }

    #[test]
    fn wrong_type_is_a_parse_error() {
        let err = ReconstructionVisualizerConfig::from_toml_str("show_block_outlines = 3")
            .expect_err("must fail");
        assert!(matches!(err, ConfigError::Parse(_)), "got {err:?}");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let path = Path::new("/nonexistent/accretion/visualizer.toml");
        let config = ReconstructionVisualizerConfig::load(path).expect("defaults");
        assert_eq!(config, ReconstructionVisualizerConfig::default());
    }

    #[test]
    fn toml_output_parses_back() {
        let mut config = ReconstructionVisualizerConfig::default();
        config.outline_scale = 0.25;
        let text = config.to_toml_string().expect("serializable");
        assert!(text.contains("[graph_layer]"), "{text}");
        let parsed = ReconstructionVisualizerConfig::from_toml_str(&text).expect("valid");
        assert_eq!(parsed, config);
    }

    #[test]
    fn gvd_update_moves_place_colormap_range() {
        let mut config = ReconstructionVisualizerConfig::default();
        config.apply(ConfigUpdate::Gvd(GvdVisualizerConfig {
            gvd_min_distance: 0.5,
            gvd_max_distance: 4.0,
            ..GvdVisualizerConfig::default()
        }));
        assert_eq!(config.graph.places_colormap_min_distance, 0.5);
        assert_eq!(config.graph.places_colormap_max_distance, 4.0);
        assert_eq!(config.gvd.gvd_max_distance, 4.0);
    }

    #[test]
    fn later_update_wins() {
        let mut config = ReconstructionVisualizerConfig::default();
        for scale in [0.3, 0.7] {
            config.apply(ConfigUpdate::GraphLayer(LayerConfig {
                marker_scale: scale,
                ..LayerConfig::default()
            }));
        }
        assert_eq!(config.graph_layer.marker_scale, 0.7);
    }

    #[test]
    fn forced_settings() {
        let mut config = ReconstructionVisualizerConfig::default();
        config.force_flat_places();
        assert_eq!(config.graph.layer_z_step, 0.0);
        assert!(config.graph.color_places_by_distance);
    }
}
