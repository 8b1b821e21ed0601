// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reconstruction and object visualizers built on `accretion_core`.
//!
//! A perception pipeline hands each visualizer a borrowed snapshot once per
//! update. The visualizer converts it into markers and lets the core
//! synchronizers decide which sink calls actually go out.
//!
//! **[`reconstruction`]**: [`ReconstructionVisualizer`], the tick driver
//! for the voxel field, place graph, GVD graph, block outlines, and GVD
//! clusters.
//!
//! **[`objects`]**: [`ObjectVisualizer`], publishing segmented mesh
//! vertices per semantic label through the [`SegmenterSink`] trait.
//!
//! **[`registry`]**: [`SinkRegistry`], resolving segmentation sinks from
//! configuration type tags.
//!
//! **[`model`]**: The snapshot types the visualizers read.
//!
//! **[`markers`]**: Pure conversion from snapshots to markers.
//!
//! **[`config`]** / **[`colormap`]**: TOML-backed configuration.
//!
//! **[`error`]**: Errors from configuration loading and the registry.
//!
//! [`ReconstructionVisualizer`]: reconstruction::ReconstructionVisualizer
//! [`ObjectVisualizer`]: objects::ObjectVisualizer
//! [`SegmenterSink`]: objects::SegmenterSink
//! [`SinkRegistry`]: registry::SinkRegistry

pub mod colormap;
pub mod config;
pub mod error;
pub mod markers;
pub mod model;
pub mod objects;
pub mod reconstruction;
pub mod registry;
