// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Configuration-driven construction of segmentation sinks.
//!
//! A host builds one [`SinkRegistry`] at startup, registers whatever extra
//! constructors it has, and then resolves sinks from `(type tag, config
//! table)` pairs read out of its own configuration:
//!
//! ```
//! use accretion_core::sink::NullSink;
//! use accretion_viz::objects::SegmenterSink;
//! use accretion_viz::registry::SinkRegistry;
//!
//! let registry = SinkRegistry::with_defaults();
//! let config: toml::Table = toml::from_str("module_ns = \"segments\"").unwrap();
//! let sink = registry
//!     .create("ObjectVisualizer", &config, Box::new(NullSink))
//!     .unwrap();
//! assert!(sink.print_info().contains("segments"));
//! ```

use std::collections::BTreeMap;

use accretion_core::sink::MarkerSink;

use crate::config::ObjectVisualizerConfig;
use crate::error::RegistryError;
use crate::objects::{ObjectVisualizer, SegmenterSink};

/// Builds a sink from its configuration table and the marker sink it should
/// publish to.
pub type SinkConstructor =
    fn(&toml::Table, Box<dyn MarkerSink>) -> Result<Box<dyn SegmenterSink>, RegistryError>;

/// Maps type tags to sink constructors.
#[derive(Clone, Debug, Default)]
pub struct SinkRegistry {
    constructors: BTreeMap<String, SinkConstructor>,
}

impl SinkRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in sinks (`"ObjectVisualizer"`).
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut constructors = BTreeMap::new();
        constructors.insert(
            ObjectVisualizer::<Box<dyn MarkerSink>>::TYPE_TAG.to_owned(),
            object_visualizer as SinkConstructor,
        );
        Self { constructors }
    }

    /// Registers `constructor` under `tag`.
    ///
    /// Fails if the tag is taken; the existing constructor is kept.
    pub fn register(
        &mut self,
        tag: impl Into<String>,
        constructor: SinkConstructor,
    ) -> Result<(), RegistryError> {
        let tag = tag.into();
        if self.constructors.contains_key(&tag) {
            return Err(RegistryError::DuplicateType { tag });
        }
        self.constructors.insert(tag, constructor);
        Ok(())
    }

    /// Returns `true` if a constructor is registered under `tag`.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.constructors.contains_key(tag)
    }

    /// Iterates over registered tags in order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    /// Builds the sink registered under `tag`.
    pub fn create(
        &self,
        tag: &str,
        config: &toml::Table,
        sink: Box<dyn MarkerSink>,
    ) -> Result<Box<dyn SegmenterSink>, RegistryError> {
        let constructor = self
            .constructors
            .get(tag)
            .ok_or_else(|| RegistryError::UnknownType {
                tag: tag.to_owned(),
            })?;
        constructor(config, sink)
    }
}

fn object_visualizer(
    config: &toml::Table,
    sink: Box<dyn MarkerSink>,
) -> Result<Box<dyn SegmenterSink>, RegistryError> {
    let config: ObjectVisualizerConfig = toml::Value::Table(config.clone())
        .try_into()
        .map_err(|source| RegistryError::InvalidConfig {
            tag: ObjectVisualizer::<Box<dyn MarkerSink>>::TYPE_TAG.to_owned(),
            source,
        })?;
    Ok(Box::new(ObjectVisualizer::new(config, sink)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use accretion_debug::capture::CaptureSink;

    use crate::model::{LabelIndices, MeshDelta};

    fn table(text: &str) -> toml::Table {
        toml::from_str(text).expect("valid table")
    }

    #[test]
    fn defaults_build_object_visualizer() {
        let registry = SinkRegistry::with_defaults();
        assert_eq!(registry.tags().collect::<Vec<_>>(), ["ObjectVisualizer"]);

        let capture = CaptureSink::new();
        let mut sink = registry
            .create(
                "ObjectVisualizer",
                &table("module_ns = \"seg\"\nenable_segmented_mesh_pub = false"),
                Box::new(capture.clone()),
            )
            .expect("known tag");
        sink.call(1, &MeshDelta::default(), &[], &LabelIndices::new());
        assert!(capture.is_empty(), "nothing active, nothing published");
        assert!(sink.print_info().contains("module_ns = \"seg\""));
    }

    #[test]
    fn unknown_tag_is_an_error() {
        let registry = SinkRegistry::new();
        let err = registry
            .create("Nope", &toml::Table::new(), Box::new(CaptureSink::new()))
            .err()
            .expect("unknown tag");
        assert!(matches!(err, RegistryError::UnknownType { ref tag } if tag == "Nope"));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = SinkRegistry::with_defaults();
        let err = registry
            .register("ObjectVisualizer", object_visualizer)
            .expect_err("taken");
        assert!(matches!(err, RegistryError::DuplicateType { .. }), "got {err:?}");
        assert!(registry.register("Other", object_visualizer).is_ok());
        assert!(registry.contains("Other"));
    }

    #[test]
    fn bad_config_is_reported() {
        let registry = SinkRegistry::with_defaults();
        let err = registry
            .create(
                "ObjectVisualizer",
                &table("point_scale = \"big\""),
                Box::new(CaptureSink::new()),
            )
            .err()
            .expect("bad config");
        assert!(matches!(err, RegistryError::InvalidConfig { .. }), "got {err:?}");
    }
}
