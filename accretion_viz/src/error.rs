// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! Only the outer surfaces can fail: reading configuration and resolving a
//! visualizer from the registry. Per-tick visualization never returns an
//! error; empty results go through the suppression path instead.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or rendering configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}")]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The configuration text is not valid TOML for the expected shape.
    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be rendered as TOML.
    #[error("failed to serialize config")]
    Serialize(#[from] toml::ser::Error),
}

/// Errors raised by [`SinkRegistry`](crate::registry::SinkRegistry).
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No constructor is registered under the requested tag.
    #[error("no visualizer registered under type tag {tag:?}")]
    UnknownType {
        /// Requested tag.
        tag: String,
    },

    /// A constructor is already registered under the tag.
    #[error("a visualizer is already registered under type tag {tag:?}")]
    DuplicateType {
        /// Conflicting tag.
        tag: String,
    },

    /// The configuration table does not match the visualizer's config type.
    #[error("invalid config for {tag:?}")]
    InvalidConfig {
        /// Tag being constructed.
        tag: String,
        /// Deserialization failure.
        #[source]
        source: toml::de::Error,
    },
}
