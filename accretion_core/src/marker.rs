// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawable primitives and the batches that carry them.
//!
//! A [`Marker`] is one identified primitive: a shape (or a list of shapes
//! sharing a style) addressed by its namespace and [`PrimitiveId`]. The pair
//! forms a [`MarkerKey`], the unit that synchronization tracks across ticks.
//! Sending a marker with an existing key replaces it on the sink; sending a
//! [`MarkerAction::Delete`] marker with that key retires it.
//!
//! A [`Batch`] is an ordered group of markers handed to the sink in a single
//! call. Batches are built fresh every tick and are not mutated after they
//! have been published.

use alloc::collections::BTreeSet;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::time::Header;

/// Identifier of a primitive, scoped to a channel and namespace.
///
/// Conversion functions choose these, usually from the id of the model entity
/// a primitive depicts, or from its position in a sequence.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PrimitiveId(pub u64);

impl fmt::Debug for PrimitiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrimitiveId({})", self.0)
    }
}

/// The `(namespace, id)` pair a sink uses to address one primitive.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerKey {
    /// Namespace the primitive lives in.
    pub ns: String,
    /// Identifier within the namespace.
    pub id: PrimitiveId,
}

impl MarkerKey {
    /// Creates a key from a namespace and id.
    #[must_use]
    pub fn new(ns: impl Into<String>, id: PrimitiveId) -> Self {
        Self { ns: ns.into(), id }
    }
}

/// A position or extent in 3-D space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point3 {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
}

impl Point3 {
    /// The origin.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Creates a point from its coordinates.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Creates a point with all three coordinates equal to `v`.
    #[inline]
    #[must_use]
    pub const fn splat(v: f64) -> Self {
        Self::new(v, v, v)
    }

    /// Returns this point translated by `offset`.
    #[inline]
    #[must_use]
    pub fn offset(self, offset: Self) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y, self.z + offset.z)
    }
}

/// An RGBA color with components in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Color {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha.
    pub a: f32,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);

    /// Opaque white.
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);

    /// Creates a color from its components.
    #[inline]
    #[must_use]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Returns this color with its alpha replaced.
    #[inline]
    #[must_use]
    pub const fn with_alpha(self, a: f32) -> Self {
        Self::rgba(self.r, self.g, self.b, a)
    }
}

/// Shape of a marker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    /// One point per entry in [`Marker::points`].
    #[default]
    Points,
    /// Consecutive pairs of [`Marker::points`] form line segments.
    LineList,
    /// A single sphere at [`Marker::position`].
    Sphere,
    /// One sphere per entry in [`Marker::points`].
    SphereList,
    /// A single cube at [`Marker::position`].
    Cube,
    /// One cube per entry in [`Marker::points`].
    CubeList,
    /// Camera-facing text at [`Marker::position`].
    Text,
}

/// What the sink should do with a marker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MarkerAction {
    /// Create the primitive, or replace the one with the same key.
    #[default]
    Add,
    /// Remove the primitive with the same key.
    Delete,
}

/// One identified drawable primitive.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Marker {
    /// Frame and stamp of the tick that produced this marker.
    pub header: Header,
    /// Namespace the marker lives in.
    pub ns: String,
    /// Identifier within [`ns`](Self::ns).
    pub id: PrimitiveId,
    /// Shape.
    pub kind: MarkerKind,
    /// Add or delete.
    pub action: MarkerAction,
    /// Position of single-shape markers.
    pub position: Point3,
    /// Per-axis scale (line width in `x` for line lists).
    pub scale: Point3,
    /// Uniform color, used when [`colors`](Self::colors) is empty.
    pub color: Color,
    /// Vertices of list markers.
    pub points: Vec<Point3>,
    /// Per-vertex colors of list markers.
    pub colors: Vec<Color>,
    /// Text of [`MarkerKind::Text`] markers.
    pub text: String,
}

impl Marker {
    /// Creates an empty marker of the given kind.
    #[must_use]
    pub fn new(kind: MarkerKind, ns: impl Into<String>, id: PrimitiveId) -> Self {
        Self {
            ns: ns.into(),
            id,
            kind,
            ..Self::default()
        }
    }

    /// Creates an instruction that removes the primitive at `(ns, id)`.
    #[must_use]
    pub fn delete(header: &Header, ns: impl Into<String>, id: PrimitiveId) -> Self {
        Self {
            header: header.clone(),
            ns: ns.into(),
            id,
            action: MarkerAction::Delete,
            ..Self::default()
        }
    }

    /// Returns the key this marker is addressed by.
    #[must_use]
    pub fn key(&self) -> MarkerKey {
        MarkerKey::new(self.ns.clone(), self.id)
    }

    /// Returns `true` if this marker retires a primitive.
    #[must_use]
    pub fn is_delete(&self) -> bool {
        self.action == MarkerAction::Delete
    }
}

/// An ordered group of markers sent to the sink in one call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Batch {
    /// Markers in emission order.
    pub markers: Vec<Marker>,
}

impl Batch {
    /// Creates an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a batch holding exactly one marker.
    #[must_use]
    pub fn single(marker: Marker) -> Self {
        Self {
            markers: alloc::vec![marker],
        }
    }

    /// Creates a batch of delete instructions, one per key, in key order.
    #[must_use]
    pub fn deletions<'a>(header: &Header, keys: impl IntoIterator<Item = &'a MarkerKey>) -> Self {
        keys.into_iter()
            .map(|key| Marker::delete(header, key.ns.clone(), key.id))
            .collect()
    }

    /// Appends a marker.
    pub fn push(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    /// Returns the number of markers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Returns `true` if the batch holds no markers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Iterates over the markers in emission order.
    pub fn iter(&self) -> core::slice::Iter<'_, Marker> {
        self.markers.iter()
    }

    /// Returns the keys of all non-delete markers.
    #[must_use]
    pub fn keys(&self) -> BTreeSet<MarkerKey> {
        self.markers
            .iter()
            .filter(|m| !m.is_delete())
            .map(Marker::key)
            .collect()
    }

    /// Overwrites every marker's header.
    pub fn stamp(&mut self, header: &Header) {
        for marker in &mut self.markers {
            marker.header.clone_from(header);
        }
    }

    /// Removes all markers, keeping the allocation.
    pub fn clear(&mut self) {
        self.markers.clear();
    }
}

impl FromIterator<Marker> for Batch {
    fn from_iter<I: IntoIterator<Item = Marker>>(iter: I) -> Self {
        Self {
            markers: iter.into_iter().collect(),
        }
    }
}

impl Extend<Marker> for Batch {
    fn extend<I: IntoIterator<Item = Marker>>(&mut self, iter: I) {
        self.markers.extend(iter);
    }
}

impl IntoIterator for Batch {
    type Item = Marker;
    type IntoIter = alloc::vec::IntoIter<Marker>;

    fn into_iter(self) -> Self::IntoIter {
        self.markers.into_iter()
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a Marker;
    type IntoIter = core::slice::Iter<'a, Marker>;

    fn into_iter(self) -> Self::IntoIter {
        self.markers.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Timestamp;

    #[test]
    fn delete_marker_carries_key_and_header() {
        let header = Header::new("world", Timestamp(5));
        let marker = Marker::delete(&header, "labels", PrimitiveId(3));
        assert!(marker.is_delete());
        assert_eq!(marker.key(), MarkerKey::new("labels", PrimitiveId(3)));
        assert_eq!(marker.header, header);
    }

    #[test]
    fn keys_skip_delete_markers() {
        let header = Header::default();
        let mut batch = Batch::new();
        batch.push(Marker::new(MarkerKind::Sphere, "a", PrimitiveId(1)));
        batch.push(Marker::delete(&header, "a", PrimitiveId(2)));
        batch.push(Marker::new(MarkerKind::Text, "b", PrimitiveId(1)));

        let keys = batch.keys();
        assert_eq!(keys.len(), 2);
        assert!(keys.contains(&MarkerKey::new("a", PrimitiveId(1))));
        assert!(keys.contains(&MarkerKey::new("b", PrimitiveId(1))));
    }

    #[test]
    fn deletions_follow_key_order() {
        let header = Header::new("map", Timestamp(1));
        let mut keys = BTreeSet::new();
        keys.insert(MarkerKey::new("n", PrimitiveId(9)));
        keys.insert(MarkerKey::new("n", PrimitiveId(2)));

        let batch = Batch::deletions(&header, &keys);
        let ids: Vec<u64> = batch.iter().map(|m| m.id.0).collect();
        assert_eq!(ids, [2, 9]);
        assert!(batch.iter().all(Marker::is_delete));
    }

    #[test]
    fn stamp_overwrites_every_header() {
        let mut batch: Batch = (0..3)
            .map(|i| Marker::new(MarkerKind::Cube, "c", PrimitiveId(i)))
            .collect();
        let header = Header::new("odom", Timestamp(42));
        batch.stamp(&header);
        assert!(batch.iter().all(|m| m.header == header));
    }
}
