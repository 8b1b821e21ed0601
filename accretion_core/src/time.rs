// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tick timestamps and the shared primitive header.
//!
//! [`Timestamp`] is a point on the host's monotonic clock in nanoseconds. Every
//! primitive emitted during one tick carries the same [`Header`]: the world
//! frame name plus that tick's timestamp.

use alloc::string::String;
use core::fmt;

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// A point in time expressed as monotonic nanoseconds.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Creates a timestamp from a nanosecond value.
    #[inline]
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    /// Returns the raw nanosecond value.
    #[inline]
    #[must_use]
    pub const fn nanos(self) -> u64 {
        self.0
    }

    /// Returns the whole-second part of the timestamp.
    #[inline]
    #[must_use]
    pub const fn secs(self) -> u64 {
        self.0 / NANOS_PER_SEC
    }

    /// Returns the sub-second part of the timestamp in nanoseconds.
    #[inline]
    #[must_use]
    pub const fn subsec_nanos(self) -> u32 {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "remainder of a division by 1e9 always fits in u32"
        )]
        let rem = (self.0 % NANOS_PER_SEC) as u32;
        rem
    }

    /// Returns the timestamp as fractional seconds.
    #[inline]
    #[must_use]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / NANOS_PER_SEC as f64
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({}.{:09})", self.secs(), self.subsec_nanos())
    }
}

/// Coordinate frame and stamp shared by every primitive in a tick.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Header {
    /// Name of the coordinate frame the primitives are expressed in.
    pub frame_id: String,
    /// When the model snapshot behind these primitives was taken.
    pub stamp: Timestamp,
}

impl Header {
    /// Creates a header for the given frame and timestamp.
    #[must_use]
    pub fn new(frame_id: impl Into<String>, stamp: Timestamp) -> Self {
        Self {
            frame_id: frame_id.into(),
            stamp,
        }
    }
}
