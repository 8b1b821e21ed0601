// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hue-range colormap used to shade distances and cluster ids.

use accretion_core::marker::Color;
use serde::{Deserialize, Serialize};

/// A linear sweep through HSV hue space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColormapConfig {
    /// Hue at ratio `0.0`, in `0.0..=1.0`.
    pub min_hue: f64,
    /// Hue at ratio `1.0`, in `0.0..=1.0`.
    pub max_hue: f64,
    /// Saturation, in `0.0..=1.0`.
    pub saturation: f64,
    /// Value (brightness), in `0.0..=1.0`.
    pub value: f64,
}

impl Default for ColormapConfig {
    fn default() -> Self {
        Self {
            min_hue: 0.0,
            max_hue: 0.85,
            saturation: 1.0,
            value: 1.0,
        }
    }
}

impl ColormapConfig {
    /// Returns the color at `ratio` along the hue range.
    ///
    /// `ratio` is clamped to `0.0..=1.0`; NaN maps to the start of the range.
    #[must_use]
    pub fn interpolate(&self, ratio: f64) -> Color {
        let ratio = if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 1.0) };
        let hue = self.min_hue + ratio * (self.max_hue - self.min_hue);
        hsv_to_rgb(hue, self.saturation, self.value)
    }

    /// Returns the color for `value` within `[min, max]`.
    ///
    /// A degenerate range maps everything to the start of the hue range.
    #[must_use]
    pub fn distance_color(&self, value: f64, min: f64, max: f64) -> Color {
        let span = max - min;
        if span <= f64::EPSILON {
            return self.interpolate(0.0);
        }
        self.interpolate((value - min) / span)
    }

    /// Returns a color for an arbitrary id, spreading consecutive ids far
    /// apart in hue.
    #[must_use]
    pub fn id_color(&self, id: u64) -> Color {
        // Golden-ratio stepping.
        const STEP: f64 = 0.618_033_988_749_895;
        let ratio = (id as f64 * STEP).fract();
        self.interpolate(ratio)
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "components are in 0.0..=1.0, f32 precision is plenty for display"
)]
fn hsv_to_rgb(hue: f64, saturation: f64, value: f64) -> Color {
    let h = hue.rem_euclid(1.0) * 6.0;
    let s = saturation.clamp(0.0, 1.0);
    let v = value.clamp(0.0, 1.0);

    let chroma = v * s;
    let x = chroma * (1.0 - ((h % 2.0) - 1.0).abs());
    let m = v - chroma;
    let (r, g, b) = match h as u8 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    Color::rgba((r + m) as f32, (g + m) as f32, (b + m) as f32, 1.0)
}
