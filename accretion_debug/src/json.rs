// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON export of captured sink calls.
//!
//! [`export`] writes the calls recorded by a
//! [`CaptureSink`](crate::capture::CaptureSink) as a JSON array, one object
//! per call, with every marker flattened to plain fields. The output is meant
//! for diffing runs and for loading into ad-hoc viewers.

use std::io::{self, Write};

use serde_json::{Value, json};

use accretion_core::marker::{Color, Marker, MarkerAction, MarkerKind, Point3};

use crate::capture::Captured;

/// Writes `calls` to `writer` as a pretty-printed JSON array.
pub fn export(calls: &[Captured], writer: &mut dyn Write) -> io::Result<()> {
    serde_json::to_writer_pretty(writer, &to_value(calls))?;
    Ok(())
}

/// Converts `calls` into a JSON array value.
#[must_use]
pub fn to_value(calls: &[Captured]) -> Value {
    Value::Array(
        calls
            .iter()
            .enumerate()
            .map(|(index, call)| {
                json!({
                    "index": index,
                    "channel": call.channel.as_str(),
                    "markers": call.batch.iter().map(marker_value).collect::<Vec<_>>(),
                })
            })
            .collect(),
    )
}

fn marker_value(marker: &Marker) -> Value {
    let mut value = json!({
        "ns": marker.ns,
        "id": marker.id.0,
        "action": action_name(marker.action),
        "frame_id": marker.header.frame_id,
        "stamp_ns": marker.header.stamp.nanos(),
    });
    if marker.is_delete() {
        return value;
    }
    value["kind"] = json!(kind_name(marker.kind));
    value["position"] = point_value(marker.position);
    value["scale"] = point_value(marker.scale);
    value["color"] = color_value(marker.color);
    if !marker.points.is_empty() {
        value["points"] = Value::Array(marker.points.iter().copied().map(point_value).collect());
    }
    if !marker.colors.is_empty() {
        value["colors"] = Value::Array(marker.colors.iter().copied().map(color_value).collect());
    }
    if !marker.text.is_empty() {
        value["text"] = json!(marker.text);
    }
    value
}

fn point_value(p: Point3) -> Value {
    json!([p.x, p.y, p.z])
}

fn color_value(c: Color) -> Value {
    json!([c.r, c.g, c.b, c.a])
}

fn action_name(action: MarkerAction) -> &'static str {
    match action {
        MarkerAction::Add => "add",
        MarkerAction::Delete => "delete",
    }
}

fn kind_name(kind: MarkerKind) -> &'static str {
    match kind {
        MarkerKind::Points => "points",
        MarkerKind::LineList => "line_list",
        MarkerKind::Sphere => "sphere",
        MarkerKind::SphereList => "sphere_list",
        MarkerKind::Cube => "cube",
        MarkerKind::CubeList => "cube_list",
        MarkerKind::Text => "text",
    }
}
