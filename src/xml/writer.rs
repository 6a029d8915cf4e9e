//! Vendor marker-list serialization.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{BridgeError, Result};
use crate::models::*;

const INDENT: &str = "    ";

/// Write `file` as vendor XML.
///
/// The document is rendered in full, written to a temporary file next to
/// `path` and renamed into place, so a failed write never leaves a partial
/// file behind. Untracked markers are never emitted.
pub fn write_marker_file(file: &MarkerFile, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let xml = render_marker_file(file);

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| BridgeError::io(path, e))?;
    tmp.write_all(xml.as_bytes())
        .map_err(|e| BridgeError::io(path, e))?;
    tmp.persist(path).map_err(|e| BridgeError::io(path, e.error))?;

    tracing::debug!(
        "Wrote {} {} marker(s) in {} to {}",
        file.markers.len() - file.untracked_count(),
        file.kind.as_str(),
        file.coordinate_space.as_str(),
        path.display()
    );
    Ok(())
}

/// Render `file` as a vendor XML document.
pub fn render_marker_file(file: &MarkerFile) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let tracked = file.markers.iter().filter(|m| !m.is_untracked());

    match file.kind {
        MarkerKind::Instrument => {
            open(&mut out, 0, "InstrumentMarkerList", &root_attrs(file));
            for marker in tracked {
                instrument_marker(&mut out, marker);
            }
        }
        MarkerKind::Trigger => {
            open(&mut out, 0, "TriggerMarkerList", &root_attrs(file));
            if let Some(params) = &file.response_parameters {
                response_parameters(&mut out, params);
            }
            for marker in tracked {
                trigger_marker(&mut out, marker);
            }
        }
    }
    close(&mut out, 0, file.kind.root_tag());
    out
}

fn root_attrs(file: &MarkerFile) -> Vec<(&'static str, String)> {
    let mut attrs = vec![("coordinateSpace", file.coordinate_space.as_str().to_string())];
    if let Some(online) = file.is_online_reading {
        attrs.push(("isOnlineReading", online.to_string()));
    }
    if let Some(start) = file.start_time {
        attrs.push(("startTime", start.to_string()));
    }
    attrs
}

fn instrument_marker(out: &mut String, marker: &Marker) {
    let mut attrs = vec![("alwaysVisible", marker.always_visible.to_string())];
    if let Some(index) = marker.index {
        attrs.push(("index", index.to_string()));
    }
    attrs.push(("selected", marker.selected.to_string()));
    open(out, 1, "InstrumentMarker", &attrs);

    let mut attrs = vec![
        ("additionalInformation", marker.additional_information.clone()),
        ("color", marker.color.clone()),
    ];
    if let Some(label) = &marker.label {
        attrs.push(("description", label.clone()));
    }
    attrs.push(("set", marker.set.to_string()));
    open(out, 2, "Marker", &attrs);
    matrix(out, 3, &marker.pose);
    close(out, 2, "Marker");

    close(out, 1, "InstrumentMarker");
}

fn trigger_marker(out: &mut String, marker: &Marker) {
    let mut attrs = vec![("color", marker.color.clone())];
    if let Some(label) = &marker.label {
        attrs.push(("description", label.clone()));
    }
    if let Some(time) = marker.recording_time {
        attrs.push(("recordingTime", time.to_string()));
    }
    attrs.push(("selected", marker.selected.to_string()));
    attrs.push(("set", marker.set.to_string()));
    attrs.push(("visibility", marker.visible.to_string()));
    open(out, 1, "TriggerMarker", &attrs);

    if !marker.response_values.is_empty() {
        open(out, 2, "ResponseValues", &[]);
        for (key, response) in &marker.response_values {
            empty(
                out,
                3,
                "Value",
                &[("key", key.clone()), ("response", number(*response))],
            );
        }
        close(out, 2, "ResponseValues");
    }

    matrix(out, 2, &marker.pose);
    close(out, 1, "TriggerMarker");
}

fn response_parameters(out: &mut String, params: &ResponseParameters) {
    let attrs: Vec<_> = params
        .selected_response_channel
        .iter()
        .map(|channel| ("selectedResponseChannel", channel.clone()))
        .collect();
    open(out, 1, "ResponseParameters", &attrs);

    for descriptor in &params.descriptors {
        let mut attrs = vec![("id", descriptor.id.clone())];
        if let Some(max) = descriptor.max_value {
            attrs.push(("maxValue", number(max)));
        }
        if let Some(min) = descriptor.min_value {
            attrs.push(("minValue", number(min)));
        }
        attrs.push(("name", descriptor.name.clone()));
        attrs.push(("unit", descriptor.unit.clone()));
        empty(out, 2, "responseDescription", &attrs);
    }

    close(out, 1, "ResponseParameters");
}

fn matrix(out: &mut String, depth: usize, pose: &Pose) {
    let attrs: Vec<_> = (0..4)
        .flat_map(|r| (0..4).map(move |c| (r, c)))
        .map(|(r, c)| (MATRIX_ATTRS[r * 4 + c], number(pose.get(r, c))))
        .collect();
    empty(out, depth, "Matrix4D", &attrs);
}

const MATRIX_ATTRS: [&str; 16] = [
    "data00", "data01", "data02", "data03", //
    "data10", "data11", "data12", "data13", //
    "data20", "data21", "data22", "data23", //
    "data30", "data31", "data32", "data33",
];

/// Shortest representation that parses back to the same `f64`. NaN is
/// written as `NaN`.
fn number(value: f64) -> String {
    format!("{:?}", value)
}

fn open(out: &mut String, depth: usize, tag: &str, attrs: &[(&str, String)]) {
    element(out, depth, tag, attrs, false);
}

fn empty(out: &mut String, depth: usize, tag: &str, attrs: &[(&str, String)]) {
    element(out, depth, tag, attrs, true);
}

fn element(out: &mut String, depth: usize, tag: &str, attrs: &[(&str, String)], empty: bool) {
    out.push_str(&INDENT.repeat(depth));
    out.push('<');
    out.push_str(tag);
    for (name, value) in attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape(value));
        out.push('"');
    }
    out.push_str(if empty { "/>\n" } else { ">\n" });
}

fn close(out: &mut String, depth: usize, tag: &str) {
    out.push_str(&INDENT.repeat(depth));
    out.push_str("</");
    out.push_str(tag);
    out.push_str(">\n");
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\n' => escaped.push_str("&#10;"),
            '\t' => escaped.push_str("&#9;"),
            '\r' => escaped.push_str("&#13;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
