//! Vendor marker-list parsing.
//!
//! The document tree is mapped straight onto typed [`Marker`] records; nothing
//! downstream sees attribute bags. Unrecognized attributes and elements are
//! ignored and do not survive a write.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use roxmltree::{Document, Node};

use crate::error::{BridgeError, Result};
use crate::models::*;
use crate::session::coil_index_from_path;

/// Read and parse a marker file. The coil index is taken from the file name.
pub fn read_marker_file(path: impl AsRef<Path>) -> Result<MarkerFile> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| BridgeError::io(path, e))?;
    let mut file = parse_marker_file(&text)?;
    file.coil_index = coil_index_from_path(path);

    tracing::debug!(
        "Read {} {} marker(s) in {} from {}",
        file.markers.len(),
        file.kind.as_str(),
        file.coordinate_space.as_str(),
        path.display()
    );
    Ok(file)
}

/// Parse an `InstrumentMarkerList` or `TriggerMarkerList` document.
pub fn parse_marker_file(text: &str) -> Result<MarkerFile> {
    let doc = Document::parse(text)
        .map_err(|e| BridgeError::format(format!("Malformed XML: {}", e)))?;
    let root = doc.root_element();
    let tag = root.tag_name().name();
    let kind = MarkerKind::from_root_tag(tag)
        .ok_or_else(|| BridgeError::format(format!("Unexpected root element <{}>", tag)))?;
    let space = coordinate_space(root)?;

    let mut file = MarkerFile::new(kind, space);
    match kind {
        MarkerKind::Instrument => {
            for node in elements(root, "InstrumentMarker") {
                file.markers.push(instrument_marker(node, space)?);
            }
        }
        MarkerKind::Trigger => {
            file.is_online_reading = optional(root, "isOnlineReading")?;
            file.start_time = optional(root, "startTime")?;
            file.response_parameters = first(root, "ResponseParameters")
                .map(response_parameters)
                .transpose()?;
            for node in elements(root, "TriggerMarker") {
                file.markers.push(trigger_marker(node, space)?);
            }
        }
    }
    Ok(file)
}

fn coordinate_space(root: Node) -> Result<CoordinateSpace> {
    match root.attribute("coordinateSpace") {
        Some(value) => {
            CoordinateSpace::from_str(value.trim()).ok_or_else(|| BridgeError::InvalidEnum {
                attribute: "coordinateSpace".to_string(),
                value: value.to_string(),
            })
        }
        None => {
            tracing::warn!("No coordinateSpace on <{}>, assuming RAS", root.tag_name().name());
            Ok(CoordinateSpace::Ras)
        }
    }
}

fn instrument_marker(node: Node, space: CoordinateSpace) -> Result<Marker> {
    let inner = child(node, "Marker")?;
    let matrix = child(inner, "Matrix4D")?;

    Ok(Marker {
        pose: pose(matrix)?,
        label: inner.attribute("description").map(str::to_string),
        color: inner.attribute("color").unwrap_or_default().to_string(),
        selected: optional(node, "selected")?.unwrap_or(false),
        visible: true,
        always_visible: optional(node, "alwaysVisible")?.unwrap_or(false),
        response_values: BTreeMap::new(),
        coordinate_space: space,
        index: optional(node, "index")?,
        additional_information: inner
            .attribute("additionalInformation")
            .unwrap_or_default()
            .to_string(),
        set: optional(inner, "set")?.unwrap_or(true),
        recording_time: None,
    })
}

fn trigger_marker(node: Node, space: CoordinateSpace) -> Result<Marker> {
    let matrix = child(node, "Matrix4D")?;
    let mut response_values: BTreeMap<String, f64> = BTreeMap::new();
    if let Some(values) = first(node, "ResponseValues") {
        for value in elements(values, "Value") {
            let key = required(value, "key")?;
            if response_values.contains_key(key) {
                return Err(BridgeError::format(format!(
                    "Duplicate response value key `{}` on <TriggerMarker>",
                    key
                )));
            }
            response_values.insert(key.to_string(), parsed(value, "response")?);
        }
    }

    Ok(Marker {
        pose: pose(matrix)?,
        label: node.attribute("description").map(str::to_string),
        color: node.attribute("color").unwrap_or_default().to_string(),
        selected: optional(node, "selected")?.unwrap_or(false),
        visible: optional(node, "visibility")?.unwrap_or(true),
        always_visible: false,
        response_values,
        coordinate_space: space,
        index: None,
        additional_information: String::new(),
        set: optional(node, "set")?.unwrap_or(true),
        recording_time: optional(node, "recordingTime")?,
    })
}

fn response_parameters(node: Node) -> Result<ResponseParameters> {
    let descriptors = elements(node, "responseDescription")
        .map(|d| -> Result<ResponseDescriptor> {
            Ok(ResponseDescriptor {
                id: required(d, "id")?.to_string(),
                name: d.attribute("name").unwrap_or_default().to_string(),
                unit: d.attribute("unit").unwrap_or_default().to_string(),
                min_value: optional(d, "minValue")?,
                max_value: optional(d, "maxValue")?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ResponseParameters {
        selected_response_channel: node
            .attribute("selectedResponseChannel")
            .map(str::to_string),
        descriptors,
    })
}

/// `Matrix4D` with row-major `data00`…`data33`, all required.
fn pose(node: Node) -> Result<Pose> {
    let mut rows = [[0.0; 4]; 4];
    for (r, row) in rows.iter_mut().enumerate() {
        for (c, value) in row.iter_mut().enumerate() {
            *value = parsed(node, &format!("data{}{}", r, c))?;
        }
    }
    Ok(Pose::from_rows(rows))
}

fn elements<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == tag)
}

fn first<'a, 'input>(node: Node<'a, 'input>, tag: &'static str) -> Option<Node<'a, 'input>> {
    elements(node, tag).next()
}

fn child<'a, 'input>(node: Node<'a, 'input>, tag: &'static str) -> Result<Node<'a, 'input>> {
    first(node, tag).ok_or_else(|| {
        BridgeError::format(format!(
            "<{}> has no <{}> element",
            node.tag_name().name(),
            tag
        ))
    })
}

fn required<'a>(node: Node<'a, '_>, name: &str) -> Result<&'a str> {
    node.attribute(name)
        .ok_or_else(|| BridgeError::missing(node.tag_name().name(), name))
}

fn parsed<T: FromStr>(node: Node, name: &str) -> Result<T> {
    let text = required(node, name)?;
    parse_value(node, name, text)
}

fn optional<T: FromStr>(node: Node, name: &str) -> Result<Option<T>> {
    node.attribute(name)
        .map(|text| parse_value(node, name, text))
        .transpose()
}

fn parse_value<T: FromStr>(node: Node, name: &str, text: &str) -> Result<T> {
    text.trim().parse().map_err(|_| {
        BridgeError::format(format!(
            "Cannot parse `{}` in attribute `{}` on <{}>",
            text,
            name,
            node.tag_name().name()
        ))
    })
}
