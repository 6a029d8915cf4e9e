//! Assembly of simulation-side position lists from marker files, and back.
//!
//! Default values for stimulation intensity and label are applied here, at
//! the boundary, so [`Marker`] stays a faithful copy of the file.

use chrono::Utc;

use crate::models::*;
use crate::transform;
use crate::validate::{self, ORTHONORMAL_TOLERANCE};

/// Convert a marker file into a position list in file order.
///
/// Untracked markers are dropped first. Each surviving pose is mapped into
/// RAS and the simulation coil-axis convention. Markers without a finite
/// stimulation intensity get [`DEFAULT_STIMULATION_INTENSITY`]; markers
/// without a description get an empty label.
///
/// Per-coil trigger files are independent: merging them is left to the caller.
pub fn build(file: MarkerFile) -> PositionList {
    let file = validate::filter(file);

    for index in validate::non_orthonormal(&file, ORTHONORMAL_TOLERANCE) {
        tracing::warn!(
            "Marker {} has a non-orthonormal rotation; converting as-is",
            index
        );
    }

    let space = file.coordinate_space;
    file.markers
        .into_iter()
        .map(|marker| Position {
            pose: transform::to_simulation(&marker.pose, space),
            stimulation_intensity: Some(
                marker
                    .stimulation_intensity()
                    .filter(|v| v.is_finite())
                    .unwrap_or(DEFAULT_STIMULATION_INTENSITY),
            ),
            label: marker.label.unwrap_or_default(),
        })
        .collect()
}

/// Convert a position list into an instrument marker file in `space`.
pub fn disassemble(positions: &PositionList, space: CoordinateSpace) -> MarkerFile {
    disassemble_as(positions, space, MarkerKind::Instrument, DEFAULT_MARKER_COLOR)
}

/// Convert a position list into a marker file of the given kind.
///
/// Vendor-only fields are synthesized: `color`, `selected = false`,
/// `visible = true`. A position without a stimulation intensity produces a
/// marker without one, so nothing is written for it.
pub fn disassemble_as(
    positions: &PositionList,
    space: CoordinateSpace,
    kind: MarkerKind,
    color: &str,
) -> MarkerFile {
    let mut file = MarkerFile::new(kind, space);
    if kind == MarkerKind::Trigger {
        file.is_online_reading = Some(false);
        file.start_time = u64::try_from(Utc::now().timestamp_millis()).ok();
    }

    file.markers = positions
        .iter()
        .enumerate()
        .map(|(i, position)| {
            let mut marker = Marker::new(transform::to_vendor(&position.pose, space), space);
            marker.color = color.to_string();
            marker.label = Some(position.label.clone());
            match kind {
                MarkerKind::Instrument => marker.index = Some(marker_index(i)),
                MarkerKind::Trigger => {
                    marker.set_stimulation_intensity(position.stimulation_intensity)
                }
            }
            marker
        })
        .collect();
    file
}

/// Instrument `index` attributes are `u32`; positions past that range saturate.
fn marker_index(position: usize) -> u32 {
    u32::try_from(position).unwrap_or(u32::MAX)
}
