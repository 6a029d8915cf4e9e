use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::pose::Pose;

/// Response key carrying the stimulator's rate of current change in A/µs.
pub const INTENSITY_RESPONSE_KEY: &str = "valueA";

/// Display color given to synthesized markers.
pub const DEFAULT_MARKER_COLOR: &str = "#ff0000";

/// World-frame convention a vendor file is expressed in.
///
/// - `Ras`: +x right, +y anterior, +z superior (the simulation side's convention)
/// - `Lps`: +x left, +y posterior, +z superior
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum CoordinateSpace {
    #[default]
    Ras,
    Lps,
}

impl CoordinateSpace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ras => "RAS",
            Self::Lps => "LPS",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "RAS" => Some(Self::Ras),
            "LPS" => Some(Self::Lps),
            _ => None,
        }
    }
}

/// The two vendor marker-list schemas.
///
/// - `Instrument`: manually placed single poses (`InstrumentMarkerList`)
/// - `Trigger`: one marker per recorded pulse, one file per coil (`TriggerMarkerList`)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    #[default]
    Instrument,
    Trigger,
}

impl MarkerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Instrument => "instrument",
            Self::Trigger => "trigger",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "instrument" => Some(Self::Instrument),
            "trigger" => Some(Self::Trigger),
            _ => None,
        }
    }

    /// Root element name of the XML list.
    pub fn root_tag(&self) -> &'static str {
        match self {
            Self::Instrument => "InstrumentMarkerList",
            Self::Trigger => "TriggerMarkerList",
        }
    }

    pub fn from_root_tag(tag: &str) -> Option<Self> {
        match tag {
            "InstrumentMarkerList" => Some(Self::Instrument),
            "TriggerMarkerList" => Some(Self::Trigger),
            _ => None,
        }
    }
}

/// One recorded or manually placed coil pose plus its vendor metadata.
///
/// Fields mirror the file contents; no defaults for stimulation intensity or
/// label are applied here. The builder fills those in at the simulation boundary.
///
/// The two vendor schemas carry different subsets of these fields. Writing a
/// marker drops the ones its file kind has no attribute for:
///
/// - instrument markers: `visible`, `response_values` and `recording_time`
///   are not written, and read back as visible with no responses.
/// - trigger markers: `always_visible`, `index` and `additional_information`
///   are not written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub pose: Pose,
    /// `description` attribute. `None` when the attribute is absent.
    pub label: Option<String>,
    pub color: String,
    pub selected: bool,
    /// `visibility` on trigger markers. Instrument markers are always visible.
    pub visible: bool,
    /// `alwaysVisible` on instrument markers.
    pub always_visible: bool,
    /// `ResponseValues/Value` entries keyed by `key`. Trigger markers only.
    /// The `valueA` entry is the stimulation intensity.
    pub response_values: BTreeMap<String, f64>,
    pub coordinate_space: CoordinateSpace,
    /// `index` attribute of an instrument marker.
    pub index: Option<u32>,
    /// `additionalInformation` attribute of an instrument marker.
    pub additional_information: String,
    pub set: bool,
    /// `recordingTime` of a trigger marker, in milliseconds.
    pub recording_time: Option<u64>,
}

impl Marker {
    /// A marker with the defaults the vendor schema expects for synthesized entries.
    pub fn new(pose: Pose, coordinate_space: CoordinateSpace) -> Self {
        Self {
            pose,
            label: None,
            color: DEFAULT_MARKER_COLOR.to_string(),
            selected: false,
            visible: true,
            always_visible: false,
            response_values: BTreeMap::new(),
            coordinate_space,
            index: None,
            additional_information: String::new(),
            set: true,
            recording_time: None,
        }
    }

    pub fn is_untracked(&self) -> bool {
        self.pose.is_untracked()
    }

    /// Rate of current change in A/µs, read from the `valueA` response entry.
    pub fn stimulation_intensity(&self) -> Option<f64> {
        self.response_values.get(INTENSITY_RESPONSE_KEY).copied()
    }

    /// Sets or clears the `valueA` response entry.
    pub fn set_stimulation_intensity(&mut self, intensity: Option<f64>) {
        match intensity {
            Some(value) => {
                self.response_values.insert(INTENSITY_RESPONSE_KEY.to_string(), value);
            }
            None => {
                self.response_values.remove(INTENSITY_RESPONSE_KEY);
            }
        }
    }
}

/// Per-channel response descriptor from a trigger file's `ResponseParameters`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseDescriptor {
    pub id: String,
    pub name: String,
    pub unit: String,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseParameters {
    pub selected_response_channel: Option<String>,
    pub descriptors: Vec<ResponseDescriptor>,
}

/// An ordered marker list plus file-level metadata.
///
/// `is_online_reading`, `start_time` and `response_parameters` only appear in
/// trigger files. `coil_index` comes from the `TriggerMarkers_Coil<N>_` file
/// name and is never written back into the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerFile {
    pub kind: MarkerKind,
    pub coordinate_space: CoordinateSpace,
    pub markers: Vec<Marker>,
    pub is_online_reading: Option<bool>,
    pub start_time: Option<u64>,
    pub response_parameters: Option<ResponseParameters>,
    pub coil_index: Option<u32>,
}

impl MarkerFile {
    pub fn new(kind: MarkerKind, coordinate_space: CoordinateSpace) -> Self {
        Self {
            kind,
            coordinate_space,
            markers: Vec::new(),
            is_online_reading: None,
            start_time: None,
            response_parameters: None,
            coil_index: None,
        }
    }

    pub fn instrument(coordinate_space: CoordinateSpace) -> Self {
        Self::new(MarkerKind::Instrument, coordinate_space)
    }

    pub fn trigger(coordinate_space: CoordinateSpace) -> Self {
        Self::new(MarkerKind::Trigger, coordinate_space)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn untracked_count(&self) -> usize {
        self.markers.iter().filter(|m| m.is_untracked()).count()
    }
}
