use std::ops::Index;

use serde::{Deserialize, Serialize};

use super::pose::{Pose, RowMajor};

/// Stimulation intensity assumed when a marker carries none, in A/µs.
pub const DEFAULT_STIMULATION_INTENSITY: f64 = 1.0;

/// A coil position on the simulation side: pose in RAS and in the
/// simulation coil-axis convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub pose: Pose,
    /// Rate of current change in A/µs. `None` is omitted from vendor output.
    #[serde(default)]
    pub stimulation_intensity: Option<f64>,
    #[serde(default)]
    pub label: String,
}

impl Position {
    pub fn new(pose: Pose) -> Self {
        Self {
            pose,
            stimulation_intensity: None,
            label: String::new(),
        }
    }

    pub fn with_intensity(mut self, intensity: f64) -> Self {
        self.stimulation_intensity = Some(intensity);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Rate of current change in A/s, the unit field solvers take.
    pub fn didt(&self) -> f64 {
        self.stimulation_intensity
            .unwrap_or(DEFAULT_STIMULATION_INTENSITY)
            * 1e6
    }
}

/// Ordered positions. For trigger-derived lists the order is the pulse sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionList {
    positions: Vec<Position>,
}

impl PositionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, position: Position) {
        self.positions.push(position);
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Position> {
        self.positions.iter()
    }

    pub fn as_slice(&self) -> &[Position] {
        &self.positions
    }

    pub fn into_vec(self) -> Vec<Position> {
        self.positions
    }
}

impl Index<usize> for PositionList {
    type Output = Position;

    fn index(&self, index: usize) -> &Position {
        &self.positions[index]
    }
}

impl IntoIterator for PositionList {
    type Item = Position;
    type IntoIter = std::vec::IntoIter<Position>;

    fn into_iter(self) -> Self::IntoIter {
        self.positions.into_iter()
    }
}

impl<'a> IntoIterator for &'a PositionList {
    type Item = &'a Position;
    type IntoIter = std::slice::Iter<'a, Position>;

    fn into_iter(self) -> Self::IntoIter {
        self.positions.iter()
    }
}

impl FromIterator<Position> for PositionList {
    fn from_iter<I: IntoIterator<Item = Position>>(iter: I) -> Self {
        Self {
            positions: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<Position>> for PositionList {
    fn from(positions: Vec<Position>) -> Self {
        Self { positions }
    }
}

impl From<Position> for PositionList {
    fn from(position: Position) -> Self {
        Self {
            positions: vec![position],
        }
    }
}

impl From<Pose> for PositionList {
    fn from(pose: Pose) -> Self {
        Position::new(pose).into()
    }
}

impl From<RowMajor> for PositionList {
    fn from(rows: RowMajor) -> Self {
        Pose::from_rows(rows).into()
    }
}
