//! Domain models for marker import/export.
//!
//! # Vendor side
//!
//! - [`MarkerFile`]: one parsed `InstrumentMarkerList` or `TriggerMarkerList`, transient.
//! - [`Marker`]: one pose plus metadata, a faithful reflection of the file.
//! - [`Pose`]: 4×4 homogeneous transform; all-zero means "untracked".
//!
//! # Simulation side
//!
//! - [`Position`]: pose in RAS and in the simulation coil-axis convention, with
//!   stimulation intensity and label.
//! - [`PositionList`]: ordered positions handed to simulation setup.

mod marker;
mod pose;
mod position;

pub use marker::*;
pub use pose::*;
pub use position::*;
