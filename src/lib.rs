//! Neuronavigation marker import/export for TMS field simulation.
//!
//! ```text
//! read:  XML ─ xml::reader ─▶ MarkerFile ─ validate::filter ─▶ transform::to_simulation ─ build ─▶ PositionList
//! write: PositionList ─ transform::to_vendor ─ build::disassemble ─▶ MarkerFile ─ xml::writer ─▶ XML
//! ```

pub mod build;
pub mod config;
pub mod error;
pub mod models;
pub mod render;
pub mod session;
pub mod transform;
pub mod validate;
pub mod xml;

use std::path::Path;

pub use error::{BridgeError, Result};
pub use models::{CoordinateSpace, Pose, Position, PositionList};

/// Read a vendor marker file into simulation-side positions.
pub fn read(path: impl AsRef<Path>) -> Result<PositionList> {
    let file = xml::read_marker_file(path)?;
    Ok(build::build(file))
}

/// Write positions as a vendor instrument marker file in `coordinate_space`.
///
/// `source` may be a [`PositionList`], a single [`Position`], a [`Pose`] or a
/// row-major `[[f64; 4]; 4]` matrix.
pub fn write(
    source: impl Into<PositionList>,
    path: impl AsRef<Path>,
    coordinate_space: CoordinateSpace,
) -> Result<()> {
    let file = build::disassemble(&source.into(), coordinate_space);
    xml::write_marker_file(&file, path)
}
