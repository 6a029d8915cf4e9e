//! Vendor XML marker lists (`InstrumentMarkerList`, `TriggerMarkerList`).

pub mod reader;
pub mod writer;

pub use reader::{parse_marker_file, read_marker_file};
pub use writer::{render_marker_file, write_marker_file};
