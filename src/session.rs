//! Neuronavigation session directory layout.
//!
//! ```text
//! <root>/Sessions/Session_<ts>/InstrumentMarkers/*.xml
//! <root>/Sessions/Session_<ts>/TMSTrigger/TriggerMarkers_Coil<N>_<ts>.xml
//! ```
//!
//! The layout is informational: nothing else in the crate depends on it.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{BridgeError, Result};

const SESSIONS_DIR: &str = "Sessions";
const SESSION_PREFIX: &str = "Session_";
const INSTRUMENT_DIR: &str = "InstrumentMarkers";
const TRIGGER_DIR: &str = "TMSTrigger";
const TRIGGER_PREFIX: &str = "TriggerMarkers_Coil";

/// Marker files found in one `Session_<ts>` directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionMarkers {
    /// Directory name, e.g. `Session_20191121094010123`.
    pub name: String,
    pub path: PathBuf,
    pub instrument_files: Vec<PathBuf>,
    pub trigger_files: Vec<TriggerFile>,
}

/// One per-coil trigger marker file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerFile {
    pub coil: u32,
    pub path: PathBuf,
}

/// Coil index encoded in a `TriggerMarkers_Coil<N>_<ts>.xml` file name.
pub fn coil_index_from_path(path: &Path) -> Option<u32> {
    let name = path.file_name()?.to_str()?;
    let rest = name.strip_prefix(TRIGGER_PREFIX)?;
    let digits: &str = &rest[..rest.find(|c: char| !c.is_ascii_digit())?];
    digits.parse().ok()
}

/// Find all sessions under `root`, which is either the directory containing
/// `Sessions/` or `Sessions/` itself. Sessions come back sorted by name,
/// instrument files by path and trigger files by coil then path.
pub fn discover(root: impl AsRef<Path>) -> Result<Vec<SessionMarkers>> {
    let root = root.as_ref();
    let sessions_dir = if root.join(SESSIONS_DIR).is_dir() {
        root.join(SESSIONS_DIR)
    } else {
        root.to_path_buf()
    };

    let mut sessions = Vec::new();
    for dir in subdirectories(&sessions_dir)? {
        let Some(name) = dir.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.starts_with(SESSION_PREFIX) {
            continue;
        }

        let mut instrument_files = xml_files(&dir.join(INSTRUMENT_DIR))?;
        instrument_files.sort();

        let mut trigger_files: Vec<TriggerFile> = xml_files(&dir.join(TRIGGER_DIR))?
            .into_iter()
            .filter_map(|path| coil_index_from_path(&path).map(|coil| TriggerFile { coil, path }))
            .collect();
        trigger_files.sort_by(|a, b| a.coil.cmp(&b.coil).then_with(|| a.path.cmp(&b.path)));

        sessions.push(SessionMarkers {
            name: name.to_string(),
            path: dir.clone(),
            instrument_files,
            trigger_files,
        });
    }

    sessions.sort_by(|a, b| a.name.cmp(&b.name));
    tracing::debug!("Found {} session(s) under {}", sessions.len(), root.display());
    Ok(sessions)
}

fn subdirectories(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| BridgeError::io(dir, e))?;
    let mut dirs = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| BridgeError::io(dir, e))?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    Ok(dirs)
}

/// `*.xml` files directly inside `dir`. A missing directory yields nothing.
fn xml_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let entries = fs::read_dir(dir).map_err(|e| BridgeError::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| BridgeError::io(dir, e))?.path();
        let is_xml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"));
        if path.is_file() && is_xml {
            files.push(path);
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coil_index_from_path() {
        let path = Path::new("/data/TMSTrigger/TriggerMarkers_Coil1_20191121094010123.xml");
        assert_eq!(coil_index_from_path(path), Some(1));
        assert_eq!(
            coil_index_from_path(Path::new("TriggerMarkers_Coil12_1.xml")),
            Some(12)
        );
    }

    #[test]
    fn test_coil_index_absent() {
        assert_eq!(coil_index_from_path(Path::new("InstrumentMarker1.xml")), None);
        assert_eq!(coil_index_from_path(Path::new("TriggerMarkers_Coil_1.xml")), None);
        assert_eq!(coil_index_from_path(Path::new("TriggerMarkers_Coil")), None);
    }
}
