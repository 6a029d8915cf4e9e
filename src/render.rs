//! Plain-text rendering of marker files and session trees.

use chrono::{DateTime, Utc};

use crate::models::MarkerFile;
use crate::session::SessionMarkers;
use crate::validate::{self, ORTHONORMAL_TOLERANCE};

const INSTRUMENT: char = '◇';
const TRIGGER: char = '●';

/// Render sessions as an ASCII tree.
///
/// Example output:
/// ```text
/// Session_20191121094010123
/// ├── ◇ InstrumentMarker20191121.xml
/// └── ● Coil 0  TriggerMarkers_Coil0_20191121.xml
/// ```
pub fn render_sessions(sessions: &[SessionMarkers]) -> String {
    let mut output = String::new();
    for session in sessions {
        output.push_str(&session.name);
        output.push('\n');

        let mut entries: Vec<String> = session
            .instrument_files
            .iter()
            .map(|path| format!("{} {}", INSTRUMENT, file_name(path)))
            .collect();
        entries.extend(
            session
                .trigger_files
                .iter()
                .map(|t| format!("{} Coil {}  {}", TRIGGER, t.coil, file_name(&t.path))),
        );

        for (i, entry) in entries.iter().enumerate() {
            let branch = if i == entries.len() - 1 {
                "└── "
            } else {
                "├── "
            };
            output.push_str(branch);
            output.push_str(entry);
            output.push('\n');
        }
    }
    output
}

/// Render a one-screen summary of a parsed marker file.
pub fn render_summary(file: &MarkerFile) -> String {
    let mut lines = vec![
        format!("Kind:              {}", file.kind.as_str()),
        format!("Coordinate space:  {}", file.coordinate_space.as_str()),
    ];
    if let Some(coil) = file.coil_index {
        lines.push(format!("Coil:              {}", coil));
    }
    if let Some(start) = file.start_time {
        let started = i64::try_from(start)
            .ok()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| start.to_string());
        lines.push(format!("Start time:        {}", started));
    }
    lines.push(format!("Markers:           {}", file.markers.len()));
    lines.push(format!("Untracked:         {}", file.untracked_count()));

    if let Some(params) = &file.response_parameters {
        for d in &params.descriptors {
            let selected = params.selected_response_channel.as_deref() == Some(d.id.as_str());
            lines.push(format!(
                "Response channel:  {} {} [{}]{}",
                d.id,
                d.name,
                d.unit,
                if selected { " (selected)" } else { "" }
            ));
        }
    }

    let skewed = validate::non_orthonormal(file, ORTHONORMAL_TOLERANCE);
    if !skewed.is_empty() {
        let indices: Vec<String> = skewed.iter().map(|i| i.to_string()).collect();
        lines.push(format!("Non-orthonormal:   {}", indices.join(", ")));
    }

    let mut output = lines.join("\n");
    output.push('\n');
    output
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::*;
    use crate::session::TriggerFile;
    use std::path::PathBuf;

    fn make_session(name: &str, instrument: &[&str], triggers: &[(u32, &str)]) -> SessionMarkers {
        SessionMarkers {
            name: name.to_string(),
            path: PathBuf::from(name),
            instrument_files: instrument.iter().map(PathBuf::from).collect(),
            trigger_files: triggers
                .iter()
                .map(|(coil, path)| TriggerFile {
                    coil: *coil,
                    path: PathBuf::from(path),
                })
                .collect(),
        }
    }

    #[test]
    fn test_empty_session() {
        let output = render_sessions(&[make_session("Session_1", &[], &[])]);
        assert_eq!(output, "Session_1\n");
    }

    #[test]
    fn test_session_with_files() {
        let output = render_sessions(&[make_session(
            "Session_1",
            &["/s/InstrumentMarkers/IM.xml"],
            &[(0, "/s/TMSTrigger/TriggerMarkers_Coil0_1.xml")],
        )]);
        assert_eq!(
            output,
            "Session_1\n├── ◇ IM.xml\n└── ● Coil 0  TriggerMarkers_Coil0_1.xml\n"
        );
    }

    #[test]
    fn test_summary_counts_untracked() {
        let mut file = MarkerFile::trigger(CoordinateSpace::Lps);
        file.coil_index = Some(1);
        file.markers.push(Marker::new(Pose::identity(), CoordinateSpace::Lps));
        file.markers.push(Marker::new(Pose::zero(), CoordinateSpace::Lps));

        let output = render_summary(&file);
        assert!(output.contains("Kind:              trigger\n"));
        assert!(output.contains("Coordinate space:  LPS\n"));
        assert!(output.contains("Coil:              1\n"));
        assert!(output.contains("Markers:           2\n"));
        assert!(output.contains("Untracked:         1\n"));
        assert!(!output.contains("Non-orthonormal"));
    }
}
