//! Marker validation.

use crate::models::MarkerFile;

/// Tolerance for `RᵀR = I` when checking rotation blocks.
pub const ORTHONORMAL_TOLERANCE: f64 = 1e-6;

/// Drop every marker whose pose is the all-zero untracked sentinel.
///
/// Total and idempotent; all other markers keep their order.
pub fn filter(mut file: MarkerFile) -> MarkerFile {
    let before = file.markers.len();
    file.markers.retain(|m| !m.is_untracked());
    let dropped = before - file.markers.len();
    if dropped > 0 {
        tracing::debug!("Dropped {} untracked marker(s) of {}", dropped, before);
    }
    file
}

/// Indices of markers whose rotation block is not orthonormal.
///
/// Untracked markers are skipped; they are handled by [`filter`].
pub fn non_orthonormal(file: &MarkerFile, tolerance: f64) -> Vec<usize> {
    file.markers
        .iter()
        .enumerate()
        .filter(|(_, m)| !m.is_untracked() && !m.pose.is_orthonormal(tolerance))
        .map(|(i, _)| i)
        .collect()
}
