//! Conversion between vendor and simulation pose conventions.
//!
//! Two independent linear maps are involved:
//!
//! 1. World space. Vendor files are tagged RAS or LPS, the simulation side is
//!    always RAS. RAS↔LPS negates the X and Y rows of the pose (rotation and
//!    translation), i.e. left-multiplication by `diag(-1, -1, 1, 1)`.
//! 2. Coil axes. The vendor's local coil frame has x along the coil normal
//!    and y opposite the handle; the simulation frame has z along the normal
//!    and y along the handle. The rotation columns are remapped by the signed
//!    permutation [`COIL_AXIS_PERMUTATION`] (`R_sim = R_vendor · P`). The
//!    translation column is untouched.
//!
//! The full forward map is world flip then axis permutation; the inverse runs
//! them in reverse. Since one acts from the left and the other from the right
//! they commute, but both sub-transforms are exposed separately.

use nalgebra::{Matrix3, Matrix4, Vector4};

use crate::models::{CoordinateSpace, Pose};

/// Row-major `P` with `R_sim = R_vendor · P`.
///
/// Validated against the reference pair: a vendor identity pose maps to a
/// simulation pose whose normal (z) is the vendor x axis.
pub const COIL_AXIS_PERMUTATION: [[f64; 3]; 3] = [
    [0.0, 0.0, 1.0],
    [0.0, -1.0, 0.0],
    [1.0, 0.0, 0.0],
];

pub fn coil_axis_permutation() -> Matrix3<f64> {
    let p = COIL_AXIS_PERMUTATION;
    Matrix3::new(
        p[0][0], p[0][1], p[0][2], //
        p[1][0], p[1][1], p[1][2], //
        p[2][0], p[2][1], p[2][2],
    )
}

/// Embed a 3×3 rotation-block operator in a 4×4 matrix that leaves the
/// translation column and homogeneous row alone.
fn block(rotation: Matrix3<f64>) -> Matrix4<f64> {
    let mut m = Matrix4::identity();
    m.fixed_view_mut::<3, 3>(0, 0).copy_from(&rotation);
    m
}

fn world_flip(space: CoordinateSpace) -> Matrix4<f64> {
    match space {
        CoordinateSpace::Ras => Matrix4::identity(),
        CoordinateSpace::Lps => Matrix4::from_diagonal(&Vector4::new(-1.0, -1.0, 1.0, 1.0)),
    }
}

/// Re-express a world-frame pose given in `space` in RAS.
pub fn space_to_ras(pose: &Pose, space: CoordinateSpace) -> Pose {
    Pose::new(world_flip(space) * pose.matrix())
}

/// Re-express a RAS pose in `space`. The flip is its own inverse.
pub fn ras_to_space(pose: &Pose, space: CoordinateSpace) -> Pose {
    Pose::new(world_flip(space) * pose.matrix())
}

/// Remap rotation columns from the vendor coil frame to the simulation one.
pub fn vendor_axes_to_simulation(pose: &Pose) -> Pose {
    Pose::new(pose.matrix() * block(coil_axis_permutation()))
}

/// Remap rotation columns from the simulation coil frame back to the vendor one.
pub fn simulation_axes_to_vendor(pose: &Pose) -> Pose {
    // P is a signed permutation, so P⁻¹ = Pᵀ.
    Pose::new(pose.matrix() * block(coil_axis_permutation().transpose()))
}

/// Vendor pose in `space` → simulation pose (RAS, simulation coil axes).
pub fn to_simulation(pose: &Pose, space: CoordinateSpace) -> Pose {
    vendor_axes_to_simulation(&space_to_ras(pose, space))
}

/// Simulation pose → vendor pose in `space`.
pub fn to_vendor(pose: &Pose, space: CoordinateSpace) -> Pose {
    ras_to_space(&simulation_axes_to_vendor(pose), space)
}
