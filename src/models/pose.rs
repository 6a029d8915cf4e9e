use nalgebra::{Matrix3, Matrix4, Vector3};
use serde::{Deserialize, Serialize};

/// Row-major 4×4 matrix, the layout of both the vendor `Matrix4D` element
/// (`dataRC` = row R, column C) and the JSON interchange format.
pub type RowMajor = [[f64; 4]; 4];

/// A 4×4 homogeneous transform: 3×3 rotation, translation column and the
/// `[0, 0, 0, 1]` bottom row.
///
/// The all-zero matrix is the vendor's sentinel for "coil not tracked" and is
/// representable on purpose; see [`Pose::is_untracked`].
///
/// Serializes as row-major nested arrays. JSON has no NaN or infinity, so
/// non-finite entries are written as the strings `"NaN"`, `"inf"` and `"-inf"`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EntryRows", into = "EntryRows")]
pub struct Pose(Matrix4<f64>);

impl Pose {
    pub fn new(matrix: Matrix4<f64>) -> Self {
        Self(matrix)
    }

    pub fn identity() -> Self {
        Self(Matrix4::identity())
    }

    /// The untracked sentinel.
    pub fn zero() -> Self {
        Self(Matrix4::zeros())
    }

    pub fn from_rows(rows: RowMajor) -> Self {
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        Self(Matrix4::from_row_slice(&flat))
    }

    pub fn to_rows(&self) -> RowMajor {
        let mut rows = [[0.0; 4]; 4];
        for (r, row) in rows.iter_mut().enumerate() {
            for (c, value) in row.iter_mut().enumerate() {
                *value = self.0[(r, c)];
            }
        }
        rows
    }

    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.0
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.0[(row, col)]
    }

    pub fn rotation(&self) -> Matrix3<f64> {
        self.0.fixed_view::<3, 3>(0, 0).into_owned()
    }

    pub fn translation(&self) -> Vector3<f64> {
        self.0.fixed_view::<3, 1>(0, 3).into_owned()
    }

    /// True when all sixteen entries are exactly `0.0`.
    pub fn is_untracked(&self) -> bool {
        self.0.iter().all(|v| *v == 0.0)
    }

    /// True when `RᵀR` is the identity within `tolerance` per entry.
    pub fn is_orthonormal(&self, tolerance: f64) -> bool {
        let r = self.rotation();
        let gram = r.transpose() * r;
        (gram - Matrix3::identity())
            .iter()
            .all(|v| v.abs() <= tolerance)
    }

    /// Entry-wise comparison. NaN entries compare equal to NaN so that files
    /// carrying `NaN` matrices still round-trip.
    pub fn approx_eq(&self, other: &Pose, tolerance: f64) -> bool {
        self.0.iter().zip(other.0.iter()).all(|(a, b)| {
            (a.is_nan() && b.is_nan()) || a == b || (a - b).abs() <= tolerance
        })
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<Matrix4<f64>> for Pose {
    fn from(matrix: Matrix4<f64>) -> Self {
        Self(matrix)
    }
}

impl From<RowMajor> for Pose {
    fn from(rows: RowMajor) -> Self {
        Self::from_rows(rows)
    }
}

impl From<Pose> for RowMajor {
    fn from(pose: Pose) -> Self {
        pose.to_rows()
    }
}

type EntryRows = [[Entry; 4]; 4];

/// One serialized matrix entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum Entry {
    Number(f64),
    Text(String),
}

impl From<f64> for Entry {
    fn from(value: f64) -> Self {
        if value.is_finite() {
            Entry::Number(value)
        } else {
            Entry::Text(format!("{:?}", value))
        }
    }
}

impl TryFrom<Entry> for f64 {
    type Error = String;

    fn try_from(entry: Entry) -> Result<Self, Self::Error> {
        match entry {
            Entry::Number(value) => Ok(value),
            Entry::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| format!("Invalid matrix entry `{}`", text)),
        }
    }
}

impl TryFrom<EntryRows> for Pose {
    type Error = String;

    fn try_from(entries: EntryRows) -> Result<Self, Self::Error> {
        let mut rows = [[0.0; 4]; 4];
        for (row, entry_row) in rows.iter_mut().zip(entries) {
            for (value, entry) in row.iter_mut().zip(entry_row) {
                *value = f64::try_from(entry)?;
            }
        }
        Ok(Self::from_rows(rows))
    }
}

impl From<Pose> for EntryRows {
    fn from(pose: Pose) -> Self {
        let rows = pose.to_rows();
        std::array::from_fn(|r| std::array::from_fn(|c| Entry::from(rows[r][c])))
    }
}
