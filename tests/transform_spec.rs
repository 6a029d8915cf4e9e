use nalgebra::{Matrix4, Rotation3, Translation3};
use nnav_bridge::models::*;
use nnav_bridge::transform::*;
use speculate2::speculate;

const TOLERANCE: f64 = 1e-12;

fn rigid(roll: f64, pitch: f64, yaw: f64, t: [f64; 3]) -> Pose {
    let rotation = Rotation3::from_euler_angles(roll, pitch, yaw).to_homogeneous();
    let translation = Translation3::new(t[0], t[1], t[2]).to_homogeneous();
    Pose::new(translation * rotation)
}

fn sample_poses() -> Vec<Pose> {
    vec![
        Pose::identity(),
        rigid(0.3, -1.1, 2.4, [-35.5, 12.25, 60.0]),
        rigid(-2.9, 0.05, -0.7, [0.0, -80.1, 41.3]),
        rigid(1.5707963267948966, 0.0, 3.141592653589793, [10.0, 20.0, 30.0]),
    ]
}

speculate! {
    describe "world space" {
        it "leaves RAS poses unchanged" {
            for pose in sample_poses() {
                assert_eq!(space_to_ras(&pose, CoordinateSpace::Ras), pose);
                assert_eq!(ras_to_space(&pose, CoordinateSpace::Ras), pose);
            }
        }

        it "negates the X and Y rows for LPS" {
            let pose = rigid(0.3, -1.1, 2.4, [-35.5, 12.25, 60.0]);
            let ras = space_to_ras(&pose, CoordinateSpace::Lps);

            for c in 0..4 {
                assert_eq!(ras.get(0, c), -pose.get(0, c));
                assert_eq!(ras.get(1, c), -pose.get(1, c));
                assert_eq!(ras.get(2, c), pose.get(2, c));
                assert_eq!(ras.get(3, c), pose.get(3, c));
            }
            assert_eq!(ras.translation().x, 35.5);
            assert_eq!(ras.translation().y, -12.25);
            assert_eq!(ras.translation().z, 60.0);
        }

        it "is inverted by ras_to_space" {
            for pose in sample_poses() {
                let back = ras_to_space(&space_to_ras(&pose, CoordinateSpace::Lps), CoordinateSpace::Lps);
                assert!(back.approx_eq(&pose, TOLERANCE));
            }
        }
    }

    describe "coil axes" {
        it "maps the vendor identity onto the permutation" {
            let sim = vendor_axes_to_simulation(&Pose::identity());
            assert_eq!(sim.to_rows(), [
                [0.0, 0.0, 1.0, 0.0],
                [0.0, -1.0, 0.0, 0.0],
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ]);
        }

        it "puts the simulation normal along the vendor x axis" {
            for pose in sample_poses() {
                let sim = vendor_axes_to_simulation(&pose);
                assert_eq!(sim.rotation().column(2), pose.rotation().column(0));
                assert_eq!(sim.rotation().column(1), -pose.rotation().column(1));
                assert_eq!(sim.rotation().column(0), pose.rotation().column(2));
            }
        }

        it "does not touch the translation" {
            for pose in sample_poses() {
                assert_eq!(vendor_axes_to_simulation(&pose).translation(), pose.translation());
                assert_eq!(simulation_axes_to_vendor(&pose).translation(), pose.translation());
            }
        }

        it "keeps rotations proper and orthonormal" {
            for pose in sample_poses() {
                let sim = vendor_axes_to_simulation(&pose);
                assert!(sim.is_orthonormal(1e-9));
                assert!((sim.rotation().determinant() - 1.0).abs() < 1e-9);
            }
        }

        it "is inverted by simulation_axes_to_vendor" {
            for pose in sample_poses() {
                let back = simulation_axes_to_vendor(&vendor_axes_to_simulation(&pose));
                assert!(back.approx_eq(&pose, TOLERANCE));
            }
        }
    }

    describe "composed transform" {
        it "is world flip followed by axis permutation" {
            for pose in sample_poses() {
                for space in [CoordinateSpace::Ras, CoordinateSpace::Lps] {
                    let expected = vendor_axes_to_simulation(&space_to_ras(&pose, space));
                    assert!(to_simulation(&pose, space).approx_eq(&expected, TOLERANCE));
                }
            }
        }

        it "round trips through to_vendor for both spaces" {
            for pose in sample_poses() {
                for space in [CoordinateSpace::Ras, CoordinateSpace::Lps] {
                    let back = to_vendor(&to_simulation(&pose, space), space);
                    assert!(back.approx_eq(&pose, TOLERANCE));

                    let forth = to_simulation(&to_vendor(&pose, space), space);
                    assert!(forth.approx_eq(&pose, TOLERANCE));
                }
            }
        }

        it "keeps the untracked sentinel untracked" {
            let sim = to_simulation(&Pose::zero(), CoordinateSpace::Lps);
            assert!(sim.is_untracked());
        }

        it "accepts non-orthonormal poses" {
            let skewed = Pose::new(Matrix4::new(
                2.0, 0.0, 0.0, 1.0,
                0.0, 1.0, 0.5, 2.0,
                0.0, 0.0, 1.0, 3.0,
                0.0, 0.0, 0.0, 1.0,
            ));
            assert!(!skewed.is_orthonormal(1e-6));
            let back = to_vendor(&to_simulation(&skewed, CoordinateSpace::Lps), CoordinateSpace::Lps);
            assert!(back.approx_eq(&skewed, TOLERANCE));
        }
    }
}
