use std::f64::consts::PI;
use nalgebra::{Matrix3, Rotation3, Vector3};
use strum::IntoEnumIterator;
use crate::inverse_kinematics::ik_branch::{ElbowConfiguration, IKBranch, NUM_IK_BRANCHES, ShoulderConfiguration, WristConfiguration};
use crate::robot_modules::robot_geometry_module::{CharacteristicPoints, RawJointAngles, RobotGeometryTable, SphericalWristDimensions};
use crate::utils::utils_errors::OptimaError;
use crate::utils::utils_math::angles::normalize_angle;
use crate::utils::utils_se3::optima_frame::OptimaFrame;

/// Slack allowed on the law-of-cosines argument before a target counts as out of reach.
pub const REACHABILITY_TOLERANCE: f64 = 1e-9;
/// Below this |sin(q5)| the wrist is treated as singular.
pub const WRIST_SINGULARITY_TOLERANCE: f64 = 1e-9;

/// The eight per-branch results of one closed-form solve, indexed by `IKBranch::index()`.
pub type RawIKSolutions = [Option<RawJointAngles>; NUM_IK_BRANCHES];

/// Closed-form position-and-orientation IK for six-axis arms whose last three axes intersect.
///
/// The arm is split at the wrist centre: axes 1 to 3 place the wrist centre, axes 4 to 6 orient
/// the flange.  Every branch is solved independently and unreachable branches come back as
/// `None`, so a target out of reach yields eight `None`s rather than an error.
///
/// ## Example
/// ```
/// use optima_analytical_ik::inverse_kinematics::spherical_wrist_ik::SphericalWristIK;
/// use optima_analytical_ik::robot_modules::robot_geometry_module::RobotGeometryTable;
///
/// let table = RobotGeometryTable::new_from_robot_name("abb_irb120_3_58").unwrap();
/// let target = table.compute_fk_raw(&[0.3, 0.2, -0.4, 0.5, 0.8, -0.2]);
/// let solutions = SphericalWristIK::solve(&target, table.dimensions());
/// for solution in solutions.iter().flatten() {
///     assert!(table.compute_fk_raw(solution).is_close(&target, 1e-6, 1e-6));
/// }
/// ```
pub struct SphericalWristIK;
impl SphericalWristIK {
    /// Solves for the given flange frame, expressed in the robot base frame.  Returned angles are
    /// raw (uncorrected) and normalized to (-pi, pi].
    pub fn solve(target: &OptimaFrame, dimensions: &SphericalWristDimensions) -> RawIKSolutions {
        let mut out: RawIKSolutions = [None; NUM_IK_BRANCHES];

        let d = dimensions;
        let wrist = target.point() - d.wrist_offset() * target.zaxis();
        let target_rotation = target.rotation();

        let c = d.lateral_offset();
        let radial_sq = wrist.x * wrist.x + wrist.y * wrist.y - c * c;
        if radial_sq < -REACHABILITY_TOLERANCE { return out; }
        let radial = radial_sq.max(0.0).sqrt();
        let wrist_azimuth = wrist.y.atan2(wrist.x);

        let a2 = d.upper_arm_length();
        let a3 = d.forearm_length();

        for shoulder in ShoulderConfiguration::iter() {
            let (q1, in_plane) = match shoulder {
                ShoulderConfiguration::Front => { (wrist_azimuth - c.atan2(radial), radial) }
                ShoulderConfiguration::Back => { (wrist_azimuth - (PI - c.atan2(radial)), -radial) }
            };

            let dx = in_plane - d.shoulder_x();
            let dz = wrist.z - d.shoulder_z();
            let k = (dx * dx + dz * dz - a2 * a2 - a3 * a3) / (2.0 * a2 * a3);
            if k.abs() > 1.0 + REACHABILITY_TOLERANCE { continue; }
            let k = k.clamp(-1.0, 1.0);
            let shoulder_to_wrist_angle = dz.atan2(dx);

            for elbow in ElbowConfiguration::iter() {
                let gamma = match elbow {
                    ElbowConfiguration::Up => { -k.acos() }
                    ElbowConfiguration::Down => { k.acos() }
                };
                let q3 = d.elbow_zero_angle() - gamma;
                let q2 = d.upper_arm_zero_angle() + (a3 * gamma.sin()).atan2(a2 + a3 * gamma.cos()) - shoulder_to_wrist_angle;

                let base_to_forearm = Rotation3::from_axis_angle(&Vector3::z_axis(), q1) * Rotation3::from_axis_angle(&Vector3::y_axis(), q2 + q3);
                let wrist_matrix = base_to_forearm.matrix().transpose() * target_rotation.matrix() * RobotGeometryTable::flange_zero_rotation().matrix().transpose();
                let wrist_solutions = Self::decompose_wrist(&wrist_matrix);

                for wrist_configuration in WristConfiguration::iter() {
                    let (q4, q5, q6) = match wrist_configuration {
                        WristConfiguration::NoFlip => { wrist_solutions[0] }
                        WristConfiguration::Flip => { wrist_solutions[1] }
                    };
                    let branch = IKBranch::new(shoulder, elbow, wrist_configuration);
                    out[branch.index()] = Some([
                        normalize_angle(q1),
                        normalize_angle(q2),
                        normalize_angle(q3),
                        q4,
                        q5,
                        q6
                    ]);
                }
            }
        }

        out
    }
    /// Validates the characteristic points and solves.
    pub fn solve_from_characteristic_points(target: &OptimaFrame, points: &CharacteristicPoints) -> Result<RawIKSolutions, OptimaError> {
        let dimensions = SphericalWristDimensions::new_from_characteristic_points(points)?;
        return Ok(Self::solve(target, &dimensions));
    }
    /// Splits `m = Rx(q4) * Ry(q5) * Rx(q6)` into its NoFlip (q5 in [0, pi]) and Flip solutions.
    ///
    /// At the singularity only q4 + q6 (or q6 - q4 when q5 = pi) is defined; q4 is then held at
    /// 0 on the NoFlip branch and at pi on the Flip branch, and q6 takes the rest.
    fn decompose_wrist(m: &Matrix3<f64>) -> [(f64, f64, f64); 2] {
        let sin_q5 = (m[(1,0)] * m[(1,0)] + m[(2,0)] * m[(2,0)]).sqrt();

        let (q4, q5, q6) = if sin_q5 < WRIST_SINGULARITY_TOLERANCE {
            if m[(0,0)] > 0.0 {
                (0.0, 0.0, m[(2,1)].atan2(m[(1,1)]))
            } else {
                (0.0, PI, (-m[(2,1)]).atan2(m[(1,1)]))
            }
        } else {
            (m[(1,0)].atan2(-m[(2,0)]), sin_q5.atan2(m[(0,0)]), m[(0,1)].atan2(m[(0,2)]))
        };

        [
            (normalize_angle(q4), normalize_angle(q5), normalize_angle(q6)),
            (normalize_angle(q4 + PI), normalize_angle(-q5), normalize_angle(q6 + PI))
        ]
    }
}
