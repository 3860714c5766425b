use crate::inverse_kinematics::analytical_ik_solver::{AnalyticalIKSolver, NUM_ARM_JOINTS};
use crate::inverse_kinematics::configuration_post_processor::IKSelectionPolicy;
use crate::inverse_kinematics::ik_branch::{IKBranch, NUM_IK_BRANCHES};
use crate::utils::utils_console::optima_print_warning;
use crate::utils::utils_errors::OptimaError;
use crate::utils::utils_math::angles::{nearest_equivalent_angle, ANGLE_BOUND_TOLERANCE};
use crate::utils::utils_robot::robot_configuration::{JointType, RobotConfiguration};
use crate::utils::utils_se3::optima_frame::OptimaFrame;

/// One configuration per path frame, all from the same IK branch.  `None` where the branch
/// has no valid solution for that frame.
pub type BranchTrack = Vec<Option<RobotConfiguration>>;

/// Follows each of the eight IK branches along an ordered list of Cartesian frames.
pub struct CartesianPathModule;
impl CartesianPathModule {
    /// Solves every frame and groups the results by branch index.  Revolute joints along a
    /// track are shifted by multiples of 2pi to stay closest to the previous valid value on the
    /// same track (the first frame uses `initial_reference`, when given), then re-checked
    /// against the solver's joint limits.
    ///
    /// `initial_reference` is also handed to the solver as start configuration, so on a robot
    /// with external axes it must carry their values as well.
    pub fn compute_branch_tracks(solver: &AnalyticalIKSolver, frames_wcf: &[OptimaFrame], initial_reference: Option<&RobotConfiguration>) -> Result<Vec<BranchTrack>, OptimaError> {
        let mut settings = solver.settings().clone();
        settings.selection_policy = IKSelectionPolicy::All;

        let mut previous: Vec<Option<Vec<f64>>> = match initial_reference {
            None => { vec![None; NUM_IK_BRANCHES] }
            Some(r) => {
                if r.num_joints() < NUM_ARM_JOINTS {
                    return Err(OptimaError::new_wrong_joint_count_error("CartesianPathModule::compute_branch_tracks", r.num_joints(), NUM_ARM_JOINTS, file!(), line!()));
                }
                vec![Some(r.joint_values_as_vec()[..NUM_ARM_JOINTS].to_vec()); NUM_IK_BRANCHES]
            }
        };

        let mut tracks: Vec<BranchTrack> = vec![Vec::with_capacity(frames_wcf.len()); NUM_IK_BRANCHES];
        for frame in frames_wcf {
            let slots = solver.solve_with_settings(frame, initial_reference, &settings)?;
            for (branch_idx, slot) in slots.into_iter().enumerate() {
                let entry = match slot {
                    None => { None }
                    Some(c) => { Self::unwrap_against_previous(solver, c, &previous[branch_idx])? }
                };
                if let Some(c) = &entry {
                    previous[branch_idx] = Some(c.joint_values_as_vec());
                }
                tracks[branch_idx].push(entry);
            }
        }

        Ok(tracks)
    }
    /// The first track, in branch order, with a valid configuration at every frame and no
    /// per-step joint change above `max_joint_jump`.
    pub fn first_continuous_track(tracks: &Vec<BranchTrack>, max_joint_jump: f64) -> Result<Option<(IKBranch, Vec<RobotConfiguration>)>, OptimaError> {
        for (branch_idx, track) in tracks.iter().enumerate() {
            let complete: Option<Vec<RobotConfiguration>> = track.iter().cloned().collect();
            let complete = match complete {
                None => { continue; }
                Some(complete) => { complete }
            };
            if let Some(jump) = Self::max_step_jump(&complete)? {
                if jump > max_joint_jump { continue; }
            }
            return Ok(Some((IKBranch::from_index(branch_idx)?, complete)));
        }

        optima_print_warning(&format!("no IK branch follows the path without a joint jump above {}.", max_joint_jump));
        Ok(None)
    }
    /// Largest single-joint change between consecutive configurations, or `None` for fewer than
    /// two configurations.
    pub fn max_step_jump(configurations: &[RobotConfiguration]) -> Result<Option<f64>, OptimaError> {
        let mut out: Option<f64> = None;
        for pair in configurations.windows(2) {
            let d = pair[0].max_joint_difference(&pair[1])?;
            out = Some(out.map_or(d, |o| o.max(d)));
        }
        Ok(out)
    }
    fn unwrap_against_previous(solver: &AnalyticalIKSolver, mut configuration: RobotConfiguration, previous: &Option<Vec<f64>>) -> Result<Option<RobotConfiguration>, OptimaError> {
        let previous = match previous {
            None => { return Ok(Some(configuration)); }
            Some(previous) => { previous }
        };

        let joint_limits = solver.joint_limits().joint_limits();
        for i in 0..configuration.num_joints() {
            if configuration.joint_types()[i] != JointType::Revolute { continue; }
            let value = nearest_equivalent_angle(configuration.joint_values()[i], previous[i]);
            let limit = &joint_limits[i];
            if value < limit.lower() - ANGLE_BOUND_TOLERANCE || value > limit.upper() + ANGLE_BOUND_TOLERANCE {
                return Ok(None);
            }
            configuration.set_joint_value(i, value)?;
        }

        Ok(Some(configuration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;
    use crate::robot_modules::robot_joint_limits_module::JointLimitsModule;

    fn solver() -> AnalyticalIKSolver {
        let names = ["j1", "j2", "j3", "j4", "j5", "j6"];
        let limits = JointLimitsModule::new_revolute_from_bounds(&names, &[(-2.0 * PI, 2.0 * PI); 6]).unwrap();
        AnalyticalIKSolver::new_from_robot_name("abb_irb120_3_58", limits).unwrap()
    }

    #[test]
    fn tracks_stay_continuous_across_the_pi_boundary() {
        let s = solver();
        let joint_values: Vec<[f64; 6]> = (0..11).map(|i| [2.9 + 0.05 * i as f64, 0.3, -0.2, 0.4, 0.9, -0.3]).collect();
        let frames: Vec<OptimaFrame> = joint_values.iter().map(|v| s.compute_fk(v).unwrap()).collect();
        let start = RobotConfiguration::new_from_revolute_values(&joint_values[0]);

        let tracks = CartesianPathModule::compute_branch_tracks(&s, &frames, Some(&start)).unwrap();
        assert_eq!(tracks.len(), NUM_IK_BRANCHES);

        let branch = s.geometry_table().branch_of(&joint_values[0]).unwrap();
        let track = &tracks[branch.index()];
        for (c, v) in track.iter().zip(joint_values.iter()) {
            let c = c.as_ref().unwrap();
            for j in 0..6 {
                assert!((c.joint_values()[j] - v[j]).abs() < 1e-6);
            }
        }

        let (_, continuous) = CartesianPathModule::first_continuous_track(&tracks, 0.2).unwrap().unwrap();
        assert_eq!(continuous.len(), frames.len());
        assert!(CartesianPathModule::max_step_jump(&continuous).unwrap().unwrap() <= 0.2);
    }

    #[test]
    fn no_continuous_track_for_a_tiny_jump_threshold() {
        let s = solver();
        let frames: Vec<OptimaFrame> = (0..3).map(|i| s.compute_fk(&[0.3 * i as f64, 0.3, -0.2, 0.4, 0.9, -0.3]).unwrap()).collect();
        let tracks = CartesianPathModule::compute_branch_tracks(&s, &frames, None).unwrap();
        assert!(CartesianPathModule::first_continuous_track(&tracks, 1e-3).unwrap().is_none());
    }

    #[test]
    fn short_reference_is_rejected() {
        let s = solver();
        let frames = vec![s.compute_fk(&[0.0, 0.3, -0.2, 0.4, 0.9, -0.3]).unwrap()];
        let reference = RobotConfiguration::new_from_revolute_values(&[0.0; 3]);
        assert!(matches!(CartesianPathModule::compute_branch_tracks(&s, &frames, Some(&reference)), Err(OptimaError::WrongJointCountError(_))));
    }
}
