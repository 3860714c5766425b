use std::f64::consts::PI;
use std::sync::Arc;
use nalgebra::{Rotation3, Vector3};
use optima_analytical_ik::inverse_kinematics::analytical_ik_solver::{AnalyticalIKSolver, IKSolverSettings};
use optima_analytical_ik::inverse_kinematics::configuration_post_processor::{CollisionCheckUnavailable, CollisionChecker, FnCollisionChecker, IKSelectionPolicy};
use optima_analytical_ik::inverse_kinematics::frame_conversion::BaseFrameSource;
use optima_analytical_ik::robot_modules::robot_geometry_module::{AxisCorrections, CharacteristicPoints, RobotGeometryTable};
use optima_analytical_ik::robot_modules::robot_joint_limits_module::JointLimitsModule;
use optima_analytical_ik::utils::utils_errors::OptimaError;
use optima_analytical_ik::utils::utils_math::angles::wrapped_angle_difference;
use optima_analytical_ik::utils::utils_robot::robot_configuration::RobotConfiguration;
use optima_analytical_ik::utils::utils_se3::optima_frame::OptimaFrame;

const JOINT_NAMES: [&str; 6] = ["joint_1", "joint_2", "joint_3", "joint_4", "joint_5", "joint_6"];

fn solver(robot_name: &str) -> AnalyticalIKSolver {
    let limits = JointLimitsModule::new_revolute_from_bounds(&JOINT_NAMES, &[(-PI, PI); 6]).unwrap();
    AnalyticalIKSolver::new_from_robot_name(robot_name, limits).unwrap()
}

#[test]
fn sampled_targets_round_trip_through_fk() {
    let base = OptimaFrame::new_from_euler_angles(0.0, 0.0, 0.8, 1.2, -0.4, 0.3);
    let tool = OptimaFrame::new_from_euler_angles(0.0, 0.4, 0.0, 0.0, 0.05, 0.12);

    for robot_name in RobotGeometryTable::available_robot_names() {
        for with_frames in [false, true] {
            let mut s = solver(robot_name);
            if with_frames {
                s.set_base_frame(Some(&base));
                s.set_tool_frame(Some(&tool));
            }
            for seed in 0..100 {
                let sample = s.joint_limits().sample_configuration(Some(seed)).unwrap();
                let target = s.compute_fk(sample.joint_values().as_slice()).unwrap();
                let solutions = s.solve(&target, None).unwrap();
                assert_eq!(solutions.len(), 8);
                assert!(solutions.iter().any(|c| c.is_some()), "{} seed {}: no solution", robot_name, seed);
                for c in solutions.iter().flatten() {
                    let fk = s.compute_fk(c.joint_values().as_slice()).unwrap();
                    assert!(fk.is_close(&target, 1e-6, 1e-6), "{} seed {}: {:?} misses the target", robot_name, seed, c.joint_values());
                }
            }
        }
    }
}

#[test]
fn branch_indices_are_stable_under_small_perturbations() {
    let s = solver("abb_irb4600_40_255");
    for seed in 0..50 {
        let sample = s.joint_limits().sample_configuration(Some(seed)).unwrap();
        let target = s.compute_fk(sample.joint_values().as_slice()).unwrap();
        let perturbed = target.translated(&Vector3::new(1e-7, -1e-7, 1e-7));

        let a = s.solve(&target, None).unwrap();
        let b = s.solve(&perturbed, None).unwrap();
        for (ca, cb) in a.iter().zip(b.iter()) {
            let (ca, cb) = match (ca, cb) {
                (Some(ca), Some(cb)) => { (ca, cb) }
                _ => { continue; }
            };
            // joint 4 and joint 6 are not continuous near the wrist singularity
            if ca.joint_values()[4].sin().abs() < 1e-3 { continue; }
            for j in 0..6 {
                assert!(wrapped_angle_difference(ca.joint_values()[j], cb.joint_values()[j]).abs() < 1e-3, "seed {} joint {}", seed, j);
            }
        }
    }
}

#[test]
fn branch_indices_are_stable_under_small_rotations() {
    let axes = [Vector3::x_axis(), Vector3::y_axis(), Vector3::z_axis()];
    for robot_name in RobotGeometryTable::available_robot_names() {
        let s = solver(robot_name);
        for seed in 0..50 {
            let sample = s.joint_limits().sample_configuration(Some(seed)).unwrap();
            let target = s.compute_fk(sample.joint_values().as_slice()).unwrap();
            let nudge = Rotation3::from_axis_angle(&axes[seed as usize % 3], 1e-7);
            let perturbed = OptimaFrame::new_from_rotation_and_point(&(nudge * target.rotation()), *target.point());

            let a = s.solve(&target, None).unwrap();
            let b = s.solve(&perturbed, None).unwrap();
            for (ca, cb) in a.iter().zip(b.iter()) {
                let (ca, cb) = match (ca, cb) {
                    (Some(ca), Some(cb)) => { (ca, cb) }
                    _ => { continue; }
                };
                if ca.joint_values()[4].sin().abs() < 1e-3 { continue; }
                for j in 0..6 {
                    assert!(wrapped_angle_difference(ca.joint_values()[j], cb.joint_values()[j]).abs() < 1e-2, "{} seed {} joint {}", robot_name, seed, j);
                }
            }
        }
    }
}

#[test]
fn joint_limits_leave_only_elbow_down_solutions() {
    let points = CharacteristicPoints::new(
        Vector3::new(0.0, 0.0, 0.5),
        Vector3::new(0.0, 0.0, 1.0),
        Vector3::new(0.5, 0.0, 1.0),
        Vector3::new(0.6, 0.0, 1.0)
    );
    let table = RobotGeometryTable::new("test_arm", points, AxisCorrections::new_identity()).unwrap();
    let mut bounds = [(-2.0 * PI, 2.0 * PI); 6];
    bounds[2] = (1.0, 3.1);
    let limits = JointLimitsModule::new_revolute_from_bounds(&JOINT_NAMES, &bounds).unwrap();
    let s = AnalyticalIKSolver::new(table, limits).unwrap();

    let solutions = s.solve(&OptimaFrame::new_world_xy(), None).unwrap();
    let valid: Vec<usize> = solutions.iter().enumerate().filter(|(_, c)| c.is_some()).map(|(i, _)| i).collect();
    assert_eq!(valid, vec![2, 3, 6, 7]);
    for c in solutions.iter().flatten() {
        assert!(s.compute_fk(c.joint_values().as_slice()).unwrap().is_close(&OptimaFrame::new_world_xy(), 1e-6, 1e-6));
    }
}

#[test]
fn target_beyond_reach_gives_eight_nones() {
    let s = solver("abb_irb120_3_58");
    let target = OptimaFrame::new_from_euler_angles(0.0, 0.0, 0.0, 2.0, 0.0, 0.5);
    let solutions = s.solve(&target, None).unwrap();
    assert_eq!(solutions.len(), 8);
    assert!(solutions.iter().all(|c| c.is_none()));
}

#[test]
fn five_joint_values_are_rejected() {
    let s = solver("abb_irb120_3_58");
    assert!(matches!(s.compute_fk(&[0.0; 5]), Err(OptimaError::WrongJointCountError(_))));
    let target = s.compute_fk(&[0.0, 0.1, 0.1, 0.0, 0.5, 0.0]).unwrap();
    let start = RobotConfiguration::new_from_revolute_values(&[0.0; 5]);
    assert!(matches!(s.solve(&target, Some(&start)), Err(OptimaError::WrongJointCountError(_))));
}

#[test]
fn singular_wrist_pose_is_solved_without_nans() {
    let s = solver("abb_irb4600_40_255");
    let values = [0.3, 0.2, 0.1, 0.5, 0.0, 0.2];
    let target = s.compute_fk(&values).unwrap();
    let solutions = s.solve(&target, None).unwrap();
    assert_eq!(solutions.len(), 8);
    for c in solutions.iter().flatten() {
        assert!(c.joint_values().iter().all(|v| v.is_finite()));
    }

    let branch = s.geometry_table().branch_of(&values).unwrap();
    let c = solutions[branch.index()].as_ref().unwrap();
    assert!(c.joint_values()[3].abs() < 1e-12);
    assert!(c.joint_values()[4].abs() < 1e-9);
    assert!((c.joint_values()[5] - 0.7).abs() < 1e-6);
}

struct OfflineChecker;
impl CollisionChecker for OfflineChecker {
    fn check_collision(&self, _configuration: &RobotConfiguration) -> Result<bool, CollisionCheckUnavailable> {
        Err(CollisionCheckUnavailable::new("simulation not connected"))
    }
}

#[test]
fn unavailable_collision_checker_passes_solutions_through() {
    let mut s = solver("staubli_tx60l");
    let target = s.compute_fk(&[0.2, 0.4, 0.9, 0.1, -0.7, 0.3]).unwrap();
    let unchecked = s.solve(&target, None).unwrap();

    s.set_settings(IKSolverSettings::new(IKSelectionPolicy::All, true));
    s.set_collision_checker(Some(Arc::new(OfflineChecker)));
    assert_eq!(s.solve(&target, None).unwrap(), unchecked);
}

#[test]
fn default_settings_apply_an_installed_collision_checker() {
    let mut s = solver("abb_irb4600_40_255");
    let target = s.compute_fk(&[0.1, 0.2, -0.3, 0.4, 0.5, 0.6]).unwrap();
    assert!(s.solve(&target, None).unwrap().iter().any(|c| c.is_some()));

    s.set_collision_checker(Some(Arc::new(FnCollisionChecker::new(|_c: &RobotConfiguration| true))));
    let solutions = s.solve(&target, None).unwrap();
    assert_eq!(solutions.len(), 8);
    assert!(solutions.iter().all(|c| c.is_none()));
}

#[test]
fn closest_to_start_recovers_the_start_configuration() {
    let mut s = solver("staubli_tx60l");
    s.set_base_frame(Some(&OptimaFrame::new_from_euler_angles(PI, 0.0, 0.0, 0.0, 0.0, 2.0)));
    s.set_settings(IKSolverSettings::new(IKSelectionPolicy::ClosestToStart, false));

    let values = [0.2, 0.4, 0.9, 0.1, -0.7, 0.3];
    let target = s.compute_fk(&values).unwrap();
    let start = RobotConfiguration::new_from_revolute_values(&values);
    let solutions = s.solve(&target, Some(&start)).unwrap();
    assert_eq!(solutions.len(), 1);
    let c = solutions[0].as_ref().unwrap();
    assert!(c.max_joint_difference(&start).unwrap() < 1e-6);
    assert_eq!(c.joint_names()[5], "joint_6");
}

#[test]
fn settings_load_from_a_toml_file() {
    let path = std::env::temp_dir().join("optima_analytical_ik_settings_test.toml");
    std::fs::write(&path, "selection_policy = \"Cull\"\nfk_verification_tolerance = 1e-6\n").unwrap();
    let settings = IKSolverSettings::load_from_file(&path).unwrap();
    assert_eq!(settings.selection_policy, IKSelectionPolicy::Cull);
    assert!(settings.avoid_collisions);
    assert_eq!(settings.fk_verification_tolerance, Some(1e-6));

    let mut s = solver("abb_irb120_3_58");
    s.set_settings(settings);
    let target = s.compute_fk(&[0.1, 0.1, 0.1, 0.1, 0.6, 0.1]).unwrap();
    assert!(s.solve(&target, None).unwrap().iter().all(|c| c.is_some()));

    let bad_path = std::env::temp_dir().join("optima_analytical_ik_settings_test.yaml");
    std::fs::write(&bad_path, "selection_policy: Cull").unwrap();
    assert!(matches!(IKSolverSettings::load_from_file(&bad_path), Err(OptimaError::UnsupportedOperationError(_))));
}

#[test]
fn gantry_axes_move_the_robot_base() {
    let mut s = solver("abb_irb4600_40_255");
    let home = OptimaFrame::new_from_euler_angles(0.0, 0.0, 0.0, 0.0, 0.0, 0.5);
    let source = BaseFrameSource::new_linear_axes(home, vec![Vector3::x(), Vector3::y(), Vector3::z()]).unwrap();
    s.set_base_frame_source(Some(source)).unwrap();
    s.set_settings(IKSolverSettings::new(IKSelectionPolicy::ClosestToStart, false));

    let values = [0.3, 0.2, -0.1, 0.5, 0.9, -0.4, 2.0, -1.0, 0.25];
    let target = s.compute_fk(&values).unwrap();
    assert!((target.point() - s.compute_fk(&values[..6]).unwrap().point() - Vector3::new(2.0, -1.0, 0.25)).norm() < 1e-9);

    let start = RobotConfiguration::new_from_revolute_and_prismatic_values(&values[..6], &values[6..]);
    let solutions = s.solve(&target, Some(&start)).unwrap();
    let c = solutions[0].as_ref().unwrap();
    for j in 0..6 {
        assert!((c.joint_values()[j] - values[j]).abs() < 1e-6);
    }

    let arm_only = RobotConfiguration::new_from_revolute_values(&values[..6]);
    assert!(matches!(s.solve(&target, Some(&arm_only)), Err(OptimaError::WrongJointCountError(_))));
}

#[test]
fn batch_solving_preserves_input_order() {
    let s = solver("staubli_tx60l");
    let frames: Vec<OptimaFrame> = (0..32).map(|i| s.compute_fk(&[-1.0 + 0.06 * i as f64, 0.4, 0.9, 0.1, -0.7, 0.3]).unwrap()).collect();
    let batch = s.solve_batch(&frames, None);
    assert_eq!(batch.len(), frames.len());
    for (frame, res) in frames.iter().zip(batch.into_iter()) {
        assert_eq!(res.unwrap(), s.solve(frame, None).unwrap());
    }
}
