pub mod analytical_ik_solver;
pub mod cartesian_path;
pub mod configuration_post_processor;
pub mod frame_conversion;
pub mod ik_branch;
pub mod spherical_wrist_ik;
