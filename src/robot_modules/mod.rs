pub mod robot_geometry_module;
pub mod robot_joint_limits_module;
