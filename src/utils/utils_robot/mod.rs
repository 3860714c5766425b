pub mod robot_configuration;
pub mod urdf_joint;
