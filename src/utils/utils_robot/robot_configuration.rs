use nalgebra::DVector;
use serde::{Serialize, Deserialize};
use crate::utils::utils_console::{optima_print, PrintColor, PrintMode};
use crate::utils::utils_errors::OptimaError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum JointType {
    /// Angle in radians.
    Revolute,
    /// Displacement in metres.
    Prismatic
}

/// An ordered set of joint values together with their joint types and, once attached, their
/// joint names.
///
/// ## Example
/// ```
/// use optima_analytical_ik::utils::utils_robot::robot_configuration::RobotConfiguration;
///
/// let a = RobotConfiguration::new_from_revolute_values(&[0.0, 0.5, -0.5, 0.0, 1.0, 0.0]);
/// let b = RobotConfiguration::new_from_revolute_values(&[0.1, 0.5, -0.5, 0.0, 1.0, -0.2]);
/// assert!((a.joint_space_distance(&b).unwrap() - 0.3).abs() < 1e-12);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RobotConfiguration {
    joint_values: DVector<f64>,
    joint_types: Vec<JointType>,
    joint_names: Vec<String>
}
impl RobotConfiguration {
    pub fn new(joint_values: DVector<f64>, joint_types: Vec<JointType>) -> Result<Self, OptimaError> {
        if joint_values.len() != joint_types.len() {
            return Err(OptimaError::new_wrong_joint_count_error("RobotConfiguration::new", joint_values.len(), joint_types.len(), file!(), line!()));
        }
        if joint_values.iter().any(|v| !v.is_finite()) {
            return Err(OptimaError::new_invalid_input_error("RobotConfiguration::new", "Joint values must be finite.", file!(), line!()));
        }

        Ok(Self {
            joint_values,
            joint_types,
            joint_names: vec![]
        })
    }
    pub fn new_from_revolute_values(values: &[f64]) -> Self {
        Self {
            joint_values: DVector::from_column_slice(values),
            joint_types: vec![JointType::Revolute; values.len()],
            joint_names: vec![]
        }
    }
    /// Revolute values first, followed by prismatic values (e.g., a six-axis arm on a gantry).
    pub fn new_from_revolute_and_prismatic_values(revolute_values: &[f64], prismatic_values: &[f64]) -> Self {
        let mut values = revolute_values.to_vec();
        values.extend_from_slice(prismatic_values);
        let mut joint_types = vec![JointType::Revolute; revolute_values.len()];
        joint_types.extend(vec![JointType::Prismatic; prismatic_values.len()]);

        Self {
            joint_values: DVector::from_vec(values),
            joint_types,
            joint_names: vec![]
        }
    }
    pub fn with_joint_names(mut self, joint_names: Vec<String>) -> Result<Self, OptimaError> {
        self.set_joint_names(joint_names)?;
        return Ok(self);
    }
    pub fn set_joint_names(&mut self, joint_names: Vec<String>) -> Result<(), OptimaError> {
        if joint_names.len() != self.joint_values.len() {
            return Err(OptimaError::new_wrong_joint_count_error("RobotConfiguration::set_joint_names", joint_names.len(), self.joint_values.len(), file!(), line!()));
        }
        self.joint_names = joint_names;
        Ok(())
    }
    pub fn set_joint_types(&mut self, joint_types: Vec<JointType>) -> Result<(), OptimaError> {
        if joint_types.len() != self.joint_values.len() {
            return Err(OptimaError::new_wrong_joint_count_error("RobotConfiguration::set_joint_types", joint_types.len(), self.joint_values.len(), file!(), line!()));
        }
        self.joint_types = joint_types;
        Ok(())
    }
    pub fn set_joint_value(&mut self, idx: usize, value: f64) -> Result<(), OptimaError> {
        if idx >= self.joint_values.len() {
            return Err(OptimaError::new_idx_out_of_bound_error(idx, self.joint_values.len(), file!(), line!()));
        }
        self.joint_values[idx] = value;
        Ok(())
    }
    pub fn joint_values(&self) -> &DVector<f64> {
        &self.joint_values
    }
    pub fn joint_values_as_vec(&self) -> Vec<f64> {
        self.joint_values.iter().map(|v| *v).collect()
    }
    pub fn joint_types(&self) -> &Vec<JointType> {
        &self.joint_types
    }
    pub fn joint_names(&self) -> &Vec<String> {
        &self.joint_names
    }
    pub fn has_joint_names(&self) -> bool {
        !self.joint_names.is_empty()
    }
    pub fn num_joints(&self) -> usize {
        self.joint_values.len()
    }
    /// Sum of absolute joint value differences.  Revolute values are compared as given, without
    /// wrapping, so two configurations 2*pi apart on one joint are far apart.
    pub fn joint_space_distance(&self, other: &RobotConfiguration) -> Result<f64, OptimaError> {
        if self.num_joints() != other.num_joints() {
            return Err(OptimaError::new_wrong_joint_count_error("joint_space_distance", other.num_joints(), self.num_joints(), file!(), line!()));
        }
        return Ok((&self.joint_values - &other.joint_values).iter().map(|d| d.abs()).sum());
    }
    /// Largest absolute difference over all joints.
    pub fn max_joint_difference(&self, other: &RobotConfiguration) -> Result<f64, OptimaError> {
        if self.num_joints() != other.num_joints() {
            return Err(OptimaError::new_wrong_joint_count_error("max_joint_difference", other.num_joints(), self.num_joints(), file!(), line!()));
        }
        return Ok((&self.joint_values - &other.joint_values).iter().fold(0.0, |acc, d| f64::max(acc, d.abs())));
    }
    pub fn print_summary(&self) {
        for i in 0..self.num_joints() {
            let name = if self.has_joint_names() { self.joint_names[i].as_str() } else { "<unnamed>" };
            optima_print(&format!("   > {} ({:?}): ", name, self.joint_types[i]), PrintMode::Print, PrintColor::Blue, false);
            optima_print(&format!("{:.6}", self.joint_values[i]), PrintMode::Println, PrintColor::None, false);
        }
    }
}
