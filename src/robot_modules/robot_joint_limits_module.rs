use std::f64::consts::PI;
use nalgebra::DVector;
use serde::{Serialize, Deserialize};
use crate::utils::utils_console::{optima_print, optima_print_new_line, PrintColor, PrintMode};
use crate::utils::utils_errors::OptimaError;
use crate::utils::utils_files::FileUtils;
use crate::utils::utils_math::angles::{ANGLE_BOUND_TOLERANCE, fit_angle_within_bounds};
use crate::utils::utils_robot::robot_configuration::{JointType, RobotConfiguration};
use crate::utils::utils_robot::urdf_joint::{URDFJoint, URDFJointKind};
use crate::utils::utils_sampling::SimpleSamplers;
use crate::utils::utils_traits::SaveAndLoadable;

/// Lower and upper bound of a single joint.  Unbounded joints use infinite bounds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JointLimit {
    joint_name: String,
    joint_type: JointType,
    lower: f64,
    upper: f64
}
impl JointLimit {
    pub fn new(joint_name: &str, joint_type: JointType, lower: f64, upper: f64) -> Result<Self, OptimaError> {
        if lower.is_nan() || upper.is_nan() || lower > upper {
            return Err(OptimaError::new_invalid_input_error("JointLimit::new", &format!("Invalid bounds ({}, {}) for joint {:?}.", lower, upper, joint_name), file!(), line!()));
        }
        Ok(Self {
            joint_name: joint_name.to_string(),
            joint_type,
            lower,
            upper
        })
    }
    pub fn new_unbounded_revolute(joint_name: &str) -> Self {
        Self {
            joint_name: joint_name.to_string(),
            joint_type: JointType::Revolute,
            lower: f64::NEG_INFINITY,
            upper: f64::INFINITY
        }
    }
    pub fn joint_name(&self) -> &str {
        &self.joint_name
    }
    pub fn joint_type(&self) -> JointType {
        self.joint_type
    }
    pub fn lower(&self) -> f64 {
        self.lower
    }
    pub fn upper(&self) -> f64 {
        self.upper
    }
    pub fn is_bounded(&self) -> bool {
        self.lower.is_finite() && self.upper.is_finite()
    }
    /// Revolute values are shifted by multiples of 2*pi into the bounds; prismatic values are
    /// only checked.
    pub fn fit_value(&self, value: f64) -> Option<f64> {
        return match self.joint_type {
            JointType::Revolute => { fit_angle_within_bounds(value, self.lower, self.upper) }
            JointType::Prismatic => {
                if value >= self.lower - ANGLE_BOUND_TOLERANCE && value <= self.upper + ANGLE_BOUND_TOLERANCE { Some(value) } else { None }
            }
        }
    }
}

/// Joint limits of a serial chain, in chain order.  The joint names held here are the names that
/// get attached to every IK solution.
///
/// ## Example
/// ```
/// use std::f64::consts::PI;
/// use optima_analytical_ik::robot_modules::robot_joint_limits_module::JointLimitsModule;
/// use optima_analytical_ik::utils::utils_robot::robot_configuration::RobotConfiguration;
///
/// let limits = JointLimitsModule::new_revolute_from_bounds(&["a", "b"], &[(0.0, 2.0 * PI), (-1.0, 1.0)]).unwrap();
/// let fitted = limits.fit_configuration(&RobotConfiguration::new_from_revolute_values(&[-0.5, 0.5])).unwrap().unwrap();
/// assert!((fitted.joint_values()[0] - (2.0 * PI - 0.5)).abs() < 1e-12);
/// assert!(limits.fit_configuration(&RobotConfiguration::new_from_revolute_values(&[0.0, 2.0])).unwrap().is_none());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct JointLimitsModule {
    joint_limits: Vec<JointLimit>
}
impl JointLimitsModule {
    pub fn new(joint_limits: Vec<JointLimit>) -> Result<Self, OptimaError> {
        for l in &joint_limits {
            JointLimit::new(l.joint_name(), l.joint_type(), l.lower(), l.upper())?;
        }
        Ok(Self {
            joint_limits
        })
    }
    pub fn new_revolute_from_bounds(joint_names: &[&str], bounds: &[(f64, f64)]) -> Result<Self, OptimaError> {
        if joint_names.len() != bounds.len() {
            return Err(OptimaError::new_wrong_joint_count_error("JointLimitsModule::new_revolute_from_bounds", bounds.len(), joint_names.len(), file!(), line!()));
        }
        let mut joint_limits = vec![];
        for (name, (lower, upper)) in joint_names.iter().zip(bounds.iter()) {
            joint_limits.push(JointLimit::new(name, JointType::Revolute, *lower, *upper)?);
        }
        return Self::new(joint_limits);
    }
    pub fn new_unbounded_revolute(joint_names: &[&str]) -> Self {
        Self {
            joint_limits: joint_names.iter().map(|n| JointLimit::new_unbounded_revolute(n)).collect()
        }
    }
    /// Reads revolute, continuous and prismatic joints from URDF text.  With `joint_names` the
    /// given joints are taken in the given order; otherwise every movable joint is taken in
    /// document order.  Continuous joints, and revolute joints that state no limits, are
    /// unbounded.
    pub fn new_from_urdf_string(urdf_string: &str, joint_names: Option<&[&str]>) -> Result<Self, OptimaError> {
        let urdf_joints = URDFJoint::new_all_from_urdf_string(urdf_string)?;

        let selected: Vec<&URDFJoint> = match joint_names {
            None => {
                urdf_joints.iter().filter(|j| j.kind() != &URDFJointKind::Fixed).collect()
            }
            Some(joint_names) => {
                let mut out = vec![];
                for name in joint_names {
                    match urdf_joints.iter().find(|j| j.name() == *name) {
                        None => { return Err(OptimaError::new_invalid_input_error("JointLimitsModule::new_from_urdf_string", &format!("Joint {:?} is not in the urdf.", name), file!(), line!())) }
                        Some(j) => { out.push(j); }
                    }
                }
                out
            }
        };

        let mut joint_limits = vec![];
        for j in selected {
            let limit = match (j.kind(), j.stated_limits()) {
                (URDFJointKind::Revolute, Some((lower, upper))) => { JointLimit::new(j.name(), JointType::Revolute, lower, upper)? }
                (URDFJointKind::Revolute, None) | (URDFJointKind::Continuous, _) => { JointLimit::new_unbounded_revolute(j.name()) }
                (URDFJointKind::Prismatic, limits) => {
                    let (lower, upper) = limits.unwrap_or((0.0, 0.0));
                    JointLimit::new(j.name(), JointType::Prismatic, lower, upper)?
                }
                (kind, _) => {
                    return Err(OptimaError::new_unsupported_operation_error("JointLimitsModule::new_from_urdf_string", &format!("Joint {:?} has unsupported type {:?}.", j.name(), kind), file!(), line!()));
                }
            };
            joint_limits.push(limit);
        }

        return Self::new(joint_limits);
    }
    pub fn joint_limits(&self) -> &Vec<JointLimit> {
        &self.joint_limits
    }
    pub fn num_joints(&self) -> usize {
        self.joint_limits.len()
    }
    pub fn joint_names(&self) -> Vec<String> {
        self.joint_limits.iter().map(|l| l.joint_name().to_string()).collect()
    }
    pub fn joint_types(&self) -> Vec<JointType> {
        self.joint_limits.iter().map(|l| l.joint_type()).collect()
    }
    pub fn bounds(&self) -> Vec<(f64, f64)> {
        self.joint_limits.iter().map(|l| (l.lower(), l.upper())).collect()
    }
    /// Fits every joint value into its limits.  `Ok(None)` when at least one joint cannot be
    /// fitted.
    pub fn fit_configuration(&self, configuration: &RobotConfiguration) -> Result<Option<RobotConfiguration>, OptimaError> {
        if configuration.num_joints() != self.num_joints() {
            return Err(OptimaError::new_wrong_joint_count_error("JointLimitsModule::fit_configuration", configuration.num_joints(), self.num_joints(), file!(), line!()));
        }

        let mut out = configuration.clone();
        for (i, limit) in self.joint_limits.iter().enumerate() {
            match limit.fit_value(configuration.joint_values()[i]) {
                None => { return Ok(None); }
                Some(v) => { out.set_joint_value(i, v)?; }
            }
        }

        return Ok(Some(out));
    }
    /// Uniform sample within the limits.  Unbounded revolute joints are sampled in [-pi, pi);
    /// revolute joints bounded on one side only are sampled over one turn from that bound.
    pub fn sample_configuration(&self, seed: Option<u64>) -> Result<RobotConfiguration, OptimaError> {
        let mut bounds = vec![];
        for l in &self.joint_limits {
            if l.is_bounded() {
                bounds.push((l.lower(), l.upper()));
            } else {
                match l.joint_type() {
                    JointType::Revolute => {
                        let b = match (l.lower().is_finite(), l.upper().is_finite()) {
                            (true, false) => { (l.lower(), l.lower() + 2.0 * PI) }
                            (false, true) => { (l.upper() - 2.0 * PI, l.upper()) }
                            _ => { (-PI, PI) }
                        };
                        bounds.push(b);
                    }
                    JointType::Prismatic => {
                        return Err(OptimaError::new_unsupported_operation_error("JointLimitsModule::sample_configuration", &format!("Cannot sample unbounded prismatic joint {:?}.", l.joint_name()), file!(), line!()));
                    }
                }
            }
        }
        let samples = SimpleSamplers::uniform_samples(&bounds, seed);
        let configuration = RobotConfiguration::new(DVector::from_vec(samples), self.joint_types())?;
        return configuration.with_joint_names(self.joint_names());
    }
    pub fn print_summary(&self) {
        for (i, l) in self.joint_limits.iter().enumerate() {
            optima_print(&format!("Joint {} ({}) ---> ", i, l.joint_name()), PrintMode::Print, PrintColor::Blue, true);
            optima_print(&format!("{:?} [{}, {}]", l.joint_type(), l.lower(), l.upper()), PrintMode::Print, PrintColor::None, false);
            optima_print_new_line();
        }
    }
}
impl SaveAndLoadable for JointLimitsModule {
    /// Infinite bounds are saved as `None` since JSON has no infinity.
    type SaveType = Vec<(String, JointType, Option<f64>, Option<f64>)>;

    fn get_save_serialization_object(&self) -> Self::SaveType {
        self.joint_limits.iter().map(|l| {
            let lower = if l.lower().is_finite() { Some(l.lower()) } else { None };
            let upper = if l.upper().is_finite() { Some(l.upper()) } else { None };
            (l.joint_name().to_string(), l.joint_type(), lower, upper)
        }).collect()
    }

    fn load_from_json_string(json_str: &str) -> Result<Self, OptimaError> where Self: Sized {
        let load: Self::SaveType = FileUtils::load_object_from_json_string(json_str)?;
        let mut joint_limits = vec![];
        for (name, joint_type, lower, upper) in load {
            joint_limits.push(JointLimit::new(&name, joint_type, lower.unwrap_or(f64::NEG_INFINITY), upper.unwrap_or(f64::INFINITY))?);
        }
        return Self::new(joint_limits);
    }
}
