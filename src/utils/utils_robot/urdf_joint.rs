use serde::{Serialize, Deserialize};
use crate::utils::utils_errors::OptimaError;

/// Name, kind and stated limits of one joint in a URDF document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct URDFJoint {
    name: String,
    kind: URDFJointKind,
    stated_limits: Option<(f64, f64)>
}
impl URDFJoint {
    pub fn new_from_urdf_joint(joint: &urdf_rs::Joint) -> Self {
        // urdf_rs fills a missing <limit> element with zeros.
        let stated_limits = if joint.limit.lower != 0.0 || joint.limit.upper != 0.0 { Some((joint.limit.lower, joint.limit.upper)) } else { None };
        Self {
            name: joint.name.clone(),
            kind: URDFJointKind::from_urdf_joint_type(&joint.joint_type),
            stated_limits
        }
    }
    /// Parses URDF text and returns its joints in document order.
    pub fn new_all_from_urdf_string(urdf_string: &str) -> Result<Vec<Self>, OptimaError> {
        let robot = urdf_rs::read_from_string(urdf_string)
            .map_err(|e| OptimaError::new_serialization_error(&format!("Could not parse urdf string: {}", e), file!(), line!()))?;

        return Ok(robot.joints.iter().map(|j| Self::new_from_urdf_joint(j)).collect());
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn kind(&self) -> &URDFJointKind {
        &self.kind
    }
    pub fn stated_limits(&self) -> Option<(f64, f64)> {
        self.stated_limits
    }
}

/// URDF joint kinds as far as limit handling cares.  Everything that is neither a single-axis
/// joint nor fixed keeps its URDF type name for error messages.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum URDFJointKind {
    Revolute,
    Continuous,
    Prismatic,
    Fixed,
    Unsupported(String)
}
impl URDFJointKind {
    pub fn from_urdf_joint_type(j: &urdf_rs::JointType) -> Self {
        match j {
            urdf_rs::JointType::Revolute => { Self::Revolute }
            urdf_rs::JointType::Continuous => { Self::Continuous }
            urdf_rs::JointType::Prismatic => { Self::Prismatic }
            urdf_rs::JointType::Fixed => { Self::Fixed }
            other => { Self::Unsupported(format!("{:?}", other).to_lowercase()) }
        }
    }
}
