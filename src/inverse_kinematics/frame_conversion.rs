use nalgebra::Vector3;
use serde::{Serialize, Deserialize};
use crate::utils::utils_errors::OptimaError;
use crate::utils::utils_se3::homogeneous_matrix::HomogeneousMatrix;
use crate::utils::utils_se3::optima_frame::OptimaFrame;

/// Where the robot base sits in the world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum BaseFrameSource {
    /// The base never moves.
    Fixed(OptimaFrame),
    /// The base rides on prismatic external axes (e.g., an x/y/z gantry).  `axes` are world
    /// directions; the external-axis values of a configuration move `home_frame` along them.
    LinearAxes { home_frame: OptimaFrame, axes: Vec<Vector3<f64>> }
}
impl BaseFrameSource {
    pub fn new_linear_axes(home_frame: OptimaFrame, axes: Vec<Vector3<f64>>) -> Result<Self, OptimaError> {
        let mut unit_axes = vec![];
        for (i, a) in axes.iter().enumerate() {
            let n = a.norm();
            if !n.is_finite() || n < 1e-12 {
                return Err(OptimaError::new_invalid_input_error("BaseFrameSource::new_linear_axes", &format!("External axis {} has no direction.", i), file!(), line!()));
            }
            unit_axes.push(a / n);
        }
        Ok(Self::LinearAxes { home_frame, axes: unit_axes })
    }
    pub fn num_external_axes(&self) -> usize {
        match self {
            BaseFrameSource::Fixed(_) => { 0 }
            BaseFrameSource::LinearAxes { axes, .. } => { axes.len() }
        }
    }
    /// The base frame for the given external-axis values.
    pub fn base_frame(&self, external_axis_values: &[f64]) -> Result<OptimaFrame, OptimaError> {
        if external_axis_values.len() != self.num_external_axes() {
            return Err(OptimaError::new_wrong_joint_count_error("BaseFrameSource::base_frame", external_axis_values.len(), self.num_external_axes(), file!(), line!()));
        }
        return match self {
            BaseFrameSource::Fixed(frame) => { Ok(frame.clone()) }
            BaseFrameSource::LinearAxes { home_frame, axes } => {
                let mut offset = Vector3::zeros();
                for (axis, value) in axes.iter().zip(external_axis_values.iter()) {
                    offset += axis * *value;
                }
                Ok(home_frame.translated(&offset))
            }
        }
    }
}

/// Converts target frames given in world coordinates into flange frames in robot coordinates:
/// `flange = T(base)^-1 * target * T(tool)^-1`.  Both inverses are computed once, when the base
/// or tool frame is set.
///
/// ## Example
/// ```
/// use nalgebra::Vector3;
/// use optima_analytical_ik::inverse_kinematics::frame_conversion::FrameConversion;
/// use optima_analytical_ik::utils::utils_se3::optima_frame::OptimaFrame;
///
/// let base = OptimaFrame::new_from_euler_angles(0.0, 0.0, 0.0, 1.0, 0.0, 0.0);
/// let conversion = FrameConversion::new(Some(&base), None);
/// let target = OptimaFrame::new_from_euler_angles(0.0, 0.0, 0.0, 3.0, 0.0, 1.0);
/// let flange = conversion.convert_to_flange_frame(&target);
/// assert!((flange.point() - Vector3::new(2.0, 0.0, 1.0)).norm() < 1e-12);
/// ```
#[derive(Clone, Debug, Default)]
pub struct FrameConversion {
    base_transformation: Option<HomogeneousMatrix>,
    tool_transformation: Option<HomogeneousMatrix>
}
impl FrameConversion {
    pub fn new(base_frame: Option<&OptimaFrame>, tool_frame: Option<&OptimaFrame>) -> Self {
        let mut out_self = Self::default();
        out_self.update_base_frame(base_frame);
        out_self.update_tool_frame(tool_frame);
        out_self
    }
    /// Sets (or clears) the robot base frame in world coordinates.
    pub fn update_base_frame(&mut self, base_frame: Option<&OptimaFrame>) {
        self.base_transformation = base_frame.map(|f| HomogeneousMatrix::new_from_frame(f).inverse());
    }
    /// Sets (or clears) the tool centre point frame, expressed in flange coordinates.
    pub fn update_tool_frame(&mut self, tool_frame: Option<&OptimaFrame>) {
        self.tool_transformation = tool_frame.map(|f| HomogeneousMatrix::new_from_frame(f).inverse());
    }
    /// A copy of this conversion with another base frame.
    pub fn with_base_frame(&self, base_frame: Option<&OptimaFrame>) -> Self {
        let mut out_self = self.clone();
        out_self.update_base_frame(base_frame);
        out_self
    }
    pub fn base_transformation(&self) -> &Option<HomogeneousMatrix> {
        &self.base_transformation
    }
    pub fn tool_transformation(&self) -> &Option<HomogeneousMatrix> {
        &self.tool_transformation
    }
    pub fn convert_to_flange_frame(&self, frame_wcf: &OptimaFrame) -> OptimaFrame {
        let mut t = HomogeneousMatrix::new_from_frame(frame_wcf);
        if let Some(base) = &self.base_transformation { t = base.multiply(&t); }
        if let Some(tool) = &self.tool_transformation { t = t.multiply(tool); }
        return t.to_frame();
    }
    /// Inverse of `convert_to_flange_frame`: where the tool ends up in world coordinates when
    /// the flange is at the given robot-frame pose.
    pub fn convert_to_world_frame(&self, flange_frame_rcf: &OptimaFrame) -> OptimaFrame {
        let mut t = HomogeneousMatrix::new_from_frame(flange_frame_rcf);
        if let Some(base) = &self.base_transformation { t = base.inverse().multiply(&t); }
        if let Some(tool) = &self.tool_transformation { t = t.multiply(&tool.inverse()); }
        return t.to_frame();
    }
}
