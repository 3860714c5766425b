use std::convert::TryFrom;
use nalgebra::{Matrix3, Rotation3, UnitQuaternion, Vector3};
use serde::{Serialize, Deserialize};
use crate::utils::utils_errors::OptimaError;

/// Smallest axis length accepted when building a frame.
const MIN_AXIS_NORM: f64 = 1e-12;
/// Smallest |x cross y| accepted when building a frame.
const MIN_CROSS_NORM: f64 = 1e-9;

/// A right-handed frame given by an origin point and two orthonormal axes.  The z-axis is always
/// `x cross y`.
///
/// Construction normalizes both axes and recomputes the y-axis from `z cross x`, so a slightly
/// skewed pair of axes is corrected into an orthonormal frame while the x-axis direction is kept.
///
/// ## Example
/// ```
/// use nalgebra::Vector3;
/// use optima_analytical_ik::utils::utils_se3::optima_frame::OptimaFrame;
///
/// let frame = OptimaFrame::new(Vector3::new(0.5, 0.0, 1.0), Vector3::new(2.0, 0.0, 0.0), Vector3::new(0.1, 1.0, 0.0)).unwrap();
/// assert!((frame.yaxis() - Vector3::new(0.0, 1.0, 0.0)).norm() < 1e-12);
/// assert!((frame.zaxis() - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-12);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "OptimaFrameDescriptor")]
pub struct OptimaFrame {
    point: Vector3<f64>,
    xaxis: Vector3<f64>,
    yaxis: Vector3<f64>
}
impl OptimaFrame {
    pub fn new(point: Vector3<f64>, xaxis: Vector3<f64>, yaxis: Vector3<f64>) -> Result<Self, OptimaError> {
        if !(point.iter().all(|v| v.is_finite()) && xaxis.iter().all(|v| v.is_finite()) && yaxis.iter().all(|v| v.is_finite())) {
            return Err(OptimaError::new_invalid_input_error("OptimaFrame::new", "Frame contains non-finite values.", file!(), line!()));
        }
        let xnorm = xaxis.norm();
        let ynorm = yaxis.norm();
        if xnorm < MIN_AXIS_NORM || ynorm < MIN_AXIS_NORM {
            return Err(OptimaError::new_invalid_input_error("OptimaFrame::new", &format!("Frame axes must have non-zero length (|x| = {}, |y| = {}).", xnorm, ynorm), file!(), line!()));
        }

        let xaxis = xaxis / xnorm;
        let yaxis = yaxis / ynorm;
        let zaxis = xaxis.cross(&yaxis);
        let znorm = zaxis.norm();
        if znorm < MIN_CROSS_NORM {
            return Err(OptimaError::new_invalid_input_error("OptimaFrame::new", "Frame x and y axes are parallel.", file!(), line!()));
        }
        let zaxis = zaxis / znorm;
        let yaxis = zaxis.cross(&xaxis);

        Ok(Self {
            point,
            xaxis,
            yaxis
        })
    }
    /// The world XY frame: origin at zero, x = (1,0,0), y = (0,1,0).
    pub fn new_world_xy() -> Self {
        Self {
            point: Vector3::zeros(),
            xaxis: Vector3::x(),
            yaxis: Vector3::y()
        }
    }
    /// Builds a frame whose axes are the columns of the given rotation.
    pub fn new_from_rotation_and_point(rotation: &Rotation3<f64>, point: Vector3<f64>) -> Self {
        let m = rotation.matrix();
        Self {
            point,
            xaxis: Vector3::new(m[(0,0)], m[(1,0)], m[(2,0)]),
            yaxis: Vector3::new(m[(0,1)], m[(1,1)], m[(2,1)])
        }
    }
    pub fn new_from_quaternion(quaternion: &UnitQuaternion<f64>, point: Vector3<f64>) -> Self {
        return Self::new_from_rotation_and_point(&quaternion.to_rotation_matrix(), point);
    }
    /// Roll-pitch-yaw angles (applied about fixed x, then y, then z) and a translation.
    pub fn new_from_euler_angles(rx: f64, ry: f64, rz: f64, x: f64, y: f64, z: f64) -> Self {
        let rotation = Rotation3::from_euler_angles(rx, ry, rz);
        return Self::new_from_rotation_and_point(&rotation, Vector3::new(x, y, z));
    }
    pub fn point(&self) -> &Vector3<f64> {
        &self.point
    }
    pub fn xaxis(&self) -> &Vector3<f64> {
        &self.xaxis
    }
    pub fn yaxis(&self) -> &Vector3<f64> {
        &self.yaxis
    }
    pub fn zaxis(&self) -> Vector3<f64> {
        self.xaxis.cross(&self.yaxis)
    }
    /// Rotation whose columns are the frame axes.
    pub fn rotation(&self) -> Rotation3<f64> {
        let matrix = Matrix3::from_columns(&[self.xaxis, self.yaxis, self.zaxis()]);
        return Rotation3::from_matrix_unchecked(matrix);
    }
    pub fn quaternion(&self) -> UnitQuaternion<f64> {
        return UnitQuaternion::from_rotation_matrix(&self.rotation());
    }
    /// Same orientation, origin moved by the given world-space offset.
    pub fn translated(&self, offset: &Vector3<f64>) -> Self {
        Self {
            point: self.point + offset,
            xaxis: self.xaxis,
            yaxis: self.yaxis
        }
    }
    /// Maps a point given in this frame's coordinates to world coordinates.
    pub fn to_world_coordinates(&self, local_point: &Vector3<f64>) -> Vector3<f64> {
        return self.point + self.rotation() * local_point;
    }
    /// Maps a world point into this frame's coordinates.
    pub fn to_local_coordinates(&self, world_point: &Vector3<f64>) -> Vector3<f64> {
        return self.rotation().transpose() * (world_point - self.point);
    }
    pub fn position_distance(&self, other: &OptimaFrame) -> f64 {
        return (self.point - other.point).norm();
    }
    /// Angle (radians) of the relative rotation between the two frames.
    pub fn orientation_distance(&self, other: &OptimaFrame) -> f64 {
        return rotation_angle_between(&self.rotation(), &other.rotation());
    }
    pub fn is_close(&self, other: &OptimaFrame, position_tolerance: f64, orientation_tolerance: f64) -> bool {
        return self.position_distance(other) <= position_tolerance && self.orientation_distance(other) <= orientation_tolerance;
    }
}
/// Angle of the relative rotation `a^T b`, computed with atan2 so that nearly identical rotations
/// give 0 instead of NaN.
pub fn rotation_angle_between(a: &Rotation3<f64>, b: &Rotation3<f64>) -> f64 {
    let r = a.transpose() * b;
    let m = r.matrix();
    let cos_part = (m[(0,0)] + m[(1,1)] + m[(2,2)] - 1.0) / 2.0;
    let sin_part = 0.5 * Vector3::new(m[(2,1)] - m[(1,2)], m[(0,2)] - m[(2,0)], m[(1,0)] - m[(0,1)]).norm();
    return sin_part.atan2(cos_part);
}

impl Default for OptimaFrame {
    fn default() -> Self {
        Self::new_world_xy()
    }
}

/// Unvalidated serialized form of an `OptimaFrame`.  Deserialization goes through
/// `OptimaFrame::new`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OptimaFrameDescriptor {
    point: Vector3<f64>,
    xaxis: Vector3<f64>,
    yaxis: Vector3<f64>
}
impl TryFrom<OptimaFrameDescriptor> for OptimaFrame {
    type Error = OptimaError;

    fn try_from(value: OptimaFrameDescriptor) -> Result<Self, Self::Error> {
        OptimaFrame::new(value.point, value.xaxis, value.yaxis)
    }
}
