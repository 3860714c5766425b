use nalgebra::{Matrix3, Matrix4, Rotation3, Vector3, Vector4};
use serde::{Serialize, Deserialize};
use crate::utils::utils_se3::optima_frame::{OptimaFrame, rotation_angle_between};

/// A representation for an SE(3) transform composed of a 4x4 homogeneous transformation matrix.
///
/// ## Example
/// ```
/// use nalgebra::Vector3;
/// use optima_analytical_ik::utils::utils_se3::homogeneous_matrix::HomogeneousMatrix;
/// use optima_analytical_ik::utils::utils_se3::optima_frame::OptimaFrame;
///
/// let frame = OptimaFrame::new_from_euler_angles(0.2, 0.0, 1.0, 1.0, 2.0, 3.0);
/// let t = HomogeneousMatrix::new_from_frame(&frame);
/// let identity = t.multiply(&t.inverse());
/// assert!(identity.approximate_distance(&HomogeneousMatrix::new_identity()) < 1e-9);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HomogeneousMatrix {
    matrix: Matrix4<f64>
}
impl HomogeneousMatrix {
    pub fn new(matrix: Matrix4<f64>) -> Self {
        Self {
            matrix
        }
    }
    pub fn new_identity() -> Self {
        return Self::new(Matrix4::identity());
    }
    pub fn new_from_rotation_and_translation(rotation: &Rotation3<f64>, translation: &Vector3<f64>) -> Self {
        let matrix = Self::rotation_and_translation_to_homogeneous_matrix(rotation.matrix(), translation);
        return Self::new(matrix);
    }
    /// The transformation that maps the world XY frame onto the given frame.
    pub fn new_from_frame(frame: &OptimaFrame) -> Self {
        return Self::new_from_rotation_and_translation(&frame.rotation(), frame.point());
    }
    /// The frame obtained by applying this transformation to the world XY frame.
    pub fn to_frame(&self) -> OptimaFrame {
        return OptimaFrame::new_from_rotation_and_point(&self.rotation(), self.translation());
    }
    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }
    /// Returns the rotation component of the homogeneous matrix.
    pub fn rotation(&self) -> Rotation3<f64> {
        let mut mat3 = Matrix3::zeros();

        for i in 0..3 {
            for j in 0..3 {
                mat3[(i,j)] = self.matrix[(i,j)];
            }
        }

        return Rotation3::from_matrix_unchecked(mat3);
    }
    /// Returns the translation component of the homogeneous matrix.
    pub fn translation(&self) -> Vector3<f64> {
        return Vector3::new(self.matrix[(0,3)], self.matrix[(1,3)], self.matrix[(2,3)]);
    }
    /// multiplication
    pub fn multiply(&self, other: &HomogeneousMatrix) -> HomogeneousMatrix {
        let matrix = self.matrix * &other.matrix;
        return Self::new(matrix);
    }
    /// multiplication by a point
    pub fn multiply_by_point(&self, point: &Vector3<f64>) -> Vector3<f64> {
        let four_point = Vector4::new(point[0], point[1], point[2], 1.0);
        let result_point = self.matrix * &four_point;
        return Vector3::new(result_point[0], result_point[1], result_point[2]);
    }
    /// Inverse multiplies by the given point.  inverse multiplication is useful for placing the
    /// given point in the transform's local coordinate system.
    pub fn inverse_multiply_by_point(&self, point: &Vector3<f64>) -> Vector3<f64> {
        return self.inverse().multiply_by_point(&point);
    }
    /// The inverse transform such that T * T^-1 = I.  Uses the transpose of the rotation block.
    pub fn inverse(&self) -> Self {
        let rot_mat_transpose = self.rotation().transpose();
        let new_translation = -(rot_mat_transpose * self.translation());

        let matrix = Self::rotation_and_translation_to_homogeneous_matrix(rot_mat_transpose.matrix(), &new_translation);

        return Self::new(matrix);
    }
    /// The displacement transform such that T_self * T_disp = T_other.
    pub fn displacement(&self, other: &HomogeneousMatrix) -> HomogeneousMatrix {
        return self.inverse().multiply(&other);
    }
    /// Provides an approximate distance between two homogeneous matrices (rotation angle plus
    /// translation distance).  This is not an official distance metric.
    pub fn approximate_distance(&self, other: &HomogeneousMatrix) -> f64 {
        let angle_between = rotation_angle_between(&self.rotation(), &other.rotation());
        let translation_between = (self.translation() - other.translation()).norm();
        return angle_between + translation_between;
    }
    /// Convenience function for mapping rotation and translation components to a 4x4 matrix.
    pub fn rotation_and_translation_to_homogeneous_matrix(rot_mat: &Matrix3<f64>, translation: &Vector3<f64>) -> Matrix4<f64> {
        let mut out_mat = Matrix4::zeros();

        for i in 0..3 {
            for j in 0..3 {
                out_mat[(i,j)] = rot_mat[(i,j)];
            }
        }

        out_mat[(0,3)] = translation[0];
        out_mat[(1,3)] = translation[1];
        out_mat[(2,3)] = translation[2];

        out_mat[(3,3)] = 1.0;

        return out_mat;
    }
}
impl Default for HomogeneousMatrix {
    fn default() -> Self {
        Self::new_identity()
    }
}
