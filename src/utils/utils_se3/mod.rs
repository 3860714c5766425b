pub mod homogeneous_matrix;
pub mod optima_frame;
