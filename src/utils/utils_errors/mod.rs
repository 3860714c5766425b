use std::fmt;

/// A common error type returned by functions throughout the crate.
///
/// Unreachable IK branches are never reported through this type (they are `None` slots in the
/// solution set); only malformed inputs and I/O or parsing failures end up here.
#[derive(Clone, Debug, PartialEq)]
pub enum OptimaError {
    IdxOutOfBoundError(String),
    UnsupportedOperationError(String),
    WrongJointCountError(String),
    InvalidInputError(String),
    SerializationError(String)
}
impl OptimaError {
    pub fn new_idx_out_of_bound_error(given_idx: usize, length_of_array: usize, file: &str, line: u32) -> Self {
        let s = format!("ERROR: Index {:?} is too large for the array of length {:?} -- File: {}, Line: {}", given_idx, length_of_array, file, line);
        return Self::IdxOutOfBoundError(s)
    }
    pub fn new_unsupported_operation_error(function_name: &str, message: &str, file: &str, line: u32) -> Self {
        let s = format!("ERROR: Unsupported operation error in function {}.  {} -- File: {}, Line: {}", function_name, message, file, line);
        return Self::UnsupportedOperationError(s);
    }
    pub fn new_wrong_joint_count_error(function_name: &str, given_count: usize, correct_count: usize, file: &str, line: u32) -> Self {
        let s = format!("ERROR: Function {} was given {} joint values, but {} are required -- File: {}, Line: {}", function_name, given_count, correct_count, file, line);
        return Self::WrongJointCountError(s);
    }
    pub fn new_invalid_input_error(function_name: &str, message: &str, file: &str, line: u32) -> Self {
        let s = format!("ERROR: Invalid input given to function {}.  {} -- File: {}, Line: {}", function_name, message, file, line);
        return Self::InvalidInputError(s);
    }
    pub fn new_serialization_error(message: &str, file: &str, line: u32) -> Self {
        let s = format!("ERROR: Serialization error.  {} -- File: {}, Line: {}", message, file, line);
        return Self::SerializationError(s);
    }
    /// The full formatted message carried by the error.
    pub fn message(&self) -> &str {
        return match self {
            OptimaError::IdxOutOfBoundError(s) => { s }
            OptimaError::UnsupportedOperationError(s) => { s }
            OptimaError::WrongJointCountError(s) => { s }
            OptimaError::InvalidInputError(s) => { s }
            OptimaError::SerializationError(s) => { s }
        }
    }
}
impl fmt::Display for OptimaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
impl std::error::Error for OptimaError { }
