
//! Analytical inverse kinematics for six-axis industrial manipulators with a spherical wrist.
//! A target frame is mapped to the eight closed-form joint configurations of the robot (one per
//! shoulder/elbow/wrist branch), which are then fitted to the joint limits, filtered for
//! collisions and narrowed down by a selection policy.
//! The core library is written in Rust; an optional Python port is available via PyO3.

pub mod inverse_kinematics;
pub mod robot_modules;
pub mod utils;

#[cfg(all(feature = "python", not(target_arch = "wasm32")))]
use pyo3::prelude::*;

#[cfg(all(feature = "python", not(target_arch = "wasm32")))]
#[pymodule]
fn optima_analytical_ik(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<inverse_kinematics::analytical_ik_solver::AnalyticalIKSolverPy>()?;
    Ok(())
}
