use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use rayon::prelude::*;
use serde::{Serialize, Deserialize};
use crate::inverse_kinematics::configuration_post_processor::{CollisionChecker, ConfigurationPostProcessor, IKSelectionPolicy, IKSolutionSlots};
use crate::inverse_kinematics::frame_conversion::{BaseFrameSource, FrameConversion};
use crate::inverse_kinematics::spherical_wrist_ik::SphericalWristIK;
use crate::robot_modules::robot_geometry_module::RobotGeometryTable;
use crate::robot_modules::robot_joint_limits_module::JointLimitsModule;
use crate::utils::utils_console::{optima_print, optima_print_warning, PrintColor, PrintMode};
use crate::utils::utils_errors::OptimaError;
use crate::utils::utils_files::FileUtils;
use crate::utils::utils_robot::robot_configuration::RobotConfiguration;
use crate::utils::utils_se3::optima_frame::OptimaFrame;

#[cfg(all(feature = "python", not(target_arch = "wasm32")))]
use pyo3::prelude::*;

/// Number of arm joints the closed-form solver produces.
pub const NUM_ARM_JOINTS: usize = 6;

/// Options of an IK query.  Loadable from TOML or JSON; missing fields take their defaults.
///
/// ## Example
/// ```
/// use optima_analytical_ik::inverse_kinematics::analytical_ik_solver::IKSolverSettings;
/// use optima_analytical_ik::inverse_kinematics::configuration_post_processor::IKSelectionPolicy;
///
/// let settings = IKSolverSettings::load_from_toml_string("selection_policy = \"Cull\"\navoid_collisions = true").unwrap();
/// assert_eq!(settings.selection_policy, IKSelectionPolicy::Cull);
/// assert!(settings.avoid_collisions);
/// assert_eq!(settings.fk_verification_tolerance, None);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IKSolverSettings {
    pub selection_policy: IKSelectionPolicy,
    /// Run the collision filter when a collision checker is installed.  Without one, the first
    /// solve prints a warning and solutions pass through unchecked.
    pub avoid_collisions: bool,
    /// When set, every solution is pushed back through forward kinematics and dropped if its
    /// flange pose is further than this (metres plus radians) from the requested one.
    pub fk_verification_tolerance: Option<f64>
}
impl IKSolverSettings {
    pub fn new(selection_policy: IKSelectionPolicy, avoid_collisions: bool) -> Self {
        Self {
            selection_policy,
            avoid_collisions,
            fk_verification_tolerance: None
        }
    }
    pub fn load_from_toml_string(toml_str: &str) -> Result<Self, OptimaError> {
        FileUtils::load_object_from_toml_string(toml_str)
    }
    /// Loads a `.toml` or `.json` settings file.
    pub fn load_from_file(path: &PathBuf) -> Result<Self, OptimaError> {
        let contents = FileUtils::read_file_contents_to_string(path)?;
        return match FileUtils::get_file_extension_string(path).as_deref() {
            Some("toml") => { Self::load_from_toml_string(&contents) }
            Some("json") => { FileUtils::load_object_from_json_string(&contents) }
            _ => {
                Err(OptimaError::new_unsupported_operation_error("IKSolverSettings::load_from_file", &format!("Settings file {:?} must have a .toml or .json extension.", path), file!(), line!()))
            }
        }
    }
}
impl Default for IKSolverSettings {
    fn default() -> Self {
        Self::new(IKSelectionPolicy::All, true)
    }
}

/// Analytical IK for a six-axis spherical-wrist robot, from a world-frame target to
/// limit-fitted, named, collision-filtered joint configurations.
///
/// `solve` only reads `self`, so one solver can serve many threads; `solve_batch` does exactly
/// that over rayon's thread pool.
///
/// ## Example
/// ```
/// use std::f64::consts::PI;
/// use optima_analytical_ik::inverse_kinematics::analytical_ik_solver::AnalyticalIKSolver;
/// use optima_analytical_ik::robot_modules::robot_joint_limits_module::JointLimitsModule;
///
/// let names = ["joint_1", "joint_2", "joint_3", "joint_4", "joint_5", "joint_6"];
/// let limits = JointLimitsModule::new_revolute_from_bounds(&names, &[(-PI, PI); 6]).unwrap();
/// let solver = AnalyticalIKSolver::new_from_robot_name("abb_irb4600_40_255", limits).unwrap();
///
/// let target = solver.compute_fk(&[0.1, 0.2, -0.3, 0.4, 0.5, 0.6]).unwrap();
/// let solutions = solver.solve(&target, None).unwrap();
/// assert_eq!(solutions.len(), 8);
/// for c in solutions.iter().flatten() {
///     assert!(solver.compute_fk(c.joint_values().as_slice()).unwrap().is_close(&target, 1e-6, 1e-6));
/// }
/// ```
#[derive(Clone)]
pub struct AnalyticalIKSolver {
    geometry_table: RobotGeometryTable,
    joint_limits: JointLimitsModule,
    frame_conversion: FrameConversion,
    base_frame_source: Option<BaseFrameSource>,
    collision_checker: Option<Arc<dyn CollisionChecker + Send + Sync>>,
    missing_checker_warned: Arc<AtomicBool>,
    settings: IKSolverSettings
}
impl AnalyticalIKSolver {
    pub fn new(geometry_table: RobotGeometryTable, joint_limits: JointLimitsModule) -> Result<Self, OptimaError> {
        if joint_limits.num_joints() != NUM_ARM_JOINTS {
            return Err(OptimaError::new_wrong_joint_count_error("AnalyticalIKSolver::new", joint_limits.num_joints(), NUM_ARM_JOINTS, file!(), line!()));
        }
        Ok(Self {
            geometry_table,
            joint_limits,
            frame_conversion: FrameConversion::default(),
            base_frame_source: None,
            collision_checker: None,
            missing_checker_warned: Arc::new(AtomicBool::new(false)),
            settings: IKSolverSettings::default()
        })
    }
    pub fn new_from_robot_name(robot_name: &str, joint_limits: JointLimitsModule) -> Result<Self, OptimaError> {
        let geometry_table = RobotGeometryTable::new_from_robot_name(robot_name)?;
        return Self::new(geometry_table, joint_limits);
    }
    /// Sets a fixed robot base frame in world coordinates.  Clears any base frame source.
    pub fn set_base_frame(&mut self, base_frame: Option<&OptimaFrame>) {
        self.base_frame_source = None;
        self.frame_conversion.update_base_frame(base_frame);
    }
    /// Sets a base frame source.  With linear external axes, a start configuration passed to
    /// `solve` places the base; without one the base sits at the home frame.
    pub fn set_base_frame_source(&mut self, base_frame_source: Option<BaseFrameSource>) -> Result<(), OptimaError> {
        match &base_frame_source {
            None => { self.frame_conversion.update_base_frame(None); }
            Some(source) => {
                let home = source.base_frame(&vec![0.0; source.num_external_axes()])?;
                self.frame_conversion.update_base_frame(Some(&home));
            }
        }
        self.base_frame_source = base_frame_source;
        Ok(())
    }
    /// Sets the tool centre point frame, in flange coordinates.
    pub fn set_tool_frame(&mut self, tool_frame: Option<&OptimaFrame>) {
        self.frame_conversion.update_tool_frame(tool_frame);
    }
    pub fn set_collision_checker(&mut self, collision_checker: Option<Arc<dyn CollisionChecker + Send + Sync>>) {
        self.collision_checker = collision_checker;
        self.missing_checker_warned = Arc::new(AtomicBool::new(false));
    }
    pub fn set_settings(&mut self, settings: IKSolverSettings) {
        self.settings = settings;
    }
    pub fn geometry_table(&self) -> &RobotGeometryTable {
        &self.geometry_table
    }
    pub fn joint_limits(&self) -> &JointLimitsModule {
        &self.joint_limits
    }
    pub fn frame_conversion(&self) -> &FrameConversion {
        &self.frame_conversion
    }
    pub fn settings(&self) -> &IKSolverSettings {
        &self.settings
    }
    pub fn num_external_axes(&self) -> usize {
        match &self.base_frame_source {
            None => { 0 }
            Some(source) => { source.num_external_axes() }
        }
    }
    /// Number of joint values a start configuration must carry: six arm joints followed by the
    /// external axes.
    pub fn num_start_configuration_joints(&self) -> usize {
        NUM_ARM_JOINTS + self.num_external_axes()
    }
    /// Solves with the solver's own settings.
    pub fn solve(&self, frame_wcf: &OptimaFrame, start_configuration: Option<&RobotConfiguration>) -> Result<IKSolutionSlots, OptimaError> {
        return self.solve_with_settings(frame_wcf, start_configuration, &self.settings);
    }
    pub fn solve_with_settings(&self, frame_wcf: &OptimaFrame, start_configuration: Option<&RobotConfiguration>, settings: &IKSolverSettings) -> Result<IKSolutionSlots, OptimaError> {
        let raw_solutions = self.compute_raw_solutions(frame_wcf, start_configuration, settings.fk_verification_tolerance)?;

        let mut slots = ConfigurationPostProcessor::fit_within_joint_limits(raw_solutions, &self.joint_limits)?;
        ConfigurationPostProcessor::attach_joint_names(&mut slots, &self.joint_limits)?;
        if settings.avoid_collisions {
            match &self.collision_checker {
                None => {
                    if !self.missing_checker_warned.swap(true, Ordering::Relaxed) {
                        optima_print_warning("no collision checker is set; IK solutions are not checked for collisions.");
                    }
                }
                Some(checker) => {
                    slots = ConfigurationPostProcessor::filter_collisions(slots, Some(checker.as_ref() as &dyn CollisionChecker));
                }
            }
        }

        let reference = start_configuration.map(|c| RobotConfiguration::new_from_revolute_values(&c.joint_values_as_vec()[..NUM_ARM_JOINTS]));
        return ConfigurationPostProcessor::select(slots, settings.selection_policy, reference.as_ref());
    }
    /// Solves every frame in parallel.  Results are in input order.
    pub fn solve_batch(&self, frames_wcf: &[OptimaFrame], start_configuration: Option<&RobotConfiguration>) -> Vec<Result<IKSolutionSlots, OptimaError>> {
        frames_wcf.par_iter().map(|f| self.solve(f, start_configuration)).collect()
    }
    /// The eight closed-form solutions in the robot's joint convention, before limit fitting,
    /// naming, collision filtering or selection.
    pub fn compute_raw_solutions(&self, frame_wcf: &OptimaFrame, start_configuration: Option<&RobotConfiguration>, fk_verification_tolerance: Option<f64>) -> Result<IKSolutionSlots, OptimaError> {
        let flange_frame = self.convert_to_flange_frame(frame_wcf, start_configuration)?;
        let raw = SphericalWristIK::solve(&flange_frame, self.geometry_table.dimensions());

        let mut out = Vec::with_capacity(raw.len());
        for solution in raw.iter() {
            let slot = match solution {
                None => { None }
                Some(raw_angles) => {
                    let verified = match fk_verification_tolerance {
                        None => { true }
                        Some(tolerance) => {
                            let fk = self.geometry_table.compute_fk_raw(raw_angles);
                            fk.position_distance(&flange_frame) + fk.orientation_distance(&flange_frame) <= tolerance
                        }
                    };
                    if verified {
                        let robot_angles = self.geometry_table.axis_corrections().raw_to_robot(raw_angles);
                        Some(RobotConfiguration::new_from_revolute_values(&robot_angles))
                    } else {
                        None
                    }
                }
            };
            out.push(slot);
        }

        Ok(out)
    }
    /// World-frame tool pose for the given joint values: six arm joints, followed by the
    /// external axes when the base rides on them.
    pub fn compute_fk(&self, joint_values: &[f64]) -> Result<OptimaFrame, OptimaError> {
        let n = self.num_external_axes();
        if joint_values.len() != NUM_ARM_JOINTS && joint_values.len() != NUM_ARM_JOINTS + n {
            return Err(OptimaError::new_wrong_joint_count_error("AnalyticalIKSolver::compute_fk", joint_values.len(), NUM_ARM_JOINTS + n, file!(), line!()));
        }
        let flange = self.geometry_table.compute_fk(&joint_values[..NUM_ARM_JOINTS])?;

        return match (&self.base_frame_source, joint_values.len() > NUM_ARM_JOINTS) {
            (Some(source), true) => {
                let base_frame = source.base_frame(&joint_values[NUM_ARM_JOINTS..])?;
                Ok(self.frame_conversion.with_base_frame(Some(&base_frame)).convert_to_world_frame(&flange))
            }
            _ => { Ok(self.frame_conversion.convert_to_world_frame(&flange)) }
        }
    }
    fn convert_to_flange_frame(&self, frame_wcf: &OptimaFrame, start_configuration: Option<&RobotConfiguration>) -> Result<OptimaFrame, OptimaError> {
        let start = match start_configuration {
            None => { return Ok(self.frame_conversion.convert_to_flange_frame(frame_wcf)); }
            Some(start) => { start }
        };

        let n = self.num_start_configuration_joints();
        if start.num_joints() != n {
            return Err(OptimaError::new_wrong_joint_count_error("AnalyticalIKSolver::solve", start.num_joints(), n, file!(), line!()));
        }
        if start.joint_values().iter().any(|v| !v.is_finite()) {
            return Err(OptimaError::new_invalid_input_error("AnalyticalIKSolver::solve", "Start configuration contains non-finite values.", file!(), line!()));
        }

        return match &self.base_frame_source {
            Some(source) if source.num_external_axes() > 0 => {
                let base_frame = source.base_frame(&start.joint_values_as_vec()[NUM_ARM_JOINTS..])?;
                Ok(self.frame_conversion.with_base_frame(Some(&base_frame)).convert_to_flange_frame(frame_wcf))
            }
            _ => { Ok(self.frame_conversion.convert_to_flange_frame(frame_wcf)) }
        }
    }
    pub fn print_summary(&self) {
        optima_print("Analytical IK solver ---> ", PrintMode::Println, PrintColor::Cyan, true);
        self.geometry_table.print_summary();
        self.joint_limits.print_summary();
        optima_print(&format!("   > external axes: {}", self.num_external_axes()), PrintMode::Println, PrintColor::None, false);
        optima_print(&format!("   > collision checker: {}", if self.collision_checker.is_some() { "set" } else { "none" }), PrintMode::Println, PrintColor::None, false);
        optima_print(&format!("   > settings: {:?}", self.settings), PrintMode::Println, PrintColor::None, false);
    }
}

/// Python implementations.
#[cfg(all(feature = "python", not(target_arch = "wasm32")))]
#[pyclass]
pub struct AnalyticalIKSolverPy {
    solver: AnalyticalIKSolver
}
#[cfg(all(feature = "python", not(target_arch = "wasm32")))]
#[pymethods]
impl AnalyticalIKSolverPy {
    #[new]
    pub fn new_py(robot_name: &str, lower_limits: Vec<f64>, upper_limits: Vec<f64>, joint_names: Option<Vec<String>>) -> PyResult<Self> {
        let joint_names = match joint_names {
            None => { (1..=NUM_ARM_JOINTS).map(|i| format!("joint_{}", i)).collect::<Vec<String>>() }
            Some(joint_names) => { joint_names }
        };
        if lower_limits.len() != joint_names.len() || upper_limits.len() != joint_names.len() {
            return Err(to_py_err(OptimaError::new_wrong_joint_count_error("AnalyticalIKSolverPy::new_py", lower_limits.len().min(upper_limits.len()), joint_names.len(), file!(), line!())));
        }
        let names: Vec<&str> = joint_names.iter().map(|s| s.as_str()).collect();
        let bounds: Vec<(f64, f64)> = lower_limits.iter().zip(upper_limits.iter()).map(|(l, u)| (*l, *u)).collect();
        let joint_limits = JointLimitsModule::new_revolute_from_bounds(&names, &bounds).map_err(to_py_err)?;
        let solver = AnalyticalIKSolver::new_from_robot_name(robot_name, joint_limits).map_err(to_py_err)?;
        Ok(Self { solver })
    }
    pub fn set_base_frame_py(&mut self, point: Vec<f64>, xaxis: Vec<f64>, yaxis: Vec<f64>) -> PyResult<()> {
        let frame = frame_from_vecs(&point, &xaxis, &yaxis).map_err(to_py_err)?;
        self.solver.set_base_frame(Some(&frame));
        Ok(())
    }
    pub fn set_tool_frame_py(&mut self, point: Vec<f64>, xaxis: Vec<f64>, yaxis: Vec<f64>) -> PyResult<()> {
        let frame = frame_from_vecs(&point, &xaxis, &yaxis).map_err(to_py_err)?;
        self.solver.set_tool_frame(Some(&frame));
        Ok(())
    }
    /// `selection_policy` is one of "All", "Cull" or "ClosestToStart".
    pub fn solve_py(&self, point: Vec<f64>, xaxis: Vec<f64>, yaxis: Vec<f64>, start_configuration: Option<Vec<f64>>, selection_policy: Option<&str>) -> PyResult<Vec<Option<Vec<f64>>>> {
        let frame = frame_from_vecs(&point, &xaxis, &yaxis).map_err(to_py_err)?;
        let mut settings = self.solver.settings().clone();
        if let Some(policy) = selection_policy {
            settings.selection_policy = match policy {
                "All" => { IKSelectionPolicy::All }
                "Cull" => { IKSelectionPolicy::Cull }
                "ClosestToStart" => { IKSelectionPolicy::ClosestToStart }
                _ => { return Err(to_py_err(OptimaError::new_invalid_input_error("AnalyticalIKSolverPy::solve_py", &format!("Unknown selection policy {:?}.", policy), file!(), line!()))); }
            };
        }
        let start = start_configuration.map(|v| RobotConfiguration::new_from_revolute_values(&v));
        let slots = self.solver.solve_with_settings(&frame, start.as_ref(), &settings).map_err(to_py_err)?;
        Ok(slots.iter().map(|s| s.as_ref().map(|c| c.joint_values_as_vec())).collect())
    }
    pub fn compute_fk_py(&self, joint_values: Vec<f64>) -> PyResult<(Vec<f64>, Vec<f64>, Vec<f64>)> {
        let frame = self.solver.compute_fk(&joint_values).map_err(to_py_err)?;
        Ok((frame.point().as_slice().to_vec(), frame.xaxis().as_slice().to_vec(), frame.yaxis().as_slice().to_vec()))
    }
}

#[cfg(all(feature = "python", not(target_arch = "wasm32")))]
fn to_py_err(e: OptimaError) -> PyErr {
    pyo3::exceptions::PyValueError::new_err(e.to_string())
}

#[cfg(all(feature = "python", not(target_arch = "wasm32")))]
fn frame_from_vecs(point: &[f64], xaxis: &[f64], yaxis: &[f64]) -> Result<OptimaFrame, OptimaError> {
    if point.len() != 3 || xaxis.len() != 3 || yaxis.len() != 3 {
        return Err(OptimaError::new_invalid_input_error("frame_from_vecs", "Frame point and axes must have three components each.", file!(), line!()));
    }
    return OptimaFrame::new(nalgebra::Vector3::from_column_slice(point), nalgebra::Vector3::from_column_slice(xaxis), nalgebra::Vector3::from_column_slice(yaxis));
}
