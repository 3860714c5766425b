use std::f64::consts::FRAC_PI_2;
use nalgebra::{Rotation3, Vector3};
use serde::{Serialize, Deserialize};
use crate::inverse_kinematics::ik_branch::{ElbowConfiguration, IKBranch, ShoulderConfiguration, WristConfiguration};
use crate::utils::utils_console::{optima_print, optima_print_new_line, PrintColor, PrintMode};
use crate::utils::utils_errors::OptimaError;
use crate::utils::utils_files::FileUtils;
use crate::utils::utils_math::angles::normalize_angle;
use crate::utils::utils_se3::optima_frame::OptimaFrame;
use crate::utils::utils_traits::SaveAndLoadable;

/// Tolerance on the coplanarity requirements of the characteristic points.
pub const GEOMETRY_TOLERANCE: f64 = 1e-9;

/// Raw joint angles of the closed-form model, before any per-robot correction.
pub type RawJointAngles = [f64; 6];

/// The four points that fully describe a spherical-wrist arm, all expressed at the kinematic
/// zero pose in the robot base frame:
/// - `p1`: a point on axis 2 (only x and z are used),
/// - `p2`: a point on axis 3,
/// - `p3`: the wrist centre, where axes 4, 5 and 6 intersect,
/// - `p4`: the flange centre, on +x from `p3`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CharacteristicPoints {
    p1: Vector3<f64>,
    p2: Vector3<f64>,
    p3: Vector3<f64>,
    p4: Vector3<f64>
}
impl CharacteristicPoints {
    pub fn new(p1: Vector3<f64>, p2: Vector3<f64>, p3: Vector3<f64>, p4: Vector3<f64>) -> Self {
        Self {
            p1,
            p2,
            p3,
            p4
        }
    }
    pub fn p1(&self) -> &Vector3<f64> {
        &self.p1
    }
    pub fn p2(&self) -> &Vector3<f64> {
        &self.p2
    }
    pub fn p3(&self) -> &Vector3<f64> {
        &self.p3
    }
    pub fn p4(&self) -> &Vector3<f64> {
        &self.p4
    }
}

/// Lengths and zero-pose angles derived from the characteristic points.  Angles are measured
/// in the arm plane as `atan2(z, x)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SphericalWristDimensions {
    shoulder_x: f64,
    shoulder_z: f64,
    lateral_offset: f64,
    upper_arm: (f64, f64),
    forearm: (f64, f64),
    upper_arm_length: f64,
    forearm_length: f64,
    upper_arm_zero_angle: f64,
    elbow_zero_angle: f64,
    wrist_offset: f64
}
impl SphericalWristDimensions {
    pub fn new_from_characteristic_points(points: &CharacteristicPoints) -> Result<Self, OptimaError> {
        let (p1, p2, p3, p4) = (points.p1(), points.p2(), points.p3(), points.p4());
        let all_finite = [p1, p2, p3, p4].iter().all(|p| p.iter().all(|v| v.is_finite()));
        if !all_finite {
            return Err(OptimaError::new_invalid_input_error("SphericalWristDimensions::new_from_characteristic_points", "Characteristic points must be finite.", file!(), line!()));
        }
        if (p3.y - p2.y).abs() > GEOMETRY_TOLERANCE || (p4.y - p2.y).abs() > GEOMETRY_TOLERANCE {
            return Err(OptimaError::new_invalid_input_error("SphericalWristDimensions::new_from_characteristic_points", &format!("p3 and p4 must lie in the arm plane y = {} (got p3.y = {}, p4.y = {}).", p2.y, p3.y, p4.y), file!(), line!()));
        }
        if (p4.z - p3.z).abs() > GEOMETRY_TOLERANCE {
            return Err(OptimaError::new_invalid_input_error("SphericalWristDimensions::new_from_characteristic_points", &format!("p4 must be level with p3 (got p3.z = {}, p4.z = {}).", p3.z, p4.z), file!(), line!()));
        }

        let upper_arm = (p2.x - p1.x, p2.z - p1.z);
        let forearm = (p3.x - p2.x, p3.z - p2.z);
        let upper_arm_length = (upper_arm.0 * upper_arm.0 + upper_arm.1 * upper_arm.1).sqrt();
        let forearm_length = (forearm.0 * forearm.0 + forearm.1 * forearm.1).sqrt();
        let wrist_offset = p4.x - p3.x;

        if upper_arm_length <= GEOMETRY_TOLERANCE || forearm_length <= GEOMETRY_TOLERANCE {
            return Err(OptimaError::new_invalid_input_error("SphericalWristDimensions::new_from_characteristic_points", &format!("Upper arm and forearm lengths must be positive (got {} and {}).", upper_arm_length, forearm_length), file!(), line!()));
        }
        if wrist_offset < 0.0 {
            return Err(OptimaError::new_invalid_input_error("SphericalWristDimensions::new_from_characteristic_points", &format!("p4 must not lie behind p3 (wrist offset {}).", wrist_offset), file!(), line!()));
        }

        let upper_arm_zero_angle = upper_arm.1.atan2(upper_arm.0);
        let forearm_zero_angle = forearm.1.atan2(forearm.0);

        Ok(Self {
            shoulder_x: p1.x,
            shoulder_z: p1.z,
            lateral_offset: p2.y,
            upper_arm,
            forearm,
            upper_arm_length,
            forearm_length,
            upper_arm_zero_angle,
            elbow_zero_angle: normalize_angle(forearm_zero_angle - upper_arm_zero_angle),
            wrist_offset
        })
    }
    pub fn shoulder_x(&self) -> f64 {
        self.shoulder_x
    }
    pub fn shoulder_z(&self) -> f64 {
        self.shoulder_z
    }
    /// Distance of the arm plane from axis 1.
    pub fn lateral_offset(&self) -> f64 {
        self.lateral_offset
    }
    pub fn upper_arm_length(&self) -> f64 {
        self.upper_arm_length
    }
    pub fn forearm_length(&self) -> f64 {
        self.forearm_length
    }
    pub fn upper_arm_zero_angle(&self) -> f64 {
        self.upper_arm_zero_angle
    }
    /// Angle from the upper arm to the forearm at the zero pose.
    pub fn elbow_zero_angle(&self) -> f64 {
        self.elbow_zero_angle
    }
    pub fn wrist_offset(&self) -> f64 {
        self.wrist_offset
    }
    pub fn upper_arm_vector(&self) -> Vector3<f64> {
        Vector3::new(self.upper_arm.0, 0.0, self.upper_arm.1)
    }
    pub fn forearm_vector(&self) -> Vector3<f64> {
        Vector3::new(self.forearm.0, 0.0, self.forearm.1)
    }
    pub fn shoulder_point(&self) -> Vector3<f64> {
        Vector3::new(self.shoulder_x, self.lateral_offset, self.shoulder_z)
    }
}

/// Per-axis affine remap `robot_q = sign * raw_q + offset` between the closed-form model's raw
/// joint convention and the robot's own joint convention.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisCorrections {
    signs: [f64; 6],
    offsets: [f64; 6]
}
impl AxisCorrections {
    pub fn new(signs: [f64; 6], offsets: [f64; 6]) -> Result<Self, OptimaError> {
        for (i, s) in signs.iter().enumerate() {
            if *s != 1.0 && *s != -1.0 {
                return Err(OptimaError::new_invalid_input_error("AxisCorrections::new", &format!("Sign of axis {} must be 1 or -1 (got {}).", i + 1, s), file!(), line!()));
            }
        }
        if offsets.iter().any(|o| !o.is_finite()) {
            return Err(OptimaError::new_invalid_input_error("AxisCorrections::new", "Axis offsets must be finite.", file!(), line!()));
        }
        Ok(Self {
            signs,
            offsets
        })
    }
    pub fn new_identity() -> Self {
        Self {
            signs: [1.0; 6],
            offsets: [0.0; 6]
        }
    }
    pub fn signs(&self) -> &[f64; 6] {
        &self.signs
    }
    pub fn offsets(&self) -> &[f64; 6] {
        &self.offsets
    }
    pub fn raw_to_robot(&self, raw: &RawJointAngles) -> RawJointAngles {
        let mut out = [0.0; 6];
        for i in 0..6 {
            out[i] = normalize_angle(self.signs[i] * raw[i] + self.offsets[i]);
        }
        out
    }
    pub fn robot_to_raw(&self, robot: &RawJointAngles) -> RawJointAngles {
        let mut out = [0.0; 6];
        for i in 0..6 {
            out[i] = normalize_angle(self.signs[i] * (robot[i] - self.offsets[i]));
        }
        out
    }
}
impl Default for AxisCorrections {
    fn default() -> Self {
        Self::new_identity()
    }
}

/// Constant geometric data of one robot model: its characteristic points, the derived
/// dimensions the closed-form solver works with, and the axis corrections into the robot's own
/// joint convention.  Also provides forward kinematics of the same model.
///
/// ## Example
/// ```
/// use optima_analytical_ik::robot_modules::robot_geometry_module::RobotGeometryTable;
///
/// let table = RobotGeometryTable::new_from_robot_name("abb_irb4600_40_255").unwrap();
/// let flange = table.compute_fk(&[0.0; 6]).unwrap();
/// assert!((flange.point()[0] - 1.581).abs() < 1e-9);
/// assert!((flange.point()[2] - 1.765).abs() < 1e-9);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct RobotGeometryTable {
    robot_name: String,
    characteristic_points: CharacteristicPoints,
    axis_corrections: AxisCorrections,
    dimensions: SphericalWristDimensions
}
impl RobotGeometryTable {
    pub fn new(robot_name: &str, characteristic_points: CharacteristicPoints, axis_corrections: AxisCorrections) -> Result<Self, OptimaError> {
        let dimensions = SphericalWristDimensions::new_from_characteristic_points(&characteristic_points)?;
        Ok(Self {
            robot_name: robot_name.to_string(),
            characteristic_points,
            axis_corrections,
            dimensions
        })
    }
    /// Built-in tables.  See `available_robot_names` for the accepted names.
    pub fn new_from_robot_name(robot_name: &str) -> Result<Self, OptimaError> {
        return match robot_name {
            "abb_irb4600_40_255" => {
                Self::new(robot_name, CharacteristicPoints::new(
                    Vector3::new(0.175, 0.0, 0.495),
                    Vector3::new(0.175, 0.0, 1.590),
                    Vector3::new(1.446, 0.0, 1.765),
                    Vector3::new(1.581, 0.0, 1.765)
                ), AxisCorrections::new_identity())
            }
            "abb_irb120_3_58" => {
                Self::new(robot_name, CharacteristicPoints::new(
                    Vector3::new(0.0, 0.0, 0.290),
                    Vector3::new(0.0, 0.0, 0.560),
                    Vector3::new(0.302, 0.0, 0.630),
                    Vector3::new(0.374, 0.0, 0.630)
                ), AxisCorrections::new_identity())
            }
            "staubli_tx60l" => {
                // The zero pose of this arm is the upright "candle" pose with axis 5 turning
                // about -y, hence the sign and the offsets on axes 3 and 6.
                Self::new(robot_name, CharacteristicPoints::new(
                    Vector3::new(0.0, 0.0, 0.375),
                    Vector3::new(0.0, 0.020, 0.775),
                    Vector3::new(0.450, 0.020, 0.775),
                    Vector3::new(0.520, 0.020, 0.775)
                ), AxisCorrections::new([1.0, 1.0, 1.0, 1.0, -1.0, 1.0], [0.0, 0.0, FRAC_PI_2, 0.0, 0.0, FRAC_PI_2])?)
            }
            _ => {
                Err(OptimaError::new_invalid_input_error("RobotGeometryTable::new_from_robot_name", &format!("Unknown robot name {:?}.  Available robots are {:?}.", robot_name, Self::available_robot_names()), file!(), line!()))
            }
        }
    }
    pub fn available_robot_names() -> Vec<&'static str> {
        vec!["abb_irb4600_40_255", "abb_irb120_3_58", "staubli_tx60l"]
    }
    pub fn robot_name(&self) -> &str {
        &self.robot_name
    }
    pub fn characteristic_points(&self) -> &CharacteristicPoints {
        &self.characteristic_points
    }
    pub fn axis_corrections(&self) -> &AxisCorrections {
        &self.axis_corrections
    }
    pub fn dimensions(&self) -> &SphericalWristDimensions {
        &self.dimensions
    }
    /// Flange frame for the given joint values in the robot's own convention.
    pub fn compute_fk(&self, joint_values: &[f64]) -> Result<OptimaFrame, OptimaError> {
        let robot = to_joint_angle_array("RobotGeometryTable::compute_fk", joint_values)?;
        let raw = self.axis_corrections.robot_to_raw(&robot);
        return Ok(self.compute_fk_raw(&raw));
    }
    /// Flange frame for raw joint angles.
    pub fn compute_fk_raw(&self, raw: &RawJointAngles) -> OptimaFrame {
        let d = &self.dimensions;
        let base_to_forearm = Rotation3::from_axis_angle(&Vector3::z_axis(), raw[0]) * Rotation3::from_axis_angle(&Vector3::y_axis(), raw[1] + raw[2]);
        let wrist = self.compute_wrist_center_raw(raw);
        let rotation = base_to_forearm * Self::wrist_rotation(raw[3], raw[4], raw[5]) * Self::flange_zero_rotation();
        let flange = wrist + d.wrist_offset() * (rotation * Vector3::z());
        return OptimaFrame::new_from_rotation_and_point(&rotation, flange);
    }
    /// Position of the wrist centre for raw joint angles.
    pub fn compute_wrist_center_raw(&self, raw: &RawJointAngles) -> Vector3<f64> {
        let d = &self.dimensions;
        let base = Rotation3::from_axis_angle(&Vector3::z_axis(), raw[0]);
        let upper_arm = Rotation3::from_axis_angle(&Vector3::y_axis(), raw[1]);
        let forearm = Rotation3::from_axis_angle(&Vector3::y_axis(), raw[1] + raw[2]);
        return base * (d.shoulder_point() + upper_arm * d.upper_arm_vector() + forearm * d.forearm_vector());
    }
    /// The branch the given robot-convention joint values belong to.
    pub fn branch_of(&self, joint_values: &[f64]) -> Result<IKBranch, OptimaError> {
        let robot = to_joint_angle_array("RobotGeometryTable::branch_of", joint_values)?;
        let raw = self.axis_corrections.robot_to_raw(&robot);
        return Ok(self.branch_of_raw(&raw));
    }
    /// The branch the given raw joint angles belong to.  Configurations exactly on a branch
    /// boundary (wrist on axis 1, stretched elbow, joint 5 at zero) are assigned to the lower
    /// branch index.
    pub fn branch_of_raw(&self, raw: &RawJointAngles) -> IKBranch {
        let d = &self.dimensions;
        let in_plane = d.shoulder_x() + (Rotation3::from_axis_angle(&Vector3::y_axis(), raw[1]) * d.upper_arm_vector())[0] + (Rotation3::from_axis_angle(&Vector3::y_axis(), raw[1] + raw[2]) * d.forearm_vector())[0];
        let shoulder = if in_plane >= 0.0 { ShoulderConfiguration::Front } else { ShoulderConfiguration::Back };
        let elbow = if normalize_angle(raw[2] - d.elbow_zero_angle()) >= 0.0 { ElbowConfiguration::Up } else { ElbowConfiguration::Down };
        let q5 = normalize_angle(raw[4]);
        let wrist = if q5 >= 0.0 { WristConfiguration::NoFlip } else { WristConfiguration::Flip };
        return IKBranch::new(shoulder, elbow, wrist);
    }
    /// Rx(q4) * Ry(q5) * Rx(q6).
    pub fn wrist_rotation(q4: f64, q5: f64, q6: f64) -> Rotation3<f64> {
        Rotation3::from_axis_angle(&Vector3::x_axis(), q4) * Rotation3::from_axis_angle(&Vector3::y_axis(), q5) * Rotation3::from_axis_angle(&Vector3::x_axis(), q6)
    }
    /// Flange orientation at the zero pose relative to the forearm: flange z along +x.
    pub fn flange_zero_rotation() -> Rotation3<f64> {
        Rotation3::from_axis_angle(&Vector3::y_axis(), FRAC_PI_2)
    }
    pub fn print_summary(&self) {
        let d = &self.dimensions;
        optima_print(&format!("Robot geometry table {:?} ---> ", self.robot_name), PrintMode::Println, PrintColor::Blue, true);
        optima_print(&format!("   > p1: {:?}", self.characteristic_points.p1().as_slice()), PrintMode::Println, PrintColor::None, false);
        optima_print(&format!("   > p2: {:?}", self.characteristic_points.p2().as_slice()), PrintMode::Println, PrintColor::None, false);
        optima_print(&format!("   > p3: {:?}", self.characteristic_points.p3().as_slice()), PrintMode::Println, PrintColor::None, false);
        optima_print(&format!("   > p4: {:?}", self.characteristic_points.p4().as_slice()), PrintMode::Println, PrintColor::None, false);
        optima_print(&format!("   > upper arm length: {}", d.upper_arm_length()), PrintMode::Println, PrintColor::None, false);
        optima_print(&format!("   > forearm length: {}", d.forearm_length()), PrintMode::Println, PrintColor::None, false);
        optima_print(&format!("   > wrist offset: {}", d.wrist_offset()), PrintMode::Println, PrintColor::None, false);
        optima_print(&format!("   > lateral offset: {}", d.lateral_offset()), PrintMode::Println, PrintColor::None, false);
        optima_print(&format!("   > axis signs: {:?}", self.axis_corrections.signs()), PrintMode::Println, PrintColor::None, false);
        optima_print(&format!("   > axis offsets: {:?}", self.axis_corrections.offsets()), PrintMode::Println, PrintColor::None, false);
        optima_print_new_line();
    }
}
/// Six joint values as a fixed-size array, or `WrongJointCountError` for any other count.
pub fn to_joint_angle_array(function_name: &str, joint_values: &[f64]) -> Result<RawJointAngles, OptimaError> {
    return <RawJointAngles>::try_from(joint_values)
        .map_err(|_| OptimaError::new_wrong_joint_count_error(function_name, joint_values.len(), 6, file!(), line!()));
}

impl SaveAndLoadable for RobotGeometryTable {
    type SaveType = (String, CharacteristicPoints, AxisCorrections);

    fn get_save_serialization_object(&self) -> Self::SaveType {
        (self.robot_name.clone(), self.characteristic_points.clone(), self.axis_corrections.clone())
    }

    fn load_from_json_string(json_str: &str) -> Result<Self, OptimaError> where Self: Sized {
        let load: Self::SaveType = FileUtils::load_object_from_json_string(json_str)?;
        return Self::new(&load.0, load.1, load.2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::utils_traits::ToAndFromRonString;

    fn assert_frames_close(a: &OptimaFrame, b: &OptimaFrame) {
        assert!(a.is_close(b, 1e-9, 1e-9), "{:?} vs {:?}", a, b);
    }

    #[test]
    fn zero_pose_reproduces_characteristic_points() {
        for name in RobotGeometryTable::available_robot_names() {
            let table = RobotGeometryTable::new_from_robot_name(name).unwrap();
            let flange = table.compute_fk_raw(&[0.0; 6]);
            assert!((flange.point() - table.characteristic_points().p4()).norm() < 1e-12);
            assert!((flange.zaxis() - Vector3::x()).norm() < 1e-12);
            assert!((flange.xaxis() + Vector3::z()).norm() < 1e-12);
            let wrist = table.compute_wrist_center_raw(&[0.0; 6]);
            assert!((wrist - table.characteristic_points().p3()).norm() < 1e-12);
        }
    }

    #[test]
    fn staubli_zero_pose_is_upright() {
        let table = RobotGeometryTable::new_from_robot_name("staubli_tx60l").unwrap();
        let flange = table.compute_fk(&[0.0; 6]).unwrap();
        let expected = OptimaFrame::new(Vector3::new(0.0, 0.020, 1.295), Vector3::new(0.0, -1.0, 0.0), Vector3::new(1.0, 0.0, 0.0)).unwrap();
        assert_frames_close(&flange, &expected);
    }

    #[test]
    fn axis_corrections_invert() {
        let corrections = AxisCorrections::new([1.0, -1.0, 1.0, -1.0, 1.0, -1.0], [0.1, -0.2, 0.3, 0.0, 3.0, -3.0]).unwrap();
        let raw = [0.5, -1.0, 2.0, -3.0, 0.25, 1.5];
        let back = corrections.robot_to_raw(&corrections.raw_to_robot(&raw));
        for i in 0..6 {
            assert!(normalize_angle(back[i] - raw[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn invalid_sign_is_rejected() {
        assert!(AxisCorrections::new([1.0, 0.5, 1.0, 1.0, 1.0, 1.0], [0.0; 6]).is_err());
    }

    #[test]
    fn invalid_geometry_is_rejected() {
        let off_plane = CharacteristicPoints::new(Vector3::zeros(), Vector3::new(0.0, 0.0, 1.0), Vector3::new(1.0, 0.1, 1.0), Vector3::new(1.1, 0.1, 1.0));
        assert!(matches!(RobotGeometryTable::new("bad", off_plane, AxisCorrections::new_identity()), Err(OptimaError::InvalidInputError(_))));

        let degenerate = CharacteristicPoints::new(Vector3::zeros(), Vector3::zeros(), Vector3::new(1.0, 0.0, 0.0), Vector3::new(1.1, 0.0, 0.0));
        assert!(RobotGeometryTable::new("bad", degenerate, AxisCorrections::new_identity()).is_err());

        let flange_behind = CharacteristicPoints::new(Vector3::zeros(), Vector3::new(0.0, 0.0, 1.0), Vector3::new(1.0, 0.0, 1.0), Vector3::new(0.9, 0.0, 1.0));
        assert!(RobotGeometryTable::new("bad", flange_behind, AxisCorrections::new_identity()).is_err());
    }

    #[test]
    fn unknown_robot_name_is_rejected() {
        assert!(matches!(RobotGeometryTable::new_from_robot_name("ur5"), Err(OptimaError::InvalidInputError(_))));
    }

    #[test]
    fn wrong_joint_count_is_rejected() {
        let table = RobotGeometryTable::new_from_robot_name("abb_irb120_3_58").unwrap();
        assert!(matches!(table.compute_fk(&[0.0; 5]), Err(OptimaError::WrongJointCountError(_))));
        assert!(matches!(table.branch_of(&[0.0; 7]), Err(OptimaError::WrongJointCountError(_))));
        assert!(matches!(to_joint_angle_array("remap", &[0.0; 5]), Err(OptimaError::WrongJointCountError(_))));
        assert_eq!(to_joint_angle_array("remap", &[0.5; 6]).unwrap(), [0.5; 6]);
    }

    #[test]
    fn json_and_ron_round_trip() {
        let table = RobotGeometryTable::new_from_robot_name("staubli_tx60l").unwrap();
        let loaded = RobotGeometryTable::load_from_json_string(&table.get_serialization_string()).unwrap();
        assert_eq!(loaded, table);

        let ron_string = table.characteristic_points().convert_to_ron_string().unwrap();
        let points = CharacteristicPoints::load_from_ron_string(&ron_string).unwrap();
        assert_eq!(&points, table.characteristic_points());
    }

    #[test]
    fn geometry_table_round_trips_through_a_file() {
        let table = RobotGeometryTable::new_from_robot_name("abb_irb4600_40_255").unwrap();
        let path = std::env::temp_dir().join(format!("optima_analytical_ik_geometry_{}.json", std::process::id()));
        table.save_to_path(&path).unwrap();
        let loaded = RobotGeometryTable::load_from_path(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, table);
    }
}
