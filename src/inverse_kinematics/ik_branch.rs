use std::fmt;
use itertools::iproduct;
use serde::{Serialize, Deserialize};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;
use crate::utils::utils_errors::OptimaError;

/// Number of closed-form solution branches of a spherical-wrist arm.
pub const NUM_IK_BRANCHES: usize = 8;

/// Whether the wrist centre lies in front of or behind axis 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum ShoulderConfiguration {
    Front,
    Back
}
impl ShoulderConfiguration {
    pub fn bit(&self) -> usize {
        match self {
            ShoulderConfiguration::Front => { 0 }
            ShoulderConfiguration::Back => { 1 }
        }
    }
}

/// Which side of the shoulder-to-wrist line the elbow is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum ElbowConfiguration {
    Up,
    Down
}
impl ElbowConfiguration {
    pub fn bit(&self) -> usize {
        match self {
            ElbowConfiguration::Up => { 0 }
            ElbowConfiguration::Down => { 1 }
        }
    }
}

/// NoFlip keeps joint 5 in [0, pi]; Flip is the mirrored wrist solution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum WristConfiguration {
    NoFlip,
    Flip
}
impl WristConfiguration {
    pub fn bit(&self) -> usize {
        match self {
            WristConfiguration::NoFlip => { 0 }
            WristConfiguration::Flip => { 1 }
        }
    }
}

/// One of the eight solution branches.  `index()` is the slot the branch occupies in every IK
/// result, so the same index always refers to the same branch for a given robot.
///
/// ## Example
/// ```
/// use optima_analytical_ik::inverse_kinematics::ik_branch::*;
///
/// let branch = IKBranch::new(ShoulderConfiguration::Back, ElbowConfiguration::Up, WristConfiguration::Flip);
/// assert_eq!(branch.index(), 5);
/// assert_eq!(IKBranch::from_index(5).unwrap(), branch);
/// assert_eq!(IKBranch::all()[5], branch);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IKBranch {
    shoulder: ShoulderConfiguration,
    elbow: ElbowConfiguration,
    wrist: WristConfiguration
}
impl IKBranch {
    pub fn new(shoulder: ShoulderConfiguration, elbow: ElbowConfiguration, wrist: WristConfiguration) -> Self {
        Self {
            shoulder,
            elbow,
            wrist
        }
    }
    /// All eight branches in slot order.
    pub fn all() -> Vec<IKBranch> {
        iproduct!(ShoulderConfiguration::iter(), ElbowConfiguration::iter(), WristConfiguration::iter())
            .map(|(s, e, w)| IKBranch::new(s, e, w))
            .collect()
    }
    pub fn from_index(idx: usize) -> Result<Self, OptimaError> {
        if idx >= NUM_IK_BRANCHES {
            return Err(OptimaError::new_idx_out_of_bound_error(idx, NUM_IK_BRANCHES, file!(), line!()));
        }
        return Ok(Self::all()[idx]);
    }
    pub fn index(&self) -> usize {
        4 * self.shoulder.bit() + 2 * self.elbow.bit() + self.wrist.bit()
    }
    pub fn shoulder(&self) -> ShoulderConfiguration {
        self.shoulder
    }
    pub fn elbow(&self) -> ElbowConfiguration {
        self.elbow
    }
    pub fn wrist(&self) -> WristConfiguration {
        self.wrist
    }
}
impl fmt::Display for IKBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}/{:?}/{:?}", self.shoulder, self.elbow, self.wrist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumeration_order_matches_index() {
        let all = IKBranch::all();
        assert_eq!(all.len(), NUM_IK_BRANCHES);
        for (i, b) in all.iter().enumerate() {
            assert_eq!(b.index(), i);
        }
        assert_eq!(all[0], IKBranch::new(ShoulderConfiguration::Front, ElbowConfiguration::Up, WristConfiguration::NoFlip));
        assert_eq!(all[7], IKBranch::new(ShoulderConfiguration::Back, ElbowConfiguration::Down, WristConfiguration::Flip));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        assert!(matches!(IKBranch::from_index(8), Err(OptimaError::IdxOutOfBoundError(_))));
    }
}
