use ordered_float::OrderedFloat;
use serde::{Serialize, Deserialize};
use crate::inverse_kinematics::ik_branch::IKBranch;
use crate::robot_modules::robot_joint_limits_module::JointLimitsModule;
use crate::utils::utils_console::{optima_print, optima_print_warning, PrintColor, PrintMode};
use crate::utils::utils_errors::OptimaError;
use crate::utils::utils_robot::robot_configuration::RobotConfiguration;

/// Result of an IK query.  A `None` slot marks a branch that has no valid solution.  Before
/// culling or selection the vector has exactly eight slots and slot `i` belongs to
/// `IKBranch::from_index(i)`.
pub type IKSolutionSlots = Vec<Option<RobotConfiguration>>;

/// Reported by a collision checker that cannot answer right now (e.g., no backend connected).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollisionCheckUnavailable {
    reason: String
}
impl CollisionCheckUnavailable {
    pub fn new(reason: &str) -> Self {
        Self {
            reason: reason.to_string()
        }
    }
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Answers whether a configuration is in collision.
pub trait CollisionChecker {
    fn check_collision(&self, configuration: &RobotConfiguration) -> Result<bool, CollisionCheckUnavailable>;
}

/// Wraps a closure as a `CollisionChecker`.
///
/// ## Example
/// ```
/// use optima_analytical_ik::inverse_kinematics::configuration_post_processor::{CollisionChecker, FnCollisionChecker};
/// use optima_analytical_ik::utils::utils_robot::robot_configuration::RobotConfiguration;
///
/// let checker = FnCollisionChecker::new(|c: &RobotConfiguration| c.joint_values()[1] < -1.0);
/// assert_eq!(checker.check_collision(&RobotConfiguration::new_from_revolute_values(&[0.0, -1.5])), Ok(true));
/// ```
pub struct FnCollisionChecker<F> where F: Fn(&RobotConfiguration) -> bool {
    f: F
}
impl <F> FnCollisionChecker<F> where F: Fn(&RobotConfiguration) -> bool {
    pub fn new(f: F) -> Self {
        Self {
            f
        }
    }
}
impl <F> CollisionChecker for FnCollisionChecker<F> where F: Fn(&RobotConfiguration) -> bool {
    fn check_collision(&self, configuration: &RobotConfiguration) -> Result<bool, CollisionCheckUnavailable> {
        Ok((self.f)(configuration))
    }
}

/// What an IK query returns from the eight branch slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IKSelectionPolicy {
    /// All eight slots, `None`s included.
    All,
    /// Only the valid configurations, in branch order.
    Cull,
    /// The single valid configuration closest to the start configuration.
    ClosestToStart
}
impl Default for IKSelectionPolicy {
    fn default() -> Self {
        IKSelectionPolicy::All
    }
}

/// The steps that turn raw closed-form solutions into the configurations a caller receives:
/// joint-limit fitting, joint-name attachment, collision filtering and selection.
pub struct ConfigurationPostProcessor;
impl ConfigurationPostProcessor {
    /// Replaces every configuration with its limit-fitted version, or with `None` when some
    /// joint cannot be fitted.  Slots are never removed.
    pub fn fit_within_joint_limits(slots: IKSolutionSlots, joint_limits: &JointLimitsModule) -> Result<IKSolutionSlots, OptimaError> {
        let mut out = Vec::with_capacity(slots.len());
        for slot in slots {
            match slot {
                None => { out.push(None); }
                Some(c) => { out.push(joint_limits.fit_configuration(&c)?); }
            }
        }
        Ok(out)
    }
    /// Gives every valid configuration the joint names and joint types of `joint_limits`.
    pub fn attach_joint_names(slots: &mut IKSolutionSlots, joint_limits: &JointLimitsModule) -> Result<(), OptimaError> {
        let joint_names = joint_limits.joint_names();
        let joint_types = joint_limits.joint_types();
        for slot in slots.iter_mut() {
            if let Some(c) = slot {
                c.set_joint_names(joint_names.clone())?;
                c.set_joint_types(joint_types.clone())?;
            }
        }
        Ok(())
    }
    /// Clears every slot whose configuration is in collision.  Without a checker, or when the
    /// checker reports itself unavailable for any configuration, the slots pass through
    /// unchanged.
    pub fn filter_collisions(slots: IKSolutionSlots, collision_checker: Option<&dyn CollisionChecker>) -> IKSolutionSlots {
        let checker = match collision_checker {
            None => {
                optima_print_warning("no collision checker is set; IK solutions are not checked for collisions.");
                return slots;
            }
            Some(checker) => { checker }
        };

        let mut in_collision = vec![false; slots.len()];
        for (i, slot) in slots.iter().enumerate() {
            if let Some(c) = slot {
                match checker.check_collision(c) {
                    Ok(res) => { in_collision[i] = res; }
                    Err(e) => {
                        optima_print_warning(&format!("collision checking is unavailable ({}); IK solutions are not checked for collisions.", e.reason()));
                        return slots;
                    }
                }
            }
        }

        slots.into_iter().zip(in_collision.into_iter()).map(|(slot, collides)| if collides { None } else { slot }).collect()
    }
    /// Applies the selection policy.  `ClosestToStart` needs a reference configuration and
    /// returns an empty result when every slot is `None`; ties go to the lowest branch index.
    pub fn select(slots: IKSolutionSlots, policy: IKSelectionPolicy, reference: Option<&RobotConfiguration>) -> Result<IKSolutionSlots, OptimaError> {
        return match policy {
            IKSelectionPolicy::All => { Ok(slots) }
            IKSelectionPolicy::Cull => { Ok(slots.into_iter().filter(|s| s.is_some()).collect()) }
            IKSelectionPolicy::ClosestToStart => {
                let reference = match reference {
                    None => { return Err(OptimaError::new_invalid_input_error("ConfigurationPostProcessor::select", "ClosestToStart selection requires a start configuration.", file!(), line!())); }
                    Some(reference) => { reference }
                };

                let mut scored = vec![];
                for c in slots.into_iter().flatten() {
                    let distance = c.joint_space_distance(reference)?;
                    scored.push((OrderedFloat(distance), c));
                }

                // min_by_key keeps the first of equal minima, i.e. the lowest branch index.
                Ok(scored.into_iter().min_by_key(|(d, _)| *d).map(|(_, c)| Some(c)).into_iter().collect())
            }
        }
    }
    pub fn print_solutions_summary(slots: &IKSolutionSlots) {
        let full = slots.len() == IKBranch::all().len();
        for (i, slot) in slots.iter().enumerate() {
            let label = if full { IKBranch::all()[i].to_string() } else { format!("solution {}", i) };
            match slot {
                None => {
                    optima_print(&format!("{} ---> no solution", label), PrintMode::Println, PrintColor::Red, false);
                }
                Some(c) => {
                    optima_print(&format!("{} ---> ", label), PrintMode::Println, PrintColor::Green, true);
                    c.print_summary();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;
    use crate::robot_modules::robot_joint_limits_module::JointLimit;
    use crate::utils::utils_robot::robot_configuration::JointType;

    fn slots() -> IKSolutionSlots {
        vec![
            Some(RobotConfiguration::new_from_revolute_values(&[0.0, 0.0])),
            None,
            Some(RobotConfiguration::new_from_revolute_values(&[1.0, -1.0])),
            Some(RobotConfiguration::new_from_revolute_values(&[3.0, 0.5])),
            None,
            Some(RobotConfiguration::new_from_revolute_values(&[-1.0, 1.0])),
            Some(RobotConfiguration::new_from_revolute_values(&[-3.0, -0.5])),
            None
        ]
    }

    fn limits() -> JointLimitsModule {
        JointLimitsModule::new_revolute_from_bounds(&["j1", "j2"], &[(0.0, 2.0 * PI), (-0.75, 0.75)]).unwrap()
    }

    #[test]
    fn limit_fit_keeps_slot_count_and_is_idempotent() {
        let fitted = ConfigurationPostProcessor::fit_within_joint_limits(slots(), &limits()).unwrap();
        assert_eq!(fitted.len(), 8);
        let valid: Vec<usize> = fitted.iter().enumerate().filter(|(_, s)| s.is_some()).map(|(i, _)| i).collect();
        assert_eq!(valid, vec![0, 3, 6]);
        assert!((fitted[6].as_ref().unwrap().joint_values()[0] - (2.0 * PI - 3.0)).abs() < 1e-12);

        let twice = ConfigurationPostProcessor::fit_within_joint_limits(fitted.clone(), &limits()).unwrap();
        assert_eq!(twice, fitted);
    }

    #[test]
    fn limit_fit_rejects_wrong_joint_count() {
        let bad = vec![Some(RobotConfiguration::new_from_revolute_values(&[0.0; 3]))];
        let res = ConfigurationPostProcessor::fit_within_joint_limits(bad, &limits());
        assert!(matches!(res, Err(OptimaError::WrongJointCountError(_))));
    }

    #[test]
    fn names_are_attached_to_valid_slots() {
        let mut s = slots();
        ConfigurationPostProcessor::attach_joint_names(&mut s, &limits()).unwrap();
        for c in s.iter().flatten() {
            assert_eq!(c.joint_names(), &vec!["j1".to_string(), "j2".to_string()]);
        }
    }

    #[test]
    fn joint_types_are_attached_from_the_limits() {
        let mixed = JointLimitsModule::new(vec![
            JointLimit::new_unbounded_revolute("j1"),
            JointLimit::new("rail", JointType::Prismatic, -0.75, 0.75).unwrap()
        ]).unwrap();
        let mut s = slots();
        ConfigurationPostProcessor::attach_joint_names(&mut s, &mixed).unwrap();
        assert_eq!(s.iter().flatten().count(), 5);
        for c in s.iter().flatten() {
            assert_eq!(c.joint_types(), &vec![JointType::Revolute, JointType::Prismatic]);
            assert_eq!(c.joint_names()[1], "rail");
        }

        let mut short = vec![Some(RobotConfiguration::new_from_revolute_values(&[0.0]))];
        assert!(matches!(ConfigurationPostProcessor::attach_joint_names(&mut short, &mixed), Err(OptimaError::WrongJointCountError(_))));
    }

    #[test]
    fn collision_filter_is_order_independent() {
        let checker = FnCollisionChecker::new(|c: &RobotConfiguration| c.joint_values()[0] > 0.5);
        let forward = ConfigurationPostProcessor::filter_collisions(slots(), Some(&checker));

        let mut reversed_input = slots();
        reversed_input.reverse();
        let mut backward = ConfigurationPostProcessor::filter_collisions(reversed_input, Some(&checker));
        backward.reverse();

        assert_eq!(forward, backward);
        assert!(forward[2].is_none() && forward[3].is_none());
        assert!(forward[0].is_some() && forward[5].is_some() && forward[6].is_some());
    }

    struct OfflineChecker;
    impl CollisionChecker for OfflineChecker {
        fn check_collision(&self, _configuration: &RobotConfiguration) -> Result<bool, CollisionCheckUnavailable> {
            Err(CollisionCheckUnavailable::new("no backend"))
        }
    }

    #[test]
    fn unavailable_checker_passes_through() {
        assert_eq!(ConfigurationPostProcessor::filter_collisions(slots(), Some(&OfflineChecker)), slots());
        assert_eq!(ConfigurationPostProcessor::filter_collisions(slots(), None), slots());
    }

    #[test]
    fn selection_policies() {
        let all = ConfigurationPostProcessor::select(slots(), IKSelectionPolicy::All, None).unwrap();
        assert_eq!(all.len(), 8);

        let culled = ConfigurationPostProcessor::select(slots(), IKSelectionPolicy::Cull, None).unwrap();
        assert_eq!(culled.len(), 5);
        assert_eq!(culled[1], slots()[2]);

        let reference = RobotConfiguration::new_from_revolute_values(&[0.0, 0.0]);
        let closest = ConfigurationPostProcessor::select(slots(), IKSelectionPolicy::ClosestToStart, Some(&reference)).unwrap();
        assert_eq!(closest, vec![slots()[0].clone()]);

        // without slot 0, slots 2 and 5 tie at distance 2; the lower index wins
        let without_zero: IKSolutionSlots = slots().into_iter().enumerate().map(|(i, s)| if i == 0 { None } else { s }).collect();
        let closest = ConfigurationPostProcessor::select(without_zero, IKSelectionPolicy::ClosestToStart, Some(&reference)).unwrap();
        assert_eq!(closest, vec![slots()[2].clone()]);

        assert!(ConfigurationPostProcessor::select(slots(), IKSelectionPolicy::ClosestToStart, None).is_err());
        let empty = ConfigurationPostProcessor::select(vec![None; 8], IKSelectionPolicy::ClosestToStart, Some(&reference)).unwrap();
        assert!(empty.is_empty());
    }
}
