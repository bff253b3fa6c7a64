//! The part of scene bookkeeping shared by every scene variant: turning a list of
//! [`ConstraintConfig`] into runtime [`Constraint`]s grouped by priority, dispatching
//! references to them by name, and producing a post-solve status snapshot.

use std::collections::HashSet;
use std::time::Duration;

use nalgebra::DVector;
use wbc_model::robot_model::RobotModel;
use wbc_task::{Constraint, ConstraintConfig, ConstraintStatus, DerivativeMode, Reference};

use crate::errors::SceneError;

/// Constraints grouped by ascending priority (priority 0 first), each group in configuration
/// order (spec §4.3's tie-breaking rule).
pub(crate) struct ConstraintSet {
    constraints: Vec<Constraint>,
}

impl ConstraintSet {
    pub(crate) fn configure(configs: Vec<ConstraintConfig>, model: &dyn RobotModel) -> Result<Self, SceneError> {
        let mut seen = HashSet::new();
        for config in &configs {
            if !seen.insert(config.name.clone()) {
                return Err(SceneError::Config(format!("duplicate constraint name '{}'", config.name)));
            }
        }

        let mut constraints: Vec<Constraint> = configs
            .into_iter()
            .map(|config| Constraint::new(config, model).map_err(SceneError::from))
            .collect::<Result<_, _>>()?;
        constraints.sort_by_key(Constraint::priority);

        Ok(Self { constraints })
    }

    pub(crate) fn set_reference(&mut self, name: &str, reference: Reference) -> Result<(), SceneError> {
        let constraint = self
            .constraints
            .iter_mut()
            .find(|c| c.name() == name)
            .ok_or_else(|| SceneError::InvalidInput(format!("unknown constraint '{name}'")))?;
        constraint.set_reference(reference)?;
        Ok(())
    }

    pub(crate) fn update(
        &mut self,
        model: &mut dyn RobotModel,
        mode: DerivativeMode,
        now: Duration,
        staleness_timeout: Duration,
    ) -> Result<(), SceneError> {
        for constraint in &mut self.constraints {
            constraint.update(model, mode, now, staleness_timeout)?;
        }
        Ok(())
    }

    /// Groups the live constraints by priority, ascending, preserving configuration order
    /// within a group.
    pub(crate) fn grouped_by_priority(&self) -> Vec<(u32, Vec<&Constraint>)> {
        let mut groups: Vec<(u32, Vec<&Constraint>)> = Vec::new();
        for constraint in &self.constraints {
            match groups.last_mut() {
                Some((priority, members)) if *priority == constraint.priority() => members.push(constraint),
                _ => groups.push((constraint.priority(), vec![constraint])),
            }
        }
        groups
    }

    pub(crate) fn status(&self, solver_output: &DVector<f64>, now: Duration) -> Vec<ConstraintStatus> {
        self.constraints
            .iter()
            .map(|constraint| ConstraintStatus::from_constraint(constraint, solver_output, now))
            .collect()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wbc_task::RefFrame;

    struct StubModel;

    impl RobotModel for StubModel {
        fn update(
            &mut self,
            _joint_state: &wbc_spatial::named_vector::NamedVector<wbc_spatial::joint_state::JointState>,
            _floating_base_state: Option<&wbc_spatial::rigid_body_state::RigidBodyStateSE3>,
        ) -> Result<(), wbc_model::robot_model::RobotModelError> {
            Ok(())
        }
        fn joint_state(
            &self,
            _names: &[String],
        ) -> Result<wbc_spatial::named_vector::NamedVector<wbc_spatial::joint_state::JointState>, wbc_model::robot_model::RobotModelError>
        {
            Ok(wbc_spatial::named_vector::NamedVector::new())
        }
        fn rigid_body_state(
            &mut self,
            root: &str,
            tip: &str,
        ) -> Result<wbc_spatial::rigid_body_state::RigidBodyStateSE3, wbc_model::robot_model::RobotModelError> {
            Ok(wbc_spatial::rigid_body_state::RigidBodyStateSE3::identity(tip, root))
        }
        fn space_jacobian(&mut self, _root: &str, _tip: &str) -> Result<wbc_spatial::jacobian::Jacobian, wbc_model::robot_model::RobotModelError> {
            Ok(wbc_spatial::jacobian::Jacobian::zero(2))
        }
        fn body_jacobian(&mut self, _root: &str, _tip: &str) -> Result<wbc_spatial::jacobian::Jacobian, wbc_model::robot_model::RobotModelError> {
            Ok(wbc_spatial::jacobian::Jacobian::zero(2))
        }
        fn spatial_acceleration_bias(
            &mut self,
            _root: &str,
            _tip: &str,
        ) -> Result<wbc_spatial::motion::SpatialMotion, wbc_model::robot_model::RobotModelError> {
            Ok(wbc_spatial::motion::SpatialMotion::zero())
        }
        fn joint_limits(&self) -> &[wbc_joint::limits::JointLimits] {
            &[]
        }
        fn joint_names(&self) -> &[String] {
            &[]
        }
        fn actuated_joint_names(&self) -> &[String] {
            &[]
        }
        fn no_of_joints(&self) -> usize {
            2
        }
        fn selection_matrix(&self) -> nalgebra::DMatrix<f64> {
            nalgebra::DMatrix::identity(2, 2)
        }
        fn has_link(&self, _name: &str) -> bool {
            true
        }
        fn has_joint(&self, name: &str) -> bool {
            name == "j1" || name == "j2"
        }
        fn joint_index(&self, name: &str) -> Option<usize> {
            match name {
                "j1" => Some(0),
                "j2" => Some(1),
                _ => None,
            }
        }
    }

    #[test]
    fn configure_rejects_duplicate_names() {
        let model = StubModel;
        let configs = vec![
            ConstraintConfig::joint("p", 0, vec!["j1".to_string()]),
            ConstraintConfig::joint("p", 1, vec!["j2".to_string()]),
        ];
        assert!(ConstraintSet::configure(configs, &model).is_err());
    }

    #[test]
    fn grouped_by_priority_preserves_configuration_order_within_a_group() {
        let model = StubModel;
        let configs = vec![
            ConstraintConfig::joint("a", 1, vec!["j1".to_string()]),
            ConstraintConfig::cartesian("b", 0, "root", "tip", RefFrame::Root),
            ConstraintConfig::joint("c", 1, vec!["j2".to_string()]),
        ];
        let set = ConstraintSet::configure(configs, &model).unwrap();
        let groups = set.grouped_by_priority();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, 0);
        assert_eq!(groups[1].0, 1);
        assert_eq!(groups[1].1[0].name(), "a");
        assert_eq!(groups[1].1[1].name(), "c");
    }
}
