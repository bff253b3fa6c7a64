//! Declarative description of a single whole-body-control objective.

use crate::errors::TaskError;

/// Whole-body task type: joint space or Cartesian.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskType {
    Joint,
    Cartesian,
}

/// Frame in which a Cartesian reference is expressed. If `Tip`, the scene converts the
/// reference to `Root` internally before assembling the task row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefFrame {
    Root,
    Tip,
}

/// Declarative configuration of one whole-body-control sub task.
///
/// Valid configurations are e.g.:
/// - `task_type = Cartesian`, `name = "left_arm"`, `priority = 0`, `root = "base"`, `tip =
///   "gripper"`.
/// - `task_type = Joint`, `name = "posture"`, `priority = 1`, `joint_names = ["j1", "j2"]`.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstraintConfig {
    /// Unique identifier of the task.
    pub name: String,
    /// Whole-body task type: joint space or Cartesian.
    pub task_type: TaskType,
    /// Priority of this task. 0-based; 0 is the highest priority.
    pub priority: u32,
    /// Scalar activation in `[0, 1]`, multiplied into every effective weight.
    pub activation: f64,
    /// Per-row weight: length `joint_names.len()` for joint tasks, length 6 for Cartesian.
    pub weights: Vec<f64>,
    /// Only joint-space tasks: the joints driven by this task.
    pub joint_names: Vec<String>,
    /// Only Cartesian tasks: root frame of the kinematic chain.
    pub root: String,
    /// Only Cartesian tasks: tip frame of the kinematic chain.
    pub tip: String,
    /// Only Cartesian tasks: frame the reference is expressed in.
    pub ref_frame: RefFrame,
}

impl ConstraintConfig {
    /// A joint-space task driving `joint_names`, at unit activation and unit weights.
    #[must_use]
    pub fn joint(name: impl Into<String>, priority: u32, joint_names: Vec<String>) -> Self {
        let weights = vec![1.0; joint_names.len()];
        Self {
            name: name.into(),
            task_type: TaskType::Joint,
            priority,
            activation: 1.0,
            weights,
            joint_names,
            root: String::new(),
            tip: String::new(),
            ref_frame: RefFrame::Root,
        }
    }

    /// A Cartesian task relating `tip` to `root`, at unit activation and unit weights.
    #[must_use]
    pub fn cartesian(
        name: impl Into<String>,
        priority: u32,
        root: impl Into<String>,
        tip: impl Into<String>,
        ref_frame: RefFrame,
    ) -> Self {
        Self {
            name: name.into(),
            task_type: TaskType::Cartesian,
            priority,
            activation: 1.0,
            weights: vec![1.0; 6],
            joint_names: Vec::new(),
            root: root.into(),
            tip: tip.into(),
            ref_frame,
        }
    }

    /// Task dimension: 6 for Cartesian, `joint_names.len()` for joint-space.
    #[must_use]
    pub fn dimension(&self) -> usize {
        match self.task_type {
            TaskType::Cartesian => 6,
            TaskType::Joint => self.joint_names.len(),
        }
    }

    /// Validates internal consistency (dimensions, non-negative priority already enforced by
    /// `u32`, required fields populated for the declared task type).
    pub fn validate(&self) -> Result<(), TaskError> {
        if self.name.is_empty() {
            return Err(TaskError::Config("constraint name must not be empty".to_string()));
        }
        if !(0.0..=1.0).contains(&self.activation) {
            return Err(TaskError::Config(format!(
                "constraint '{}' has activation {} outside [0, 1]",
                self.name, self.activation
            )));
        }
        if self.weights.len() != self.dimension() {
            return Err(TaskError::Config(format!(
                "constraint '{}' has {} weights, expected {}",
                self.name,
                self.weights.len(),
                self.dimension()
            )));
        }
        match self.task_type {
            TaskType::Joint => {
                if self.joint_names.is_empty() {
                    return Err(TaskError::Config(format!(
                        "joint constraint '{}' has no joint names",
                        self.name
                    )));
                }
            }
            TaskType::Cartesian => {
                if self.root.is_empty() || self.tip.is_empty() {
                    return Err(TaskError::Config(format!(
                        "cartesian constraint '{}' is missing root or tip frame",
                        self.name
                    )));
                }
            }
        }
        Ok(())
    }
}
