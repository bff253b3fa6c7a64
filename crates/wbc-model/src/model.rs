//! [`Model`] structure containing the robot model and its immutable properties.

use crate::data::Data;
use crate::frame::{Frame, FrameType};
use std::fmt::Debug;
use std::sync::LazyLock;
use thiserror::Error;
use wbc_inertia::inertia::Inertia;
use wbc_joint::fixed::JointModelFixed;
use wbc_joint::joint::{JointModel, JointWrapper};
use wbc_spatial::configuration::Configuration;
use wbc_spatial::se3::SE3;
use wbc_spatial::vector3d::Vector3D;

/// Identifier of the world joint.
pub const WORLD_ID: usize = 0;
/// Identifier of the world frame.
pub const WORLD_FRAME_ID: usize = 0;
/// Standard gravity vector (0, 0, -9.81).
pub static STANDARD_GRAVITY: LazyLock<Vector3D> = LazyLock::new(|| Vector3D::new(0.0, 0.0, -9.81));

/// Data structure that contains the immutable properties of the robot model.
/// It contains information about the joints, frames, and their local placements.
pub struct Model {
    /// Name of the model.
    pub name: String,
    /// Names of the joints.
    pub joint_names: Vec<String>,
    /// Parent joint of each joint.
    pub joint_parents: Vec<usize>,
    /// Placements of the joints relative to their parent joints.
    pub joint_placements: Vec<SE3>,
    /// Joint models.
    pub joint_models: Vec<JointWrapper>,
    /// Number of position variables.
    pub nq: usize,
    /// Number of velocity variables.
    pub nv: usize,
    /// Inertias of the bodies at each joint.
    pub inertias: Vec<Inertia>,
    /// Operational frames at each joint
    pub frames: Vec<Frame>,
    /// The spatial gravity of the model.
    pub gravity: Vector3D,
}

impl Model {
    /// Creates a new [`Model`] with given name. Same as [`Model::new_empty()`].
    #[must_use]
    pub fn new(name: String) -> Self {
        let mut model = Self::new_empty();
        model.name = name;
        model
    }

    /// Creates a new empty [`Model`], containing only the world joint and frame.
    #[must_use]
    pub fn new_empty() -> Self {
        Self {
            name: String::new(),
            joint_names: vec!["__WORLD__".to_string()],
            joint_parents: vec![WORLD_ID],
            joint_placements: vec![SE3::identity()],
            joint_models: vec![JointWrapper::fixed(JointModelFixed::default())],
            nq: 0,
            nv: 0,
            inertias: vec![Inertia::zeros()],
            frames: vec![Frame::new(
                "__WORLD_FRAME__".to_string(),
                WORLD_ID,
                WORLD_FRAME_ID,
                SE3::identity(),
                FrameType::Fixed,
                Inertia::zeros(),
            )],
            gravity: *STANDARD_GRAVITY,
        }
    }

    /// Adds a joint to the model.
    pub fn add_joint(
        &mut self,
        parent_id: usize,
        joint_model: JointWrapper,
        placement: SE3,
        name: String,
    ) -> Result<usize, ModelError> {
        if parent_id >= self.joint_names.len() {
            return Err(ModelError::ParentJointDoesNotExist(parent_id));
        }
        for (id, other_name) in self.joint_names.iter().enumerate() {
            if other_name == &name {
                return Err(ModelError::JointNameAlreadyUsed(name, id));
            }
        }

        let id = self.joint_names.len();
        self.joint_names.push(name);
        self.joint_placements.push(placement);
        self.nq += joint_model.nq();
        self.nv += joint_model.nv();
        self.joint_models.push(joint_model);
        self.inertias.push(Inertia::zeros());
        self.joint_parents.push(parent_id);
        Ok(id)
    }

    /// Adds a frame to the model. Returns the id of an existing frame of the same name/type
    /// instead of inserting a duplicate.
    pub fn add_frame(&mut self, frame: Frame, append_inertia: bool) -> Result<usize, ModelError> {
        if frame.parent_joint >= self.joint_names.len() {
            return Err(ModelError::ParentJointDoesNotExist(frame.parent_joint));
        }

        for (id, other_frame) in self.frames.iter().enumerate() {
            if other_frame.name == frame.name && other_frame.frame_type == frame.frame_type {
                return Ok(id);
            }
        }

        let id = self.frames.len();
        self.frames.push(frame);
        let frame = &self.frames[id];

        if append_inertia {
            self.inertias[frame.parent_joint] += frame.placement.act(&frame.inertia);
        }

        Ok(id)
    }

    /// Creates the mutable [`Data`] companion to this model.
    #[must_use]
    pub fn create_data(&self) -> Data {
        let joint_data = self
            .joint_models
            .iter()
            .map(|joint_model| joint_model.create_joint_data())
            .collect();
        Data::from_joints_data(joint_data, self)
    }

    /// Returns the index of the joint with the given name.
    #[must_use]
    pub fn get_joint_id(&self, name: &str) -> Option<usize> {
        self.joint_names.iter().position(|joint_name| joint_name == name)
    }

    /// Returns the index of the frame with the given name, optionally restricted to a type.
    #[must_use]
    pub fn get_frame_id(&self, name: &str, frame_type: Option<FrameType>) -> Option<usize> {
        for (id, frame) in self.frames.iter().enumerate() {
            if frame.name == name {
                if let Some(ft) = &frame_type
                    && &frame.frame_type != ft
                {
                    continue;
                }
                return Some(id);
            }
        }
        None
    }

    /// The velocity-vector offset of the given joint's own degrees of freedom.
    #[must_use]
    pub fn joint_v_offset(&self, joint_id: usize) -> usize {
        self.joint_models[..joint_id]
            .iter()
            .map(JointModel::nv)
            .sum()
    }

    /// Returns the number of joints in the model, including the world joint.
    #[must_use]
    pub fn njoints(&self) -> usize {
        self.joint_names.len()
    }

    /// Returns the number of frames in the model, including the world frame.
    #[must_use]
    pub fn nframes(&self) -> usize {
        self.frames.len()
    }

    /// Locks the named joint by replacing its model with a fixed joint, removing its degrees
    /// of freedom from the configuration and velocity vectors while keeping the kinematic
    /// tree (and any frames attached below it) intact. Used to apply a joint blacklist.
    pub fn lock_joint(&mut self, name: &str) -> Result<(), ModelError> {
        let id = self
            .get_joint_id(name)
            .ok_or_else(|| ModelError::UnknownJoint(name.to_string()))?;
        let old = &self.joint_models[id];
        self.nq -= old.nq();
        self.nv -= old.nv();
        self.joint_models[id] = JointWrapper::fixed(JointModelFixed::default());
        Ok(())
    }

    /// Grafts every root joint of `other` (a joint whose parent is `other`'s own world joint)
    /// onto `hook`, offsetting its placement by `placement`; every joint and frame `other`
    /// carries below its roots is reparented along with it, keeping their relative placements.
    ///
    /// Lets two independently parsed descriptions be composed into one model — attaching a
    /// gripper or a second arm at a named link — rather than requiring a single monolithic
    /// URDF document up front.
    pub fn attach_tree(&mut self, hook: usize, other: Model, placement: SE3) -> Result<(), ModelError> {
        if hook >= self.joint_names.len() {
            return Err(ModelError::ParentJointDoesNotExist(hook));
        }

        // `other`'s own world joint (id 0) is never grafted; every later joint's parent is
        // either that world joint (a root, attached under `hook`) or an earlier joint of
        // `other`, which has already been grafted and remapped by the time we reach it.
        let joint_offset = self.joint_names.len();
        for other_id in 1..other.joint_names.len() {
            let parent = if other.joint_parents[other_id] == WORLD_ID {
                hook
            } else {
                joint_offset + other.joint_parents[other_id] - 1
            };
            let local_placement = if other.joint_parents[other_id] == WORLD_ID {
                placement * other.joint_placements[other_id]
            } else {
                other.joint_placements[other_id]
            };

            let new_id = self.add_joint(
                parent,
                other.joint_models[other_id].clone(),
                local_placement,
                other.joint_names[other_id].clone(),
            )?;
            self.inertias[new_id] = other.inertias[other_id].clone();
        }

        for other_frame in &other.frames[1..] {
            let parent_joint = joint_offset + other_frame.parent_joint - 1;
            self.add_frame(
                Frame::new(
                    other_frame.name.clone(),
                    parent_joint,
                    WORLD_FRAME_ID,
                    other_frame.placement,
                    other_frame.frame_type.clone(),
                    other_frame.inertia.clone(),
                ),
                false,
            )?;
        }

        Ok(())
    }
}

impl Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.name)
            .field("joint_names", &self.joint_names)
            .field("joint_parents", &self.joint_parents)
            .field("joint_placements", &self.joint_placements)
            .finish()
    }
}

#[derive(Debug, Error)]
/// An error that can occur when adding a joint or frame to the model.
pub enum ModelError {
    #[error("parent joint with id {0} does not exist")]
    ParentJointDoesNotExist(usize),
    #[error("joint name '{0}' is already used by joint with id {1}")]
    JointNameAlreadyUsed(String, usize),
    #[error("joint '{0}' is not known to this model")]
    UnknownJoint(String),
}

/// Generates a random configuration for the given model.
#[must_use]
pub fn random_configuration(model: &Model) -> Configuration {
    let mut rng = rand::rng();
    let q = model
        .joint_models
        .iter()
        .map(|joint_model| joint_model.random_configuration(&mut rng))
        .collect::<Vec<_>>();
    Configuration::concat(q.as_slice())
}
