//! Live references fed into runtime constraints each cycle.

use wbc_spatial::joint_state::JointState;
use wbc_spatial::named_vector::NamedVector;
use wbc_spatial::rigid_body_state::RigidBodyStateSE3;
use wbc_spatial::timestamp::Timestamp;

/// A reference value for one constraint: either a per-joint target or a Cartesian target,
/// type-checked against the constraint's [`crate::config::TaskType`] at `set_reference` time.
#[derive(Clone, Debug, PartialEq)]
pub enum Reference {
    Joint(NamedVector<JointState>),
    Cartesian(RigidBodyStateSE3),
}

impl Reference {
    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        match self {
            Reference::Joint(named) => named.values().map(|s| s.timestamp).max().unwrap_or_else(Timestamp::never),
            Reference::Cartesian(state) => state.timestamp,
        }
    }

    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Reference::Joint(_) => "joint",
            Reference::Cartesian(_) => "cartesian",
        }
    }
}
