//! Defines **joint state**: the per-joint scalar quantities exchanged with a control loop.

use crate::timestamp::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq)]
/// Position, speed, acceleration and effort of a single joint.
///
/// Any field may be `f64::NAN` to denote "unspecified"; callers must check with
/// `f64::is_nan` rather than comparing against zero.
pub struct JointState {
    pub position: f64,
    pub speed: f64,
    pub acceleration: f64,
    pub effort: f64,
    pub timestamp: Timestamp,
}

impl JointState {
    #[must_use]
    pub fn unspecified() -> Self {
        Self {
            position: f64::NAN,
            speed: f64::NAN,
            acceleration: f64::NAN,
            effort: f64::NAN,
            timestamp: Timestamp::never(),
        }
    }

    #[must_use]
    pub fn with_position(position: f64, timestamp: Timestamp) -> Self {
        Self {
            position,
            timestamp,
            ..Self::unspecified()
        }
    }

    #[must_use]
    pub fn has_position(&self) -> bool {
        !self.position.is_nan()
    }

    #[must_use]
    pub fn has_speed(&self) -> bool {
        !self.speed.is_nan()
    }

    #[must_use]
    pub fn has_acceleration(&self) -> bool {
        !self.acceleration.is_nan()
    }

    #[must_use]
    pub fn has_effort(&self) -> bool {
        !self.effort.is_nan()
    }
}

impl Default for JointState {
    fn default() -> Self {
        Self::unspecified()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unspecified_fields_are_nan() {
        let s = JointState::unspecified();
        assert!(!s.has_position());
        assert!(!s.has_speed());
        assert!(s.timestamp.is_never());
    }

    #[test]
    fn with_position_only_sets_position() {
        let s = JointState::with_position(0.5, Timestamp::at(std::time::Duration::from_secs(1)));
        assert!(s.has_position());
        assert!(!s.has_speed());
        assert_eq!(s.position, 0.5);
    }
}
