//! Joint box-bound assembly (spec §4.5): every sub-QP carries bounds on the decision vector
//! derived from the model's joint limits and current state.

use nalgebra::DVector;
use wbc_model::robot_model::RobotModel;

/// Kinematically consistent velocity bounds for every column of `model`'s joint vector:
/// `lb = max(-v_max, (q_min - q) / dt)`, `ub = min(v_max, (q_max - q) / dt)`.
///
/// A joint whose current position cannot be read from the model (e.g. a floating-base
/// synthetic axis, whose position comes from the external base pose rather than the joint
/// state) falls back to the velocity-only bound; such axes carry unbounded limits in practice
/// so this only matters in principle.
pub(crate) fn velocity_bounds(model: &dyn RobotModel, dt: f64) -> (DVector<f64>, DVector<f64>) {
    let n = model.no_of_joints();
    let names = model.joint_names();
    let limits = model.joint_limits();

    let mut lower = DVector::from_element(n, f64::NEG_INFINITY);
    let mut upper = DVector::from_element(n, f64::INFINITY);

    for i in 0..n {
        let v_max = limits[i].velocity;
        let mut lb = -v_max;
        let mut ub = v_max;

        if let Ok(state) = model.joint_state(std::slice::from_ref(&names[i]))
            && let Some(joint) = state.get_by_name(&names[i])
            && joint.has_position()
        {
            let q = joint.position;
            let q_min = limits[i].min_configuration[0];
            let q_max = limits[i].max_configuration[0];
            lb = lb.max((q_min - q) / dt);
            ub = ub.min((q_max - q) / dt);
        }

        lower[i] = lb;
        upper[i] = ub;
    }

    (lower, upper)
}

/// Acceleration bounds for a TSID scene's `q̈` block: the same velocity-limit projection as
/// [`velocity_bounds`], but against the current joint speed rather than position, since it is
/// the next cycle's velocity that must stay admissible. Position limits are not additionally
/// enforced here — the velocity scene one level up already steers the reference away from
/// them well before an acceleration bound would need to act as a second line of defense.
pub(crate) fn acceleration_bounds(model: &dyn RobotModel, dt: f64) -> (DVector<f64>, DVector<f64>) {
    let n = model.no_of_joints();
    let names = model.joint_names();
    let limits = model.joint_limits();

    let mut lower = DVector::from_element(n, f64::NEG_INFINITY);
    let mut upper = DVector::from_element(n, f64::INFINITY);

    for i in 0..n {
        let v_max = limits[i].velocity;
        let mut lb = f64::NEG_INFINITY;
        let mut ub = f64::INFINITY;

        if let Ok(state) = model.joint_state(std::slice::from_ref(&names[i]))
            && let Some(joint) = state.get_by_name(&names[i])
            && joint.has_speed()
            && v_max.is_finite()
        {
            let v = joint.speed;
            lb = (-v_max - v) / dt;
            ub = (v_max - v) / dt;
        }

        lower[i] = lb;
        upper[i] = ub;
    }

    (lower, upper)
}

/// Effort (torque) bounds for a TSID scene's `τ` block, in actuated-joint order.
pub(crate) fn effort_bounds(model: &dyn RobotModel) -> (DVector<f64>, DVector<f64>) {
    let actuated = model.actuated_joint_names();
    let names = model.joint_names();
    let limits = model.joint_limits();

    let mut lower = DVector::from_element(actuated.len(), f64::NEG_INFINITY);
    let mut upper = DVector::from_element(actuated.len(), f64::INFINITY);

    for (i, name) in actuated.iter().enumerate() {
        if let Some(col) = names.iter().position(|n| n == name) {
            let effort = limits[col].effort;
            lower[i] = -effort;
            upper[i] = effort;
        }
    }

    (lower, upper)
}
