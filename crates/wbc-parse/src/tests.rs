use crate::config::{dynamics_model_from_urdf_str, kinematics_model_from_urdf_str, RobotModelConfig};
use crate::errors::ParseError;
use crate::urdf::parse_urdf_str;
use wbc_joint::joint::JointModel;
use wbc_model::robot_model::RobotModel;

const TWO_LINK_ARM: &str = r#"
<?xml version="1.0"?>
<robot name="two_link_arm">
  <link name="base_link">
    <inertial>
      <origin xyz="0 0 0" rpy="0 0 0"/>
      <mass value="1.0"/>
      <inertia ixx="0.01" iyy="0.01" izz="0.01" ixy="0" ixz="0" iyz="0"/>
    </inertial>
  </link>
  <link name="link1">
    <inertial>
      <origin xyz="0.5 0 0" rpy="0 0 0"/>
      <mass value="2.0"/>
      <inertia ixx="0.02" iyy="0.02" izz="0.02" ixy="0" ixz="0" iyz="0"/>
    </inertial>
  </link>
  <link name="link2">
    <inertial>
      <origin xyz="0.5 0 0" rpy="0 0 0"/>
      <mass value="1.5"/>
      <inertia ixx="0.015" iyy="0.015" izz="0.015" ixy="0" ixz="0" iyz="0"/>
    </inertial>
  </link>
  <joint name="joint1" type="revolute">
    <parent link="base_link"/>
    <child link="link1"/>
    <origin xyz="0 0 0" rpy="0 0 0"/>
    <axis xyz="0 0 1"/>
    <limit lower="-3.14" upper="3.14" effort="50" velocity="5"/>
    <dynamics damping="0.1" friction="0.05"/>
  </joint>
  <joint name="joint2" type="revolute">
    <parent link="link1"/>
    <child link="link2"/>
    <origin xyz="1.0 0 0" rpy="0 0 0"/>
    <axis xyz="0 0 1"/>
    <limit lower="-3.14" upper="3.14" effort="50" velocity="5"/>
  </joint>
</robot>
"#;

#[test]
fn parses_a_simple_revolute_chain() {
    let model = parse_urdf_str(TWO_LINK_ARM).unwrap();
    assert_eq!(model.name, "two_link_arm");
    // world + base_link's fixed root joint + joint1 + joint2
    assert_eq!(model.njoints(), 4);
    assert_eq!(model.nq, 2);
    assert_eq!(model.nv, 2);
}

#[test]
fn carries_joint_limits_and_dynamics_from_the_limit_and_dynamics_elements() {
    let model = parse_urdf_str(TWO_LINK_ARM).unwrap();
    let joint1_id = model.get_joint_id("joint1").unwrap();
    let limits = model.joint_models[joint1_id].limits();
    assert_eq!(limits.effort, 50.0);
    assert_eq!(limits.velocity, 5.0);
    assert_eq!(limits.min_configuration[0], -3.14);
    assert_eq!(limits.max_configuration[0], 3.14);
    assert_eq!(limits.damping, 0.1);
    assert_eq!(limits.friction, 0.05);
}

#[test]
fn links_without_a_limit_element_stay_unbounded() {
    let model = parse_urdf_str(TWO_LINK_ARM).unwrap();
    let joint2_id = model.get_joint_id("joint2").unwrap();
    let limits = model.joint_models[joint2_id].limits();
    assert_eq!(limits.damping, 0.0);
}

#[test]
fn rejects_documents_without_a_robot_element() {
    let xml = "<robots></robots>";
    let err = parse_urdf_str(xml).unwrap_err();
    assert!(matches!(err, ParseError::MissingRobotTag));
}

#[test]
fn rejects_unsupported_joint_types() {
    let xml = r#"
    <robot name="r">
      <link name="a"/>
      <link name="b"/>
      <joint name="j" type="floating">
        <parent link="a"/>
        <child link="b"/>
      </joint>
    </robot>
    "#;
    let err = parse_urdf_str(xml).unwrap_err();
    assert!(matches!(err, ParseError::UnsupportedJointType { .. }));
}

#[test]
fn rejects_joints_referencing_an_unknown_child_link() {
    let xml = r#"
    <robot name="r">
      <link name="a"/>
      <joint name="j" type="fixed">
        <parent link="a"/>
        <child link="ghost"/>
      </joint>
    </robot>
    "#;
    let err = parse_urdf_str(xml).unwrap_err();
    assert!(matches!(err, ParseError::UnknownChildLink { .. }));
}

#[test]
fn axis_defaults_to_x_when_the_axis_element_is_absent() {
    let xml = r#"
    <robot name="r">
      <link name="a"/>
      <link name="b"/>
      <joint name="j" type="prismatic">
        <parent link="a"/>
        <child link="b"/>
        <limit lower="-1" upper="1" effort="1" velocity="1"/>
      </joint>
    </robot>
    "#;
    let model = parse_urdf_str(xml).unwrap();
    let joint_id = model.get_joint_id("j").unwrap();
    let axis = model.joint_models[joint_id].get_axis();
    assert_eq!(axis.len(), 1);
    assert_eq!(axis[0].translation(), wbc_spatial::vector3d::Vector3D::new(1.0, 0.0, 0.0));
}

#[test]
fn builds_a_kinematics_model_from_urdf() {
    let kinematics = kinematics_model_from_urdf_str(TWO_LINK_ARM).unwrap();
    assert_eq!(kinematics.joint_names().len(), 2);
}

#[test]
fn builds_a_floating_base_dynamics_model_from_urdf() {
    let config = RobotModelConfig::floating_base(vec!["joint1".to_string(), "joint2".to_string()], "world".to_string());
    let dynamics = dynamics_model_from_urdf_str(TWO_LINK_ARM, &config).unwrap();
    assert_eq!(dynamics.no_of_actuated_joints(), 2);
    assert_eq!(dynamics.no_of_joints(), 8); // 6 floating-base DOFs + joint1 + joint2
}

#[test]
fn builds_a_fixed_base_dynamics_model_from_urdf() {
    let config = RobotModelConfig::fixed_base(vec!["joint1".to_string(), "joint2".to_string()]);
    let dynamics = dynamics_model_from_urdf_str(TWO_LINK_ARM, &config).unwrap();
    assert_eq!(dynamics.no_of_joints(), 2);
}
