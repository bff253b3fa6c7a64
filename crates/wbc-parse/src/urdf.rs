//! Parser for the URDF (Unified Robot Description Format) file format.
//!
//! Only the kinematic and inertial structure of the description is built: visual,
//! collision, and material elements are ignored, since nothing downstream in this
//! crate stack consumes them.

use std::collections::{HashMap, HashSet, VecDeque};
use std::str::FromStr;

use roxmltree::{Document, Node};

use wbc_inertia::inertia::Inertia;
use wbc_joint::continuous::JointModelContinuous;
use wbc_joint::fixed::JointModelFixed;
use wbc_joint::joint::JointWrapper;
use wbc_joint::limits::JointLimits;
use wbc_joint::prismatic::JointModelPrismatic;
use wbc_joint::revolute::JointModelRevolute;
use wbc_spatial::configuration::Configuration;
use wbc_spatial::motion::SpatialRotation;
use wbc_spatial::se3::SE3;
use wbc_spatial::vector3d::Vector3D;

use crate::errors::ParseError;
use wbc_model::frame::{Frame, FrameType};
use wbc_model::model::{Model, WORLD_FRAME_ID, WORLD_ID};

/// Parses a URDF description held in memory and builds the corresponding [`Model`].
pub fn parse_urdf_str(xml: &str) -> Result<Model, ParseError> {
    let doc = Document::parse(xml)?;

    let robot_node = doc
        .descendants()
        .find(|n| n.has_tag_name("robot"))
        .ok_or(ParseError::MissingRobotTag)?;
    let robot_name = robot_node.attribute("name").unwrap_or("robot").to_string();

    let link_nodes: HashMap<String, Node> = robot_node
        .children()
        .filter(|n| n.has_tag_name("link"))
        .filter_map(|n| n.attribute("name").map(|name| (name.to_string(), n)))
        .collect();

    let joint_nodes: Vec<Node> = robot_node.children().filter(|n| n.has_tag_name("joint")).collect();

    // index joints by parent link name, and track which links are someone's child
    let mut joints_by_parent_link: HashMap<String, Vec<Node>> = HashMap::new();
    let mut child_links: HashSet<String> = HashSet::new();
    for joint_node in &joint_nodes {
        let parent_link = link_reference(joint_node, "parent")?;
        let child_link = link_reference(joint_node, "child")?;
        child_links.insert(child_link);
        joints_by_parent_link.entry(parent_link).or_default().push(*joint_node);
    }

    let mut root_links: Vec<String> = link_nodes
        .keys()
        .filter(|name| !child_links.contains(*name))
        .cloned()
        .collect();
    root_links.sort();

    let mut model = Model::new(robot_name);
    let mut link_joint_ids: HashMap<String, usize> = HashMap::new();

    for root_link in &root_links {
        let link_node = &link_nodes[root_link];
        let joint_id = attach_root_link(&mut model, root_link, link_node)?;
        link_joint_ids.insert(root_link.clone(), joint_id);
    }

    // breadth-first traversal down from the roots, visiting joints in name order at each level
    let mut queue: VecDeque<String> = root_links.into_iter().collect();
    while let Some(parent_link) = queue.pop_front() {
        let parent_joint_id = link_joint_ids[&parent_link];
        let Some(children) = joints_by_parent_link.get(&parent_link) else {
            continue;
        };
        let mut children = children.clone();
        children.sort_by_key(|n| n.attribute("name").unwrap_or("").to_string());

        for joint_node in children {
            let joint_name = joint_node
                .attribute("name")
                .ok_or_else(|| ParseError::MissingAttribute("joint/@name".to_string()))?
                .to_string();
            let joint_type = joint_node
                .attribute("type")
                .ok_or_else(|| ParseError::MissingAttribute("joint/@type".to_string()))?;
            let child_link_name = link_reference(&joint_node, "child")?;
            let child_link_node = link_nodes.get(&child_link_name).ok_or_else(|| ParseError::UnknownChildLink {
                joint: joint_name.clone(),
                link: child_link_name.clone(),
            })?;

            let origin = parse_origin(&joint_node)?;
            let joint_model = build_joint(&joint_name, joint_type, &joint_node)?;
            let child_joint_id = model.add_joint(parent_joint_id, joint_model, origin, joint_name)?;
            attach_link_inertia(&mut model, child_joint_id, &child_link_name, child_link_node)?;

            link_joint_ids.insert(child_link_name.clone(), child_joint_id);
            queue.push_back(child_link_name);
        }
    }

    Ok(model)
}

/// Parses a URDF file from disk and builds the corresponding [`Model`].
pub fn parse_urdf_file(path: &str) -> Result<Model, ParseError> {
    let contents = std::fs::read_to_string(path)?;
    parse_urdf_str(&contents)
}

/// Attaches a root link (one that is never the `<child>` of a joint) to the world
/// through a zero-DOF fixed joint, so that every link in the model has a joint of its own.
fn attach_root_link(model: &mut Model, link_name: &str, link_node: &Node) -> Result<usize, ParseError> {
    let joint_id = model.add_joint(
        WORLD_ID,
        JointWrapper::fixed(JointModelFixed::default()),
        SE3::identity(),
        format!("{link_name}__root"),
    )?;
    attach_link_inertia(model, joint_id, link_name, link_node)?;
    Ok(joint_id)
}

/// Parses a link's `<inertial>` element, if any, and accumulates it onto the joint
/// that carries that link.
fn attach_link_inertia(model: &mut Model, joint_id: usize, link_name: &str, link_node: &Node) -> Result<(), ParseError> {
    let (inertia, origin) = parse_inertial(link_node)?;
    let frame = Frame::new(link_name.to_string(), joint_id, WORLD_FRAME_ID, origin, FrameType::Body, inertia);
    model.add_frame(frame, true)?;
    Ok(())
}

fn build_joint(joint_name: &str, joint_type: &str, joint_node: &Node) -> Result<JointWrapper, ParseError> {
    let limit = parse_limit(joint_node)?;
    let dynamics = parse_dynamics(joint_node)?;

    let wrapper = match joint_type {
        "fixed" => JointWrapper::fixed(JointModelFixed::default()),

        "revolute" => {
            let axis = parse_axis(joint_node)?;
            let mut joint = JointModelRevolute::new(axis);
            if let Some(limit) = &limit {
                apply_limit(&mut joint.limits, limit);
            }
            if let Some((damping, friction)) = dynamics {
                apply_dynamics(&mut joint.limits, damping, friction);
            }
            JointWrapper::revolute(joint)
        }

        "continuous" => {
            let axis = parse_axis(joint_node)?;
            let mut joint = JointModelContinuous::new(axis);
            // lower/upper bounds don't apply to a joint without limits; only effort/velocity carry over
            if let Some(limit) = &limit {
                if let Some(effort) = limit.effort {
                    joint.limits.effort = effort;
                }
                if let Some(velocity) = limit.velocity {
                    joint.limits.velocity = velocity;
                }
            }
            if let Some((damping, friction)) = dynamics {
                apply_dynamics(&mut joint.limits, damping, friction);
            }
            JointWrapper::continuous(joint)
        }

        "prismatic" => {
            let axis = parse_axis(joint_node)?;
            let mut joint = JointModelPrismatic::new(axis);
            if let Some(limit) = &limit {
                apply_limit(&mut joint.limits, limit);
            }
            if let Some((damping, friction)) = dynamics {
                apply_dynamics(&mut joint.limits, damping, friction);
            }
            JointWrapper::prismatic(joint)
        }

        other => {
            return Err(ParseError::UnsupportedJointType {
                joint: joint_name.to_string(),
                joint_type: other.to_string(),
            });
        }
    };

    Ok(wrapper)
}

/// Parsed contents of a `<limit .../>` element; every field is optional since URDF only
/// requires `effort`/`velocity` on actuated (non-continuous) joints.
struct LimitSpec {
    effort: Option<f64>,
    velocity: Option<f64>,
    lower: Option<f64>,
    upper: Option<f64>,
}

fn parse_limit(joint_node: &Node) -> Result<Option<LimitSpec>, ParseError> {
    let Some(limit_node) = joint_node.children().find(|n| n.has_tag_name("limit")) else {
        return Ok(None);
    };
    Ok(Some(LimitSpec {
        effort: optional_attribute(&limit_node, "effort")?,
        velocity: optional_attribute(&limit_node, "velocity")?,
        lower: optional_attribute(&limit_node, "lower")?,
        upper: optional_attribute(&limit_node, "upper")?,
    }))
}

fn apply_limit(limits: &mut JointLimits, spec: &LimitSpec) {
    if let Some(effort) = spec.effort {
        limits.effort = effort;
    }
    if let Some(velocity) = spec.velocity {
        limits.velocity = velocity;
    }
    if let Some(lower) = spec.lower {
        limits.min_configuration = Configuration::from_row_slice(&[lower]);
    }
    if let Some(upper) = spec.upper {
        limits.max_configuration = Configuration::from_row_slice(&[upper]);
    }
}

fn parse_dynamics(joint_node: &Node) -> Result<Option<(f64, f64)>, ParseError> {
    let Some(dynamics_node) = joint_node.children().find(|n| n.has_tag_name("dynamics")) else {
        return Ok(None);
    };
    let damping = optional_attribute::<f64>(&dynamics_node, "damping")?.unwrap_or(0.0);
    let friction = optional_attribute::<f64>(&dynamics_node, "friction")?.unwrap_or(0.0);
    Ok(Some((damping, friction)))
}

fn apply_dynamics(limits: &mut JointLimits, damping: f64, friction: f64) {
    limits.damping = damping;
    limits.friction = friction;
}

/// Reads the `xyz` axis attribute of a joint's `<axis>` element, defaulting to `(1, 0, 0)`
/// per the URDF specification when the element is absent.
fn parse_axis(joint_node: &Node) -> Result<Vector3D, ParseError> {
    match joint_node.children().find(|n| n.has_tag_name("axis")) {
        Some(axis_node) => Ok(parse_vector3(&axis_node, "xyz")?.unwrap_or_else(|| Vector3D::new(1.0, 0.0, 0.0))),
        None => Ok(Vector3D::new(1.0, 0.0, 0.0)),
    }
}

/// Reads a node's `<origin xyz="..." rpy="..."/>` child, defaulting to the identity
/// transform when absent, as specified by URDF.
fn parse_origin(node: &Node) -> Result<SE3, ParseError> {
    let Some(origin_node) = node.children().find(|n| n.has_tag_name("origin")) else {
        return Ok(SE3::identity());
    };
    let translation = parse_vector3(&origin_node, "xyz")?.unwrap_or_else(Vector3D::zeros);
    let rpy = parse_vector3(&origin_node, "rpy")?.unwrap_or_else(Vector3D::zeros);
    let rpy = rpy.as_slice();
    let rotation = SpatialRotation::from_euler_angles(rpy[0], rpy[1], rpy[2]);
    Ok(SE3::from_parts(translation, rotation))
}

fn parse_inertial(link_node: &Node) -> Result<(Inertia, SE3), ParseError> {
    let Some(inertial_node) = link_node.children().find(|n| n.has_tag_name("inertial")) else {
        return Ok((Inertia::zeros(), SE3::identity()));
    };

    let mass_node = inertial_node
        .children()
        .find(|n| n.has_tag_name("mass"))
        .ok_or_else(|| ParseError::MissingAttribute("inertial/mass".to_string()))?;
    let mass = required_attribute::<f64>(&mass_node, "value")?;

    // the mass is concentrated at the <inertial> origin, so the body-frame center of
    // mass carried by Inertia itself stays at zero; the origin transform already places it
    let origin = parse_origin(&inertial_node)?;

    let inertia = if let Some(inertia_node) = inertial_node.children().find(|n| n.has_tag_name("inertia")) {
        wbc_spatial::symmetric3::Symmetric3::new(
            required_attribute::<f64>(&inertia_node, "ixx")?,
            required_attribute::<f64>(&inertia_node, "iyy")?,
            required_attribute::<f64>(&inertia_node, "izz")?,
            required_attribute::<f64>(&inertia_node, "ixy")?,
            required_attribute::<f64>(&inertia_node, "ixz")?,
            required_attribute::<f64>(&inertia_node, "iyz")?,
        )
    } else {
        wbc_spatial::symmetric3::Symmetric3::zeros()
    };

    Ok((Inertia::new(mass, Vector3D::zeros(), inertia), origin))
}

/// Resolves the `link` attribute of a joint's `<parent>` or `<child>` element.
fn link_reference(joint_node: &Node, tag: &str) -> Result<String, ParseError> {
    let node = joint_node
        .children()
        .find(|n| n.has_tag_name(tag))
        .ok_or_else(|| ParseError::MissingAttribute(format!("joint/{tag}")))?;
    node.attribute("link")
        .map(str::to_string)
        .ok_or_else(|| ParseError::MissingAttribute(format!("joint/{tag}/@link")))
}

fn parse_vector3(node: &Node, attr: &str) -> Result<Option<Vector3D>, ParseError> {
    let Some(raw) = node.attribute(attr) else {
        return Ok(None);
    };
    let values = parse_floats(raw, attr)?;
    if values.len() != 3 {
        return Err(ParseError::InvalidAttribute {
            name: attr.to_string(),
            value: raw.to_string(),
        });
    }
    Ok(Some(Vector3D::new(values[0], values[1], values[2])))
}

fn parse_floats(raw: &str, attr: &str) -> Result<Vec<f64>, ParseError> {
    raw.split_whitespace()
        .map(|s| {
            s.parse::<f64>().map_err(|_| ParseError::InvalidAttribute {
                name: attr.to_string(),
                value: raw.to_string(),
            })
        })
        .collect()
}

fn required_attribute<T: FromStr>(node: &Node, name: &str) -> Result<T, ParseError> {
    let raw = node
        .attribute(name)
        .ok_or_else(|| ParseError::MissingAttribute(name.to_string()))?;
    raw.parse::<T>().map_err(|_| ParseError::InvalidAttribute {
        name: name.to_string(),
        value: raw.to_string(),
    })
}

fn optional_attribute<T: FromStr>(node: &Node, name: &str) -> Result<Option<T>, ParseError> {
    match node.attribute(name) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| ParseError::InvalidAttribute {
                name: name.to_string(),
                value: raw.to_string(),
            }),
        None => Ok(None),
    }
}
