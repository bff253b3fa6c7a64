//! Error types for parsing robot description files.

use thiserror::Error;
use wbc_model::model::ModelError;
use wbc_model::robot_model::RobotModelError;

/// Errors that can occur while parsing a robot description file into a [`wbc_model::model::Model`].
#[derive(Debug, Error)]
pub enum ParseError {
    /// The description file could not be read from disk.
    #[error("failed to read description file: {0}")]
    Io(#[from] std::io::Error),

    /// The description file is not well-formed XML.
    #[error("failed to parse XML: {0}")]
    Xml(#[from] roxmltree::Error),

    /// The document has no `<robot>` root element.
    #[error("URDF document has no <robot> element")]
    MissingRobotTag,

    /// A required attribute or child element is missing.
    #[error("missing required attribute or element '{0}'")]
    MissingAttribute(String),

    /// An attribute is present but its value could not be parsed.
    #[error("attribute '{name}' has invalid value '{value}'")]
    InvalidAttribute {
        /// Name of the offending attribute.
        name: String,
        /// Raw value that failed to parse.
        value: String,
    },

    /// A `<joint>` declares a `type` this crate does not implement.
    #[error("joint '{joint}' has unsupported type '{joint_type}'")]
    UnsupportedJointType {
        /// Name of the offending joint.
        joint: String,
        /// The unsupported URDF joint type.
        joint_type: String,
    },

    /// A `<joint>` references a `<child>` link that is not declared in the document.
    #[error("joint '{joint}' references unknown child link '{link}'")]
    UnknownChildLink {
        /// Name of the offending joint.
        joint: String,
        /// Name of the missing link.
        link: String,
    },

    /// The kinematic tree could not be assembled.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The parsed model could not be wrapped into a [`wbc_model::robot_model::RobotModel`].
    #[error(transparent)]
    RobotModel(#[from] RobotModelError),

    /// A floating-base configuration was given with no world frame id.
    #[error("a floating-base robot model configuration requires a world frame id")]
    FloatingBaseRequiresWorldFrame,

    /// A configured contact point does not name a known link or frame.
    #[error("contact point '{0}' is neither a known link nor a known frame")]
    UnknownContactFrame(String),

    /// `attach_urdf_tree_str`/`attach_urdf_tree_file` named a hook joint the target model
    /// does not have.
    #[error("attach hook '{0}' is not a known joint of the target model")]
    UnknownHookJoint(String),
}
