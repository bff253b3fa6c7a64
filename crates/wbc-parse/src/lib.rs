//! Parsers for robot description formats.
//!
//! ## Overview
//! This crate builds a [`wbc_model::model::Model`] from a robot description file. The
//! [`config`] module then wraps that model into a [`wbc_model::robot_model::KinematicsModel`]
//! or [`wbc_model::robot_model::DynamicsModel`] for use by the rest of the whole-body-control
//! stack.
//!
//! ## Supported formats
//! Currently, the only supported format is URDF. Only the kinematic and inertial structure
//! of the description is parsed; visual, collision, and material elements are ignored.

pub mod config;
pub mod errors;
pub mod urdf;

#[cfg(test)]
mod tests;
