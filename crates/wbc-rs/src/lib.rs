//! # **`wbc`**: A Rust library for Whole-Body Control
//!
//! `wbc` provides a hierarchical task-priority solver for articulated robots: declarative
//! Cartesian and joint-space tasks are turned into a cascade of quadratic programs (an HQP)
//! and solved for joint velocities, or jointly for accelerations, torques and contact forces
//! (TSID), each priority level only acting in the null space of the ones above it.
//!
//! This library draws on two inspiration sources:
//! - the task-priority / HQP formulation used across the whole-body-control literature for
//!   humanoid and manipulator control,
//! - the C++ library [Pinocchio](https://github.com/stack-of-tasks/pinocchio/), a widely-used
//!   library for rigid body dynamics in robotics, which served as a reference for the
//!   kinematics/dynamics API design in [`wbc-model`](https://docs.rs/crate/wbc-model/latest).
//!
//! ## Features
//! - Representation of rigid body systems using articulated body models, with kinematics-only
//!   and full-dynamics variants and optional floating bases.
//! - Parsing of model files in URDF (Unified Robot Description Format).
//! - Cartesian and joint-space tasks, composed into a priority-ordered hierarchy.
//! - Two HQP solvers: a hierarchical least-squares solver (strict lexicographic priority via
//!   null-space projection) and a single-QP solver with a geometric priority-weight cascade.
//! - Scenes that wire tasks and a robot model into a solver, for velocity-level control or
//!   acceleration/torque/contact-force task-space inverse dynamics.
//!
//! ## Crates
//! The `wbc` library is organized into several crates, each focusing on a specific aspect of
//! whole-body control:
//! - [`wbc-rs`](https://docs.rs/crate/wbc-rs/latest): the main crate that provides high-level functionalities and interfaces.
//! - [`wbc-spatial`](https://docs.rs/crate/wbc-spatial/latest): implements spatial algebra used in rigid body dynamics, such as spatial vectors and transformations.
//! - [`wbc-model`](https://docs.rs/crate/wbc-model/latest): contains model and data structures for rigid body systems.
//! - [`wbc-joint`](https://docs.rs/crate/wbc-joint/latest): implements various joint types and their properties.
//! - [`wbc-inertia`](https://docs.rs/crate/wbc-inertia/latest): provides inertia-related computations and data structures.
//! - [`wbc-parse`](https://docs.rs/crate/wbc-parse/latest): utilities for parsing model files and configurations.
//! - [`wbc-task`](https://docs.rs/crate/wbc-task/latest): Cartesian and joint-space task constraints.
//! - [`wbc-hqp`](https://docs.rs/crate/wbc-hqp/latest): the hierarchical QP data structures shared by every solver.
//! - [`wbc-solve`](https://docs.rs/crate/wbc-solve/latest): the HQP solvers.
//! - [`wbc-scene`](https://docs.rs/crate/wbc-scene/latest): wires tasks, a robot model and a solver together per control cycle.

pub use wbc_hqp as hqp;
pub use wbc_inertia as inertia;
pub use wbc_joint as joint;
pub use wbc_model as model;
pub use wbc_parse as parse;
pub use wbc_scene as scene;
pub use wbc_solve as solve;
pub use wbc_spatial as spatial;
pub use wbc_task as task;

pub mod prelude;
