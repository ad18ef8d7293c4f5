//! Pantograph Core Types and Definitions
//!
//! This crate provides the foundational types for the Pantograph diagram
//! editor. It includes:
//!
//! - **Geometry**: points, sizes, bounds, and the border-intersection math
//!   behind connector anchoring ([`geometry`] module)
//! - **Identifiers**: stable arena handles for nodes and relationships
//!   ([`identifier`] module)
//! - **Model**: the diagram semantic model — typed nodes, typed
//!   relationships, and the invariant-enforcing aggregate ([`model`] module)
//!
//! Interaction, connector layout, undo, and persistence live in the
//! `pantograph` crate.

pub mod geometry;
pub mod identifier;
pub mod model;
