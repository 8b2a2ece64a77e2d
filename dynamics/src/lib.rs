//! Rotational dynamics of a single rigid spacecraft.

pub mod rigid_body;

pub use rigid_body::{RigidBodyErrors, RigidBodyState};
