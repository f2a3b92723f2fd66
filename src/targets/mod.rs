//! Reactive collision targets
//!
//! Targets subscribe to the collision bus, test each probe against their own
//! live geometry, and keep purely local visual state. Nothing flows back to
//! the simulation.

pub mod boxes;
pub mod text;

pub use boxes::BoxCollider;
pub use text::{HitRecord, LetterSpacing, TextCollider};
