//! Overlay simulation
//!
//! All gameplay logic lives here. This module is pure and platform-free:
//! - One tick per display frame, no internal scheduling
//! - Seeded RNG only (bounce jitter)
//! - No rendering or DOM dependencies; probes are returned, not dispatched

pub mod collision;
pub mod control;
pub mod state;
pub mod tick;

pub use collision::Rect;
pub use control::{ControlMode, ControlState};
pub use state::{Ball, Paddle, PaddleEdge, SimState, SpeedConfig};
pub use tick::{fold_into_extent, tick};
