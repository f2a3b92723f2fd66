//! Control-mode coordination
//!
//! Holds the current paddle policy and the latest pointer position. Both live
//! in shared mutable state that the tick re-reads every frame, so a change
//! takes effect on the very next tick without restarting the loop.

use glam::Vec2;

use super::state::SimState;

/// Who drives the paddles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMode {
    /// Paddles chase predicted intercepts on their own
    Autonomous,
    /// Paddles track the pointer directly
    Pointer,
}

/// Mode plus the last known pointer coordinate (viewport-absolute)
#[derive(Debug, Clone, Copy)]
pub struct ControlState {
    pub mode: ControlMode,
    pub pointer: Vec2,
}

impl ControlState {
    /// Autonomous by default, pointer assumed at the viewport center until
    /// the first move event arrives
    pub fn new(viewport: Vec2) -> Self {
        Self {
            mode: ControlMode::Autonomous,
            pointer: viewport / 2.0,
        }
    }
}

/// Switch modes. Entering pointer mode snaps every paddle to the pointer
/// synchronously, so the next rendered tick shows no jump.
pub fn set_mode(sim: &mut SimState, control: &mut ControlState, mode: ControlMode) {
    if control.mode == mode {
        return;
    }
    control.mode = mode;
    if mode == ControlMode::Pointer {
        snap_paddles(sim, control.pointer);
    }
    log::info!("control mode -> {:?}", mode);
}

/// Place every paddle's free axis directly under the pointer, clamped to the
/// viewport. Also the per-tick pointer policy.
pub fn snap_paddles(sim: &mut SimState, pointer: Vec2) {
    let viewport = sim.viewport;
    for paddle in &mut sim.paddles {
        if paddle.edge.is_horizontal() {
            paddle.pos.x = pointer.x - paddle.width / 2.0;
        } else {
            paddle.pos.y = pointer.y - paddle.height / 2.0;
        }
        paddle.clamp_to(viewport);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_to_pointer_snaps_immediately() {
        let viewport = Vec2::new(800.0, 600.0);
        let mut sim = SimState::new(viewport, 1);
        let mut control = ControlState::new(viewport);
        control.pointer = Vec2::new(200.0, 150.0);

        set_mode(&mut sim, &mut control, ControlMode::Pointer);

        let top = sim.paddles[0];
        assert_eq!(top.pos.x, 200.0 - top.width / 2.0);
        let left = sim.paddles[2];
        assert_eq!(left.pos.y, 150.0 - left.height / 2.0);
    }

    #[test]
    fn test_snap_clamps_at_viewport_edges() {
        let viewport = Vec2::new(800.0, 600.0);
        let mut sim = SimState::new(viewport, 1);
        snap_paddles(&mut sim, Vec2::new(-500.0, 10_000.0));

        assert_eq!(sim.paddles[0].pos.x, 0.0);
        assert_eq!(
            sim.paddles[2].pos.y,
            600.0 - sim.paddles[2].height
        );
    }

    #[test]
    fn test_redundant_mode_set_does_not_move_paddles() {
        let viewport = Vec2::new(800.0, 600.0);
        let mut sim = SimState::new(viewport, 1);
        let mut control = ControlState::new(viewport);
        control.pointer = Vec2::new(50.0, 50.0);
        let before = sim.paddles[0].pos;

        set_mode(&mut sim, &mut control, ControlMode::Autonomous);
        assert_eq!(sim.paddles[0].pos, before);
    }
}
