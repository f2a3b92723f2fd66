//! Per-frame simulation tick
//!
//! One call per display frame: integrate the ball, resolve paddle and wall
//! bounces, run the active paddle policy, and hand back the tick's collision
//! probes for the caller to broadcast after drawing. Mode and pointer are
//! read fresh from [`ControlState`] on every call; nothing is cached between
//! ticks.

use glam::Vec2;
use rand::Rng;

use super::collision::{catches, circle_hits_rect};
use super::control::{snap_paddles, ControlMode, ControlState};
use super::state::{PaddleEdge, SimState};
use crate::bus::Probe;
use crate::consts::AUTO_PADDLE_STEP;

/// Advance the simulation by one tick and return this tick's probes
/// (point first, then circle), both carrying the post-update ball position.
pub fn tick(state: &mut SimState, control: &ControlState) -> [Probe; 2] {
    update_ball(state, control);

    match control.mode {
        ControlMode::Autonomous => update_paddles_auto(state),
        ControlMode::Pointer => snap_paddles(state, control.pointer),
    }

    let ball = state.ball;
    [
        Probe::Point { pos: ball.pos },
        Probe::Circle {
            pos: ball.pos,
            radius: ball.radius,
        },
    ]
}

fn update_ball(state: &mut SimState, control: &ControlState) {
    let SimState {
        ref mut ball,
        ref paddles,
        ref mut rng,
        speed_cfg,
        viewport,
    } = *state;

    ball.pos += ball.vel;

    // Paddle bounces: invert the component perpendicular to the paddle's
    // long edge, perturb the other so trajectories never settle into a loop,
    // then restore the scalar speed.
    for paddle in paddles {
        if !circle_hits_rect(ball.pos, ball.radius, &paddle.rect()) {
            continue;
        }
        if paddle.edge.is_horizontal() {
            ball.vel.y = -ball.vel.y;
            ball.vel.x += jitter(rng);
            // Only pointer-driven catches on the horizontal paddles feed the
            // speed ladder; side paddles never touch it.
            if control.mode == ControlMode::Pointer {
                ball.raise_speed(&speed_cfg);
            }
        } else {
            ball.vel.x = -ball.vel.x;
            ball.vel.y += jitter(rng);
        }
        ball.renormalize();
    }

    // Side walls
    if ball.pos.x - ball.radius < 0.0 || ball.pos.x + ball.radius > viewport.x {
        ball.vel.x = -ball.vel.x;
    }

    // Top/bottom edges. Crossing one in pointer mode without a horizontal
    // paddle underneath is a miss, and the speed ladder resets.
    if ball.pos.y - ball.radius < 0.0 || ball.pos.y + ball.radius > viewport.y {
        ball.vel.y = -ball.vel.y;

        if control.mode == ControlMode::Pointer {
            let caught = paddles
                .iter()
                .filter(|p| p.edge.is_horizontal())
                .any(|p| catches(ball.pos, ball.radius, &p.rect()));
            if !caught {
                ball.reset_speed();
            }
        }
    }
}

/// Small symmetric perturbation in (-1, 1)
fn jitter(rng: &mut impl Rng) -> f32 {
    (rng.random::<f32>() - 0.5) * 2.0
}

/// Autonomous policy: when the ball is heading toward a paddle's edge,
/// extrapolate the intercept at the paddle's fixed coordinate, fold it back
/// into the viewport through wall mirrors, and step toward it.
fn update_paddles_auto(state: &mut SimState) {
    let ball = state.ball;
    let viewport = state.viewport;

    for paddle in &mut state.paddles {
        if paddle.edge.is_horizontal() {
            let toward = (paddle.edge == PaddleEdge::Top && ball.vel.y < 0.0)
                || (paddle.edge == PaddleEdge::Bottom && ball.vel.y > 0.0);
            if toward {
                let time = match paddle.edge {
                    PaddleEdge::Top => (ball.pos.y - ball.radius - paddle.height) / -ball.vel.y,
                    _ => (paddle.pos.y - ball.pos.y - ball.radius) / ball.vel.y,
                };
                let intercept = ball.pos.x + ball.vel.x * time;
                paddle.target = fold_into_extent(intercept, viewport.x);
            }

            let center = paddle.center();
            if (center - paddle.target).abs() > AUTO_PADDLE_STEP {
                paddle.pos.x += AUTO_PADDLE_STEP * (paddle.target - center).signum();
            }
        } else {
            let toward = (paddle.edge == PaddleEdge::Left && ball.vel.x < 0.0)
                || (paddle.edge == PaddleEdge::Right && ball.vel.x > 0.0);
            if toward {
                let time = match paddle.edge {
                    PaddleEdge::Left => (ball.pos.x - ball.radius - paddle.width) / -ball.vel.x,
                    _ => (paddle.pos.x - ball.pos.x - ball.radius) / ball.vel.x,
                };
                let intercept = ball.pos.y + ball.vel.y * time;
                paddle.target = fold_into_extent(intercept, viewport.y);
            }

            let center = paddle.center();
            if (center - paddle.target).abs() > AUTO_PADDLE_STEP {
                paddle.pos.y += AUTO_PADDLE_STEP * (paddle.target - center).signum();
            }
        }
        paddle.clamp_to(viewport);
    }
}

/// Mirror a coordinate back into `[0, extent]`, reflecting off either wall as
/// many times as needed. Mirroring (not clamping) keeps the predicted
/// intercept faithful to how the ball actually bounces.
pub fn fold_into_extent(mut value: f32, extent: f32) -> f32 {
    if extent <= 0.0 {
        return 0.0;
    }
    if !value.is_finite() {
        return extent / 2.0;
    }
    while value < 0.0 || value > extent {
        if value < 0.0 {
            value = -value;
        }
        if value > extent {
            value = 2.0 * extent - value;
        }
    }
    value
}
