//! Simulation state and core types

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::collision::Rect;
use crate::consts::*;

/// Speed progression tuning. The level-to-speed mapping is
/// `min(base + level * increment, max)`.
#[derive(Debug, Clone, Copy)]
pub struct SpeedConfig {
    pub base_speed: f32,
    pub max_level: u32,
    pub increment: f32,
    pub max_speed: f32,
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            base_speed: BASE_SPEED,
            max_level: MAX_SPEED_LEVEL,
            increment: SPEED_INCREMENT,
            max_speed: MAX_SPEED,
        }
    }
}

/// The ball. Invariant: `vel.length() == speed` after every bounce or speed
/// change; direction may change freely, magnitude is re-normalized.
#[derive(Debug, Clone, Copy)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub speed: f32,
    pub base_speed: f32,
    pub speed_level: u32,
}

impl Ball {
    /// Ball centered in the viewport with the default launch vector
    pub fn new(viewport: Vec2) -> Self {
        Self {
            pos: viewport / 2.0,
            vel: Vec2::new(BALL_START_VEL.0, BALL_START_VEL.1),
            radius: BALL_RADIUS,
            speed: BASE_SPEED,
            base_speed: BASE_SPEED,
            speed_level: 0,
        }
    }

    /// Rescale velocity to the current scalar speed, keeping direction
    pub fn renormalize(&mut self) {
        let magnitude = self.vel.length();
        if magnitude > f32::EPSILON {
            self.vel = self.vel / magnitude * self.speed;
        }
    }

    /// Step the speed level up one (capped). Returns true if it changed.
    pub fn raise_speed(&mut self, cfg: &SpeedConfig) -> bool {
        if self.speed_level >= cfg.max_level {
            return false;
        }
        self.speed_level += 1;
        self.speed =
            (self.base_speed + self.speed_level as f32 * cfg.increment).min(cfg.max_speed);
        self.renormalize();
        log::debug!(
            "speed level {} -> {:.2} px/tick",
            self.speed_level,
            self.speed
        );
        true
    }

    /// Drop back to the base speed after a miss
    pub fn reset_speed(&mut self) {
        self.speed_level = 0;
        self.speed = self.base_speed;
        self.renormalize();
        log::debug!("speed reset to base");
    }
}

/// Which viewport edge a paddle defends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaddleEdge {
    Top,
    Bottom,
    Left,
    Right,
}

impl PaddleEdge {
    /// Top/bottom paddles travel horizontally
    pub fn is_horizontal(&self) -> bool {
        matches!(self, PaddleEdge::Top | PaddleEdge::Bottom)
    }
}

/// An edge-anchored paddle. `target` is the intercept coordinate used only by
/// the autonomous policy. The free-axis position is always clamped inside the
/// viewport.
#[derive(Debug, Clone, Copy)]
pub struct Paddle {
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    pub edge: PaddleEdge,
    pub target: f32,
}

impl Paddle {
    fn new(edge: PaddleEdge, viewport: Vec2) -> Self {
        let (width, height) = if edge.is_horizontal() {
            (PADDLE_LENGTH, PADDLE_THICKNESS)
        } else {
            (PADDLE_THICKNESS, PADDLE_LENGTH)
        };
        let mut paddle = Self {
            pos: Vec2::ZERO,
            width,
            height,
            edge,
            target: if edge.is_horizontal() {
                viewport.x / 2.0
            } else {
                viewport.y / 2.0
            },
        };
        paddle.anchor(viewport);
        paddle
    }

    /// Bounding rectangle in viewport coordinates
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.width, self.height)
    }

    /// Center coordinate along the free axis
    pub fn center(&self) -> f32 {
        if self.edge.is_horizontal() {
            self.pos.x + self.width / 2.0
        } else {
            self.pos.y + self.height / 2.0
        }
    }

    /// Clamp the free-axis position so the paddle stays fully on screen
    pub fn clamp_to(&mut self, viewport: Vec2) {
        if self.edge.is_horizontal() {
            self.pos.x = self.pos.x.clamp(0.0, (viewport.x - self.width).max(0.0));
        } else {
            self.pos.y = self.pos.y.clamp(0.0, (viewport.y - self.height).max(0.0));
        }
    }

    /// Re-anchor against the owning edge and recenter the free axis. Called
    /// at construction and whenever the viewport resizes.
    pub fn anchor(&mut self, viewport: Vec2) {
        match self.edge {
            PaddleEdge::Top => {
                self.pos = Vec2::new(viewport.x / 2.0 - self.width / 2.0, 0.0);
            }
            PaddleEdge::Bottom => {
                self.pos = Vec2::new(
                    viewport.x / 2.0 - self.width / 2.0,
                    viewport.y - self.height,
                );
            }
            PaddleEdge::Left => {
                self.pos = Vec2::new(0.0, viewport.y / 2.0 - self.height / 2.0);
            }
            PaddleEdge::Right => {
                self.pos = Vec2::new(
                    viewport.x - self.width,
                    viewport.y / 2.0 - self.height / 2.0,
                );
            }
        }
        self.clamp_to(viewport);
    }
}

/// Complete simulation state. Lives behind the app's shared cell; mutated
/// only by the tick and by the resize/mode-switch callbacks between ticks.
#[derive(Debug, Clone)]
pub struct SimState {
    pub viewport: Vec2,
    pub ball: Ball,
    pub paddles: [Paddle; 4],
    pub speed_cfg: SpeedConfig,
    pub rng: Pcg32,
}

impl SimState {
    pub fn new(viewport: Vec2, seed: u64) -> Self {
        Self {
            viewport,
            ball: Ball::new(viewport),
            paddles: [
                Paddle::new(PaddleEdge::Top, viewport),
                Paddle::new(PaddleEdge::Bottom, viewport),
                Paddle::new(PaddleEdge::Left, viewport),
                Paddle::new(PaddleEdge::Right, viewport),
            ],
            speed_cfg: SpeedConfig::default(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Apply a viewport resize: re-anchor every paddle before the next tick
    pub fn resize(&mut self, viewport: Vec2) {
        self.viewport = viewport;
        for paddle in &mut self.paddles {
            paddle.anchor(viewport);
        }
        log::info!("viewport resized to {}x{}", viewport.x, viewport.y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ball_starts_centered_at_base_speed() {
        let ball = Ball::new(Vec2::new(800.0, 600.0));
        assert_eq!(ball.pos, Vec2::new(400.0, 300.0));
        assert!((ball.vel.length() - ball.speed).abs() < 1e-4);
        assert_eq!(ball.speed_level, 0);
    }

    #[test]
    fn test_raise_speed_caps_at_max_level() {
        let cfg = SpeedConfig::default();
        let mut ball = Ball::new(Vec2::new(800.0, 600.0));

        for _ in 0..cfg.max_level {
            assert!(ball.raise_speed(&cfg));
        }
        assert!(!ball.raise_speed(&cfg));
        assert_eq!(ball.speed_level, cfg.max_level);
        assert!(ball.speed <= cfg.max_speed + 1e-6);
        assert!((ball.vel.length() - ball.speed).abs() < 1e-3);
    }

    #[test]
    fn test_reset_speed_returns_to_base() {
        let cfg = SpeedConfig::default();
        let mut ball = Ball::new(Vec2::new(800.0, 600.0));
        ball.raise_speed(&cfg);
        ball.raise_speed(&cfg);

        ball.reset_speed();
        assert_eq!(ball.speed_level, 0);
        assert_eq!(ball.speed, ball.base_speed);
        assert!((ball.vel.length() - ball.speed).abs() < 1e-3);
    }

    #[test]
    fn test_paddles_anchor_on_resize() {
        let mut state = SimState::new(Vec2::new(800.0, 600.0), 7);
        state.resize(Vec2::new(1200.0, 800.0));

        let bottom = state.paddles[1];
        assert_eq!(bottom.edge, PaddleEdge::Bottom);
        assert_eq!(bottom.pos.y, 800.0 - bottom.height);
        assert_eq!(bottom.pos.x, 600.0 - bottom.width / 2.0);

        let right = state.paddles[3];
        assert_eq!(right.edge, PaddleEdge::Right);
        assert_eq!(right.pos.x, 1200.0 - right.width);
        assert_eq!(right.pos.y, 400.0 - right.height / 2.0);
    }

    #[test]
    fn test_clamp_keeps_paddle_inside() {
        let viewport = Vec2::new(800.0, 600.0);
        let mut state = SimState::new(viewport, 7);
        let paddle = &mut state.paddles[0];
        paddle.pos.x = -50.0;
        paddle.clamp_to(viewport);
        assert_eq!(paddle.pos.x, 0.0);
        paddle.pos.x = 10_000.0;
        paddle.clamp_to(viewport);
        assert_eq!(paddle.pos.x, 800.0 - paddle.width);
    }
}
