//! Pixel Rally - full-screen ball-and-paddle overlay
//!
//! Core modules:
//! - `sim`: Per-frame simulation (ball physics, paddle policies, control modes)
//! - `bus`: Collision event bus decoupling the simulation from page elements
//! - `targets`: Reactive collision targets (pixel text, boxes)
//! - `renderer`: WebGPU overlay rendering
//! - `post`: Watercolor post-processing chain (structure tensor + Kuwahara)
//! - `theme`: Retro color themes
//! - `settings`: Persisted preferences

pub mod bus;
pub mod glyphs;
pub mod post;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod targets;
pub mod theme;

pub use settings::Settings;
pub use theme::{Color, ColorTheme};

/// Overlay configuration constants
pub mod consts {
    /// Ball radius in CSS pixels
    pub const BALL_RADIUS: f32 = 8.0;
    /// Initial velocity components (magnitude 5 = BASE_SPEED)
    pub const BALL_START_VEL: (f32, f32) = (3.0, 4.0);

    /// Base scalar speed, pixels per tick
    pub const BASE_SPEED: f32 = 5.0;
    /// Highest speed level reachable through pointer-mode catches
    pub const MAX_SPEED_LEVEL: u32 = 10;
    /// Speed gained per level
    pub const SPEED_INCREMENT: f32 = 0.5;
    /// Hard speed ceiling
    pub const MAX_SPEED: f32 = 10.0;

    /// Paddle short side (perpendicular to its edge)
    pub const PADDLE_THICKNESS: f32 = 10.0;
    /// Paddle long side
    pub const PADDLE_LENGTH: f32 = 100.0;
    /// Autonomous paddle travel per tick
    pub const AUTO_PADDLE_STEP: f32 = 5.0;

    /// How long a completed word keeps blinking
    pub const BLINK_DURATION_MS: f64 = 5000.0;
    /// Box pulse duration after a circle-probe hit
    pub const PULSE_MS: f64 = 300.0;

    /// Device pixel ratio cap for render surfaces
    pub const MAX_DPR: f64 = 2.0;
    /// Default Kuwahara filter radius
    pub const KUWAHARA_RADIUS: u32 = 4;
}
