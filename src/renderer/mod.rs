//! WebGPU rendering module
//!
//! The overlay scene (ball + paddles) is drawn entirely in a fullscreen
//! fragment shader using signed distance fields.

pub mod overlay;

pub use overlay::OverlayRenderState;
