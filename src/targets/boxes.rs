//! Box collision target
//!
//! A bordered page element that pulses briefly when the ball's circle probe
//! overlaps its rectangle. Same closest-point test as the paddle collision,
//! against bounds re-read from the live element on every probe.

use glam::Vec2;

use crate::consts::PULSE_MS;
use crate::sim::collision::{circle_hits_rect, Rect};

/// Pulse state for one mounted box element
#[derive(Debug, Clone, Copy, Default)]
pub struct BoxCollider {
    pulse_started_ms: Option<f64>,
}

impl BoxCollider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test a circle probe against the element's current bounds. A hit
    /// (re)starts the pulse. Returns whether this probe overlapped.
    pub fn probe_circle(
        &mut self,
        center: Vec2,
        radius: f32,
        bounds: &Rect,
        now_ms: f64,
    ) -> bool {
        if circle_hits_rect(center, radius, bounds) {
            self.pulse_started_ms = Some(now_ms);
            true
        } else {
            false
        }
    }

    pub fn is_pulsing(&self, now_ms: f64) -> bool {
        matches!(self.pulse_started_ms, Some(t) if now_ms - t < PULSE_MS)
    }

    /// Scale factor for the transient pulse: pops out on the hit, eases back
    /// to 1.0 over the pulse window.
    pub fn scale(&self, now_ms: f64) -> f32 {
        match self.pulse_started_ms {
            Some(t) if now_ms - t < PULSE_MS => {
                let remaining = 1.0 - ((now_ms - t) / PULSE_MS) as f32;
                1.0 + 0.06 * remaining
            }
            _ => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_starts_pulse() {
        let mut collider = BoxCollider::new();
        let bounds = Rect::new(100.0, 100.0, 200.0, 80.0);

        assert!(collider.probe_circle(Vec2::new(95.0, 120.0), 8.0, &bounds, 1000.0));
        assert!(collider.is_pulsing(1000.0));
        assert!(collider.scale(1000.0) > 1.0);
    }

    #[test]
    fn test_pulse_expires_after_window() {
        let mut collider = BoxCollider::new();
        let bounds = Rect::new(0.0, 0.0, 50.0, 50.0);
        collider.probe_circle(Vec2::new(25.0, 25.0), 8.0, &bounds, 0.0);

        assert!(collider.is_pulsing(299.0));
        assert!(!collider.is_pulsing(301.0));
        assert_eq!(collider.scale(301.0), 1.0);
    }

    #[test]
    fn test_miss_leaves_state_untouched() {
        let mut collider = BoxCollider::new();
        let bounds = Rect::new(0.0, 0.0, 50.0, 50.0);

        assert!(!collider.probe_circle(Vec2::new(500.0, 500.0), 8.0, &bounds, 0.0));
        assert!(!collider.is_pulsing(0.0));
        assert_eq!(collider.scale(0.0), 1.0);
    }

    #[test]
    fn test_rehit_restarts_pulse() {
        let mut collider = BoxCollider::new();
        let bounds = Rect::new(0.0, 0.0, 50.0, 50.0);
        collider.probe_circle(Vec2::new(25.0, 25.0), 8.0, &bounds, 0.0);
        collider.probe_circle(Vec2::new(25.0, 25.0), 8.0, &bounds, 250.0);

        assert!(collider.is_pulsing(500.0));
        assert!(!collider.is_pulsing(551.0));
    }
}
