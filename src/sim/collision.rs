//! Circle-vs-rectangle collision
//!
//! Everything in the overlay is a circle (ball, probe) meeting an
//! axis-aligned rectangle (paddle, box target). The closest point on the
//! rectangle is found by clamping the circle center into the rectangle's
//! extent; a collision is declared when the squared distance from that point
//! to the center is below the squared radius.

use glam::Vec2;

/// Axis-aligned rectangle in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            max: Vec2::new(x + width, y + height),
        }
    }

    /// Closest point on (or inside) the rectangle to `p`
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max)
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }
}

/// Closest-point circle/rectangle overlap test
#[inline]
pub fn circle_hits_rect(center: Vec2, radius: f32, rect: &Rect) -> bool {
    let closest = rect.closest_point(center);
    center.distance_squared(closest) < radius * radius
}

/// Catch test for horizontal paddles: the ball's top or bottom rim sits
/// within the paddle's vertical band while the x-extents overlap. Looser than
/// the bounce test on purpose; used only to decide whether a top/bottom exit
/// was a miss.
pub fn catches(center: Vec2, radius: f32, rect: &Rect) -> bool {
    let ball_top = center.y - radius;
    let ball_bottom = center.y + radius;

    let vertical = (ball_bottom >= rect.min.y && ball_bottom <= rect.max.y)
        || (ball_top <= rect.max.y && ball_top >= rect.min.y);

    vertical && center.x + radius >= rect.min.x && center.x - radius <= rect.max.x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closest_point_clamps_into_extent() {
        let rect = Rect::new(350.0, 590.0, 100.0, 10.0);
        assert_eq!(
            rect.closest_point(Vec2::new(400.0, 300.0)),
            Vec2::new(400.0, 590.0)
        );
        assert_eq!(
            rect.closest_point(Vec2::new(0.0, 0.0)),
            Vec2::new(350.0, 590.0)
        );
        // Point inside maps to itself
        assert_eq!(
            rect.closest_point(Vec2::new(400.0, 595.0)),
            Vec2::new(400.0, 595.0)
        );
    }

    #[test]
    fn test_circle_hits_rect_edge_cases() {
        let rect = Rect::new(100.0, 100.0, 50.0, 10.0);

        // Just overlapping the top edge
        assert!(circle_hits_rect(Vec2::new(125.0, 93.0), 8.0, &rect));
        // Exactly touching is not a hit (strict inequality)
        assert!(!circle_hits_rect(Vec2::new(125.0, 92.0), 8.0, &rect));
        // Corner approach uses true distance, not per-axis bands
        assert!(!circle_hits_rect(Vec2::new(94.0, 94.0), 8.0, &rect));
        assert!(circle_hits_rect(Vec2::new(96.0, 96.0), 8.0, &rect));
    }

    #[test]
    fn test_catch_band() {
        let paddle = Rect::new(350.0, 590.0, 100.0, 10.0);

        // Ball resting on the paddle band
        assert!(catches(Vec2::new(400.0, 585.0), 8.0, &paddle));
        // Ball past the paddle horizontally
        assert!(!catches(Vec2::new(200.0, 585.0), 8.0, &paddle));
        // Ball well above the band
        assert!(!catches(Vec2::new(400.0, 400.0), 8.0, &paddle));
    }
}
