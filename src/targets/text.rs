//! Pixel-text collision target
//!
//! A run of glyph bitmaps drawn as square cells. Point probes are tested
//! against the filled cells character by character; the first untouched
//! character under the probe gets a hit record with a palette color. Once
//! every character of a word has been hit the whole word starts blinking,
//! and stops on its own five seconds later.
//!
//! The hit map is sparse (index -> record) and only ever grows within a
//! mount; nothing is un-hit except by the blink-stop rule.

use std::collections::{HashMap, HashSet};

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::BLINK_DURATION_MS;
use crate::glyphs::{glyph_for, Glyph};
use crate::theme::Color;

/// Horizontal breathing room between characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LetterSpacing {
    #[default]
    Normal,
    Wide,
    Wider,
}

impl LetterSpacing {
    /// Multiplier applied to each character's advance
    pub fn factor(&self) -> f32 {
        match self {
            LetterSpacing::Normal => 1.1,
            LetterSpacing::Wide => 1.3,
            LetterSpacing::Wider => 1.6,
        }
    }
}

/// Visual state of one hit character
#[derive(Debug, Clone, Copy)]
pub struct HitRecord {
    /// Palette color assigned at first hit
    pub color: Color,
    /// When the hit (or the word completion) happened
    pub timestamp_ms: f64,
    pub blinking: bool,
    /// 0..1, advanced once per rendered frame
    pub blink_phase: f32,
    pub blink_speed: f32,
    /// Owning word, if the character belongs to one
    pub word: Option<usize>,
}

/// A filled cell's position within the target's canvas
#[derive(Debug, Clone, Copy)]
pub struct CellRect {
    pub char_index: usize,
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

/// Collision state machine for one mounted text element
pub struct TextCollider {
    chars: Vec<char>,
    glyphs: Vec<&'static Glyph>,
    pixel_size: f32,
    gap: f32,
    /// x-offset of each character, accumulated over preceding glyph widths
    offsets: Vec<f32>,
    size: Vec2,
    words: Vec<Vec<usize>>,
    hit_in_word: Vec<HashSet<usize>>,
    completed: HashSet<usize>,
    hits: HashMap<usize, HitRecord>,
    rng: Pcg32,
}

impl TextCollider {
    /// Lay out `text` at the given pixel size. `word_groups` overrides the
    /// default grouping (split on spaces).
    pub fn new(
        text: &str,
        pixel_size: f32,
        spacing: LetterSpacing,
        word_groups: Option<Vec<Vec<usize>>>,
        seed: u64,
    ) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let glyphs: Vec<&'static Glyph> = chars.iter().map(|&c| glyph_for(c)).collect();

        let gap = (pixel_size / 4.0).max(1.0);
        let cell = pixel_size + gap;
        let factor = spacing.factor();

        let mut offsets = Vec::with_capacity(chars.len());
        let mut x = 0.0f32;
        let mut height = 0.0f32;
        for glyph in &glyphs {
            offsets.push(x);
            x += (glyph.cols() as f32 * cell + gap) * factor;
            height = height.max(glyph.rows() as f32 * cell + gap);
        }

        let words = word_groups.unwrap_or_else(|| derive_word_groups(&chars));
        let hit_in_word = vec![HashSet::new(); words.len()];

        Self {
            chars,
            glyphs,
            pixel_size,
            gap,
            offsets,
            size: Vec2::new(x, height),
            words,
            hit_in_word,
            completed: HashSet::new(),
            hits: HashMap::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Canvas size needed to draw the full run
    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn pixel_size(&self) -> f32 {
        self.pixel_size
    }

    pub fn hit(&self, index: usize) -> Option<&HitRecord> {
        self.hits.get(&index)
    }

    pub fn completed_words(&self) -> &HashSet<usize> {
        &self.completed
    }

    /// Word index owning a character, if any
    pub fn word_of(&self, char_index: usize) -> Option<usize> {
        self.words.iter().position(|w| w.contains(&char_index))
    }

    /// Test a point probe, given the element's current top-left origin in the
    /// same coordinate space as the probe. The origin must be re-read from
    /// the live element every probe; the page may have scrolled since the
    /// last one. Returns the index of a freshly hit character.
    pub fn probe_point(
        &mut self,
        probe: Vec2,
        origin: Vec2,
        palette: &[Color],
        now_ms: f64,
    ) -> Option<usize> {
        let local = probe - origin;
        // Outside the canvas is a normal miss
        if local.x < 0.0 || local.x >= self.size.x || local.y < 0.0 || local.y >= self.size.y {
            return None;
        }

        for i in 0..self.chars.len() {
            let cell_hit = self.char_cell_hit(i, local);
            if cell_hit && !self.hits.contains_key(&i) {
                let color = palette
                    .get(i % palette.len().max(1))
                    .copied()
                    .unwrap_or(crate::theme::WHITE);
                let word = self.word_of(i);
                let blink_speed = self.fresh_blink_speed();
                self.hits.insert(
                    i,
                    HitRecord {
                        color,
                        timestamp_ms: now_ms,
                        blinking: false,
                        blink_phase: 0.0,
                        blink_speed,
                        word,
                    },
                );
                if let Some(w) = word {
                    self.hit_in_word[w].insert(i);
                    self.check_word_completion(w, now_ms);
                }
                return Some(i);
            }
        }
        None
    }

    /// Whether the local point lands on a filled cell of character `i`
    fn char_cell_hit(&self, i: usize, local: Vec2) -> bool {
        let glyph = self.glyphs[i];
        let cell = self.pixel_size + self.gap;
        let x0 = self.offsets[i];
        for row in 0..glyph.rows() {
            for col in 0..glyph.cols() {
                if !glyph.filled(col, row) {
                    continue;
                }
                let px = x0 + col as f32 * cell + self.gap;
                let py = row as f32 * cell + self.gap;
                if local.x >= px
                    && local.x < px + self.pixel_size
                    && local.y >= py
                    && local.y < py + self.pixel_size
                {
                    return true;
                }
            }
        }
        false
    }

    /// Once all characters of a word are hit, complete it exactly once and
    /// flip every member to blinking in the same update.
    fn check_word_completion(&mut self, word: usize, now_ms: f64) {
        if self.completed.contains(&word) {
            return;
        }
        let all_hit = self.words[word]
            .iter()
            .all(|i| self.hit_in_word[word].contains(i));
        if !all_hit {
            return;
        }

        self.completed.insert(word);
        log::debug!("word {word} complete, starting blink");

        let count = self.words[word].len();
        let mut speeds = Vec::with_capacity(count);
        for _ in 0..count {
            speeds.push(self.fresh_blink_speed());
        }
        for (&i, speed) in self.words[word].iter().zip(speeds) {
            if let Some(record) = self.hits.get_mut(&i) {
                record.blinking = true;
                record.blink_phase = 0.0;
                record.blink_speed = speed;
                record.timestamp_ms = now_ms;
            }
        }
    }

    fn fresh_blink_speed(&mut self) -> f32 {
        0.05 + self.rng.random::<f32>() * 0.05
    }

    /// Advance blink phases one rendered frame. Returns true while anything
    /// is still blinking so the caller knows to keep scheduling frames.
    pub fn advance_blink(&mut self) -> bool {
        let mut any = false;
        for record in self.hits.values_mut() {
            if record.blinking {
                record.blink_phase = (record.blink_phase + record.blink_speed) % 1.0;
                any = true;
            }
        }
        any
    }

    /// Periodic sweep: blinking stops five seconds after its timestamp.
    /// Wall-clock comparison, not per-character timers.
    pub fn sweep_blink(&mut self, now_ms: f64) {
        for record in self.hits.values_mut() {
            if record.blinking && now_ms - record.timestamp_ms > BLINK_DURATION_MS {
                record.blinking = false;
            }
        }
    }

    pub fn any_blinking(&self) -> bool {
        self.hits.values().any(|r| r.blinking)
    }

    /// Color to draw character `i` with this frame
    pub fn render_color(&self, i: usize, base: Color) -> Color {
        match self.hits.get(&i) {
            None => base,
            Some(record) if record.blinking => {
                let wave = (record.blink_phase * std::f32::consts::TAU).sin() * 0.5 + 0.5;
                if wave > 0.5 {
                    record.color
                } else {
                    base
                }
            }
            Some(record) => record.color,
        }
    }

    /// Every filled cell with its canvas position, for drawing
    pub fn cells(&self) -> Vec<CellRect> {
        let cell = self.pixel_size + self.gap;
        let mut out = Vec::new();
        for (i, glyph) in self.glyphs.iter().enumerate() {
            let x0 = self.offsets[i];
            for row in 0..glyph.rows() {
                for col in 0..glyph.cols() {
                    if glyph.filled(col, row) {
                        out.push(CellRect {
                            char_index: i,
                            x: x0 + col as f32 * cell + self.gap,
                            y: row as f32 * cell + self.gap,
                            size: self.pixel_size,
                        });
                    }
                }
            }
        }
        out
    }

}

/// Default word grouping: consecutive non-space character indices
fn derive_word_groups(chars: &[char]) -> Vec<Vec<usize>> {
    let mut groups = Vec::new();
    let mut current = Vec::new();
    for (i, &c) in chars.iter().enumerate() {
        if c == ' ' {
            if !current.is_empty() {
                groups.push(std::mem::take(&mut current));
            }
        } else {
            current.push(i);
        }
    }
    if !current.is_empty() {
        groups.push(current);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::builtin_themes;

    const PS: f32 = 4.0;

    fn palette() -> Vec<Color> {
        builtin_themes()[3].hit_colors.clone() // NES, 3 colors
    }

    /// Center of the first filled cell of character `i`
    fn first_cell_center(collider: &TextCollider, i: usize) -> Vec2 {
        let cell = collider
            .cells()
            .into_iter()
            .find(|c| c.char_index == i)
            .expect("character has filled cells");
        Vec2::new(cell.x + cell.size / 2.0, cell.y + cell.size / 2.0)
    }

    #[test]
    fn test_layout_advances_accumulate() {
        // H is 4 cols: advance = (4 * (ps + gap) + gap) * 1.1
        let collider = TextCollider::new("HI", PS, LetterSpacing::Normal, None, 1);
        let gap = 1.0;
        let cell = PS + gap;
        let h_advance = (4.0 * cell + gap) * 1.1;
        assert!((collider.offsets[1] - h_advance).abs() < 1e-4);
        // I is 3 cols
        let total = h_advance + (3.0 * cell + gap) * 1.1;
        assert!((collider.size().x - total).abs() < 1e-4);
        assert!((collider.size().y - (5.0 * cell + gap)).abs() < 1e-4);
    }

    #[test]
    fn test_probe_hit_assigns_palette_color() {
        let mut collider = TextCollider::new("HI", PS, LetterSpacing::Normal, None, 1);
        let palette = palette();
        let probe = first_cell_center(&collider, 0);

        let hit = collider.probe_point(probe, Vec2::ZERO, &palette, 1000.0);
        assert_eq!(hit, Some(0));

        let record = collider.hit(0).unwrap();
        assert_eq!(record.color, palette[0]);
        assert!(!record.blinking);
        assert_eq!(record.timestamp_ms, 1000.0);
        assert!(record.blink_speed >= 0.05 && record.blink_speed <= 0.1);
    }

    #[test]
    fn test_probe_miss_outside_canvas() {
        let mut collider = TextCollider::new("HI", PS, LetterSpacing::Normal, None, 1);
        let hit = collider.probe_point(Vec2::new(-5.0, 2.0), Vec2::ZERO, &palette(), 0.0);
        assert_eq!(hit, None);
        assert!(collider.hit(0).is_none());
    }

    #[test]
    fn test_probe_respects_moving_origin() {
        // Same viewport point, element scrolled 100px up between probes
        let mut collider = TextCollider::new("HI", PS, LetterSpacing::Normal, None, 1);
        let local = first_cell_center(&collider, 0);
        let probe = local + Vec2::new(40.0, 300.0);

        assert_eq!(
            collider.probe_point(probe, Vec2::new(40.0, 200.0), &palette(), 0.0),
            None
        );
        assert_eq!(
            collider.probe_point(probe, Vec2::new(40.0, 300.0), &palette(), 0.0),
            Some(0)
        );
    }

    #[test]
    fn test_repeat_probe_is_inert() {
        let mut collider = TextCollider::new("HI", PS, LetterSpacing::Normal, None, 1);
        let probe = first_cell_center(&collider, 0);
        let palette = palette();

        assert_eq!(collider.probe_point(probe, Vec2::ZERO, &palette, 50.0), Some(0));
        // Identical probe again: no fresh hit, timestamp untouched
        assert_eq!(collider.probe_point(probe, Vec2::ZERO, &palette, 99.0), None);
        assert_eq!(collider.hit(0).unwrap().timestamp_ms, 50.0);
    }

    #[test]
    fn test_word_completion_flips_all_members_to_blinking() {
        let mut collider =
            TextCollider::new("HI", PS, LetterSpacing::Normal, Some(vec![vec![0, 1]]), 1);
        let palette = palette();

        let p0 = first_cell_center(&collider, 0);
        let p1 = first_cell_center(&collider, 1);

        collider.probe_point(p0, Vec2::ZERO, &palette, 100.0);
        assert!(collider.completed_words().is_empty());
        assert!(!collider.hit(0).unwrap().blinking);

        collider.probe_point(p1, Vec2::ZERO, &palette, 200.0);
        assert_eq!(collider.completed_words().len(), 1);
        assert!(collider.completed_words().contains(&0));
        assert!(collider.hit(0).unwrap().blinking);
        assert!(collider.hit(1).unwrap().blinking);
        // Word completion restamps both records
        assert_eq!(collider.hit(0).unwrap().timestamp_ms, 200.0);
    }

    #[test]
    fn test_word_groups_derived_from_spaces() {
        let collider = TextCollider::new("HI HO", PS, LetterSpacing::Normal, None, 1);
        assert_eq!(collider.word_of(0), Some(0));
        assert_eq!(collider.word_of(1), Some(0));
        assert_eq!(collider.word_of(2), None); // the space itself
        assert_eq!(collider.word_of(3), Some(1));
        assert_eq!(collider.word_of(4), Some(1));
    }

    #[test]
    fn test_blink_stops_after_five_seconds() {
        let mut collider =
            TextCollider::new("HI", PS, LetterSpacing::Normal, Some(vec![vec![0, 1]]), 1);
        let palette = palette();
        collider.probe_point(first_cell_center(&collider, 0), Vec2::ZERO, &palette, 0.0);
        collider.probe_point(first_cell_center(&collider, 1), Vec2::ZERO, &palette, 0.0);
        assert!(collider.any_blinking());

        collider.sweep_blink(4_999.0);
        assert!(collider.any_blinking());

        collider.sweep_blink(5_001.0);
        assert!(!collider.any_blinking());
        // Hit records survive; only the blink state decays
        assert!(collider.hit(0).is_some());
    }

    #[test]
    fn test_blink_animation_self_halts() {
        let mut collider = TextCollider::new("HI", PS, LetterSpacing::Normal, None, 1);
        collider.probe_point(first_cell_center(&collider, 0), Vec2::ZERO, &palette(), 0.0);

        // Solid hit, not blinking: nothing to animate
        assert!(!collider.advance_blink());
    }

    #[test]
    fn test_render_color_states() {
        let mut collider =
            TextCollider::new("HI", PS, LetterSpacing::Normal, Some(vec![vec![0, 1]]), 1);
        let palette = palette();
        let base = builtin_themes()[0].text;

        assert_eq!(collider.render_color(0, base), base);

        collider.probe_point(first_cell_center(&collider, 0), Vec2::ZERO, &palette, 0.0);
        assert_eq!(collider.render_color(0, base), palette[0]);

        collider.probe_point(first_cell_center(&collider, 1), Vec2::ZERO, &palette, 0.0);
        // Blinking with phase 0: sin(0) maps to the base half of the wave
        assert_eq!(collider.render_color(0, base), base);
    }
}
