use rand::Rng;
use std::collections::VecDeque;

use super::geometry::Rect;
use crate::config::GameConfig;

/// One obstacle: an upper and a lower pipe sharing an x coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipePair {
    pub x: i32,
    /// Top edge of the upper pipe sprite (usually negative)
    pub upper_y: i32,
    /// Top edge of the lower pipe sprite
    pub lower_y: i32,
    /// Set once the pair has awarded its point
    pub scored: bool,
}

impl PipePair {
    /// A pair whose gap starts at `gap_y` and is `gap` pixels tall.
    pub fn with_gap(x: i32, gap_y: i32, gap: i32, pipe_height: i32) -> Self {
        Self {
            x,
            upper_y: gap_y - pipe_height,
            lower_y: gap_y + gap,
            scored: false,
        }
    }

    pub fn upper_rect(&self, pipe_width: i32, pipe_height: i32) -> Rect {
        Rect::new(self.x, self.upper_y, pipe_width, pipe_height)
    }

    pub fn lower_rect(&self, pipe_width: i32, pipe_height: i32) -> Rect {
        Rect::new(self.x, self.lower_y, pipe_width, pipe_height)
    }

    /// First free row below the upper pipe.
    pub fn gap_top(&self, pipe_height: i32) -> i32 {
        self.upper_y + pipe_height
    }

    pub fn gap_size(&self, pipe_height: i32) -> i32 {
        self.lower_y - self.gap_top(pipe_height)
    }

    pub fn mid_x(&self, pipe_width: i32) -> f64 {
        self.x as f64 + pipe_width as f64 / 2.0
    }
}

/// Generate a pair just beyond the right edge with a random gap offset.
///
/// The offset is drawn uniformly so the gap stays below the top fifth of the
/// play area and never reaches the ground line.
pub fn random_pipe_pair<R: Rng + ?Sized>(
    rng: &mut R,
    config: &GameConfig,
    pipe_height: i32,
) -> PipePair {
    let gap_y = rng.gen_range(0..config.gap_span()) + config.gap_floor();
    PipePair::with_gap(
        config.screen_width + config.spawn_offset,
        gap_y,
        config.pipe_gap,
        pipe_height,
    )
}

/// What a call to [`Pipes::recycle`] changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Recycled {
    pub spawned: bool,
    pub removed: bool,
}

/// Active pipe pairs in creation order; index 0 is the leftmost and oldest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pipes {
    pairs: VecDeque<PipePair>,
}

impl Pipes {
    pub fn new() -> Self {
        Self::default()
    }

    /// The two pairs a fresh game starts with, half a screen apart.
    pub fn initial<R: Rng + ?Sized>(rng: &mut R, config: &GameConfig, pipe_height: i32) -> Self {
        let first_x = config.screen_width + config.first_pipe_offset;
        let mut pipes = Self::new();
        for x in [first_x, first_x + config.screen_width / 2] {
            pipes.push(PipePair {
                x,
                ..random_pipe_pair(rng, config, pipe_height)
            });
        }
        pipes
    }

    /// Append a pair on the right. Pairs must arrive in left-to-right order.
    pub fn push(&mut self, pair: PipePair) {
        debug_assert!(
            self.pairs.back().map_or(true, |last| last.x <= pair.x),
            "pipe pairs must be appended in left-to-right order"
        );
        self.pairs.push_back(pair);
    }

    pub fn clear(&mut self) {
        self.pairs.clear();
    }

    pub fn front(&self) -> Option<&PipePair> {
        self.pairs.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PipePair> {
        self.pairs.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PipePair> {
        self.pairs.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Move every pair horizontally by `dx`.
    pub fn scroll(&mut self, dx: i32) {
        for pair in &mut self.pairs {
            pair.x += dx;
        }
    }

    /// Spawn a pair when the leading one nears the left edge and drop the
    /// leading one once it has fully left the screen.
    pub fn recycle<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        config: &GameConfig,
        pipe_width: i32,
        pipe_height: i32,
    ) -> Recycled {
        let mut recycled = Recycled::default();

        if let Some(front) = self.pairs.front() {
            if 0 < front.x && front.x < config.spawn_threshold {
                let pair = random_pipe_pair(rng, config, pipe_height);
                tracing::trace!("Spawning pipe pair at x={} (gap top {})", pair.x, pair.gap_top(pipe_height));
                self.push(pair);
                recycled.spawned = true;
            }
        }

        if let Some(front) = self.pairs.front() {
            if front.x < -pipe_width {
                tracing::trace!("Removing pipe pair at x={}", front.x);
                self.pairs.pop_front();
                recycled.removed = true;
            }
        }

        recycled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const PIPE_W: i32 = 52;
    const PIPE_H: i32 = 320;

    #[test]
    fn test_gap_is_exact_and_in_bounds() {
        let config = GameConfig::default();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..500 {
            let pair = random_pipe_pair(&mut rng, &config, PIPE_H);
            assert_eq!(pair.gap_size(PIPE_H), config.pipe_gap);
            assert_eq!(pair.x, config.screen_width + config.spawn_offset);
            assert!(pair.gap_top(PIPE_H) >= config.gap_floor());
            assert!(pair.lower_y < config.ground_y());
            assert!(!pair.scored);
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let config = GameConfig::default();
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);

        let first: Vec<PipePair> = (0..20).map(|_| random_pipe_pair(&mut a, &config, PIPE_H)).collect();
        let second: Vec<PipePair> = (0..20).map(|_| random_pipe_pair(&mut b, &config, PIPE_H)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_initial_layout() {
        let config = GameConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let pipes = Pipes::initial(&mut rng, &config, PIPE_H);

        let xs: Vec<i32> = pipes.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![488, 632]);
    }

    #[test]
    fn test_recycle_spawns_near_left_edge() {
        let config = GameConfig::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut pipes = Pipes::new();
        pipes.push(PipePair::with_gap(4, 150, config.pipe_gap, PIPE_H));

        let recycled = pipes.recycle(&mut rng, &config, PIPE_W, PIPE_H);
        assert!(recycled.spawned);
        assert!(!recycled.removed);
        assert_eq!(pipes.len(), 2);
        assert_eq!(pipes.iter().last().unwrap().x, 298);
    }

    #[test]
    fn test_recycle_removes_offscreen_front() {
        let config = GameConfig::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut pipes = Pipes::new();
        pipes.push(PipePair::with_gap(-PIPE_W - 1, 150, config.pipe_gap, PIPE_H));
        pipes.push(PipePair::with_gap(100, 150, config.pipe_gap, PIPE_H));

        let recycled = pipes.recycle(&mut rng, &config, PIPE_W, PIPE_H);
        assert!(recycled.removed);
        assert_eq!(pipes.len(), 1);
        assert_eq!(pipes.front().unwrap().x, 100);

        // Exactly at -width the pair is still (just) kept
        pipes.push(PipePair::with_gap(200, 150, config.pipe_gap, PIPE_H));
        pipes.scroll(-100 - PIPE_W);
        assert_eq!(pipes.front().unwrap().x, -PIPE_W);
        assert!(!pipes.recycle(&mut rng, &config, PIPE_W, PIPE_H).removed);
    }

    #[test]
    fn test_recycle_empty_is_noop() {
        let config = GameConfig::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut pipes = Pipes::new();
        assert_eq!(
            pipes.recycle(&mut rng, &config, PIPE_W, PIPE_H),
            Recycled::default()
        );
        assert!(pipes.is_empty());
    }
}
