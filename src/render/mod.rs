//! Headless presentation: a software rasterizer that turns a [`GameState`]
//! into an RGB frame, behind the [`Presenter`] seam the environment reports to.

use image::RgbImage;
use std::path::Path;
use std::sync::Arc;

use crate::config::GameConfig;
use crate::game::{GameState, HitMask, SpriteMasks, StepEvents};
use crate::{Error, Result};

pub const SKY: [u8; 3] = [135, 206, 235];
pub const PIPE: [u8; 3] = [83, 191, 47];
pub const GROUND: [u8; 3] = [222, 216, 149];
pub const BIRD: [u8; 3] = [255, 255, 0];
pub const SCORE: [u8; 3] = [255, 255, 255];

/// Width of one score digit, in pixels
const DIGIT_WIDTH: i32 = 10;
/// Horizontal advance between score digits
const DIGIT_ADVANCE: i32 = 20;
/// Length of one digit segment unit
const SEGMENT: i32 = 5;

/// An RGB image, row-major, three bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, fill: [u8; 3]) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * 3);
        for _ in 0..width as usize * height as usize {
            data.extend_from_slice(&fill);
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        Some([self.data[i], self.data[i + 1], self.data[i + 2]])
    }

    /// Set a pixel; coordinates off the frame are ignored.
    pub fn put(&mut self, x: i32, y: i32, color: [u8; 3]) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        self.data[i..i + 3].copy_from_slice(&color);
    }

    pub fn to_image(&self) -> Result<RgbImage> {
        RgbImage::from_raw(self.width, self.height, self.as_raw().to_vec()).ok_or_else(|| {
            Error::Sprite(format!(
                "frame buffer of {} bytes does not fit {}x{}",
                self.data.len(),
                self.width,
                self.height
            ))
        })
    }

    /// Write the frame as a PNG file.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.to_image()?
            .save_with_format(path.as_ref(), image::ImageFormat::Png)?;
        tracing::debug!("Saved {}x{} frame to {}", self.width, self.height, path.as_ref().display());
        Ok(())
    }
}

/// Receives every presented tick. Presenters observe the game; they never
/// change it.
pub trait Presenter {
    /// Called after a tick with the resulting state and what happened during
    /// it. Returns the rendered frame, if the presenter produces one.
    fn present(&mut self, state: &GameState, events: &StepEvents) -> Option<Frame>;
}

/// Draws the play area from the hit masks: sky, pipes, ground, score, bird.
pub struct FrameRenderer {
    config: GameConfig,
    masks: Arc<SpriteMasks>,
}

impl FrameRenderer {
    pub fn new(config: GameConfig, masks: Arc<SpriteMasks>) -> Self {
        Self { config, masks }
    }

    pub fn render(&self, state: &GameState) -> Frame {
        let mut frame = Frame::new(
            self.config.screen_width.max(0) as u32,
            self.config.screen_height.max(0) as u32,
            SKY,
        );

        for pair in state.pipes.iter() {
            draw_mask(&mut frame, self.masks.upper_pipe(), pair.x, pair.upper_y, PIPE);
            draw_mask(&mut frame, self.masks.lower_pipe(), pair.x, pair.lower_y, PIPE);
        }

        let ground_y = self.config.ground_y();
        for y in ground_y..self.config.screen_height {
            for x in 0..self.config.screen_width {
                frame.put(x, y, GROUND);
            }
        }

        self.draw_score(&mut frame, state.score);

        let player = &state.player;
        draw_mask(
            &mut frame,
            self.masks.player(player.frame),
            player.x,
            player.y + state.bob.val,
            BIRD,
        );

        frame
    }

    /// Score digits, centred horizontally a tenth of the way down.
    fn draw_score(&self, frame: &mut Frame, score: u32) {
        let digits = score.to_string();
        let total = digits.len() as i32 * DIGIT_ADVANCE - (DIGIT_ADVANCE - DIGIT_WIDTH);
        let mut x = (self.config.screen_width - total) / 2;
        let y = (self.config.screen_height as f64 * 0.1) as i32;

        for c in digits.chars() {
            draw_digit(frame, c, x, y, SCORE);
            x += DIGIT_ADVANCE;
        }
    }
}

impl Presenter for FrameRenderer {
    fn present(&mut self, state: &GameState, events: &StepEvents) -> Option<Frame> {
        if events.crashed() {
            tracing::trace!("Rendering first frame after {:?} crash", events.crash);
        }
        Some(self.render(state))
    }
}

fn draw_mask(frame: &mut Frame, mask: &HitMask, left: i32, top: i32, color: [u8; 3]) {
    for y in 0..mask.height() {
        for x in 0..mask.width() {
            if mask.is_opaque(x, y) {
                frame.put(left + x, top + y, color);
            }
        }
    }
}

fn draw_digit(frame: &mut Frame, digit: char, x: i32, y: i32, color: [u8; 3]) {
    let segments: &[(i32, i32, i32, i32)] = match digit {
        '0' => &[(0, 0, 0, 2), (0, 0, 2, 0), (2, 0, 2, 2), (0, 2, 2, 2)],
        '1' => &[(1, 0, 1, 2)],
        '2' => &[(0, 0, 2, 0), (2, 0, 2, 1), (0, 1, 2, 1), (0, 1, 0, 2), (0, 2, 2, 2)],
        '3' => &[(0, 0, 2, 0), (2, 0, 2, 2), (0, 1, 2, 1), (0, 2, 2, 2)],
        '4' => &[(0, 0, 0, 1), (0, 1, 2, 1), (2, 0, 2, 2)],
        '5' => &[(0, 0, 2, 0), (0, 0, 0, 1), (0, 1, 2, 1), (2, 1, 2, 2), (0, 2, 2, 2)],
        '6' => &[(0, 0, 2, 0), (0, 0, 0, 2), (0, 1, 2, 1), (2, 1, 2, 2), (0, 2, 2, 2)],
        '7' => &[(0, 0, 2, 0), (2, 0, 2, 2)],
        '8' => &[(0, 0, 2, 0), (0, 0, 0, 2), (2, 0, 2, 2), (0, 1, 2, 1), (0, 2, 2, 2)],
        '9' => &[(0, 0, 2, 0), (0, 0, 0, 1), (2, 0, 2, 2), (0, 1, 2, 1), (0, 2, 2, 2)],
        _ => &[],
    };

    for &(x1, y1, x2, y2) in segments {
        draw_line(
            frame,
            (x + x1 * SEGMENT, y + y1 * SEGMENT),
            (x + x2 * SEGMENT, y + y2 * SEGMENT),
            color,
        );
    }
}

// Segments are axis-aligned, so stepping the longer axis is enough
fn draw_line(frame: &mut Frame, from: (i32, i32), to: (i32, i32), color: [u8; 3]) {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let steps = dx.abs().max(dy.abs());
    if steps == 0 {
        frame.put(from.0, from.1, color);
        return;
    }
    for i in 0..=steps {
        frame.put(from.0 + dx * i / steps, from.1 + dy * i / steps, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{PipePair, Session};
    use tempfile::tempdir;

    fn renderer_and_session() -> (FrameRenderer, Session) {
        let session = Session::seeded(GameConfig::default(), 17).unwrap();
        let renderer = FrameRenderer::new(session.config().clone(), Arc::clone(session.masks()));
        (renderer, session)
    }

    #[test]
    fn test_frame_layout() {
        let (renderer, mut session) = renderer_and_session();
        session.state_mut().pipes.clear();
        let frame = renderer.render(session.state());

        assert_eq!((frame.width(), frame.height()), (288, 512));
        assert_eq!(frame.as_raw().len(), 288 * 512 * 3);
        assert_eq!(frame.pixel(0, 0), Some(SKY));
        assert_eq!(frame.pixel(0, 404), Some(GROUND));
        assert_eq!(frame.pixel(287, 511), Some(GROUND));
        assert_eq!(frame.pixel(0, 403), Some(SKY));
        assert_eq!(frame.pixel(288, 0), None);
    }

    #[test]
    fn test_bird_drawn_with_bob_offset() {
        let (renderer, mut session) = renderer_and_session();
        session.state_mut().pipes.clear();
        session.state_mut().bob.val = 5;
        let frame = renderer.render(session.state());

        // Centre of the bird at (57 + 17, 244 + 12), shifted down by the bob
        assert_eq!(frame.pixel(74, 261), Some(BIRD));
        // Transparent corner of the bird mask stays sky
        assert_eq!(frame.pixel(57, 249), Some(SKY));
    }

    #[test]
    fn test_pipes_drawn_from_masks() {
        let (renderer, mut session) = renderer_and_session();
        let gap = session.config().pipe_gap;
        session.state_mut().pipes.clear();
        session
            .state_mut()
            .pipes
            .push(PipePair::with_gap(150, 150, gap, 320));
        let frame = renderer.render(session.state());

        assert_eq!(frame.pixel(160, 149), Some(PIPE));
        assert_eq!(frame.pixel(160, 200), Some(SKY));
        assert_eq!(frame.pixel(160, 250), Some(PIPE));
        assert_eq!(frame.pixel(149, 250), Some(SKY));
    }

    #[test]
    fn test_score_is_drawn_centred() {
        let (renderer, mut session) = renderer_and_session();
        session.state_mut().pipes.clear();
        session.state_mut().score = 1;
        let frame = renderer.render(session.state());

        // A single digit is 10 wide: it starts at x=139, its stroke at x=144
        assert_eq!(frame.pixel(144, 51), Some(SCORE));
        assert_eq!(frame.pixel(144, 61), Some(SCORE));
        assert_eq!(frame.pixel(139, 55), Some(SKY));
    }

    #[test]
    fn test_presenter_returns_frame() {
        let (mut renderer, session) = renderer_and_session();
        let frame = renderer.present(session.state(), &StepEvents::default());
        assert!(frame.is_some());
    }

    #[test]
    fn test_to_image_keeps_pixels() {
        let mut frame = Frame::new(3, 2, SKY);
        frame.put(2, 1, BIRD);
        frame.put(5, 5, PIPE);

        let image = frame.to_image().unwrap();
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(2, 1).0, BIRD);
        assert_eq!(image.get_pixel(0, 0).0, SKY);
    }

    #[test]
    fn test_save_png() {
        let (renderer, session) = renderer_and_session();
        let frame = renderer.render(session.state());
        let dir = tempdir().unwrap();
        let path = dir.path().join("frame.png");

        frame.save_png(&path).unwrap();
        let loaded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(loaded.dimensions(), (288, 512));
        assert_eq!(loaded.get_pixel(0, 0).0, SKY);
        assert_eq!(frame.as_raw(), loaded.as_raw().as_slice());
    }
}
