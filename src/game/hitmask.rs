use image::RgbaImage;
use std::path::Path;

use super::geometry::Rect;
use crate::{Error, Result};

/// Number of player animation frames, each with its own mask.
pub const PLAYER_FRAMES: usize = 3;

/// Per-pixel opacity of a sprite, derived once from its alpha channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitMask {
    width: i32,
    height: i32,
    /// Row-major, `true` = opaque
    opaque: Vec<bool>,
}

impl HitMask {
    pub fn from_fn(width: i32, height: i32, f: impl Fn(i32, i32) -> bool) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        let mut opaque = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                opaque.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            opaque,
        }
    }

    pub fn solid(width: i32, height: i32) -> Self {
        Self::from_fn(width, height, |_, _| true)
    }

    pub fn transparent(width: i32, height: i32) -> Self {
        Self::from_fn(width, height, |_, _| false)
    }

    /// Build a mask from a row-major alpha channel; any non-zero alpha is opaque.
    pub fn from_alpha(width: u32, height: u32, alpha: &[u8]) -> Result<Self> {
        let expected = width as usize * height as usize;
        if alpha.len() != expected {
            return Err(Error::Sprite(format!(
                "alpha channel has {} values, expected {} for {}x{}",
                alpha.len(),
                expected,
                width,
                height
            )));
        }
        Ok(Self {
            width: width as i32,
            height: height as i32,
            opaque: alpha.iter().map(|a| *a != 0).collect(),
        })
    }

    pub fn from_image(image: &RgbaImage) -> Result<Self> {
        let alpha: Vec<u8> = image.pixels().map(|p| p.0[3]).collect();
        Self::from_alpha(image.width(), image.height(), &alpha)
    }

    /// Load a sprite image and derive its mask.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let image = image::open(path.as_ref())?.to_rgba8();
        tracing::debug!(
            "Loaded hit mask {} ({}x{})",
            path.as_ref().display(),
            image.width(),
            image.height()
        );
        Self::from_image(&image)
    }

    /// The same mask upside down, as used for the upper pipe sprite.
    pub fn flipped_vertically(&self) -> Self {
        Self::from_fn(self.width, self.height, |x, y| {
            self.is_opaque(x, self.height - 1 - y)
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Opacity at `(x, y)`; anything outside the sprite is transparent.
    pub fn is_opaque(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return false;
        }
        self.opaque[(y * self.width + x) as usize]
    }
}

/// Whether two sprites overlap on at least one pixel that is opaque in both.
///
/// The cheap rectangle clip rules out most pairs before any pixel is read.
pub fn pixel_collision(rect1: &Rect, rect2: &Rect, mask1: &HitMask, mask2: &HitMask) -> bool {
    let clip = rect1.clip(rect2);
    if clip.is_empty() {
        return false;
    }

    let (x1, y1) = (clip.x - rect1.x, clip.y - rect1.y);
    let (x2, y2) = (clip.x - rect2.x, clip.y - rect2.y);

    for x in 0..clip.width {
        for y in 0..clip.height {
            if mask1.is_opaque(x1 + x, y1 + y) && mask2.is_opaque(x2 + x, y2 + y) {
                return true;
            }
        }
    }
    false
}

/// Hit masks for every sprite that takes part in collisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteMasks {
    player: [HitMask; PLAYER_FRAMES],
    upper_pipe: HitMask,
    lower_pipe: HitMask,
}

impl Default for SpriteMasks {
    /// Built-in masks at the classic sprite sizes: an elliptical 34x24 bird
    /// and solid 52x320 pipes.
    fn default() -> Self {
        let (w, h) = (34, 24);
        let (rx, ry) = (w as f64 / 2.0, h as f64 / 2.0);
        let bird = HitMask::from_fn(w, h, |x, y| {
            let dx = (x as f64 + 0.5 - rx) / rx;
            let dy = (y as f64 + 0.5 - ry) / ry;
            dx * dx + dy * dy <= 1.0
        });
        let pipe = HitMask::solid(52, 320);

        Self {
            player: [bird.clone(), bird.clone(), bird],
            upper_pipe: pipe.clone(),
            lower_pipe: pipe,
        }
    }
}

impl SpriteMasks {
    /// Assemble masks from the three player frames and the lower pipe; the
    /// upper pipe is the lower one flipped.
    pub fn new(player: [HitMask; PLAYER_FRAMES], lower_pipe: HitMask) -> Result<Self> {
        let (w, h) = (player[0].width(), player[0].height());
        if w == 0 || h == 0 {
            return Err(Error::Sprite("player sprite is empty".to_string()));
        }
        if let Some(frame) = player.iter().position(|m| m.width() != w || m.height() != h) {
            return Err(Error::Sprite(format!(
                "player frame {} is {}x{}, expected {}x{}",
                frame,
                player[frame].width(),
                player[frame].height(),
                w,
                h
            )));
        }
        if lower_pipe.width() == 0 || lower_pipe.height() == 0 {
            return Err(Error::Sprite("pipe sprite is empty".to_string()));
        }

        Ok(Self {
            player,
            upper_pipe: lower_pipe.flipped_vertically(),
            lower_pipe,
        })
    }

    /// Load `{bird}-upflap.png`, `{bird}-midflap.png`, `{bird}-downflap.png`
    /// and `pipe-{pipe}.png` from a sprite directory.
    pub fn load_dir<P: AsRef<Path>>(dir: P, bird: &str, pipe: &str) -> Result<Self> {
        let dir = dir.as_ref();
        let player = [
            HitMask::load(dir.join(format!("{}-upflap.png", bird)))?,
            HitMask::load(dir.join(format!("{}-midflap.png", bird)))?,
            HitMask::load(dir.join(format!("{}-downflap.png", bird)))?,
        ];
        let lower_pipe = HitMask::load(dir.join(format!("pipe-{}.png", pipe)))?;
        Self::new(player, lower_pipe)
    }

    pub fn player(&self, frame: usize) -> &HitMask {
        &self.player[frame % PLAYER_FRAMES]
    }

    pub fn upper_pipe(&self) -> &HitMask {
        &self.upper_pipe
    }

    pub fn lower_pipe(&self) -> &HitMask {
        &self.lower_pipe
    }

    pub fn player_width(&self) -> i32 {
        self.player[0].width()
    }

    pub fn player_height(&self) -> i32 {
        self.player[0].height()
    }

    pub fn pipe_width(&self) -> i32 {
        self.lower_pipe.width()
    }

    pub fn pipe_height(&self) -> i32 {
        self.lower_pipe.height()
    }
}
