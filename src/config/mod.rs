use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::{Error, Result};

/// Simulation constants, fixed for the lifetime of a session.
///
/// Distances are in screen pixels, velocities in pixels per tick, rotations
/// in degrees. Positive `y` points down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Play area width
    pub screen_width: i32,

    /// Play area height
    pub screen_height: i32,

    /// Ground line as a fraction of the screen height
    pub ground_ratio: f64,

    /// Target frame rate for real-time presentation
    pub fps: u32,

    /// Vertical gap between the upper and lower pipe of a pair
    pub pipe_gap: i32,

    /// Distance past the right edge where the first pipe pair starts
    pub first_pipe_offset: i32,

    /// Distance past the right edge where recycled pipe pairs spawn
    pub spawn_offset: i32,

    /// A new pair spawns when the leading pair's x is in `(0, spawn_threshold)`
    pub spawn_threshold: i32,

    /// Horizontal pipe velocity (negative = leftwards)
    pub pipe_vel_x: i32,

    /// Vertical velocity of a fresh player
    pub player_initial_vel_y: i32,

    /// Maximum descent speed
    pub player_max_vel_y: i32,

    /// Downward acceleration per tick
    pub player_acc_y: i32,

    /// Velocity set by a flap
    pub player_flap_acc: i32,

    /// Rotation of a fresh player and rotation restored after a flap
    pub player_flap_rot: i32,

    /// Rotation decay per tick
    pub player_vel_rot: i32,

    /// Rotation stops decaying at this angle
    pub player_min_rot: i32,

    /// Width of the scoring band past a pipe's midpoint
    pub score_band: f64,

    /// Players above this y are penalised for drifting off-screen
    pub ceiling_y: i32,

    /// Ticks between animation frame changes
    pub animation_period: u64,

    // Rewards
    pub reward_alive: f64,
    pub reward_ceiling: f64,
    pub reward_score: f64,
    pub reward_crash: f64,

    /// Headless mode: no observation frames are produced
    pub daemon: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            screen_width: 288,
            screen_height: 512,
            ground_ratio: 0.79,
            fps: 30,
            pipe_gap: 100,
            first_pipe_offset: 200,
            spawn_offset: 10,
            spawn_threshold: 5,
            pipe_vel_x: -4,
            player_initial_vel_y: -9,
            player_max_vel_y: 10,
            player_acc_y: 1,
            player_flap_acc: -9,
            player_flap_rot: 15,
            player_vel_rot: 3,
            player_min_rot: -30,
            score_band: 4.0,
            ceiling_y: -15,
            animation_period: 3,
            reward_alive: 0.1,
            reward_ceiling: -0.1,
            reward_score: 1.0,
            reward_crash: -1.0,
            daemon: false,
        }
    }
}

impl GameConfig {
    /// Default configuration in headless mode
    pub fn headless() -> Self {
        Self {
            daemon: true,
            ..Default::default()
        }
    }

    /// The ground line; a player whose bottom edge reaches it has crashed.
    pub fn ground_y(&self) -> i32 {
        (self.screen_height as f64 * self.ground_ratio) as i32
    }

    /// Fixed horizontal position of the player.
    pub fn player_x(&self) -> i32 {
        (self.screen_width as f64 * 0.2) as i32
    }

    /// Number of distinct gap offsets the pipe generator draws from.
    pub fn gap_span(&self) -> i32 {
        (self.ground_y() as f64 * 0.6 - self.pipe_gap as f64) as i32
    }

    /// Smallest gap offset, keeping the gap clear of the top of the screen.
    pub fn gap_floor(&self) -> i32 {
        (self.ground_y() as f64 * 0.2) as i32
    }

    pub fn validate(&self) -> Result<()> {
        if self.screen_width <= 0 || self.screen_height <= 0 {
            return Err(Error::Config(format!(
                "screen must have a positive size, got {}x{}",
                self.screen_width, self.screen_height
            )));
        }
        if !(self.ground_ratio > 0.0 && self.ground_ratio <= 1.0) {
            return Err(Error::Config(format!(
                "ground_ratio must be in (0, 1], got {}",
                self.ground_ratio
            )));
        }
        if self.pipe_gap <= 0 {
            return Err(Error::Config("pipe_gap must be positive".to_string()));
        }
        if self.gap_span() <= 0 {
            return Err(Error::Config(format!(
                "pipe_gap {} leaves no room for the gap above ground line {}",
                self.pipe_gap,
                self.ground_y()
            )));
        }
        if self.pipe_vel_x >= 0 {
            return Err(Error::Config("pipe_vel_x must be negative".to_string()));
        }
        // A pipe midpoint moving further than the band per tick can jump over it.
        if self.pipe_vel_x.unsigned_abs() as f64 > self.score_band {
            return Err(Error::Config(format!(
                "pipe speed {} exceeds score_band {}; pipes could pass unscored",
                self.pipe_vel_x.unsigned_abs(),
                self.score_band
            )));
        }
        if self.spawn_threshold <= 0 {
            return Err(Error::Config("spawn_threshold must be positive".to_string()));
        }
        if self.player_flap_acc >= 0 {
            return Err(Error::Config("player_flap_acc must be negative".to_string()));
        }
        if self.player_acc_y < 0 {
            return Err(Error::Config("player_acc_y must not be negative".to_string()));
        }
        if self.animation_period == 0 {
            return Err(Error::Config("animation_period must be positive".to_string()));
        }
        Ok(())
    }

    /// Save the configuration to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load the configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path.as_ref())?;
        let config: GameConfig = serde_json::from_str(&json)?;
        config.validate()?;
        tracing::info!("Loaded game configuration from {}", path.as_ref().display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.ground_y(), 404);
        assert_eq!(config.player_x(), 57);
        assert_eq!(config.gap_span(), 142);
        assert_eq!(config.gap_floor(), 80);
        assert!(!config.daemon);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_headless_config() {
        let config = GameConfig::headless();
        assert!(config.daemon);
        assert_eq!(config.screen_width, 288);
    }

    #[test]
    fn test_rejects_fast_pipes() {
        let config = GameConfig {
            pipe_vel_x: -6,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_oversized_gap() {
        let config = GameConfig {
            pipe_gap: 300,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("game.json");

        let config = GameConfig {
            pipe_gap: 120,
            daemon: true,
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert!(path.exists());

        let loaded = GameConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_fills_missing_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.json");
        fs::write(&path, r#"{ "pipe_gap": 90 }"#).unwrap();

        let loaded = GameConfig::load(&path).unwrap();
        assert_eq!(loaded.pipe_gap, 90);
        assert_eq!(loaded.screen_width, 288);
    }

    #[test]
    fn test_load_rejects_invalid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{ "pipe_vel_x": 3 }"#).unwrap();

        assert!(matches!(GameConfig::load(&path), Err(Error::Config(_))));
    }
}
