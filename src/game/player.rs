use super::geometry::Rect;
use crate::config::GameConfig;

/// Animation frame order: up, mid, down, mid.
pub const PLAYER_FRAME_CYCLE: [usize; 4] = [0, 1, 2, 1];

/// Animation frame shown at a given animation step.
pub fn frame_index(step: u64) -> usize {
    PLAYER_FRAME_CYCLE[(step % PLAYER_FRAME_CYCLE.len() as u64) as usize]
}

/// The bird.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub x: i32,
    pub y: i32,
    /// Vertical velocity (positive = downwards)
    pub vel_y: i32,
    /// Rotation in degrees (positive = nose up)
    pub rot: i32,
    /// True from a flap until the next kinematics update
    pub flapped: bool,
    /// Index into the player hit masks
    pub frame: usize,
}

impl Player {
    /// A fresh player, vertically centred at the fixed x position.
    pub fn new(config: &GameConfig, player_height: i32) -> Self {
        Self {
            x: config.player_x(),
            y: (config.screen_height - player_height) / 2,
            vel_y: config.player_initial_vel_y,
            rot: config.player_flap_rot,
            flapped: false,
            frame: 0,
        }
    }

    pub fn rect(&self, width: i32, height: i32) -> Rect {
        Rect::new(self.x, self.y, width, height)
    }

    pub fn mid_x(&self, width: i32) -> f64 {
        self.x as f64 + width as f64 / 2.0
    }

    /// Flaps are ignored once the player is well above the top of the screen.
    pub fn can_flap(&self, player_height: i32) -> bool {
        self.y > -2 * player_height
    }

    /// Replace the velocity with the flap impulse.
    pub fn flap(&mut self, config: &GameConfig) {
        self.vel_y = config.player_flap_acc;
        self.flapped = true;
    }

    /// One tick of rotation, gravity and clamped vertical movement.
    pub fn advance(&mut self, config: &GameConfig, player_height: i32) {
        if self.rot > config.player_min_rot {
            self.rot -= config.player_vel_rot;
        }

        if self.vel_y < config.player_max_vel_y && !self.flapped {
            self.vel_y += config.player_acc_y;
        }

        if self.flapped {
            self.flapped = false;
            self.rot = config.player_flap_rot;
        }

        // Never sink through the ground within a single tick
        self.y += self.vel_y.min(config.ground_y() - self.y - player_height);
    }
}

/// Idle up-and-down bob in `[-8, 8]`, a purely visual offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bob {
    pub val: i32,
    pub dir: i32,
}

impl Default for Bob {
    fn default() -> Self {
        Self { val: 0, dir: 1 }
    }
}

impl Bob {
    pub const AMPLITUDE: i32 = 8;

    pub fn advance(&mut self) {
        if self.val.abs() == Self::AMPLITUDE {
            self.dir = -self.dir;
        }
        self.val += self.dir;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const H: i32 = 24;

    #[test]
    fn test_frame_cycle() {
        let frames: Vec<usize> = (0..9).map(frame_index).collect();
        assert_eq!(frames, vec![0, 1, 2, 1, 0, 1, 2, 1, 0]);
    }

    #[test]
    fn test_new_player() {
        let config = GameConfig::default();
        let player = Player::new(&config, H);
        assert_eq!(player.x, 57);
        assert_eq!(player.y, 244);
        assert_eq!(player.vel_y, -9);
        assert_eq!(player.rot, 15);
        assert!(!player.flapped);
    }

    #[test]
    fn test_gravity_accumulates_and_caps() {
        let config = GameConfig::default();
        let mut player = Player::new(&config, H);
        player.vel_y = 8;

        player.advance(&config, H);
        assert_eq!(player.vel_y, 9);
        player.advance(&config, H);
        assert_eq!(player.vel_y, 10);
        player.advance(&config, H);
        assert_eq!(player.vel_y, 10);
    }

    #[test]
    fn test_flap_skips_gravity_for_one_tick() {
        let config = GameConfig::default();
        let mut player = Player::new(&config, H);
        player.vel_y = 5;
        player.rot = -30;
        let y = player.y;

        player.flap(&config);
        player.advance(&config, H);
        assert_eq!(player.vel_y, config.player_flap_acc);
        assert_eq!(player.y, y + config.player_flap_acc);
        assert_eq!(player.rot, 15);
        assert!(!player.flapped);

        player.advance(&config, H);
        assert_eq!(player.vel_y, config.player_flap_acc + 1);
        assert_eq!(player.rot, 12);
    }

    #[test]
    fn test_rotation_floor() {
        let config = GameConfig::default();
        let mut player = Player::new(&config, H);
        for _ in 0..50 {
            player.advance(&config, H);
            player.y = 100;
        }
        assert_eq!(player.rot, -30);
    }

    #[test]
    fn test_clamped_at_ground() {
        let config = GameConfig::default();
        let mut player = Player::new(&config, H);
        player.y = config.ground_y() - H - 3;
        player.vel_y = 10;

        player.advance(&config, H);
        assert_eq!(player.y, config.ground_y() - H);
    }

    #[test]
    fn test_can_flap_threshold() {
        let config = GameConfig::default();
        let mut player = Player::new(&config, H);
        player.y = -2 * H;
        assert!(!player.can_flap(H));
        player.y = -2 * H + 1;
        assert!(player.can_flap(H));
    }

    #[test]
    fn test_bob_oscillates() {
        let mut bob = Bob::default();
        let mut seen = Vec::new();
        for _ in 0..40 {
            bob.advance();
            seen.push(bob.val);
        }
        assert_eq!(*seen.iter().max().unwrap(), 8);
        assert_eq!(*seen.iter().min().unwrap(), -8);
        assert_eq!(&seen[..9], &[1, 2, 3, 4, 5, 6, 7, 8, 7]);
    }
}
