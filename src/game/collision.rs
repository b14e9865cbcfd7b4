use serde::{Deserialize, Serialize};

use super::hitmask::{pixel_collision, SpriteMasks};
use super::pipes::Pipes;
use super::player::Player;

/// What the player crashed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Crash {
    Ground,
    Pipe,
}

/// Ground first, then every pipe pair in order, upper before lower.
///
/// `None` means no crash. The ground test short-circuits, so a player whose
/// bottom edge reaches the ground line always reports [`Crash::Ground`]
/// whatever the pipes are doing.
pub fn check_crash(
    player: &Player,
    pipes: &Pipes,
    masks: &SpriteMasks,
    ground_y: i32,
) -> Option<Crash> {
    let (player_w, player_h) = (masks.player_width(), masks.player_height());

    if player.y + player_h >= ground_y {
        return Some(Crash::Ground);
    }

    let player_rect = player.rect(player_w, player_h);
    let player_mask = masks.player(player.frame);
    let (pipe_w, pipe_h) = (masks.pipe_width(), masks.pipe_height());

    for pair in pipes.iter() {
        let upper_hit = pixel_collision(
            &player_rect,
            &pair.upper_rect(pipe_w, pipe_h),
            player_mask,
            masks.upper_pipe(),
        );
        if upper_hit
            || pixel_collision(
                &player_rect,
                &pair.lower_rect(pipe_w, pipe_h),
                player_mask,
                masks.lower_pipe(),
            )
        {
            return Some(Crash::Pipe);
        }
    }

    None
}
