//! The simulation core: pipes, player kinematics, collision and the
//! per-tick state machine that ties them together.

pub mod collision;
pub mod geometry;
pub mod hitmask;
pub mod pipes;
pub mod player;
pub mod session;

#[cfg(test)]
mod tests;

pub use collision::{check_crash, Crash};
pub use geometry::Rect;
pub use hitmask::{pixel_collision, HitMask, SpriteMasks, PLAYER_FRAMES};
pub use pipes::{random_pipe_pair, PipePair, Pipes, Recycled};
pub use player::{frame_index, Bob, Player, PLAYER_FRAME_CYCLE};
pub use session::{GameState, Input, Session, StepEvents, StepOutcome};
