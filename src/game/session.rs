use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::collision::{check_crash, Crash};
use super::hitmask::SpriteMasks;
use super::pipes::Pipes;
use super::player::{frame_index, Bob, Player};
use crate::config::GameConfig;
use crate::{Error, Result};

/// The single player action for a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Input {
    Noop,
    Flap,
}

impl Input {
    /// Decode a one-hot `[noop, flap]` action vector.
    pub fn from_actions(actions: &[u8]) -> Result<Self> {
        match actions {
            [1, 0] => Ok(Input::Noop),
            [0, 1] => Ok(Input::Flap),
            _ => Err(Error::InvalidInput(actions.to_vec())),
        }
    }

    pub fn to_actions(self) -> [u8; 2] {
        match self {
            Input::Noop => [1, 0],
            Input::Flap => [0, 1],
        }
    }
}

impl From<bool> for Input {
    fn from(flap: bool) -> Self {
        if flap {
            Input::Flap
        } else {
            Input::Noop
        }
    }
}

/// Transitions that happened during one tick, for presentation and agents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepEvents {
    /// The flap input was accepted
    pub flapped: bool,
    /// Pipe pairs passed this tick
    pub scored: u32,
    /// Set when the tick ended the episode
    pub crash: Option<Crash>,
}

impl StepEvents {
    pub fn crashed(&self) -> bool {
        self.crash.is_some()
    }

    pub fn ground_crash(&self) -> bool {
        self.crash == Some(Crash::Ground)
    }
}

/// Result of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub reward: f64,
    pub terminal: bool,
    pub events: StepEvents,
}

/// Everything a crash throws away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub player: Player,
    pub pipes: Pipes,
    pub score: u32,
    /// Ticks since this state was created
    pub tick: u64,
    /// Visual idle bob, no effect on gameplay
    pub bob: Bob,
}

impl GameState {
    pub fn new<R: Rng + ?Sized>(rng: &mut R, config: &GameConfig, masks: &SpriteMasks) -> Self {
        Self {
            player: Player::new(config, masks.player_height()),
            pipes: Pipes::initial(rng, config, masks.pipe_height()),
            score: 0,
            tick: 0,
            bob: Bob::default(),
        }
    }
}

/// A running game: configuration, shared masks, the random source and the
/// current [`GameState`].
pub struct Session<R = StdRng> {
    config: GameConfig,
    masks: Arc<SpriteMasks>,
    rng: R,
    state: GameState,
    /// Number of resets so far
    episode: u64,
}

impl Session<StdRng> {
    /// Reproducible session with the built-in sprite masks.
    pub fn seeded(config: GameConfig, seed: u64) -> Result<Self> {
        Self::new(config, Arc::new(SpriteMasks::default()), StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy(config: GameConfig) -> Result<Self> {
        Self::new(config, Arc::new(SpriteMasks::default()), StdRng::from_entropy())
    }
}

impl<R: Rng> Session<R> {
    pub fn new(config: GameConfig, masks: Arc<SpriteMasks>, mut rng: R) -> Result<Self> {
        config.validate()?;
        if masks.player_height() >= config.ground_y() {
            return Err(Error::Config(format!(
                "player sprite height {} does not fit above ground line {}",
                masks.player_height(),
                config.ground_y()
            )));
        }

        let state = GameState::new(&mut rng, &config, &masks);
        Ok(Self {
            config,
            masks,
            rng,
            state,
            episode: 0,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn masks(&self) -> &Arc<SpriteMasks> {
        &self.masks
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct access for scripted setups, e.g. clearing or placing pipes.
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn episode(&self) -> u64 {
        self.episode
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    /// Replace the game state with a fresh one and start a new episode.
    pub fn reset(&mut self) -> &GameState {
        self.state = GameState::new(&mut self.rng, &self.config, &self.masks);
        self.episode += 1;
        &self.state
    }

    /// Advance one tick from a one-hot `[noop, flap]` action vector.
    pub fn frame_step(&mut self, input_actions: &[u8]) -> Result<StepOutcome> {
        let input = Input::from_actions(input_actions)?;
        Ok(self.step(input))
    }

    /// Advance one tick.
    ///
    /// A crash resets the session before returning; the returned outcome is
    /// the only record of the finished episode.
    pub fn step(&mut self, input: Input) -> StepOutcome {
        let (player_w, player_h) = (self.masks.player_width(), self.masks.player_height());
        let (pipe_w, pipe_h) = (self.masks.pipe_width(), self.masks.pipe_height());
        let mut events = StepEvents::default();
        let mut reward = self.config.reward_alive;

        if input == Input::Flap && self.state.player.can_flap(player_h) {
            self.state.player.flap(&self.config);
            events.flapped = true;
        }

        if let Some(crash) = check_crash(
            &self.state.player,
            &self.state.pipes,
            &self.masks,
            self.config.ground_y(),
        ) {
            tracing::debug!(
                "Iteration: {} | score: {} ({:?} crash)",
                self.episode,
                self.state.score,
                crash
            );
            events.crash = Some(crash);
            self.reset();
            return StepOutcome {
                reward: self.config.reward_crash,
                terminal: true,
                events,
            };
        }

        if self.state.player.y < self.config.ceiling_y {
            reward = self.config.reward_ceiling;
        }

        let player_mid = self.state.player.mid_x(player_w);
        for pair in self.state.pipes.iter_mut() {
            let pipe_mid = pair.mid_x(pipe_w);
            if !pair.scored && pipe_mid <= player_mid && player_mid < pipe_mid + self.config.score_band {
                pair.scored = true;
                self.state.score += 1;
                events.scored += 1;
                reward = self.config.reward_score;
            }
        }

        self.state.player.advance(&self.config, player_h);
        self.state.tick += 1;
        self.state.player.frame = frame_index(self.state.tick / self.config.animation_period);
        self.state.bob.advance();

        self.state.pipes.scroll(self.config.pipe_vel_x);
        self.state
            .pipes
            .recycle(&mut self.rng, &self.config, pipe_w, pipe_h);

        StepOutcome {
            reward,
            terminal: false,
            events,
        }
    }
}
