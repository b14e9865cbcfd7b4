use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Action, Environment, State};
use crate::config::GameConfig;
use crate::game::{GameState, Input, Session, SpriteMasks, StepEvents};
use crate::render::{Frame, Presenter};
use crate::Result;

/// Compact observation of the game for feature-based agents.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct FlappyBirdState {
    pub bird_y: i32,
    pub bird_velocity: i32,
    /// Horizontal distance from the bird to the next pipe pair's left edge
    pub next_pipe_dist: i32,
    /// First free row of the next gap
    pub next_pipe_top: i32,
    /// Top edge of the next lower pipe
    pub next_pipe_bottom: i32,
    pub score: i32,
}

impl FlappyBirdState {
    /// Observe a game state. With no pipe ahead the "next pipe" is a full
    /// screen away and its gap spans the whole play area.
    pub fn observe(state: &GameState, config: &GameConfig, masks: &SpriteMasks) -> Self {
        let player = &state.player;
        let next = state
            .pipes
            .iter()
            .find(|pair| pair.x + masks.pipe_width() > player.x);

        let (next_pipe_dist, next_pipe_top, next_pipe_bottom) = match next {
            Some(pair) => (
                pair.x - player.x,
                pair.gap_top(masks.pipe_height()),
                pair.lower_y,
            ),
            None => (config.screen_width, 0, config.ground_y()),
        };

        Self {
            bird_y: player.y,
            bird_velocity: player.vel_y,
            next_pipe_dist,
            next_pipe_top,
            next_pipe_bottom,
            score: state.score as i32,
        }
    }
}

impl State for FlappyBirdState {
    fn to_features(&self) -> Vec<f64> {
        vec![
            self.bird_y as f64,
            self.bird_velocity as f64,
            self.next_pipe_dist as f64,
            self.next_pipe_top as f64,
            self.next_pipe_bottom as f64,
        ]
    }
}

/// Indices follow the `[noop, flap]` order of the action vector.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum FlappyBirdAction {
    DoNothing,
    Flap,
}

impl FlappyBirdAction {
    /// One-hot `[noop, flap]` vector for [`FlappyBirdEnv::frame_step`].
    pub fn to_actions(self) -> [u8; 2] {
        Input::from(self).to_actions()
    }
}

impl From<FlappyBirdAction> for Input {
    fn from(action: FlappyBirdAction) -> Self {
        match action {
            FlappyBirdAction::DoNothing => Input::Noop,
            FlappyBirdAction::Flap => Input::Flap,
        }
    }
}

impl Action for FlappyBirdAction {
    fn to_index(&self) -> usize {
        match self {
            FlappyBirdAction::DoNothing => 0,
            FlappyBirdAction::Flap => 1,
        }
    }

    fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(FlappyBirdAction::DoNothing),
            1 => Some(FlappyBirdAction::Flap),
            _ => None,
        }
    }
}

/// Result of [`FlappyBirdEnv::frame_step`].
#[derive(Debug, Clone, PartialEq)]
pub struct FrameStep {
    /// Rendered frame, only outside daemon mode and with a presenter attached
    pub observation: Option<Frame>,
    pub reward: f64,
    pub terminal: bool,
    pub events: StepEvents,
}

/// A [`Session`] wrapped for agents, with an optional presenter.
pub struct FlappyBirdEnv<R = StdRng> {
    session: Session<R>,
    presenter: Option<Box<dyn Presenter>>,
}

impl FlappyBirdEnv<StdRng> {
    /// Environment with the built-in sprite masks. A seed makes it reproducible.
    pub fn new(config: GameConfig, seed: Option<u64>) -> Result<Self> {
        let session = match seed {
            Some(seed) => Session::seeded(config, seed)?,
            None => Session::from_entropy(config)?,
        };
        Ok(Self::from_session(session))
    }
}

impl<R: Rng> FlappyBirdEnv<R> {
    pub fn from_session(session: Session<R>) -> Self {
        Self {
            session,
            presenter: None,
        }
    }

    pub fn with_presenter(mut self, presenter: Box<dyn Presenter>) -> Self {
        self.presenter = Some(presenter);
        self
    }

    pub fn session(&self) -> &Session<R> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session<R> {
        &mut self.session
    }

    pub fn daemon(&self) -> bool {
        self.session.config().daemon
    }

    pub fn score(&self) -> u32 {
        self.session.score()
    }

    pub fn observe(&self) -> FlappyBirdState {
        FlappyBirdState::observe(self.session.state(), self.session.config(), self.session.masks())
    }

    /// Advance one tick from a one-hot `[noop, flap]` action vector.
    pub fn frame_step(&mut self, input_actions: &[u8]) -> Result<FrameStep> {
        let outcome = self.session.frame_step(input_actions)?;
        let observation = self.present(&outcome.events);
        Ok(FrameStep {
            observation,
            reward: outcome.reward,
            terminal: outcome.terminal,
            events: outcome.events,
        })
    }

    fn present(&mut self, events: &StepEvents) -> Option<Frame> {
        if self.session.config().daemon {
            return None;
        }
        let presenter = self.presenter.as_mut()?;
        presenter.present(self.session.state(), events)
    }
}

impl<R: Rng> Environment for FlappyBirdEnv<R> {
    type S = FlappyBirdState;
    type A = FlappyBirdAction;

    fn reset(&mut self) -> Self::S {
        self.session.reset();
        self.observe()
    }

    fn step(&mut self, action: &Self::A) -> (Self::S, f64, bool) {
        let outcome = self.session.step(Input::from(*action));
        self.present(&outcome.events);
        (self.observe(), outcome.reward, outcome.terminal)
    }

    fn action_space_size(&self) -> usize {
        2
    }

    fn valid_actions(&self, _state: &Self::S) -> Vec<Self::A> {
        vec![FlappyBirdAction::DoNothing, FlappyBirdAction::Flap]
    }
}
