//! Scripted episode runner, the driving loop behind `flappy_run`.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::{Duration, Instant};

use super::flappy::{FlappyBirdAction, FlappyBirdEnv, FlappyBirdState};
use super::Environment;
use crate::game::Crash;
use crate::render::Frame;
use crate::{Error, Result};

/// Room the hover policy keeps between the bird's top edge and the lower pipe
pub const HOVER_MARGIN: i32 = 40;

/// Input policies that need no learning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Policy {
    /// Never flap
    Idle,
    /// Flap with a fixed probability every tick
    Random { flap_prob: f64 },
    /// Flap whenever the bird sinks too close to the next lower pipe
    Hover,
}

impl Policy {
    /// A random policy; the probability must be a finite value in `[0, 1]`.
    pub fn random(flap_prob: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&flap_prob) {
            return Err(Error::Config(format!(
                "flap probability must be in [0, 1], got {}",
                flap_prob
            )));
        }
        Ok(Policy::Random { flap_prob })
    }

    pub fn choose<R: Rng + ?Sized>(&self, state: &FlappyBirdState, rng: &mut R) -> FlappyBirdAction {
        let flap = match *self {
            Policy::Idle => false,
            // NaN never flaps
            Policy::Random { flap_prob } if flap_prob.is_nan() => false,
            Policy::Random { flap_prob } => rng.gen_bool(flap_prob.clamp(0.0, 1.0)),
            Policy::Hover => state.bird_y > state.next_pipe_bottom - HOVER_MARGIN,
        };
        if flap {
            FlappyBirdAction::Flap
        } else {
            FlappyBirdAction::DoNothing
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub episodes: usize,
    /// Episodes still alive after this many ticks are cut short
    pub max_steps: Option<u64>,
    /// Minimum wall time per tick, for real-time presentation
    pub frame_time: Option<Duration>,
}

/// Outcome of one episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeStats {
    pub episode: u64,
    pub score: u32,
    pub steps: u64,
    pub total_reward: f64,
    /// `None` when the episode was cut short by `max_steps`
    pub crash: Option<Crash>,
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub episodes: Vec<EpisodeStats>,
    /// Most recent rendered frame, if the environment produced any
    pub last_observation: Option<Frame>,
}

impl RunSummary {
    pub fn best_score(&self) -> u32 {
        self.episodes.iter().map(|e| e.score).max().unwrap_or(0)
    }

    pub fn mean_score(&self) -> f64 {
        if self.episodes.is_empty() {
            return 0.0;
        }
        let total: u64 = self.episodes.iter().map(|e| e.score as u64).sum();
        total as f64 / self.episodes.len() as f64
    }
}

/// Play `options.episodes` episodes with `policy`, logging
/// `iteration | score` for each one.
pub fn run_episodes<E: Rng, P: Rng + ?Sized>(
    env: &mut FlappyBirdEnv<E>,
    policy: Policy,
    rng: &mut P,
    options: &RunOptions,
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    for _ in 0..options.episodes {
        let episode = env.session().episode();
        let mut stats = EpisodeStats {
            episode,
            score: 0,
            steps: 0,
            total_reward: 0.0,
            crash: None,
        };

        loop {
            let tick_start = Instant::now();
            let action = policy.choose(&env.observe(), rng);
            let step = env.frame_step(&action.to_actions())?;

            stats.steps += 1;
            stats.total_reward += step.reward;
            stats.score += step.events.scored;
            if step.observation.is_some() {
                summary.last_observation = step.observation;
            }

            if let Some(frame_time) = options.frame_time {
                let elapsed = tick_start.elapsed();
                if elapsed < frame_time {
                    thread::sleep(frame_time - elapsed);
                }
            }

            if step.terminal {
                stats.crash = step.events.crash;
                break;
            }
            if options.max_steps.map_or(false, |max| stats.steps >= max) {
                tracing::debug!("Episode {} cut short after {} steps", episode, stats.steps);
                env.reset();
                break;
            }
        }

        tracing::info!("Iteration: {} | score: {}", stats.episode, stats.score);
        summary.episodes.push(stats);
    }

    Ok(summary)
}
