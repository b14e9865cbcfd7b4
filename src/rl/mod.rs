//! Agent-facing environment interface.

use serde::de::DeserializeOwned;
use serde::Serialize;

pub mod flappy;
pub mod runner;

/// An observation an agent can turn into a feature vector.
pub trait State: Clone + Eq + std::hash::Hash + Serialize + DeserializeOwned {
    fn to_features(&self) -> Vec<f64>;
}

/// A discrete action with a stable index in `0..action_space_size()`.
pub trait Action: Clone + Eq + std::hash::Hash + Serialize + DeserializeOwned {
    fn to_index(&self) -> usize;
    fn from_index(index: usize) -> Option<Self>;
}

/// A resettable, steppable game as seen by an agent.
pub trait Environment {
    type S: State;
    type A: Action;

    /// Start a new episode and return its first observation.
    fn reset(&mut self) -> Self::S;

    /// Apply one action; returns `(observation, reward, episode_over)`.
    fn step(&mut self, action: &Self::A) -> (Self::S, f64, bool);

    fn action_space_size(&self) -> usize;

    fn valid_actions(&self, state: &Self::S) -> Vec<Self::A>;
}

#[cfg(test)]
mod tests {
    use super::flappy::{FlappyBirdAction, FlappyBirdEnv};
    use super::*;
    use crate::config::GameConfig;

    /// Play one episode through the trait alone, picking actions by index.
    /// Returns the rewards seen and whether the episode ended.
    fn rollout<E: Environment>(
        env: &mut E,
        mut pick: impl FnMut(&E::S) -> usize,
        max_steps: usize,
    ) -> (Vec<f64>, bool) {
        let mut state = env.reset();
        let mut rewards = Vec::new();

        for _ in 0..max_steps {
            let valid = env.valid_actions(&state);
            assert_eq!(valid.len(), env.action_space_size());
            for (i, action) in valid.iter().enumerate() {
                assert_eq!(action.to_index(), i);
                assert!(E::A::from_index(i).as_ref() == Some(action));
            }
            assert!(E::A::from_index(env.action_space_size()).is_none());

            let action = E::A::from_index(pick(&state)).unwrap();
            let (next, reward, done) = env.step(&action);
            rewards.push(reward);
            if done {
                return (rewards, true);
            }
            state = next;
        }
        (rewards, false)
    }

    #[test]
    fn test_idle_rollout_ends_with_crash_reward() {
        let mut env = FlappyBirdEnv::new(GameConfig::headless(), Some(12)).unwrap();
        let idle = FlappyBirdAction::DoNothing.to_index();

        let (rewards, done) = rollout(&mut env, |_| idle, 200);
        assert!(done);
        assert_eq!(rewards.last(), Some(&-1.0));
        assert!(rewards[..rewards.len() - 1].iter().all(|r| *r == 0.1));
        // reset() plus the crash
        assert_eq!(env.session().episode(), 2);
    }

    #[test]
    fn test_feature_policy_keeps_bird_up() {
        let mut env = FlappyBirdEnv::new(GameConfig::headless(), Some(13)).unwrap();
        let flap = FlappyBirdAction::Flap.to_index();
        let idle = FlappyBirdAction::DoNothing.to_index();

        // The first pipes start at x=488 and are still clear of the bird
        let (rewards, done) = rollout(
            &mut env,
            |state| {
                let features = state.to_features();
                assert_eq!(features.len(), 5);
                if features[0] > 250.0 {
                    flap
                } else {
                    idle
                }
            },
            60,
        );
        assert!(!done);
        assert_eq!(rewards, vec![0.1; 60]);
    }
}
