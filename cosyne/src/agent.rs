use crate::world::{Vec2, World};

use serde::{Deserialize, Serialize};

/// Goal-tracking counters of an agent.
///
/// The agent advances `elapsed_alive_steps` on every
/// update it survives; the evaluation loop owns the
/// other two counters and halves `elapsed_alive_steps`
/// whenever a goal is collected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalProgress {
    /// Number of goals collected this episode.
    pub goals_reached: usize,
    /// Consecutive steps spent within the capture radius
    /// of the current goal.
    pub steps_within_capture: usize,
    /// Steps survived, discounted on goal collection.
    pub elapsed_alive_steps: u64,
}

impl GoalProgress {
    pub fn reset(&mut self) {
        *self = GoalProgress::default();
    }
}

/// An interface for simulated bodies driven by a controller.
pub trait Agent: Clone + Send {
    /// Returns the agent to its canonical start state,
    /// including its goal progress.
    fn reset(&mut self);

    /// Advances the simulation by one step of `dt` seconds.
    /// May kill the agent. Dead agents must not change.
    fn update(&mut self, dt: f32, world: &World);

    fn alive(&self) -> bool;

    fn position(&self) -> Vec2;

    /// Length of the observation vector written by [`observe`].
    ///
    /// [`observe`]: Agent::observe
    fn observation_size(&self) -> usize;

    /// Writes the agent's current observation of `world`
    /// into `observation`, which has exactly
    /// [`observation_size`] entries.
    ///
    /// [`observation_size`]: Agent::observation_size
    fn observe(&self, world: &World, observation: &mut [f32]);

    /// Number of actuator commands expected by [`control`].
    ///
    /// [`control`]: Agent::control
    fn actuator_count(&self) -> usize;

    /// Sets actuator commands for the next step. `controls`
    /// has exactly [`actuator_count`] entries.
    ///
    /// [`actuator_count`]: Agent::actuator_count
    fn control(&mut self, controls: &[f32]);

    fn progress(&self) -> &GoalProgress;

    fn progress_mut(&mut self) -> &mut GoalProgress;
}
