//! The episode step: advance every agent, let its
//! controller react, and accumulate shaped fitness.
use crate::config::ShapingConfig;
use crate::errors::EvaluationError;
use crate::{Agent, Controller, GoalProgress, Population, Vec2, World};

use rayon::prelude::*;

use std::f32::consts::FRAC_PI_2;

impl<C, A> Population<C, A>
where
    C: Controller,
    A: Agent,
{
    /// Advances every agent by one step of `dt` seconds,
    /// then feeds each survivor's observation through its
    /// controller and applies the shaped fitness increment.
    ///
    /// Dead agents are skipped. Individuals are stepped in
    /// parallel; no random numbers are drawn, so the result
    /// does not depend on scheduling.
    ///
    /// Returns `true` once no agent is alive, i.e. the
    /// episode is finished.
    pub fn step(
        &mut self,
        dt: f32,
        world: &World,
        shaping: &ShapingConfig,
    ) -> Result<bool, EvaluationError> {
        if world.goals.is_empty() {
            return Err(EvaluationError::NoGoals);
        }
        let (agents, controllers, fitness) = self.evaluation_slots();
        let any_alive = agents
            .par_iter_mut()
            .zip(controllers.par_iter())
            .zip(fitness.par_iter_mut())
            .enumerate()
            .map(|(index, ((agent, controller), fitness))| {
                step_individual(index, agent, controller, fitness, dt, world, shaping)
            })
            .try_reduce(|| false, |a, b| Ok(a || b))?;
        Ok(!any_alive)
    }
}

/// Steps a single individual, returning whether it
/// is still alive afterwards.
fn step_individual<C: Controller, A: Agent>(
    index: usize,
    agent: &mut A,
    controller: &C,
    fitness: &mut f32,
    dt: f32,
    world: &World,
    shaping: &ShapingConfig,
) -> Result<bool, EvaluationError> {
    agent.update(dt, world);
    if !agent.alive() {
        return Ok(false);
    }

    let mut observation = vec![0.0; agent.observation_size()];
    agent.observe(world, &mut observation);

    let goal = world.goals[agent.progress().goals_reached % world.goals.len()];
    let offset = goal - agent.position();
    *fitness += shaping.reward(agent.progress_mut(), offset, world.boundary);

    let controls = controller
        .forward(&observation)
        .map_err(|e| EvaluationError::Controller {
            index,
            source: Box::new(e),
        })?;
    if controls.len() != agent.actuator_count() {
        return Err(EvaluationError::ControlSize {
            index,
            expected: agent.actuator_count(),
            found: controls.len(),
        });
    }
    agent.control(&controls);
    Ok(true)
}

impl ShapingConfig {
    /// Returns the fitness earned in one step by an agent
    /// at `offset` from its current goal, updating its
    /// goal progress.
    ///
    /// Hovering within the capture radius for more than
    /// `capture_steps` consecutive steps collects the goal:
    /// the capture timer is zeroed, the goal index advances,
    /// a speed reward of `(goals + 1) × (time_budget - elapsed)`
    /// is paid and the elapsed step count is halved. Every
    /// step also pays `(goals + 1) × proximity(offset)`.
    ///
    /// # Examples
    /// ```
    /// use cosyne::{GoalProgress, ShapingConfig, Vec2};
    ///
    /// let shaping = ShapingConfig::default();
    /// let boundary = Vec2::new(800.0, 800.0);
    /// let mut progress = GoalProgress::default();
    ///
    /// // Sitting on the goal pays the full proximity reward...
    /// assert_eq!(shaping.reward(&mut progress, Vec2::zeros(), boundary), 1.0);
    /// assert_eq!(progress.steps_within_capture, 1);
    ///
    /// // ...until the goal is collected.
    /// progress.steps_within_capture = 30;
    /// progress.elapsed_alive_steps = 100;
    /// let reward = shaping.reward(&mut progress, Vec2::zeros(), boundary);
    /// assert_eq!(reward, 2.0 * (600.0 - 100.0) + 2.0);
    /// assert_eq!(progress.goals_reached, 1);
    /// assert_eq!(progress.steps_within_capture, 0);
    /// assert_eq!(progress.elapsed_alive_steps, 50);
    /// ```
    pub fn reward(&self, progress: &mut GoalProgress, offset: Vec2, boundary: Vec2) -> f32 {
        let mut reward = 0.0;
        if offset.norm_squared() < self.capture_radius * self.capture_radius {
            progress.steps_within_capture += 1;
            if progress.steps_within_capture > self.capture_steps {
                progress.steps_within_capture = 0;
                progress.goals_reached += 1;
                let multiplier = (progress.goals_reached + 1) as f32;
                reward += multiplier * (self.time_budget - progress.elapsed_alive_steps as f32);
                progress.elapsed_alive_steps /= 2;
            }
        } else {
            progress.steps_within_capture = 0;
        }
        reward + (progress.goals_reached + 1) as f32 * proximity(offset, boundary)
    }
}

/// Goal proximity in [0, 1]: the smaller of cos⁴ of each
/// offset axis, normalized by the boundary and scaled so a
/// full boundary's distance maps to zero.
///
/// Taking the minimum penalizes drifting away along
/// either axis.
pub fn proximity(offset: Vec2, boundary: Vec2) -> f32 {
    let axis = |d: f32, extent: f32| (d / extent * FRAC_PI_2).cos().powi(4);
    axis(offset.x, boundary.x).min(axis(offset.y, boundary.y))
}
