//! Minimal controller and agent used by the unit tests.
use crate::{rng, Agent, Controller, GoalProgress, Vec2, Weights, World};

use rand::Rng;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
#[error("expected {expected} values, found {found}")]
pub struct Mismatch {
    pub expected: usize,
    pub found: usize,
}

/// `y = W x + b`, with `W` stored row-major
/// by output, followed by `b`.
#[derive(Clone, Debug, PartialEq)]
pub struct Affine {
    inputs: usize,
    outputs: usize,
    parameters: Vec<f32>,
}

pub fn affine(inputs: usize, outputs: usize) -> Affine {
    Affine {
        inputs,
        outputs,
        parameters: vec![0.0; (inputs + 1) * outputs],
    }
}

impl Controller for Affine {
    type Topology = (usize, usize);
    type Error = Mismatch;

    fn from_topology(&(inputs, outputs): &(usize, usize)) -> Result<Affine, Mismatch> {
        Ok(affine(inputs, outputs))
    }

    fn topology(&self) -> (usize, usize) {
        (self.inputs, self.outputs)
    }

    fn initialize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.parameters
            .iter_mut()
            .for_each(|p| *p = rng::unit_weight(rng));
    }

    fn forward(&self, observation: &[f32]) -> Result<Vec<f32>, Mismatch> {
        if observation.len() != self.inputs {
            return Err(Mismatch {
                expected: self.inputs,
                found: observation.len(),
            });
        }
        let (weights, biases) = self.parameters.split_at(self.inputs * self.outputs);
        Ok(weights
            .chunks(self.inputs)
            .zip(biases)
            .map(|(row, b)| row.iter().zip(observation).map(|(w, x)| w * x).sum::<f32>() + b)
            .collect())
    }

    fn weights(&self) -> Weights {
        self.parameters.clone()
    }

    fn load_weights(&mut self, weights: &[f32]) -> Result<(), Mismatch> {
        if weights.len() != self.parameters.len() {
            return Err(Mismatch {
                expected: self.parameters.len(),
                found: weights.len(),
            });
        }
        self.parameters.copy_from_slice(weights);
        Ok(())
    }

    fn weight_count(&self) -> usize {
        self.parameters.len()
    }
}

/// A motionless agent that dies after a fixed
/// number of updates.
#[derive(Clone, Debug)]
pub struct ScriptedAgent {
    lifetime: u64,
    steps: u64,
    alive: bool,
    position: Vec2,
    progress: GoalProgress,
    actuators: usize,
    observation_size: usize,
    pub control_calls: usize,
    pub last_controls: Vec<f32>,
}

impl ScriptedAgent {
    pub fn new(lifetime: u64) -> ScriptedAgent {
        ScriptedAgent {
            lifetime,
            steps: 0,
            alive: true,
            position: Vec2::zeros(),
            progress: GoalProgress::default(),
            actuators: 2,
            observation_size: 2,
            control_calls: 0,
            last_controls: vec![],
        }
    }

    pub fn at(mut self, position: Vec2) -> ScriptedAgent {
        self.position = position;
        self
    }

    pub fn with_actuators(mut self, actuators: usize) -> ScriptedAgent {
        self.actuators = actuators;
        self
    }

    pub fn with_observation_size(mut self, size: usize) -> ScriptedAgent {
        self.observation_size = size;
        self
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }
}

impl Agent for ScriptedAgent {
    fn reset(&mut self) {
        self.steps = 0;
        self.alive = true;
        self.progress.reset();
        self.control_calls = 0;
        self.last_controls.clear();
    }

    fn update(&mut self, _dt: f32, _world: &World) {
        if !self.alive {
            return;
        }
        self.steps += 1;
        self.progress.elapsed_alive_steps += 1;
        if self.steps >= self.lifetime {
            self.alive = false;
        }
    }

    fn alive(&self) -> bool {
        self.alive
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn observation_size(&self) -> usize {
        self.observation_size
    }

    fn observe(&self, _world: &World, observation: &mut [f32]) {
        observation.iter_mut().for_each(|o| *o = 0.0);
        if let [x, y, ..] = observation {
            *x = self.position.x;
            *y = self.position.y;
        }
    }

    fn actuator_count(&self) -> usize {
        self.actuators
    }

    fn control(&mut self, controls: &[f32]) {
        self.control_calls += 1;
        self.last_controls = controls.to_vec();
    }

    fn progress(&self) -> &GoalProgress {
        &self.progress
    }

    fn progress_mut(&mut self) -> &mut GoalProgress {
        &mut self.progress
    }
}
