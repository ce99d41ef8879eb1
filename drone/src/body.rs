//! Rigid-body physics of a two-thruster drone.
use cosyne::{Agent, GoalProgress, Vec2, World};
use nalgebra::Rotation2;

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

/// Where every drone starts an episode.
pub const START: Vec2 = Vec2::new(400.0, 650.0);

/// Velocity, angular velocity, heading and goal offset.
pub const BASE_OBSERVATIONS: usize = 7;
pub const SENSOR_COUNT: usize = 8;
pub const SENSOR_LENGTH: f32 = 200.0;
/// Left angle, left power, right angle, right power.
pub const ACTUATORS: usize = 4;

const MAX_THRUSTER_ANGLE: f32 = FRAC_PI_2;
const MAX_POWER: f32 = 15.0;
/// Fraction of the remaining angle error a thruster closes per second.
const SLEW_RATE: f32 = 5.0;
const GRAVITY: Vec2 = Vec2::new(0.0, 10.0);
const MOMENT_FACTOR: f32 = 0.0005;
const CONTACT_RADIUS: f32 = 60.0;
const THRUSTER_OFFSET: Vec2 = Vec2::new(50.0, 0.0);
const MAX_ALIVE_STEPS: u64 = 600;
/// Ray marching stops once a surface is closer than this.
const SURFACE_DISTANCE: f32 = 1.0;

/// A swivelling thruster.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Thruster {
    angle_control: f32,
    power_control: f32,
    angle: f32,
}

impl Thruster {
    /// Sets the target angle as a fraction of ±π/2 and
    /// the power as a fraction of the maximum.
    pub fn control(&mut self, angle: f32, power: f32) {
        self.angle_control = angle;
        self.power_control = power;
    }

    /// Swivels towards the target angle.
    pub fn update(&mut self, dt: f32) {
        let target = self.angle_control * MAX_THRUSTER_ANGLE;
        self.angle += (target - self.angle) * SLEW_RATE * dt;
    }

    /// Current angle relative to the drone's frame.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn power(&self) -> f32 {
        self.power_control * MAX_POWER
    }

    /// Unit thrust direction for a frame rotated by `heading`.
    fn direction(&self, heading: f32) -> Vec2 {
        Rotation2::new(heading + self.angle - FRAC_PI_2) * Vec2::x()
    }
}

/// A distance sensor casting a ray from the drone's hull.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sensor {
    /// Ray direction relative to the drone's heading.
    pub angle: f32,
    pub length: f32,
}

impl Sensor {
    /// Marches the ray through `world` and returns the
    /// fraction of its length travelled before hitting a wall
    /// or the world's edge, or `1.0` if nothing was hit.
    ///
    /// # Examples
    /// ```
    /// use cosyne::{Vec2, World};
    /// use drone::body::Sensor;
    ///
    /// let world = World {
    ///     boundary: Vec2::new(800.0, 800.0),
    ///     walls: vec![],
    ///     goals: vec![],
    /// };
    /// let sensor = Sensor { angle: 0.0, length: 200.0 };
    /// // The hull ends 60 to the right; the edge is 100 further.
    /// let free = sensor.check(Vec2::new(640.0, 400.0), 0.0, &world);
    /// assert!((free - 0.5).abs() < 0.01);
    /// assert_eq!(sensor.check(Vec2::new(400.0, 400.0), 0.0, &world), 1.0);
    /// ```
    pub fn check(&self, origin: Vec2, heading: f32, world: &World) -> f32 {
        let direction = Rotation2::new(self.angle + heading) * Vec2::x();
        let mut probe = origin + direction * CONTACT_RADIUS;
        let mut travelled = 0.0;
        while travelled < self.length {
            let closest = distance_to_surface(probe, world);
            if closest < SURFACE_DISTANCE {
                return travelled / self.length;
            }
            travelled += closest;
            probe += direction * closest;
        }
        1.0
    }
}

/// Signed distance from `point` to the nearest wall or world edge.
fn distance_to_surface(point: Vec2, world: &World) -> f32 {
    let walls = world
        .walls
        .iter()
        .map(|wall| (wall.position - point).norm() - wall.radius);
    let edges = [
        point.x.abs(),
        point.y.abs(),
        world.boundary.x - point.x.abs(),
        world.boundary.y - point.y.abs(),
    ];
    walls.chain(edges).fold(f32::MAX, f32::min)
}

/// A drone lifted by two thrusters mounted symmetrically
/// at either side of its body.
///
/// The y axis points down, so gravity is positive and a
/// thruster at angle zero pushes the drone up.
#[derive(Clone, Debug, PartialEq)]
pub struct Drone {
    start: Vec2,
    position: Vec2,
    velocity: Vec2,
    angle: f32,
    angular_velocity: f32,
    left: Thruster,
    right: Thruster,
    sensors: Vec<Sensor>,
    alive: bool,
    progress: GoalProgress,
    last_controls: [f32; ACTUATORS],
}

impl Drone {
    /// Returns a drone without distance sensors.
    pub fn new(start: Vec2) -> Drone {
        Drone {
            start,
            position: start,
            velocity: Vec2::zeros(),
            angle: 0.0,
            angular_velocity: 0.0,
            left: Thruster::default(),
            right: Thruster::default(),
            sensors: vec![],
            alive: true,
            progress: GoalProgress::default(),
            last_controls: [0.0; ACTUATORS],
        }
    }

    /// Returns a drone with [`SENSOR_COUNT`] sensors spread
    /// evenly around its body, starting straight ahead.
    ///
    /// # Examples
    /// ```
    /// use cosyne::Agent;
    /// use drone::body::{Drone, START};
    ///
    /// assert_eq!(Drone::new(START).observation_size(), 7);
    /// assert_eq!(Drone::with_sensors(START).observation_size(), 15);
    /// ```
    pub fn with_sensors(start: Vec2) -> Drone {
        let sensors = (0..SENSOR_COUNT)
            .map(|k| Sensor {
                angle: k as f32 * FRAC_PI_4,
                length: SENSOR_LENGTH,
            })
            .collect();
        Drone {
            sensors,
            ..Drone::new(start)
        }
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Heading in radians; zero is upright.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn angular_velocity(&self) -> f32 {
        self.angular_velocity
    }

    pub fn thrusters(&self) -> (&Thruster, &Thruster) {
        (&self.left, &self.right)
    }

    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    /// The raw commands last passed to [`Agent::control`].
    pub fn last_controls(&self) -> &[f32; ACTUATORS] {
        &self.last_controls
    }

    /// Combined thrust of both thrusters in world coordinates.
    pub fn thrust(&self) -> Vec2 {
        self.left.direction(self.angle) * self.left.power()
            + self.right.direction(self.angle) * self.right.power()
    }

    /// Angular acceleration produced by the thrusters.
    pub fn torque(&self) -> f32 {
        let left = lever_moment(self.left.direction(0.0) * self.left.power(), -THRUSTER_OFFSET);
        let right = lever_moment(self.right.direction(0.0) * self.right.power(), THRUSTER_OFFSET);
        (left + right) * MOMENT_FACTOR
    }

    fn touches_wall(&self, world: &World) -> bool {
        world.walls.iter().any(|wall| {
            let reach = wall.radius + CONTACT_RADIUS;
            (wall.position - self.position).norm_squared() < reach * reach
        })
    }

    fn should_die(&self, world: &World) -> bool {
        let finite = self.position.iter().all(|c| c.is_finite())
            && self.angle.is_finite()
            && self.angular_velocity.is_finite();
        let out_of_bounds = self.position.x < 0.0
            || self.position.x > world.boundary.x
            || self.position.y < 0.0
            || self.position.y > world.boundary.y;
        !finite
            || out_of_bounds
            || self.angle.abs() > FRAC_PI_2
            || self.progress.elapsed_alive_steps > MAX_ALIVE_STEPS
            || self.progress.goals_reached > 2 * world.goals.len()
            || self.touches_wall(world)
    }
}

/// Moment of a force applied at `arm` for thrusters mounted
/// on the horizontal axis of the body.
fn lever_moment(force: Vec2, arm: Vec2) -> f32 {
    force.x * arm.y + force.y * arm.x
}

impl Agent for Drone {
    fn reset(&mut self) {
        *self = Drone {
            sensors: std::mem::take(&mut self.sensors),
            ..Drone::new(self.start)
        };
    }

    fn update(&mut self, dt: f32, world: &World) {
        if !self.alive {
            return;
        }
        self.progress.elapsed_alive_steps += 1;

        self.left.update(dt);
        self.right.update(dt);

        self.velocity += GRAVITY * dt;
        self.velocity += self.thrust() * dt;
        self.position += self.velocity;

        self.angular_velocity += self.torque() * dt;
        self.angle += self.angular_velocity;

        self.alive = !self.should_die(world);
    }

    fn alive(&self) -> bool {
        self.alive
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn observation_size(&self) -> usize {
        BASE_OBSERVATIONS + self.sensors.len()
    }

    fn observe(&self, world: &World, observation: &mut [f32]) {
        let goal = world.goal(self.progress.goals_reached).unwrap_or(self.position);
        let offset = goal - self.position;
        observation[..BASE_OBSERVATIONS].copy_from_slice(&[
            self.velocity.x / 20.0,
            self.velocity.y / 20.0,
            self.angular_velocity,
            self.angle.cos(),
            self.angle.sin(),
            offset.x / world.boundary.x,
            offset.y / world.boundary.y,
        ]);
        for (value, sensor) in observation[BASE_OBSERVATIONS..].iter_mut().zip(&self.sensors) {
            *value = 1.0 - sensor.check(self.position, self.angle, world);
        }
    }

    fn actuator_count(&self) -> usize {
        ACTUATORS
    }

    fn control(&mut self, controls: &[f32]) {
        self.last_controls.copy_from_slice(controls);
        let [left_angle, left_power, right_angle, right_power] = self.last_controls;
        self.left.control(left_angle, (left_power + 1.0) * 0.5);
        self.right.control(right_angle, (right_power + 1.0) * 0.5);
    }

    fn progress(&self) -> &GoalProgress {
        &self.progress
    }

    fn progress_mut(&mut self) -> &mut GoalProgress {
        &mut self.progress
    }
}
