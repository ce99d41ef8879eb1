//! The shared simulation context agents are evaluated in.
use serde::{Deserialize, Serialize};

/// A 2D vector in world coordinates.
pub type Vec2 = nalgebra::Vector2<f32>;

/// A circular obstacle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub position: Vec2,
    pub radius: f32,
}

/// Read-only geometry of an episode: the playable
/// area spans `[0, boundary.x] × [0, boundary.y]`.
///
/// Goals are visited in order, wrapping around
/// once the last one has been reached.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub boundary: Vec2,
    pub walls: Vec<Wall>,
    pub goals: Vec<Vec2>,
}

impl World {
    /// Returns the goal an agent that has already reached
    /// `goals_reached` goals is currently heading for,
    /// or `None` if the world has no goals.
    ///
    /// # Examples
    /// ```
    /// use cosyne::{Vec2, World};
    ///
    /// let world = World {
    ///     boundary: Vec2::new(800.0, 800.0),
    ///     walls: vec![],
    ///     goals: vec![Vec2::new(200.0, 200.0), Vec2::new(600.0, 600.0)],
    /// };
    ///
    /// assert_eq!(world.goal(1), Some(Vec2::new(600.0, 600.0)));
    /// assert_eq!(world.goal(2), Some(Vec2::new(200.0, 200.0)));
    /// ```
    pub fn goal(&self, goals_reached: usize) -> Option<Vec2> {
        if self.goals.is_empty() {
            None
        } else {
            Some(self.goals[goals_reached % self.goals.len()])
        }
    }
}
