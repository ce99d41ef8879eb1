//! Training worlds, from an open field to cluttered rooms.
use crate::body::START;
use crate::errors::RunError;

use cosyne::{Vec2, Wall, World};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Side length of the square training area.
pub const WORLD_SIZE: f32 = 800.0;
/// Minimal gap between a wall and the start position or a goal.
pub const CLEARANCE: f32 = 60.0;
/// Goals stay at least this far inside the world's edges.
const GOAL_MARGIN: u32 = 25;
const MIN_WALL_RADIUS: u32 = 50;
/// Smallest side a randomized level can place goals in.
pub const MIN_RANDOMIZED_SIZE: f32 = 2.0 * GOAL_MARGIN as f32;
/// Rejection sampling gives up after this many draws per item.
const MAX_PLACEMENT_ATTEMPTS: usize = 10_000;

/// A world the drones train in.
///
/// Randomized levels move their walls and goals before
/// every episode, keeping their counts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub world: World,
    pub randomized: bool,
}

impl Level {
    pub fn fixed(world: World) -> Level {
        Level {
            world,
            randomized: false,
        }
    }

    pub fn randomized(world: World) -> Level {
        Level {
            world,
            randomized: true,
        }
    }

    /// Re-places the walls of a randomized level, keeping each
    /// clear of `start`, then the goals, keeping each clear of
    /// every wall. Fixed levels are left untouched.
    ///
    /// Coordinates are drawn as whole numbers; wall radii lie
    /// in `[50, width / 8]`.
    ///
    /// # Errors
    /// Returns an error if an item cannot be placed, which
    /// happens when the walls crowd out the whole world or the
    /// world has no room for goals inside its margins.
    ///
    /// # Examples
    /// ```
    /// use drone::body::START;
    /// use drone::levels::{self, CLEARANCE};
    ///
    /// let mut rng = cosyne::rng::seeded(Some(3));
    /// let mut level = levels::default_levels().remove(3);
    /// level.randomize(START, &mut rng).unwrap();
    ///
    /// for wall in &level.world.walls {
    ///     assert!((START - wall.position).norm() - wall.radius >= CLEARANCE);
    /// }
    /// assert_eq!(level.world.goals.len(), 5);
    /// ```
    pub fn randomize<R: Rng + ?Sized>(&mut self, start: Vec2, rng: &mut R) -> Result<(), RunError> {
        if !self.randomized {
            return Ok(());
        }
        let width = self.world.boundary.x as u32;
        let height = self.world.boundary.y as u32;
        let max_radius = (width / 8).max(MIN_WALL_RADIUS);

        for index in 0..self.world.walls.len() {
            self.world.walls[index] = place(rng, "wall", index, |rng| {
                let wall = Wall {
                    position: Vec2::new(
                        rng.gen_range(0..=width) as f32,
                        rng.gen_range(0..=height) as f32,
                    ),
                    radius: rng.gen_range(MIN_WALL_RADIUS..=max_radius) as f32,
                };
                let clear = (start - wall.position).norm() - wall.radius >= CLEARANCE;
                clear.then_some(wall)
            })?;
        }

        let walls = &self.world.walls;
        let goal_area = width >= 2 * GOAL_MARGIN && height >= 2 * GOAL_MARGIN;
        let x_range = GOAL_MARGIN..=width.saturating_sub(GOAL_MARGIN);
        let y_range = GOAL_MARGIN..=height.saturating_sub(GOAL_MARGIN);
        for index in 0..self.world.goals.len() {
            if !goal_area {
                return Err(RunError::Placement { item: "goal", index });
            }
            self.world.goals[index] = place(rng, "goal", index, |rng| {
                let goal = Vec2::new(
                    rng.gen_range(x_range.clone()) as f32,
                    rng.gen_range(y_range.clone()) as f32,
                );
                let clear = walls
                    .iter()
                    .all(|wall| (goal - wall.position).norm() - wall.radius >= CLEARANCE);
                clear.then_some(goal)
            })?;
        }
        Ok(())
    }
}

/// Draws candidates until `candidate` accepts one.
fn place<R, T, F>(rng: &mut R, item: &'static str, index: usize, mut candidate: F) -> Result<T, RunError>
where
    R: Rng + ?Sized,
    F: FnMut(&mut R) -> Option<T>,
{
    (0..MAX_PLACEMENT_ATTEMPTS)
        .find_map(|_| candidate(rng))
        .ok_or(RunError::Placement { item, index })
}

/// The open training field: five goals visited in a loop
/// that ends back above the start.
pub fn open_world() -> World {
    World {
        boundary: Vec2::new(WORLD_SIZE, WORLD_SIZE),
        walls: vec![],
        goals: vec![
            Vec2::new(200.0, 200.0),
            Vec2::new(600.0, 600.0),
            Vec2::new(200.0, 600.0),
            Vec2::new(600.0, 200.0),
            Vec2::new(400.0, 650.0),
        ],
    }
}

/// The open field with two overlapping pillars in its centre.
pub fn pillar_world() -> World {
    World {
        walls: vec![
            Wall {
                position: Vec2::new(400.0, 400.0),
                radius: 100.0,
            },
            Wall {
                position: Vec2::new(300.0, 400.0),
                radius: 50.0,
            },
        ],
        ..open_world()
    }
}

/// The training curriculum: the open field, its randomized
/// variant, the pillar room and its randomized variant.
pub fn default_levels() -> Vec<Level> {
    vec![
        Level::fixed(open_world()),
        Level::randomized(open_world()),
        Level::fixed(pillar_world()),
        Level::randomized(pillar_world()),
    ]
}

/// Returns `true` if `start` is clear of every wall of `world`.
pub fn start_is_clear(world: &World) -> bool {
    world
        .walls
        .iter()
        .all(|wall| (START - wall.position).norm() - wall.radius >= CLEARANCE)
}

/// Returns `true` if `world` leaves room to place goals
/// inside its margins when randomized.
pub fn can_randomize(world: &World) -> bool {
    world.boundary.x >= MIN_RANDOMIZED_SIZE && world.boundary.y >= MIN_RANDOMIZED_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosyne::rng;

    #[test]
    fn fixed_levels_do_not_move() {
        let mut level = Level::fixed(pillar_world());
        level.randomize(START, &mut rng::seeded(Some(0))).unwrap();
        assert_eq!(level.world, pillar_world());
    }

    #[test]
    fn randomized_placement_keeps_clearances() {
        let mut rng = rng::seeded(Some(11));
        let mut level = Level::randomized(pillar_world());
        for _ in 0..50 {
            level.randomize(START, &mut rng).unwrap();
            let world = &level.world;
            assert_eq!(world.walls.len(), 2);
            assert_eq!(world.goals.len(), 5);
            assert!(start_is_clear(world));
            for wall in &world.walls {
                assert!((50.0..=100.0).contains(&wall.radius));
                assert_eq!(wall.position.x.fract(), 0.0);
                assert!((0.0..=WORLD_SIZE).contains(&wall.position.y));
            }
            for goal in &world.goals {
                assert!((25.0..=775.0).contains(&goal.x));
                assert!((25.0..=775.0).contains(&goal.y));
                for wall in &world.walls {
                    assert!((*goal - wall.position).norm() - wall.radius >= CLEARANCE);
                }
            }
        }
    }

    #[test]
    fn randomization_moves_goals() {
        let mut level = Level::randomized(open_world());
        level.randomize(START, &mut rng::seeded(Some(5))).unwrap();
        assert_ne!(level.world.goals, open_world().goals);
        assert_eq!(level.world.boundary, open_world().boundary);
    }

    #[test]
    fn crowded_world_is_reported() {
        let mut level = Level::randomized(World {
            boundary: Vec2::new(100.0, 100.0),
            walls: vec![Wall {
                position: Vec2::zeros(),
                radius: 50.0,
            }],
            goals: vec![],
        });
        // Every wall position is within reach of a start in the middle.
        let result = level.randomize(Vec2::new(50.0, 50.0), &mut rng::seeded(Some(1)));
        assert!(matches!(
            result,
            Err(RunError::Placement {
                item: "wall",
                index: 0
            })
        ));
    }

    #[test]
    fn tiny_world_is_reported() {
        let tiny = World {
            boundary: Vec2::new(40.0, 40.0),
            walls: vec![],
            goals: vec![Vec2::new(20.0, 20.0)],
        };
        assert!(!can_randomize(&tiny));
        let mut level = Level::randomized(tiny.clone());
        let result = level.randomize(Vec2::new(20.0, 20.0), &mut rng::seeded(Some(2)));
        assert!(matches!(
            result,
            Err(RunError::Placement {
                item: "goal",
                index: 0
            })
        ));

        let mut level = Level::randomized(World {
            boundary: Vec2::new(MIN_RANDOMIZED_SIZE, f32::NAN),
            ..tiny
        });
        assert!(!can_randomize(&level.world));
        assert!(level.randomize(Vec2::zeros(), &mut rng::seeded(Some(2))).is_err());
    }

    #[test]
    fn smallest_randomizable_world() {
        let mut level = Level::randomized(World {
            boundary: Vec2::new(MIN_RANDOMIZED_SIZE, MIN_RANDOMIZED_SIZE),
            walls: vec![],
            goals: vec![Vec2::zeros(); 3],
        });
        assert!(can_randomize(&level.world));
        level.randomize(Vec2::zeros(), &mut rng::seeded(Some(4))).unwrap();
        assert!(level.world.goals.iter().all(|goal| *goal == Vec2::new(25.0, 25.0)));
    }

    #[test]
    fn curriculum() {
        let levels = default_levels();
        assert_eq!(levels.len(), 4);
        assert!(levels.iter().all(|level| start_is_clear(&level.world)));
        assert!(levels.iter().all(|level| can_randomize(&level.world)));
        assert_eq!(
            levels.iter().map(|l| l.randomized).collect::<Vec<_>>(),
            [false, true, false, true]
        );
    }
}
