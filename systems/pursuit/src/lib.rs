#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that decides where every live robot moves next turn.
//!
//! Robots chase the player greedily: each axis steps toward the player's
//! coordinate independently, scaled by the robot's speed. All robots decide
//! from the same snapshot, so the order in which they are evaluated never
//! changes an individual decision.

use flying_robots_core::{Command, Coord, GridSize, RobotStep};
use flying_robots_world::query::RobotView;

/// Pursuit system that emits one `Command::AdvanceRobots` per enemy turn.
#[derive(Debug, Default)]
pub struct Pursuit {
    scratch: Vec<RobotStep>,
}

impl Pursuit {
    /// Creates a new pursuit system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decides every robot's destination and queues the advance command.
    ///
    /// Nothing is emitted when no robot is alive.
    pub fn handle(
        &mut self,
        robots: &RobotView,
        player: Coord,
        grid: GridSize,
        out: &mut Vec<Command>,
    ) {
        if robots.is_empty() {
            return;
        }

        self.scratch.clear();
        self.scratch.extend(robots.iter().map(|robot| RobotStep {
            robot: robot.id,
            destination: pursue(robot.coord, player, robot.speed, grid),
        }));

        out.push(Command::AdvanceRobots {
            steps: std::mem::take(&mut self.scratch),
        });
    }
}

/// Destination of a robot chasing `player` at `speed` tiles per axis.
///
/// Intermediate tiles are never inspected. A destination that would leave
/// the grid, which only faster robots can produce, keeps the robot in place.
#[must_use]
pub fn pursue(robot: Coord, player: Coord, speed: u32, grid: GridSize) -> Coord {
    step_toward(robot, player, speed)
        .filter(|coord| grid.contains(*coord))
        .unwrap_or(robot)
}

fn step_toward(robot: Coord, player: Coord, speed: u32) -> Option<Coord> {
    Some(Coord::new(
        pursue_axis(robot.x(), player.x(), speed)?,
        pursue_axis(robot.y(), player.y(), speed)?,
        pursue_axis(robot.z(), player.z(), speed)?,
    ))
}

fn pursue_axis(robot: u32, player: u32, speed: u32) -> Option<u32> {
    match robot.cmp(&player) {
        std::cmp::Ordering::Less => robot.checked_add(speed),
        std::cmp::Ordering::Greater => robot.checked_sub(speed),
        std::cmp::Ordering::Equal => Some(robot),
    }
}
