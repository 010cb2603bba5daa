#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Flying Robots.

use std::collections::HashSet;

use flying_robots_core::{
    Command, Coord, Delta, Event, GameError, GridSize, JunkId, MoveRejection, RobotId, RobotStep,
    DEFAULT_ROBOT_SPEED,
};
use rand_chacha::ChaCha8Rng;
use tracing::trace;

mod grid;

pub use grid::{Grid, Tile};

/// Represents the authoritative Flying Robots world state.
///
/// The grid holds handles only. Robot, junk and player records below are the
/// authoritative store for coordinates and liveness.
#[derive(Debug)]
pub struct World {
    grid: Grid,
    robots: Vec<Robot>,
    live: Vec<RobotId>,
    junk: Vec<Junk>,
    player: Player,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates a world holding only the player, placed on a random tile.
    ///
    /// All later placement randomness is drawn from `rng`. Fails when the
    /// grid has more tiles than can be stored.
    pub fn new(size: GridSize, rng: ChaCha8Rng) -> Result<Self, GameError> {
        let mut world = Self::empty(size, rng)?;
        let _ = world.populate(0);
        Ok(world)
    }

    /// Creates a world with every occupant placed exactly as described.
    pub fn from_layout(size: GridSize, layout: &Layout, rng: ChaCha8Rng) -> Result<Self, GameError> {
        let mut seen = HashSet::new();
        let coords = std::iter::once(layout.player)
            .chain(layout.robots.iter().map(|spawn| spawn.coord))
            .chain(layout.junk.iter().copied());
        for coord in coords {
            if !size.contains(coord) {
                return Err(GameError::InvalidLayout(format!(
                    "{coord} lies outside the grid"
                )));
            }
            if !seen.insert(coord) {
                return Err(GameError::InvalidLayout(format!(
                    "{coord} holds more than one occupant"
                )));
            }
        }

        let mut world = Self::empty(size, rng)?;
        for spawn in &layout.robots {
            world.spawn_robot(spawn.coord, spawn.speed);
        }
        for coord in &layout.junk {
            let _ = world.spawn_junk(*coord);
        }
        world.player = Player::at(layout.player);
        world.grid.set_tile(layout.player, Tile::Player);
        Ok(world)
    }

    fn empty(size: GridSize, rng: ChaCha8Rng) -> Result<Self, GameError> {
        Ok(Self {
            grid: Grid::new(size)?,
            robots: Vec::new(),
            live: Vec::new(),
            junk: Vec::new(),
            player: Player::at(Coord::new(0, 0, 0)),
            rng,
        })
    }

    /// Clears the grid and places `robots` robots followed by the player.
    ///
    /// The robot count is capped so that the player always finds a tile.
    fn populate(&mut self, robots: u32) -> u32 {
        self.grid.clear();
        self.robots.clear();
        self.live.clear();
        self.junk.clear();

        let capacity = self.grid.empty_tiles().saturating_sub(1);
        let count = u64::from(robots).min(capacity) as u32;
        for _ in 0..count {
            if let Some(coord) = self.grid.random_empty_coord(&mut self.rng) {
                self.spawn_robot(coord, DEFAULT_ROBOT_SPEED);
            }
        }

        let coord = self
            .grid
            .random_empty_coord(&mut self.rng)
            .unwrap_or(Coord::new(0, 0, 0));
        self.player = Player::at(coord);
        self.grid.set_tile(coord, Tile::Player);
        count
    }

    fn spawn_robot(&mut self, coord: Coord, speed: u32) {
        let id = RobotId::new(self.robots.len() as u32);
        self.robots.push(Robot {
            id,
            coord,
            speed,
            alive: true,
        });
        self.live.push(id);
        self.grid.set_tile(coord, Tile::Robot(id));
    }

    fn spawn_junk(&mut self, coord: Coord) -> JunkId {
        let id = JunkId::new(self.junk.len() as u32);
        self.junk.push(Junk { coord });
        self.grid.set_tile(coord, Tile::Junk(id));
        id
    }

    fn robot_mut(&mut self, id: RobotId) -> Option<&mut Robot> {
        self.robots.get_mut(id.get() as usize)
    }

    fn move_player(&mut self, destination: Coord) {
        self.grid.clear_tile(self.player.coord);
        self.player.coord = destination;
        self.grid.set_tile(destination, Tile::Player);
    }

    fn check_player_move(
        &self,
        delta: Delta,
        safe_only: bool,
    ) -> Result<Coord, MoveRejection> {
        let destination = self
            .player
            .coord
            .offset(delta)
            .filter(|coord| self.grid.is_valid_tile(*coord))
            .ok_or(MoveRejection::OutOfBounds)?;
        if !delta.is_stay() && !self.grid.tile_is_empty(destination) {
            return Err(MoveRejection::Occupied);
        }
        if safe_only && !self.grid.tile_is_safe(destination) {
            return Err(MoveRejection::Unsafe);
        }
        Ok(destination)
    }

    fn advance_robots(&mut self, steps: &[RobotStep], out_events: &mut Vec<Event>) {
        // Every mover leaves its tile before anyone lands, so robots only
        // collide with arrivals from this turn, junk, or the player.
        let mut movers = Vec::with_capacity(steps.len());
        for step in steps {
            let Some(robot) = self.robots.get(step.robot.get() as usize) else {
                continue;
            };
            if !robot.alive {
                continue;
            }
            let destination = if self.grid.is_valid_tile(step.destination) {
                step.destination
            } else {
                robot.coord
            };
            let from = robot.coord;
            self.grid.clear_tile(from);
            movers.push((step.robot, destination));
        }

        for (id, destination) in movers {
            if let Some(robot) = self.robot_mut(id) {
                robot.coord = destination;
            }
            self.place_robot(id, destination, out_events);
        }

        let player_alive = self.player.alive;
        if player_alive {
            let robots = &self.robots;
            self.live
                .retain(|id| robots.get(id.get() as usize).is_some_and(|robot| robot.alive));
        }

        out_events.push(Event::RobotsAdvanced {
            live: self.live_robot_count() as u32,
            player_alive,
        });
    }

    fn place_robot(&mut self, id: RobotId, at: Coord, out_events: &mut Vec<Event>) {
        let Ok(incumbent) = self.grid.tile(at) else {
            return;
        };
        match incumbent {
            Tile::Empty => self.grid.set_tile(at, Tile::Robot(id)),
            Tile::Player => {
                self.player.alive = false;
                self.grid.set_tile(at, Tile::Robot(id));
                trace!(robot = id.get(), %at, "robot caught the player");
                out_events.push(Event::PlayerCaught { robot: id, at });
            }
            Tile::Robot(other) => {
                self.kill(other);
                self.kill(id);
                let junk = self.spawn_junk(at);
                trace!(first = other.get(), second = id.get(), %at, "robots collided");
                out_events.push(Event::RobotsCollided {
                    incumbent: other,
                    arriving: id,
                    junk,
                    at,
                });
            }
            Tile::Junk(_) => {
                self.kill(id);
                trace!(robot = id.get(), %at, "robot ran into junk");
                out_events.push(Event::RobotScrapped { robot: id, at });
            }
        }
    }

    fn kill(&mut self, id: RobotId) {
        if let Some(robot) = self.robot_mut(id) {
            robot.alive = false;
        }
    }

    fn live_robot_count(&self) -> usize {
        self.live
            .iter()
            .filter(|id| {
                self.robots
                    .get(id.get() as usize)
                    .is_some_and(|robot| robot.alive)
            })
            .count()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Populate { robots } => {
            let placed = world.populate(robots);
            out_events.push(Event::LevelPopulated {
                robots: placed,
                player: world.player.coord,
            });
        }
        Command::MovePlayer { delta, safe_only } => {
            match world.check_player_move(delta, safe_only) {
                Ok(destination) => {
                    let from = world.player.coord;
                    world.move_player(destination);
                    out_events.push(Event::PlayerMoved {
                        from,
                        to: destination,
                    });
                }
                Err(reason) => out_events.push(Event::PlayerMoveRejected { reason }),
            }
        }
        Command::TeleportPlayer => {
            let from = world.player.coord;
            let to = world.grid.random_empty_coord(&mut world.rng).unwrap_or(from);
            world.move_player(to);
            out_events.push(Event::PlayerTeleported { from, to });
        }
        Command::AdvanceRobots { steps } => world.advance_robots(&steps, out_events),
    }
}

/// Hand-placed starting position used instead of random population.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Layout {
    /// Tile the player starts on.
    pub player: Coord,
    /// Robots in enemy-set order.
    pub robots: Vec<RobotSpawn>,
    /// Pre-existing junk piles.
    pub junk: Vec<Coord>,
}

/// Starting tile and speed of a staged robot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RobotSpawn {
    /// Tile the robot starts on.
    pub coord: Coord,
    /// Tiles moved along each axis per turn.
    pub speed: u32,
}

impl RobotSpawn {
    /// Creates a robot spawn with the default speed.
    #[must_use]
    pub const fn at(coord: Coord) -> Self {
        Self {
            coord,
            speed: DEFAULT_ROBOT_SPEED,
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use flying_robots_core::{Coord, GameError, OccupantClass, RobotId};

    use super::{Grid, Tile, World};

    /// Provides read-only access to the tile grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Captures the player's current state.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        PlayerSnapshot {
            coord: world.player.coord,
            alive: world.player.alive,
        }
    }

    /// Captures a read-only view of the live robots in enemy-set order.
    #[must_use]
    pub fn robot_view(world: &World) -> RobotView {
        let snapshots = world
            .live
            .iter()
            .filter_map(|id| world.robots.get(id.get() as usize))
            .filter(|robot| robot.alive)
            .map(|robot| RobotSnapshot {
                id: robot.id,
                coord: robot.coord,
                speed: robot.speed,
            })
            .collect();
        RobotView { snapshots }
    }

    /// Number of robots still alive.
    #[must_use]
    pub fn live_robot_count(world: &World) -> usize {
        world.live_robot_count()
    }

    /// Number of junk piles on the grid.
    #[must_use]
    pub fn junk_count(world: &World) -> usize {
        world.junk.len()
    }

    /// Enumerates every occupant: live robots, junk and the player.
    #[must_use]
    pub fn occupants(world: &World) -> Vec<(Coord, OccupantClass)> {
        let robots = robot_view(world)
            .into_vec()
            .into_iter()
            .map(|robot| (robot.coord, OccupantClass::Robot));
        let junk = world
            .junk
            .iter()
            .map(|junk| (junk.coord, OccupantClass::Junk));
        robots
            .chain(junk)
            .chain(std::iter::once((world.player.coord, OccupantClass::Player)))
            .collect()
    }

    /// Exposes the tiles of one elevation for rendering.
    pub fn plane(world: &World, elevation: u32) -> Result<PlaneView<'_>, GameError> {
        let tiles = world.grid.plane(elevation)?;
        Ok(PlaneView {
            tiles,
            columns: world.grid.size().x(),
            elevation,
        })
    }

    /// Immutable representation of the player used for queries.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct PlayerSnapshot {
        /// Tile the player occupies.
        pub coord: Coord,
        /// Whether the player survived so far.
        pub alive: bool,
    }

    /// Immutable representation of a single robot used for queries.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct RobotSnapshot {
        /// Identifier of the robot.
        pub id: RobotId,
        /// Tile the robot occupies.
        pub coord: Coord,
        /// Tiles moved along each axis per turn.
        pub speed: u32,
    }

    /// Read-only snapshot describing all live robots.
    #[derive(Clone, Debug, Default)]
    pub struct RobotView {
        snapshots: Vec<RobotSnapshot>,
    }

    impl RobotView {
        /// Iterator over the captured robots in enemy-set order.
        pub fn iter(&self) -> impl Iterator<Item = &RobotSnapshot> {
            self.snapshots.iter()
        }

        /// Number of captured robots.
        #[must_use]
        pub fn len(&self) -> usize {
            self.snapshots.len()
        }

        /// Reports whether no robot is alive.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.snapshots.is_empty()
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<RobotSnapshot> {
            self.snapshots
        }
    }

    /// Read-only view of a single elevation.
    #[derive(Clone, Copy, Debug)]
    pub struct PlaneView<'a> {
        tiles: &'a [Tile],
        columns: u32,
        elevation: u32,
    }

    impl<'a> PlaneView<'a> {
        /// Elevation the view was captured from.
        #[must_use]
        pub const fn elevation(&self) -> u32 {
            self.elevation
        }

        /// Occupant class at the provided column and row, if inside the plane.
        #[must_use]
        pub fn class_at(&self, x: u32, y: u32) -> Option<OccupantClass> {
            if x >= self.columns {
                return None;
            }
            let index = y as usize * self.columns as usize + x as usize;
            self.tiles.get(index).map(|tile| tile.class())
        }

        /// Rows of occupant classes, starting at row zero.
        pub fn rows(&self) -> impl Iterator<Item = Vec<OccupantClass>> + 'a {
            self.tiles
                .chunks(self.columns.max(1) as usize)
                .map(|row| row.iter().map(|tile| tile.class()).collect())
        }
    }
}

#[derive(Clone, Debug)]
struct Robot {
    id: RobotId,
    coord: Coord,
    speed: u32,
    alive: bool,
}

#[derive(Clone, Copy, Debug)]
struct Junk {
    coord: Coord,
}

#[derive(Clone, Copy, Debug)]
struct Player {
    coord: Coord,
    alive: bool,
}

impl Player {
    const fn at(coord: Coord) -> Self {
        Self { coord, alive: true }
    }
}
