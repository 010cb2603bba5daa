#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Flying Robots engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Systems submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values describing what
//! actually happened. The session system folds those events into score,
//! level progression and the [`SessionSignal`] values handed to adapters.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod config;

pub use config::{GameConfig, GameSection, PlayerSection};

/// Score awarded for every robot destroyed outside of wait mode.
pub const ROBOT_KILL_SCORE: u32 = 10;

/// Speed assigned to robots created by level population.
pub const DEFAULT_ROBOT_SPEED: u32 = 1;

/// Largest number of tiles a grid may hold.
pub const MAX_GRID_CELLS: u64 = 1 << 32;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Clears every tile and places a fresh set of robots and the player.
    ///
    /// Robots are placed first, each on a random empty tile, followed by the
    /// player on another random empty tile.
    Populate {
        /// Number of robots to create.
        robots: u32,
    },
    /// Requests that the player move by the provided delta.
    MovePlayer {
        /// Offset applied to the player's coordinate.
        delta: Delta,
        /// Rejects the move when the destination neighbours a robot.
        safe_only: bool,
    },
    /// Moves the player to a random empty tile without any safety check.
    TeleportPlayer,
    /// Places every live robot on its decided destination and resolves collisions.
    AdvanceRobots {
        /// Destination for each live robot, in enemy-set order.
        steps: Vec<RobotStep>,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a new level layout was generated.
    LevelPopulated {
        /// Number of robots placed on the grid.
        robots: u32,
        /// Tile the player starts on.
        player: Coord,
    },
    /// Confirms that the player moved, or stayed in place.
    PlayerMoved {
        /// Tile the player occupied before the move.
        from: Coord,
        /// Tile the player occupies after the move.
        to: Coord,
    },
    /// Reports that a player move was rejected and nothing changed.
    PlayerMoveRejected {
        /// Specific reason the move failed.
        reason: MoveRejection,
    },
    /// Confirms that the player teleported.
    PlayerTeleported {
        /// Tile the player occupied before teleporting.
        from: Coord,
        /// Random empty tile the player landed on.
        to: Coord,
    },
    /// Two robots tried to share a tile; both died and left junk behind.
    RobotsCollided {
        /// Robot that already stood on the tile.
        incumbent: RobotId,
        /// Robot that moved onto the tile.
        arriving: RobotId,
        /// Junk created in place of the robots.
        junk: JunkId,
        /// Tile where the collision happened.
        at: Coord,
    },
    /// A robot moved onto junk and was destroyed.
    RobotScrapped {
        /// Robot that was destroyed.
        robot: RobotId,
        /// Junk tile that absorbed the robot.
        at: Coord,
    },
    /// A robot reached the player's tile.
    PlayerCaught {
        /// Robot that landed on the player.
        robot: RobotId,
        /// Tile where the player was caught.
        at: Coord,
    },
    /// Reports the settled state after all robots were placed.
    RobotsAdvanced {
        /// Robots still alive once the turn settled.
        live: u32,
        /// Whether the player survived the turn.
        player_alive: bool,
    },
}

/// Destination decided for a single robot during the enemy decision phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RobotStep {
    /// Robot that moves.
    pub robot: RobotId,
    /// Tile the robot wants to occupy after the turn.
    pub destination: Coord,
}

/// Reasons a player move may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveRejection {
    /// The destination lies outside the grid.
    OutOfBounds,
    /// The destination is occupied and the move was not a stay.
    Occupied,
    /// The destination is within reach of a robot.
    Unsafe,
}

/// Control-flow signals that end the current turn sequence.
///
/// These are not failures: adapters react to them by advancing to the next
/// level or by finishing the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionSignal {
    /// Every robot on the level was destroyed.
    LevelComplete,
    /// The session ended.
    GameOver {
        /// `true` when the player cleared the final level.
        victory: bool,
    },
}

/// Errors reported by the engine.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GameError {
    /// A tile outside the grid was accessed.
    #[error("tile {0} lies outside the grid")]
    OutOfBounds(Coord),
    /// A directional command was not a unit step.
    #[error("delta ({dx}, {dy}, {dz}) is not a unit step")]
    InvalidCommand {
        /// Requested x offset.
        dx: i32,
        /// Requested y offset.
        dy: i32,
        /// Requested z offset.
        dz: i32,
    },
    /// The grid cannot hold every occupant some level requires.
    #[error("grid of {cells} tiles cannot hold {occupants} occupants required by level {level}")]
    GridTooSmall {
        /// Number of tiles in the grid.
        cells: u64,
        /// Robots plus the player.
        occupants: u64,
        /// Level that requires the occupants.
        level: u32,
    },
    /// The configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A staged layout overlaps itself or leaves the grid.
    #[error("invalid layout: {0}")]
    InvalidLayout(String),
}

/// Location of a single tile expressed as x, y and z indices.
///
/// The z axis is the elevation; each elevation is a plane of x columns and
/// y rows.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Coord {
    x: u32,
    y: u32,
    z: u32,
}

impl Coord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Zero-based column index.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row index.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Zero-based elevation index.
    #[must_use]
    pub const fn z(&self) -> u32 {
        self.z
    }

    /// Shifts the coordinate by the provided delta.
    ///
    /// Returns `None` when any axis would become negative. The result is not
    /// checked against grid bounds.
    #[must_use]
    pub fn offset(self, delta: Delta) -> Option<Coord> {
        Some(Coord::new(
            self.x.checked_add_signed(delta.dx())?,
            self.y.checked_add_signed(delta.dy())?,
            self.z.checked_add_signed(delta.dz())?,
        ))
    }

    /// Computes the Chebyshev distance between two coordinates.
    #[must_use]
    pub fn chebyshev_distance(self, other: Coord) -> u32 {
        self.x
            .abs_diff(other.x)
            .max(self.y.abs_diff(other.y))
            .max(self.z.abs_diff(other.z))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Dimensions of the three-dimensional grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSize {
    x: u32,
    y: u32,
    z: u32,
}

impl GridSize {
    /// Creates a new grid size.
    #[must_use]
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Number of columns in each plane.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Number of rows in each plane.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Number of elevations.
    #[must_use]
    pub const fn z(&self) -> u32 {
        self.z
    }

    /// Total number of tiles, saturating at `u64::MAX`.
    #[must_use]
    pub const fn cell_count(&self) -> u64 {
        (self.x as u64)
            .saturating_mul(self.y as u64)
            .saturating_mul(self.z as u64)
    }

    /// Number of tiles as an in-memory length, or `None` above [`MAX_GRID_CELLS`].
    #[must_use]
    pub fn tile_capacity(&self) -> Option<usize> {
        let cells = self.cell_count();
        if cells > MAX_GRID_CELLS {
            return None;
        }
        usize::try_from(cells).ok()
    }

    /// Reports whether every axis of `coord` lies within `[0, dimension)`.
    #[must_use]
    pub const fn contains(&self, coord: Coord) -> bool {
        coord.x < self.x && coord.y < self.y && coord.z < self.z
    }
}

/// Signed unit step applied to a coordinate.
///
/// Every component is one of -1, 0 or 1. Adapters build deltas from their own
/// key bindings through [`Delta::step`], which rejects anything larger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Delta {
    dx: i32,
    dy: i32,
    dz: i32,
}

impl Delta {
    /// The zero delta, used for waiting in place.
    pub const STAY: Delta = Delta {
        dx: 0,
        dy: 0,
        dz: 0,
    };

    /// Creates a unit step, rejecting components outside -1..=1.
    pub fn step(dx: i32, dy: i32, dz: i32) -> Result<Self, GameError> {
        let unit = |value: i32| (-1..=1).contains(&value);
        if unit(dx) && unit(dy) && unit(dz) {
            Ok(Self { dx, dy, dz })
        } else {
            Err(GameError::InvalidCommand { dx, dy, dz })
        }
    }

    /// Enumerates all 27 unit steps, including [`Delta::STAY`].
    pub fn all() -> impl Iterator<Item = Delta> {
        (-1..=1).flat_map(|dz| {
            (-1..=1).flat_map(move |dy| (-1..=1).map(move |dx| Delta { dx, dy, dz }))
        })
    }

    /// Offset along the x axis.
    #[must_use]
    pub const fn dx(&self) -> i32 {
        self.dx
    }

    /// Offset along the y axis.
    #[must_use]
    pub const fn dy(&self) -> i32 {
        self.dy
    }

    /// Offset along the z axis.
    #[must_use]
    pub const fn dz(&self) -> i32 {
        self.dz
    }

    /// Reports whether the delta leaves the coordinate unchanged.
    #[must_use]
    pub const fn is_stay(&self) -> bool {
        self.dx == 0 && self.dy == 0 && self.dz == 0
    }
}

/// Kind of occupant found on a tile, as exposed to renderers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OccupantClass {
    /// Nothing occupies the tile.
    Empty,
    /// Debris left after robots collided.
    Junk,
    /// A hostile robot.
    Robot,
    /// The player.
    Player,
}

impl OccupantClass {
    /// Stable lowercase name used by character maps.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Junk => "junk",
            Self::Robot => "robot",
            Self::Player => "player",
        }
    }
}

/// Unique identifier assigned to a robot within a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RobotId(u32);

impl RobotId {
    /// Creates a new robot identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a junk pile within a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JunkId(u32);

impl JunkId {
    /// Creates a new junk identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Number of robots populated on the provided level.
///
/// Computes `floor((10 * level) ^ 1.5)` exactly in integer arithmetic.
#[must_use]
pub fn enemy_count(level: u32) -> u64 {
    // (10 * u32::MAX)^3 fits in u128 and its root fits in u64.
    let base = 10 * u128::from(level);
    let root = integer_sqrt(base * base * base);
    u64::try_from(root).unwrap_or(u64::MAX)
}

/// Score credited for a robot destroyed while the player waits.
///
/// Wait-mode kills earn a ten percent bonus, truncated to a whole number.
#[must_use]
pub const fn wait_kill_score(kill_score: u32) -> u32 {
    kill_score * 11 / 10
}

fn integer_sqrt(value: u128) -> u128 {
    let mut root = (value as f64).sqrt() as u128;
    while root.checked_mul(root).map_or(true, |square| square > value) {
        root -= 1;
    }
    while (root + 1)
        .checked_mul(root + 1)
        .is_some_and(|square| square <= value)
    {
        root += 1;
    }
    root
}
