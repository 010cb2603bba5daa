#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn engine and level lifecycle for Flying Robots.
//!
//! [`Game`] is the single entry point adapters talk to. Every command runs a
//! complete turn before returning: the player acts, every live robot decides
//! its destination from the same snapshot, robots are placed one at a time
//! with collisions resolved against whatever already occupies the tile, and
//! finally the turn is checked for a caught player or an empty level.
//!
//! Level transitions and the end of the session surface as
//! [`SessionSignal`] values in the `Err` arm of each command. They are not
//! failures; once one is pending, further turn commands return it again until
//! the caller advances the level or restarts.

use std::ops::ControlFlow;

use flying_robots_core::{
    enemy_count, wait_kill_score, Command, Coord, Delta, Event, GameConfig, GameError,
    MoveRejection, OccupantClass, SessionSignal, ROBOT_KILL_SCORE,
};
use flying_robots_system_pursuit::Pursuit;
use flying_robots_world::{self as world, query, Layout, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

mod summary;

pub use summary::SessionSummary;

/// Result of a player move command that did not end the turn sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveOutcome {
    /// The player moved and the robots answered `turns` times.
    Moved {
        /// Number of complete turns played; more than one only in AFAP mode.
        turns: u32,
    },
    /// The very first step was rejected and nothing changed.
    Rejected(MoveRejection),
}

/// A single game session: one grid, one player, and the level progression.
#[derive(Debug)]
pub struct Game {
    config: GameConfig,
    world: World,
    pursuit: Pursuit,
    level: u32,
    score: u64,
    wait_bonus: u64,
    waiting: bool,
    move_afap: bool,
    sticky_view: bool,
    elevation: u32,
    pending: Option<SessionSignal>,
    events: Vec<Event>,
}

impl Game {
    /// Creates a session and starts its first level.
    ///
    /// All random placement is drawn from a generator seeded with `seed`, so
    /// equal seeds and equal commands replay identically.
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, GameError> {
        config.validate()?;
        let world = World::new(config.grid, ChaCha8Rng::seed_from_u64(seed))?;
        let mut game = Self::with_world(config, world);
        game.start_game();
        Ok(game)
    }

    /// Creates a session whose current level starts from a staged layout.
    ///
    /// The session sits on `start_level`; later levels are populated randomly.
    pub fn from_layout(config: GameConfig, layout: &Layout, seed: u64) -> Result<Self, GameError> {
        config.validate()?;
        let world = World::from_layout(config.grid, layout, ChaCha8Rng::seed_from_u64(seed))?;
        let mut game = Self::with_world(config, world);
        game.zoom_to_player();
        info!(level = game.level, "starting staged level");
        Ok(game)
    }

    fn with_world(config: GameConfig, world: World) -> Self {
        let level = config.game.start_level;
        Self {
            config,
            world,
            pursuit: Pursuit::new(),
            level,
            score: 0,
            wait_bonus: 0,
            waiting: false,
            move_afap: false,
            sticky_view: false,
            elevation: 0,
            pending: None,
            events: Vec::new(),
        }
    }

    /// Starts a whole new session at the configured start level.
    pub fn restart(&mut self) {
        info!(score = self.score, "restarting session");
        self.start_game();
    }

    fn start_game(&mut self) {
        self.score = 0;
        self.wait_bonus = 0;
        // A validated configuration always starts on a playable level.
        let _ = self.play_level(self.config.game.start_level);
    }

    fn play_level(&mut self, level: u32) -> Result<u32, SessionSignal> {
        self.score += self.wait_bonus;
        self.wait_bonus = 0;
        self.waiting = false;
        self.move_afap = false;
        self.sticky_view = false;

        if level > self.config.game.max_level {
            return Err(self.finish(SessionSignal::GameOver { victory: true }));
        }

        self.level = level;
        self.pending = None;
        let robots = u32::try_from(enemy_count(level)).unwrap_or(u32::MAX);
        self.events.clear();
        world::apply(
            &mut self.world,
            Command::Populate { robots },
            &mut self.events,
        );
        self.zoom_to_player();
        info!(level, robots, "starting level");
        Ok(level)
    }

    /// Moves on to the next level, or wins the game after the final one.
    pub fn advance_to_next_level(&mut self) -> Result<u32, SessionSignal> {
        if let Some(signal @ SessionSignal::GameOver { .. }) = self.pending {
            return Err(signal);
        }
        self.play_level(self.level + 1)
    }

    /// Moves the player by `delta` and lets the robots answer.
    ///
    /// The player may not step onto an occupied tile; with `safe_only` the
    /// destination must also be out of every robot's reach. In AFAP mode the
    /// whole turn repeats in the same direction until a step is rejected or the
    /// level ends, re-checking safety on every step. AFAP is switched off
    /// once the command returns.
    pub fn move_player(
        &mut self,
        delta: Delta,
        safe_only: bool,
    ) -> Result<MoveOutcome, SessionSignal> {
        let repeat = std::mem::take(&mut self.move_afap) && !delta.is_stay();
        self.ensure_playing()?;
        let mut turns = 0;
        loop {
            match self.player_turn(delta, safe_only) {
                Ok(None) => {
                    turns += 1;
                    if !repeat {
                        break Ok(MoveOutcome::Moved { turns });
                    }
                }
                Ok(Some(reason)) if turns == 0 => break Ok(MoveOutcome::Rejected(reason)),
                Ok(Some(_)) => break Ok(MoveOutcome::Moved { turns }),
                Err(signal) => break Err(signal),
            }
        }
    }

    /// Teleports the player to a random empty tile, then lets the robots answer.
    ///
    /// The landing tile is not checked for safety.
    pub fn teleport_player(&mut self) -> Result<(), SessionSignal> {
        self.ensure_playing()?;
        self.events.clear();
        world::apply(&mut self.world, Command::TeleportPlayer, &mut self.events);
        self.robot_turn()
    }

    /// Enters wait mode: the player stands still and kills earn a bonus.
    pub fn begin_wait(&mut self) {
        if self.pending.is_none() {
            self.waiting = true;
        }
    }

    /// Leaves wait mode. Bonus accrued so far is kept for the next level start.
    pub fn cancel_wait(&mut self) {
        self.waiting = false;
    }

    /// Runs a single waiting turn. Does nothing outside wait mode.
    pub fn wait_tick(&mut self) -> Result<(), SessionSignal> {
        self.ensure_playing()?;
        if !self.waiting {
            return Ok(());
        }
        // Standing still is never rejected when safety is not requested.
        let _ = self.player_turn(Delta::STAY, false)?;
        Ok(())
    }

    /// Waits turn after turn until interrupted or the turn sequence ends.
    ///
    /// `keep_going` is consulted before every turn; returning
    /// `ControlFlow::Break` cancels wait mode. Returns the number of turns
    /// played when interrupted.
    pub fn run_wait<F>(&mut self, mut keep_going: F) -> Result<u32, SessionSignal>
    where
        F: FnMut(&Game) -> ControlFlow<()>,
    {
        self.ensure_playing()?;
        self.begin_wait();
        let mut turns = 0;
        while self.waiting {
            if keep_going(self).is_break() {
                self.cancel_wait();
                break;
            }
            self.wait_tick()?;
            turns += 1;
        }
        Ok(turns)
    }

    /// Flips whether the view stays on its elevation instead of following the player.
    pub fn toggle_sticky_view(&mut self) {
        self.sticky_view = !self.sticky_view;
    }

    /// Flips as-far-as-possible mode for the next move.
    pub fn toggle_afap(&mut self) {
        self.move_afap = !self.move_afap;
    }

    /// Points the view at the provided elevation.
    pub fn zoom_to_elevation(&mut self, elevation: u32) -> Result<(), GameError> {
        if elevation >= self.config.grid.z() {
            return Err(GameError::OutOfBounds(Coord::new(0, 0, elevation)));
        }
        self.elevation = elevation;
        Ok(())
    }

    fn zoom_to_player(&mut self) {
        self.elevation = query::player(&self.world).coord.z();
    }

    fn ensure_playing(&self) -> Result<(), SessionSignal> {
        match self.pending {
            Some(signal) => Err(signal),
            None => Ok(()),
        }
    }

    /// Plays one full turn. Returns the rejection reason if the player could not move.
    fn player_turn(
        &mut self,
        delta: Delta,
        safe_only: bool,
    ) -> Result<Option<MoveRejection>, SessionSignal> {
        self.events.clear();
        world::apply(
            &mut self.world,
            Command::MovePlayer { delta, safe_only },
            &mut self.events,
        );
        if let Some(Event::PlayerMoveRejected { reason }) = self.events.first() {
            return Ok(Some(*reason));
        }
        self.robot_turn()?;
        Ok(None)
    }

    fn robot_turn(&mut self) -> Result<(), SessionSignal> {
        let robots = query::robot_view(&self.world);
        let player = query::player(&self.world).coord;
        let mut commands = Vec::new();
        self.pursuit
            .handle(&robots, player, self.config.grid, &mut commands);
        for command in commands {
            world::apply(&mut self.world, command, &mut self.events);
        }

        let kills = count_kills(&self.events);
        self.credit_kills(kills);
        if !self.sticky_view {
            self.zoom_to_player();
        }

        let live = query::live_robot_count(&self.world);
        debug!(level = self.level, kills, live, "turn resolved");

        if !query::player(&self.world).alive {
            return Err(self.finish(SessionSignal::GameOver { victory: false }));
        }
        if live == 0 {
            return Err(self.finish(SessionSignal::LevelComplete));
        }
        Ok(())
    }

    fn credit_kills(&mut self, kills: u64) {
        if self.waiting {
            self.wait_bonus += kills * u64::from(wait_kill_score(ROBOT_KILL_SCORE));
        } else {
            self.score += kills * u64::from(ROBOT_KILL_SCORE);
        }
    }

    fn finish(&mut self, signal: SessionSignal) -> SessionSignal {
        match signal {
            SessionSignal::LevelComplete => info!(level = self.level, "level complete"),
            SessionSignal::GameOver { victory } => {
                info!(victory, score = self.score, level = self.level, "game over");
            }
        }
        self.pending = Some(signal);
        signal
    }

    /// Tile the player currently occupies.
    #[must_use]
    pub fn player_coordinate(&self) -> Coord {
        query::player(&self.world).coord
    }

    /// Whether the player survived so far.
    #[must_use]
    pub fn player_alive(&self) -> bool {
        query::player(&self.world).alive
    }

    /// Level currently being played.
    #[must_use]
    pub const fn current_level(&self) -> u32 {
        self.level
    }

    /// Score banked so far, excluding pending wait bonus.
    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    /// Bonus accrued in wait mode, banked at the next level start.
    #[must_use]
    pub const fn wait_bonus(&self) -> u64 {
        self.wait_bonus
    }

    /// Whether wait mode is active.
    #[must_use]
    pub const fn is_waiting(&self) -> bool {
        self.waiting
    }

    /// Whether the next move runs in as-far-as-possible mode.
    #[must_use]
    pub const fn is_afap(&self) -> bool {
        self.move_afap
    }

    /// Whether the view ignores the player's elevation.
    #[must_use]
    pub const fn is_sticky_view(&self) -> bool {
        self.sticky_view
    }

    /// Elevation the view currently shows.
    #[must_use]
    pub const fn view_elevation(&self) -> u32 {
        self.elevation
    }

    /// Signal that ended the last turn sequence, if the caller has not acted on it yet.
    #[must_use]
    pub const fn pending_signal(&self) -> Option<SessionSignal> {
        self.pending
    }

    /// Number of robots still alive on the level.
    #[must_use]
    pub fn live_enemy_count(&self) -> usize {
        query::live_robot_count(&self.world)
    }

    /// Occupant classes of one elevation, for rendering.
    pub fn viewable_plane(&self, elevation: u32) -> Result<query::PlaneView<'_>, GameError> {
        query::plane(&self.world, elevation)
    }

    /// Every occupant with its tile: live robots, junk and the player.
    #[must_use]
    pub fn all_objects(&self) -> Vec<(Coord, OccupantClass)> {
        query::occupants(&self.world)
    }

    /// Read-only access to the underlying world.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Configuration the session was created with.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Name and score to hand to a high-score store.
    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            player_name: self.config.player.name.clone(),
            score: self.score,
            level: self.level,
            victory: self.pending == Some(SessionSignal::GameOver { victory: true }),
        }
    }
}

fn count_kills(events: &[Event]) -> u64 {
    events
        .iter()
        .map(|event| match event {
            Event::RobotsCollided { .. } => 2,
            Event::RobotScrapped { .. } => 1,
            _ => 0,
        })
        .sum()
}
