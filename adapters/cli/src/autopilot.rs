//! Scripted player used by the command-line adapter.
//!
//! Each turn the autopilot stands still while that is safe, so robots keep
//! colliding with each other. When a robot comes within reach it steps to the
//! first safe neighbouring tile, and teleports when none is left.

use flying_robots_core::{Delta, SessionSignal};
use flying_robots_system_session::{Game, MoveOutcome};
use tracing::debug;

/// Totals gathered while the autopilot played.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Report {
    /// Turns played, including teleports.
    pub(crate) turns: u32,
    /// Turns resolved by teleporting.
    pub(crate) teleports: u32,
    /// Whether the session reached game over before the turn budget ran out.
    pub(crate) finished: bool,
}

/// Plays `game` until it ends or `max_turns` turns have been played.
///
/// `on_level_end` runs whenever a level completes or the game ends, before
/// the session moves on.
pub(crate) fn play<F>(game: &mut Game, max_turns: u32, mut on_level_end: F) -> Report
where
    F: FnMut(&Game),
{
    let mut report = Report::default();
    while report.turns < max_turns {
        report.turns += 1;
        let Err(signal) = take_turn(game, &mut report) else {
            continue;
        };
        on_level_end(game);
        match signal {
            SessionSignal::LevelComplete => {
                if game.advance_to_next_level().is_err() {
                    report.finished = true;
                    break;
                }
            }
            SessionSignal::GameOver { .. } => {
                report.finished = true;
                break;
            }
        }
    }
    report
}

fn take_turn(game: &mut Game, report: &mut Report) -> Result<(), SessionSignal> {
    let candidates = std::iter::once(Delta::STAY).chain(Delta::all().filter(|d| !d.is_stay()));
    for delta in candidates {
        match game.move_player(delta, true)? {
            MoveOutcome::Moved { .. } => return Ok(()),
            MoveOutcome::Rejected(reason) => {
                debug!(?reason, dx = delta.dx(), dy = delta.dy(), dz = delta.dz(), "move rejected");
            }
        }
    }
    report.teleports += 1;
    game.teleport_player()
}
