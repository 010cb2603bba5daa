use flying_robots_core::{Coord, Delta, GameConfig, GridSize, OccupantClass, SessionSignal};
use flying_robots_system_session::{Game, MoveOutcome};

const TURN_LIMIT: usize = 400;

#[derive(Debug, PartialEq, Eq)]
struct TurnRecord {
    level: u32,
    score: u64,
    player: Coord,
    objects: Vec<(Coord, OccupantClass)>,
    signal: Option<SessionSignal>,
}

fn config() -> GameConfig {
    let mut config = GameConfig::default();
    config.grid = GridSize::new(12, 10, 8);
    config.game.max_level = 3;
    config
}

/// Plays the first safe step it finds each turn, teleporting when boxed in.
fn replay(seed: u64) -> Vec<TurnRecord> {
    let mut game = Game::new(config(), seed).expect("valid configuration");
    let mut records = Vec::new();

    for _ in 0..TURN_LIMIT {
        let mut signal = None;
        let mut moved = false;
        for delta in Delta::all().filter(|delta| !delta.is_stay()) {
            match game.move_player(delta, true) {
                Ok(MoveOutcome::Moved { .. }) => moved = true,
                Ok(MoveOutcome::Rejected(_)) => continue,
                Err(pending) => {
                    moved = true;
                    signal = Some(pending);
                }
            }
            break;
        }
        if !moved {
            signal = game.teleport_player().err();
        }

        records.push(TurnRecord {
            level: game.current_level(),
            score: game.score(),
            player: game.player_coordinate(),
            objects: game.all_objects(),
            signal,
        });

        match signal {
            Some(SessionSignal::LevelComplete) => {
                if game.advance_to_next_level().is_err() {
                    break;
                }
            }
            Some(SessionSignal::GameOver { .. }) => break,
            None => {}
        }
    }
    records
}

#[test]
fn equal_seeds_replay_identically() {
    let first = replay(0x00C0_FFEE);
    let second = replay(0x00C0_FFEE);

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn different_seeds_diverge() {
    assert_ne!(replay(1)[0], replay(2)[0]);
}

#[test]
fn every_recorded_turn_keeps_occupants_on_distinct_tiles() {
    for record in replay(7) {
        let mut tiles: Vec<Coord> = record
            .objects
            .iter()
            .filter(|(_, class)| *class != OccupantClass::Player)
            .map(|(coord, _)| *coord)
            .collect();
        let total = tiles.len();
        tiles.sort_unstable();
        tiles.dedup();
        assert_eq!(tiles.len(), total, "shared tile at level {}", record.level);
    }
}
