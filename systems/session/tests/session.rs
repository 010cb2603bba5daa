use std::ops::ControlFlow;

use flying_robots_core::{
    Coord, Delta, GameConfig, GameError, GridSize, MoveRejection, OccupantClass, SessionSignal,
};
use flying_robots_system_session::{Game, MoveOutcome};
use flying_robots_world::{Layout, RobotSpawn};

fn config(side: u32, start_level: u32, max_level: u32) -> GameConfig {
    let mut config = GameConfig::default();
    config.grid = GridSize::new(side, side, side);
    config.game.start_level = start_level;
    config.game.max_level = max_level;
    config
}

fn staged(config: GameConfig, layout: Layout) -> Game {
    Game::from_layout(config, &layout, 42).expect("valid session")
}

/// Two robots flanking the tile in front of the player meet there next turn.
fn converging_pair() -> Layout {
    Layout {
        player: Coord::new(2, 4, 2),
        robots: vec![
            RobotSpawn::at(Coord::new(1, 2, 2)),
            RobotSpawn::at(Coord::new(3, 2, 2)),
        ],
        junk: Vec::new(),
    }
}

#[test]
fn colliding_robots_score_and_complete_the_level() {
    let mut game = staged(config(5, 1, 2), converging_pair());

    let result = game.move_player(Delta::STAY, false);

    assert_eq!(result, Err(SessionSignal::LevelComplete));
    assert_eq!(game.score(), 20);
    assert_eq!(game.live_enemy_count(), 0);
    assert!(game
        .all_objects()
        .contains(&(Coord::new(2, 3, 2), OccupantClass::Junk)));
}

#[test]
fn robot_running_into_junk_is_scrapped() {
    let mut game = staged(
        config(5, 1, 2),
        Layout {
            player: Coord::new(4, 4, 4),
            robots: vec![
                RobotSpawn::at(Coord::new(0, 0, 0)),
                RobotSpawn::at(Coord::new(0, 4, 0)),
            ],
            junk: vec![Coord::new(1, 1, 1)],
        },
    );

    assert_eq!(game.move_player(Delta::STAY, false), Ok(MoveOutcome::Moved { turns: 1 }));
    assert_eq!(game.live_enemy_count(), 1);
    assert_eq!(game.score(), 10);
}

#[test]
fn caught_player_ends_the_game_after_every_robot_moved() {
    let mut game = staged(
        config(5, 1, 2),
        Layout {
            player: Coord::new(2, 2, 2),
            robots: vec![
                RobotSpawn::at(Coord::new(1, 1, 1)),
                RobotSpawn::at(Coord::new(4, 4, 4)),
            ],
            junk: Vec::new(),
        },
    );

    let result = game.move_player(Delta::STAY, false);

    assert_eq!(result, Err(SessionSignal::GameOver { victory: false }));
    assert!(!game.player_alive());
    assert_eq!(game.live_enemy_count(), 2);
    assert!(game
        .all_objects()
        .contains(&(Coord::new(3, 3, 3), OccupantClass::Robot)));

    assert_eq!(
        game.teleport_player(),
        Err(SessionSignal::GameOver { victory: false })
    );
    assert_eq!(
        game.advance_to_next_level(),
        Err(SessionSignal::GameOver { victory: false })
    );
    assert!(!game.summary().victory);
}

#[test]
fn rejected_moves_do_not_spend_a_turn() {
    let robot = Coord::new(4, 4, 4);
    let mut game = staged(
        config(5, 1, 2),
        Layout {
            player: Coord::new(0, 0, 0),
            robots: vec![RobotSpawn::at(robot)],
            junk: vec![Coord::new(1, 0, 0)],
        },
    );
    let before = game.all_objects();

    let west = Delta::step(-1, 0, 0).expect("unit step");
    let east = Delta::step(1, 0, 0).expect("unit step");
    assert_eq!(
        game.move_player(west, false),
        Ok(MoveOutcome::Rejected(MoveRejection::OutOfBounds))
    );
    assert_eq!(
        game.move_player(east, false),
        Ok(MoveOutcome::Rejected(MoveRejection::Occupied))
    );
    assert_eq!(game.all_objects(), before);
    assert_eq!(game.player_coordinate(), Coord::new(0, 0, 0));
}

#[test]
fn safe_moves_refuse_tiles_next_to_robots() {
    let mut game = staged(
        config(5, 1, 2),
        Layout {
            player: Coord::new(0, 0, 0),
            robots: vec![RobotSpawn::at(Coord::new(2, 2, 2))],
            junk: Vec::new(),
        },
    );
    let diagonal = Delta::step(1, 1, 1).expect("unit step");

    assert_eq!(
        game.move_player(diagonal, true),
        Ok(MoveOutcome::Rejected(MoveRejection::Unsafe))
    );
    assert_eq!(game.player_coordinate(), Coord::new(0, 0, 0));
}

#[test]
fn wait_mode_banks_its_bonus_at_the_next_level() {
    let mut game = staged(config(5, 1, 2), converging_pair());

    game.begin_wait();
    assert!(game.is_waiting());
    assert_eq!(game.wait_tick(), Err(SessionSignal::LevelComplete));
    assert_eq!(game.score(), 0);
    assert_eq!(game.wait_bonus(), 22);

    assert_eq!(game.advance_to_next_level(), Ok(2));
    assert_eq!(game.score(), 22);
    assert_eq!(game.wait_bonus(), 0);
    assert!(!game.is_waiting());
    assert_eq!(game.live_enemy_count(), 89);
}

#[test]
fn clearing_the_final_level_wins_without_repopulating() {
    let mut game = staged(config(5, 2, 2), converging_pair());

    assert_eq!(game.run_wait(|_| ControlFlow::Continue(())), Err(SessionSignal::LevelComplete));
    assert_eq!(
        game.advance_to_next_level(),
        Err(SessionSignal::GameOver { victory: true })
    );

    assert_eq!(game.current_level(), 2);
    assert_eq!(game.score(), 22);
    assert_eq!(game.live_enemy_count(), 0);
    let summary = game.summary();
    assert!(summary.victory);
    assert_eq!(summary.player_name, "j_doe");
    assert_eq!(summary.score, 22);
}

#[test]
fn run_wait_stops_when_interrupted() {
    let mut game = staged(
        config(9, 1, 1),
        Layout {
            player: Coord::new(8, 8, 8),
            robots: vec![RobotSpawn::at(Coord::new(0, 0, 0))],
            junk: Vec::new(),
        },
    );
    let mut remaining = 3;

    let turns = game.run_wait(|_| {
        if remaining == 0 {
            return ControlFlow::Break(());
        }
        remaining -= 1;
        ControlFlow::Continue(())
    });

    assert_eq!(turns, Ok(3));
    assert!(!game.is_waiting());
    assert!(game
        .all_objects()
        .contains(&(Coord::new(3, 3, 3), OccupantClass::Robot)));
}

#[test]
fn afap_repeats_until_the_path_is_blocked() {
    let mut game = staged(
        config(9, 1, 1),
        Layout {
            player: Coord::new(0, 4, 4),
            robots: vec![RobotSpawn::at(Coord::new(8, 8, 8))],
            junk: vec![Coord::new(3, 4, 4)],
        },
    );
    let east = Delta::step(1, 0, 0).expect("unit step");

    game.toggle_afap();
    assert!(game.is_afap());
    assert_eq!(game.move_player(east, false), Ok(MoveOutcome::Moved { turns: 2 }));
    assert!(!game.is_afap());
    assert_eq!(game.player_coordinate(), Coord::new(2, 4, 4));
    assert!(game
        .all_objects()
        .contains(&(Coord::new(6, 6, 6), OccupantClass::Robot)));

    game.toggle_afap();
    assert_eq!(
        game.move_player(Delta::STAY, false),
        Ok(MoveOutcome::Moved { turns: 1 })
    );
}

#[test]
fn safe_afap_stops_before_stepping_into_reach() {
    let mut game = staged(
        config(9, 1, 1),
        Layout {
            player: Coord::new(0, 0, 0),
            robots: vec![RobotSpawn::at(Coord::new(8, 0, 8))],
            junk: Vec::new(),
        },
    );
    let east = Delta::step(1, 0, 0).expect("unit step");

    game.toggle_afap();
    assert_eq!(game.move_player(east, true), Ok(MoveOutcome::Moved { turns: 7 }));

    assert!(game.player_alive());
    assert_eq!(game.player_coordinate(), Coord::new(7, 0, 0));
    assert!(game
        .all_objects()
        .contains(&(Coord::new(7, 0, 1), OccupantClass::Robot)));
    assert!(!game.is_afap());
}

#[test]
fn teleport_moves_the_player_and_spends_a_turn() {
    let mut game = staged(
        config(5, 1, 2),
        Layout {
            player: Coord::new(0, 0, 0),
            robots: vec![RobotSpawn::at(Coord::new(4, 4, 4))],
            junk: Vec::new(),
        },
    );

    let result = game.teleport_player();

    assert_ne!(game.player_coordinate(), Coord::new(0, 0, 0));
    assert!(!game
        .all_objects()
        .contains(&(Coord::new(4, 4, 4), OccupantClass::Robot)));
    if game.player_alive() {
        assert_eq!(result, Ok(()));
    } else {
        assert_eq!(result, Err(SessionSignal::GameOver { victory: false }));
    }
}

#[test]
fn view_follows_the_player_unless_sticky() {
    let mut game = staged(
        config(5, 1, 2),
        Layout {
            player: Coord::new(2, 2, 2),
            robots: vec![RobotSpawn::at(Coord::new(0, 0, 0))],
            junk: Vec::new(),
        },
    );
    assert_eq!(game.view_elevation(), 2);
    assert_eq!(
        game.zoom_to_elevation(5),
        Err(GameError::OutOfBounds(Coord::new(0, 0, 5)))
    );

    game.toggle_sticky_view();
    game.zoom_to_elevation(0).expect("elevation inside the grid");
    let up = Delta::step(0, 0, 1).expect("unit step");
    assert_eq!(game.move_player(up, false), Ok(MoveOutcome::Moved { turns: 1 }));
    assert_eq!(game.view_elevation(), 0);

    game.toggle_sticky_view();
    assert_eq!(game.move_player(up, false), Ok(MoveOutcome::Moved { turns: 1 }));
    assert_eq!(game.view_elevation(), 4);

    let plane = game.viewable_plane(4).expect("plane inside the grid");
    assert_eq!(plane.class_at(2, 2), Some(OccupantClass::Player));
    assert!(game.viewable_plane(5).is_err());
}

#[test]
fn pending_level_complete_blocks_turns_until_advanced() {
    let mut game = staged(config(5, 1, 2), converging_pair());
    assert_eq!(game.move_player(Delta::STAY, false), Err(SessionSignal::LevelComplete));

    assert_eq!(
        game.move_player(Delta::STAY, false),
        Err(SessionSignal::LevelComplete)
    );
    assert_eq!(game.wait_tick(), Err(SessionSignal::LevelComplete));
    assert_eq!(game.pending_signal(), Some(SessionSignal::LevelComplete));

    game.toggle_afap();
    assert_eq!(
        game.move_player(Delta::STAY, false),
        Err(SessionSignal::LevelComplete)
    );
    assert!(!game.is_afap());

    assert_eq!(game.advance_to_next_level(), Ok(2));
    assert_eq!(game.pending_signal(), None);
}

#[test]
fn restart_resets_score_and_level() {
    let mut game = staged(config(5, 1, 2), converging_pair());
    assert_eq!(game.move_player(Delta::STAY, false), Err(SessionSignal::LevelComplete));
    assert_eq!(game.advance_to_next_level(), Ok(2));

    game.restart();

    assert_eq!(game.current_level(), 1);
    assert_eq!(game.score(), 0);
    assert_eq!(game.live_enemy_count(), 31);
    assert_eq!(game.pending_signal(), None);
    assert!(game.player_alive());
}
