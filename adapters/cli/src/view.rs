//! Plain-text rendering of a single elevation.

use std::fmt::Write as _;

use flying_robots_core::OccupantClass;
use flying_robots_system_session::Game;

const fn glyph(class: OccupantClass) -> char {
    match class {
        OccupantClass::Empty => ' ',
        OccupantClass::Junk => '*',
        OccupantClass::Robot => '+',
        OccupantClass::Player => '@',
    }
}

/// Draws the elevation the view points at, framed and headed by the session status.
pub(crate) fn render_player_plane(game: &Game) -> String {
    let elevation = game.view_elevation();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "level {} | score {} | robots {} | elevation {}",
        game.current_level(),
        game.score(),
        game.live_enemy_count(),
        elevation
    );
    let Ok(plane) = game.viewable_plane(elevation) else {
        return out;
    };
    let width = game.config().grid.x() as usize;
    let border = format!("+{}+\n", "-".repeat(width));
    out.push_str(&border);
    for row in plane.rows() {
        out.push('|');
        out.extend(row.into_iter().map(glyph));
        out.push_str("|\n");
    }
    out.push_str(&border);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use flying_robots_core::{GameConfig, GridSize};

    #[test]
    fn renders_a_framed_plane_containing_the_player() {
        let mut config = GameConfig::default();
        config.grid = GridSize::new(12, 10, 8);
        config.game.max_level = 1;
        let game = Game::new(config, 21).expect("valid configuration");

        let text = render_player_plane(&game);
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("level 1 | score 0 | robots 31"));
        assert_eq!(lines.len(), 1 + 2 + 10);
        assert!(lines[1..].iter().all(|line| line.chars().count() == 14));
        assert_eq!(text.matches('@').count(), 1);
    }
}
