//! Session configuration shared by the engine and its adapters.

use serde::{Deserialize, Serialize};

use crate::{enemy_count, GameError, GridSize, MAX_GRID_CELLS};

const DEFAULT_GRID: GridSize = GridSize::new(59, 22, 36);
const DEFAULT_START_LEVEL: u32 = 1;
const DEFAULT_MAX_LEVEL: u32 = 25;
const DEFAULT_PLAYER_NAME: &str = "j_doe";

/// Complete configuration for a game session.
///
/// The serialized layout groups settings into `[player]`, `[game]` and
/// `[grid]` sections. Missing sections and keys fall back to defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Player identity.
    pub player: PlayerSection,
    /// Level progression bounds.
    pub game: GameSection,
    /// Grid dimensions.
    pub grid: GridSize,
}

/// Player identity settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSection {
    /// Name reported alongside the final score.
    pub name: String,
}

impl Default for PlayerSection {
    fn default() -> Self {
        Self {
            name: DEFAULT_PLAYER_NAME.to_owned(),
        }
    }
}

/// Level progression settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSection {
    /// Level every new session starts on.
    pub start_level: u32,
    /// Last playable level; clearing it wins the game.
    pub max_level: u32,
}

impl Default for GameSection {
    fn default() -> Self {
        Self {
            start_level: DEFAULT_START_LEVEL,
            max_level: DEFAULT_MAX_LEVEL,
        }
    }
}

impl Default for GridSize {
    fn default() -> Self {
        DEFAULT_GRID
    }
}

impl GameConfig {
    /// Checks that a session built from this configuration can run to completion.
    ///
    /// Robot counts grow with the level, so the grid only needs to fit the
    /// population of `max_level` plus the player.
    pub fn validate(&self) -> Result<(), GameError> {
        let grid = self.grid;
        if grid.x() == 0 || grid.y() == 0 || grid.z() == 0 {
            return Err(GameError::InvalidConfig(format!(
                "grid dimensions {}x{}x{} must all be positive",
                grid.x(),
                grid.y(),
                grid.z()
            )));
        }
        if grid.tile_capacity().is_none() {
            return Err(GameError::InvalidConfig(format!(
                "grid dimensions {}x{}x{} exceed {MAX_GRID_CELLS} tiles",
                grid.x(),
                grid.y(),
                grid.z()
            )));
        }

        let GameSection {
            start_level,
            max_level,
        } = self.game;
        if start_level == 0 {
            return Err(GameError::InvalidConfig(
                "start_level must be at least 1".to_owned(),
            ));
        }
        if start_level > max_level {
            return Err(GameError::InvalidConfig(format!(
                "start_level {start_level} exceeds max_level {max_level}"
            )));
        }

        let occupants = enemy_count(max_level).saturating_add(1);
        if occupants > grid.cell_count() {
            return Err(GameError::GridTooSmall {
                cells: grid.cell_count(),
                occupants,
                level: max_level,
            });
        }

        Ok(())
    }
}
