//! Dense tile storage for the three-dimensional grid.

use flying_robots_core::{Coord, Delta, GameError, GridSize, JunkId, OccupantClass, RobotId};
use rand::Rng;

/// Handle stored in a grid tile.
///
/// Tiles never own occupant data; they point at the authoritative records
/// kept by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tile {
    /// Nothing occupies the tile.
    Empty,
    /// Junk pile identified by its handle.
    Junk(JunkId),
    /// Robot identified by its handle.
    Robot(RobotId),
    /// The player.
    Player,
}

impl Tile {
    /// Class of occupant referenced by the tile.
    #[must_use]
    pub const fn class(self) -> OccupantClass {
        match self {
            Self::Empty => OccupantClass::Empty,
            Self::Junk(_) => OccupantClass::Junk,
            Self::Robot(_) => OccupantClass::Robot,
            Self::Player => OccupantClass::Player,
        }
    }
}

/// Authoritative tile occupancy indexed by elevation, row and column.
#[derive(Clone, Debug)]
pub struct Grid {
    size: GridSize,
    tiles: Vec<Tile>,
    empty_tiles: u64,
}

impl Grid {
    pub(crate) fn new(size: GridSize) -> Result<Self, GameError> {
        let capacity = size.tile_capacity().ok_or_else(|| {
            GameError::InvalidConfig(format!(
                "grid dimensions {}x{}x{} cannot be allocated",
                size.x(),
                size.y(),
                size.z()
            ))
        })?;
        Ok(Self {
            size,
            tiles: vec![Tile::Empty; capacity],
            empty_tiles: capacity as u64,
        })
    }

    /// Dimensions of the grid.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Reports whether every axis of `coord` lies inside the grid.
    #[must_use]
    pub const fn is_valid_tile(&self, coord: Coord) -> bool {
        self.size.contains(coord)
    }

    /// Returns the handle stored on the tile.
    pub fn tile(&self, coord: Coord) -> Result<Tile, GameError> {
        self.index(coord)
            .and_then(|index| self.tiles.get(index).copied())
            .ok_or(GameError::OutOfBounds(coord))
    }

    /// Reports whether the tile holds nothing. Tiles outside the grid are never empty.
    #[must_use]
    pub fn tile_is_empty(&self, coord: Coord) -> bool {
        matches!(self.tile(coord), Ok(Tile::Empty))
    }

    /// Reports whether no robot stands on the tile or any of its 26 neighbours.
    ///
    /// Neighbours outside the grid cannot hold robots and are skipped.
    #[must_use]
    pub fn tile_is_safe(&self, coord: Coord) -> bool {
        Delta::all()
            .filter_map(|delta| coord.offset(delta))
            .filter_map(|neighbour| self.tile(neighbour).ok())
            .all(|tile| !matches!(tile, Tile::Robot(_)))
    }

    /// Number of tiles currently holding nothing.
    #[must_use]
    pub const fn empty_tiles(&self) -> u64 {
        self.empty_tiles
    }

    /// Tiles of a single elevation in row-major order.
    pub fn plane(&self, elevation: u32) -> Result<&[Tile], GameError> {
        if elevation >= self.size.z() {
            return Err(GameError::OutOfBounds(Coord::new(0, 0, elevation)));
        }
        let plane_len = self.size.x() as usize * self.size.y() as usize;
        let start = elevation as usize * plane_len;
        Ok(&self.tiles[start..start + plane_len])
    }

    pub(crate) fn set_tile(&mut self, coord: Coord, tile: Tile) {
        let Some(index) = self.index(coord) else {
            debug_assert!(false, "set_tile called with {coord} outside the grid");
            return;
        };
        let previous = std::mem::replace(&mut self.tiles[index], tile);
        match (previous, tile) {
            (Tile::Empty, Tile::Empty) => {}
            (Tile::Empty, _) => self.empty_tiles -= 1,
            (_, Tile::Empty) => self.empty_tiles += 1,
            _ => {}
        }
    }

    pub(crate) fn clear_tile(&mut self, coord: Coord) {
        self.set_tile(coord, Tile::Empty);
    }

    pub(crate) fn clear(&mut self) {
        self.tiles.fill(Tile::Empty);
        self.empty_tiles = self.tiles.len() as u64;
    }

    /// Samples uniformly random tiles until an empty one turns up.
    ///
    /// Returns `None` instead of spinning forever when the grid is full.
    pub(crate) fn random_empty_coord<R: Rng>(&self, rng: &mut R) -> Option<Coord> {
        if self.empty_tiles == 0 {
            return None;
        }
        loop {
            let coord = Coord::new(
                rng.gen_range(0..self.size.x()),
                rng.gen_range(0..self.size.y()),
                rng.gen_range(0..self.size.z()),
            );
            if self.tile_is_empty(coord) {
                return Some(coord);
            }
        }
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        if !self.size.contains(coord) {
            return None;
        }
        let width = usize::try_from(self.size.x()).ok()?;
        let depth = usize::try_from(self.size.y()).ok()?;
        let x = usize::try_from(coord.x()).ok()?;
        let y = usize::try_from(coord.y()).ok()?;
        let z = usize::try_from(coord.z()).ok()?;
        Some((z * depth + y) * width + x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn grid() -> Grid {
        Grid::new(GridSize::new(4, 3, 2)).expect("small grid")
    }

    #[test]
    fn oversized_grids_are_refused() {
        let result = Grid::new(GridSize::new(1 << 16, 1 << 16, 2));
        assert!(matches!(result, Err(GameError::InvalidConfig(_))));
    }

    #[test]
    fn out_of_bounds_reads_are_errors() {
        let grid = grid();
        let outside = Coord::new(4, 0, 0);
        assert_eq!(grid.tile(outside), Err(GameError::OutOfBounds(outside)));
        assert!(!grid.tile_is_empty(outside));
    }

    #[test]
    fn set_and_clear_track_empty_tiles() {
        let mut grid = grid();
        let coord = Coord::new(3, 2, 1);
        grid.set_tile(coord, Tile::Player);
        assert_eq!(grid.tile(coord), Ok(Tile::Player));
        assert_eq!(grid.empty_tiles(), 23);

        grid.set_tile(coord, Tile::Robot(RobotId::new(0)));
        assert_eq!(grid.empty_tiles(), 23);

        grid.clear_tile(coord);
        assert!(grid.tile_is_empty(coord));
        assert_eq!(grid.empty_tiles(), 24);
    }

    #[test]
    fn safety_checks_the_full_neighbourhood() {
        let mut grid = grid();
        grid.set_tile(Coord::new(0, 0, 0), Tile::Robot(RobotId::new(1)));

        assert!(!grid.tile_is_safe(Coord::new(0, 0, 0)));
        assert!(!grid.tile_is_safe(Coord::new(1, 1, 1)));
        assert!(grid.tile_is_safe(Coord::new(2, 0, 0)));
        assert!(grid.tile_is_safe(Coord::new(3, 2, 1)));
    }

    #[test]
    fn junk_does_not_make_tiles_unsafe() {
        let mut grid = grid();
        grid.set_tile(Coord::new(1, 1, 0), Tile::Junk(JunkId::new(0)));
        assert!(grid.tile_is_safe(Coord::new(1, 1, 1)));
    }

    #[test]
    fn random_empty_coord_skips_occupied_tiles() {
        let mut grid = grid();
        let free = Coord::new(2, 1, 1);
        for z in 0..2 {
            for y in 0..3 {
                for x in 0..4 {
                    let coord = Coord::new(x, y, z);
                    if coord != free {
                        grid.set_tile(coord, Tile::Junk(JunkId::new(0)));
                    }
                }
            }
        }

        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..16 {
            assert_eq!(grid.random_empty_coord(&mut rng), Some(free));
        }

        grid.set_tile(free, Tile::Player);
        assert_eq!(grid.random_empty_coord(&mut rng), None);
    }

    #[test]
    fn planes_are_contiguous_per_elevation() {
        let mut grid = grid();
        grid.set_tile(Coord::new(1, 2, 1), Tile::Player);

        let lower = grid.plane(0).expect("plane 0");
        let upper = grid.plane(1).expect("plane 1");
        assert_eq!(lower.len(), 12);
        assert!(lower.iter().all(|tile| *tile == Tile::Empty));
        assert_eq!(upper[2 * 4 + 1], Tile::Player);
        assert!(grid.plane(2).is_err());
    }
}
