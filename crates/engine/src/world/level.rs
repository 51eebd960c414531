use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;
use tracing::debug;

use super::collectible::Collectible;
use super::container::Container;
use super::geometry::{Facing, Rect};
use super::hostile::HostileEntity;
use super::peaceful::PeacefulEntity;

pub const TILE_SIZE: i32 = 64;

/// Grid position of a level inside the world map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LevelCoord {
    pub column: u32,
    pub row: u32,
}

impl LevelCoord {
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    pub fn neighbor(self, facing: Facing) -> Option<LevelCoord> {
        let (column, row) = match facing {
            Facing::North => (self.column, self.row.checked_sub(1)?),
            Facing::South => (self.column, self.row.checked_add(1)?),
            Facing::West => (self.column.checked_sub(1)?, self.row),
            Facing::East => (self.column.checked_add(1)?, self.row),
        };
        Some(LevelCoord { column, row })
    }
}

impl fmt::Display for LevelCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tile {
    #[default]
    Floor,
    Wall,
    Water,
}

impl Tile {
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '.' => Some(Self::Floor),
            '#' => Some(Self::Wall),
            '~' => Some(Self::Water),
            _ => None,
        }
    }

    pub fn is_solid(self) -> bool {
        !matches!(self, Self::Floor)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tilemap {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TilemapError {
    #[error("tile count mismatch: expected {expected}, got {actual}")]
    TileCountMismatch { expected: usize, actual: usize },
    #[error("tilemap must be at least 1x1")]
    Empty,
}

impl Tilemap {
    pub fn new(width: u32, height: u32, tiles: Vec<Tile>) -> Result<Self, TilemapError> {
        if width == 0 || height == 0 {
            return Err(TilemapError::Empty);
        }
        let expected = width as usize * height as usize;
        let actual = tiles.len();
        if expected != actual {
            return Err(TilemapError::TileCountMismatch { expected, actual });
        }
        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    /// Open floor enclosed by walls, used by tests and as a fallback room.
    pub fn walled_room(width: u32, height: u32) -> Result<Self, TilemapError> {
        let mut tiles = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                let border = x == 0 || y == 0 || x + 1 == width || y + 1 == height;
                tiles.push(if border { Tile::Wall } else { Tile::Floor });
            }
        }
        Self::new(width, height, tiles)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_at(&self, x: u32, y: u32) -> Option<Tile> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.tiles
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    pub fn set_tile(&mut self, x: u32, y: u32, tile: Tile) {
        if x < self.width && y < self.height {
            let index = y as usize * self.width as usize + x as usize;
            self.tiles[index] = tile;
        }
    }

    /// Level extent in world units.
    pub fn pixel_bounds(&self) -> Rect {
        Rect::new(
            0,
            0,
            self.width as i32 * TILE_SIZE,
            self.height as i32 * TILE_SIZE,
        )
    }

    /// True when `rect` overlaps any solid tile. Area outside the grid is ignored.
    pub fn overlaps_solid(&self, rect: &Rect) -> bool {
        if rect.width <= 0 || rect.height <= 0 {
            return false;
        }
        let first_x = rect.left().div_euclid(TILE_SIZE).max(0);
        let last_x = (rect.right() - 1).div_euclid(TILE_SIZE);
        let first_y = rect.top().div_euclid(TILE_SIZE).max(0);
        let last_y = (rect.bottom() - 1).div_euclid(TILE_SIZE);
        for ty in first_y..=last_y {
            for tx in first_x..=last_x {
                if let Some(tile) = self.tile_at(tx as u32, ty as u32) {
                    if tile.is_solid() {
                        return true;
                    }
                }
            }
        }
        false
    }
}

/// Everything that lives in a level and persists while the player is away.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelPopulation {
    pub hostiles: Vec<HostileEntity>,
    pub peaceful: Vec<PeacefulEntity>,
    pub containers: Vec<Container>,
    pub items: Vec<Collectible>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LevelMap {
    coord: LevelCoord,
    tilemap: Tilemap,
    population: LevelPopulation,
}

impl LevelMap {
    pub fn new(coord: LevelCoord, tilemap: Tilemap, population: LevelPopulation) -> Self {
        Self {
            coord,
            tilemap,
            population,
        }
    }

    pub fn coord(&self) -> LevelCoord {
        self.coord
    }

    pub fn tilemap(&self) -> &Tilemap {
        &self.tilemap
    }

    /// Initial population, cloned the first time the level is entered.
    pub fn population(&self) -> &LevelPopulation {
        &self.population
    }
}

/// Level geometry keyed by grid coordinate.
#[derive(Debug, Clone, Default)]
pub struct WorldMap {
    levels: BTreeMap<LevelCoord, LevelMap>,
}

impl WorldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a level, returning any level it replaced at the same coordinate.
    pub fn add_level(&mut self, level: LevelMap) -> Option<LevelMap> {
        debug!(column = level.coord.column, row = level.coord.row, "level_registered");
        self.levels.insert(level.coord, level)
    }

    pub fn level(&self, coord: LevelCoord) -> Option<&LevelMap> {
        self.levels.get(&coord)
    }

    pub fn contains(&self, coord: LevelCoord) -> bool {
        self.levels.contains_key(&coord)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn coords(&self) -> impl Iterator<Item = LevelCoord> + '_ {
        self.levels.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbor_saturates_at_grid_origin() {
        let origin = LevelCoord::new(0, 0);
        assert_eq!(origin.neighbor(Facing::North), None);
        assert_eq!(origin.neighbor(Facing::West), None);
        assert_eq!(origin.neighbor(Facing::East), Some(LevelCoord::new(1, 0)));
        assert_eq!(origin.neighbor(Facing::South), Some(LevelCoord::new(0, 1)));
    }

    #[test]
    fn tilemap_rejects_wrong_tile_count() {
        assert_eq!(
            Tilemap::new(2, 2, vec![Tile::Floor; 3]),
            Err(TilemapError::TileCountMismatch {
                expected: 4,
                actual: 3
            })
        );
        assert_eq!(Tilemap::new(0, 2, Vec::new()), Err(TilemapError::Empty));
    }

    #[test]
    fn overlaps_solid_checks_every_covered_tile() {
        let map = Tilemap::walled_room(4, 4).expect("room");
        assert!(!map.overlaps_solid(&Rect::new(64, 64, 128, 128)));
        assert!(map.overlaps_solid(&Rect::new(63, 64, 10, 10)));
        assert!(map.overlaps_solid(&Rect::new(100, 180, 10, 20)));
        assert!(!map.overlaps_solid(&Rect::new(100, 180, 10, 12)));
    }

    #[test]
    fn add_level_replaces_same_coordinate() {
        let mut world_map = WorldMap::new();
        let coord = LevelCoord::new(2, 0);
        let level = LevelMap::new(
            coord,
            Tilemap::walled_room(3, 3).expect("room"),
            LevelPopulation::default(),
        );
        assert!(world_map.add_level(level.clone()).is_none());
        assert!(world_map.add_level(level).is_some());
        assert_eq!(world_map.len(), 1);
        assert!(world_map.contains(coord));
    }
}
