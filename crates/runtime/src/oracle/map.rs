//! Static dungeon layout served through [`crawl_core::MapOracle`].
use std::collections::{HashMap, HashSet};

use crawl_content::MapLayout;
use crawl_core::{MapDimensions, MapOracle, Position, StaticTile, TerrainKind};

/// MapOracle implementation with static map data
///
/// Holds immutable terrain that doesn't change during play. Clouds and
/// actors live in `GameState`.
pub struct MapOracleImpl {
    dimensions: MapDimensions,
    tiles: HashMap<Position, StaticTile>,
    silenced: HashSet<Position>,
}

impl MapOracleImpl {
    pub fn new(
        dimensions: MapDimensions,
        tiles: HashMap<Position, StaticTile>,
        silenced: HashSet<Position>,
    ) -> Self {
        Self {
            dimensions,
            tiles,
            silenced,
        }
    }

    /// Creates a simple test map (all floor tiles)
    pub fn test_map(width: u32, height: u32) -> Self {
        let dimensions = MapDimensions::new(width, height);
        let mut tiles = HashMap::new();

        for x in 0..width as i32 {
            for y in 0..height as i32 {
                tiles.insert(Position::new(x, y), StaticTile::new(TerrainKind::Floor));
            }
        }

        Self::new(dimensions, tiles, HashSet::new())
    }

    pub fn with_tile(mut self, position: Position, terrain: TerrainKind) -> Self {
        if self.dimensions.contains(position) {
            self.tiles.insert(position, StaticTile::new(terrain));
        }
        self
    }

    pub fn with_silence(mut self, position: Position) -> Self {
        self.silenced.insert(position);
        self
    }
}

impl From<MapLayout> for MapOracleImpl {
    fn from(layout: MapLayout) -> Self {
        Self::new(layout.dimensions, layout.tiles, layout.silenced)
    }
}

impl MapOracle for MapOracleImpl {
    fn dimensions(&self) -> MapDimensions {
        self.dimensions
    }

    fn tile(&self, position: Position) -> Option<StaticTile> {
        self.tiles.get(&position).copied()
    }

    fn is_silenced(&self, position: Position) -> bool {
        self.silenced.contains(&position)
    }
}
