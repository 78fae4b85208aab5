//! Map data loader.
//!
//! Loads pure terrain data from map RON files. Actors are placed separately
//! by whoever drives the game.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use crawl_core::{MapDimensions, Position, StaticTile, TerrainKind};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Map data structure for RON files (terrain only).
///
/// Unlisted cells are floor. `rows` is an optional ASCII drawing applied
/// before the explicit `tiles` overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MapDataRon {
    dimensions: (u32, u32),
    #[serde(default)]
    rows: Vec<String>,
    #[serde(default)]
    tiles: Vec<(i32, i32, TerrainKind)>, // (x, y, terrain)
    #[serde(default)]
    silenced: Vec<(i32, i32)>,
}

/// Terrain of a whole level, ready to be wrapped in a map oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapLayout {
    pub dimensions: MapDimensions,
    pub tiles: HashMap<Position, StaticTile>,
    /// Cells under magical silence.
    pub silenced: HashSet<Position>,
}

impl MapLayout {
    /// All-floor layout.
    pub fn open(dimensions: MapDimensions) -> Self {
        let mut tiles = HashMap::with_capacity(dimensions.area());
        for y in 0..dimensions.height {
            for x in 0..dimensions.width {
                tiles.insert(
                    Position::new(x as i32, y as i32),
                    StaticTile::new(TerrainKind::Floor),
                );
            }
        }
        Self {
            dimensions,
            tiles,
            silenced: HashSet::new(),
        }
    }

    pub fn terrain(&self, position: Position) -> Option<TerrainKind> {
        self.tiles.get(&position).map(|tile| tile.terrain())
    }
}

/// Terrain for one glyph of an ASCII row.
pub fn terrain_glyph(glyph: char) -> Option<TerrainKind> {
    let terrain = match glyph {
        '.' => TerrainKind::Floor,
        '#' => TerrainKind::Wall,
        'X' => TerrainKind::PermaRock,
        '+' => TerrainKind::Door,
        'S' => TerrainKind::Statue,
        'T' => TerrainKind::Tree,
        'w' => TerrainKind::ShallowWater,
        '~' => TerrainKind::DeepWater,
        _ => return None,
    };
    Some(terrain)
}

/// Loader for map data from RON files.
pub struct MapLoader;

impl MapLoader {
    /// Load map data from a RON file.
    pub fn load(path: &Path) -> LoadResult<MapLayout> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse map RON {}: {}", path.display(), e))
    }

    /// Parses a RON map document.
    pub fn parse(content: &str) -> LoadResult<MapLayout> {
        let data: MapDataRon = ron::from_str(content)?;
        let dimensions = MapDimensions::new(data.dimensions.0, data.dimensions.1);
        if dimensions.area() == 0 {
            anyhow::bail!("map dimensions must be non-zero");
        }

        // Fill entire map with default Floor tiles first
        let mut layout = MapLayout::open(dimensions);

        if data.rows.len() > dimensions.height as usize {
            anyhow::bail!(
                "{} rows drawn for a map {} tall",
                data.rows.len(),
                dimensions.height
            );
        }
        for (y, row) in data.rows.iter().enumerate() {
            if row.chars().count() > dimensions.width as usize {
                anyhow::bail!("row {y} is wider than the map");
            }
            for (x, glyph) in row.chars().enumerate() {
                let terrain = terrain_glyph(glyph)
                    .ok_or_else(|| anyhow::anyhow!("unknown glyph {glyph:?} at ({x}, {y})"))?;
                layout
                    .tiles
                    .insert(Position::new(x as i32, y as i32), StaticTile::new(terrain));
            }
        }

        // Then override with explicitly defined tiles
        for (x, y, terrain) in data.tiles {
            let pos = Position::new(x, y);
            if !dimensions.contains(pos) {
                anyhow::bail!("tile override {pos} lies outside the map");
            }
            layout.tiles.insert(pos, StaticTile::new(terrain));
        }

        for (x, y) in data.silenced {
            let pos = Position::new(x, y);
            if !dimensions.contains(pos) {
                anyhow::bail!("silenced cell {pos} lies outside the map");
            }
            layout.silenced.insert(pos);
        }

        tracing::debug!(
            width = dimensions.width,
            height = dimensions.height,
            silenced = layout.silenced.len(),
            "parsed map layout"
        );
        Ok(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_then_overrides() {
        let layout = MapLoader::parse(
            r#####"(
                dimensions: (4, 3),
                rows: ["####", "#.~#"],
                tiles: [(1, 1, Door)],
            )"#####,
        )
        .expect("parse");
        assert_eq!(layout.terrain(Position::new(0, 0)), Some(TerrainKind::Wall));
        assert_eq!(layout.terrain(Position::new(1, 1)), Some(TerrainKind::Door));
        assert_eq!(layout.terrain(Position::new(2, 1)), Some(TerrainKind::DeepWater));
        assert_eq!(layout.terrain(Position::new(2, 2)), Some(TerrainKind::Floor));
        assert_eq!(layout.terrain(Position::new(4, 0)), None);
    }

    #[test]
    fn unknown_glyph_is_an_error() {
        let err = MapLoader::parse(r#"(dimensions: (2, 1), rows: [".?"])"#).expect_err("bad glyph");
        assert!(err.to_string().contains("unknown glyph"));
    }

    #[test]
    fn out_of_bounds_override_is_an_error() {
        assert!(MapLoader::parse("(dimensions: (2, 2), tiles: [(5, 0, Wall)])").is_err());
    }
}
