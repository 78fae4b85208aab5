use crate::state::Position;

/// Static map oracle exposing immutable layout information.
pub trait MapOracle: Send + Sync {
    fn dimensions(&self) -> MapDimensions;
    fn tile(&self, position: Position) -> Option<StaticTile>;

    fn contains(&self, position: Position) -> bool {
        self.dimensions().contains(position)
    }

    /// True when magical silence covers the cell.
    fn is_silenced(&self, _position: Position) -> bool {
        false
    }

    /// Bresenham line check between two cells. Endpoints never block.
    fn line_of_sight(&self, from: Position, to: Position, policy: SightPolicy) -> bool {
        let mut x = from.x;
        let mut y = from.y;
        let dx = (to.x - from.x).abs();
        let dy = -(to.y - from.y).abs();
        let sx = if from.x < to.x { 1 } else { -1 };
        let sy = if from.y < to.y { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            let here = Position::new(x, y);
            if here == to {
                return true;
            }
            if here != from {
                match self.tile(here) {
                    Some(tile) if !policy.blocks(tile.terrain()) => {}
                    _ => return false,
                }
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }
}

/// Which terrain interrupts a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SightPolicy {
    /// Opaque terrain blocks (vision).
    SolidBlocks,
    /// Any solid feature blocks, statues included (reach, projection).
    AllBlocks,
}

impl SightPolicy {
    fn blocks(self, terrain: TerrainKind) -> bool {
        match self {
            SightPolicy::SolidBlocks => terrain.is_opaque(),
            SightPolicy::AllBlocks => terrain.is_solid(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapDimensions {
    pub width: u32,
    pub height: u32,
}

impl MapDimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && position.x < self.width as i32
            && position.y < self.height as i32
    }

    /// Row-major index of an in-bounds position.
    pub fn index(&self, position: Position) -> Option<usize> {
        self.contains(position)
            .then(|| position.y as usize * self.width as usize + position.x as usize)
    }

    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Clamps a position onto the map.
    pub fn clamp(&self, position: Position) -> Position {
        Position::new(
            position.x.clamp(0, self.width as i32 - 1),
            position.y.clamp(0, self.height as i32 - 1),
        )
    }
}

/// Immutable descriptor for a tile in the static layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StaticTile {
    terrain: TerrainKind,
}

impl StaticTile {
    pub const fn new(terrain: TerrainKind) -> Self {
        Self { terrain }
    }

    pub fn terrain(self) -> TerrainKind {
        self.terrain
    }

    pub fn is_passable(self) -> bool {
        self.terrain.is_passable()
    }
}

/// Canonical terrain classes for static map tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TerrainKind {
    #[default]
    Floor,
    Wall,
    /// Indestructible rock at the level edge.
    PermaRock,
    /// Closed door.
    Door,
    Statue,
    Tree,
    ShallowWater,
    DeepWater,
}

impl TerrainKind {
    pub fn is_passable(self) -> bool {
        matches!(
            self,
            TerrainKind::Floor | TerrainKind::ShallowWater | TerrainKind::DeepWater
        )
    }

    pub fn is_solid(self) -> bool {
        !self.is_passable()
    }

    /// Blocks vision. Statues are solid but can be seen past.
    pub fn is_opaque(self) -> bool {
        matches!(
            self,
            TerrainKind::Wall | TerrainKind::PermaRock | TerrainKind::Door | TerrainKind::Tree
        )
    }
}
