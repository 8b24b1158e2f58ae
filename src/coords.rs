// Tile grid to world space conversion
use bevy::prelude::*;

use crate::constants::{TILE_HEIGHT_STEP, TILE_WORLD_SIZE};
use crate::types::PathNode;

/// Converts fractional tile coordinates (x, y on the grid, z elevation) to a world point
pub trait TileProjector {
    fn tile_to_world(&self, x: f32, y: f32, z: f32) -> Vec3;
}

/// Flat grid on the XZ plane, elevation along +Y
#[derive(Resource, Clone, Copy, Debug)]
pub struct IsoCoords {
    pub tile_size: f32,
    pub height_step: f32,
}

impl Default for IsoCoords {
    fn default() -> Self {
        Self {
            tile_size: TILE_WORLD_SIZE,
            height_step: TILE_HEIGHT_STEP,
        }
    }
}

impl TileProjector for IsoCoords {
    #[inline]
    fn tile_to_world(&self, x: f32, y: f32, z: f32) -> Vec3 {
        Vec3::new(x * self.tile_size, z * self.height_step, y * self.tile_size)
    }
}

/// World point at the centre of a path node's tile, lifted by any bridge elevation
pub fn path_node_to_world(projector: &dyn TileProjector, node: &PathNode) -> Vec3 {
    projector.tile_to_world(
        node.tile.rx as f32 + 0.5,
        node.tile.ry as f32 + 0.5,
        (node.tile.z + node.bridge_elevation.unwrap_or(0)) as f32,
    )
}
