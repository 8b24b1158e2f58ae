use bevy::prelude::Color;
use std::time::Duration;

// Order line display settings
pub const TARGET_LINE_DISPLAY_DURATION: Duration = Duration::from_millis(1000); // Lines hide after this long without updates
pub const ATTACK_LINE_COLOR: Color = Color::srgb(0.678, 0.0, 0.0);  // #AD0000
pub const MOVE_LINE_COLOR: Color = Color::srgb(0.0, 0.667, 0.0);    // #00AA00
pub const LINE_DEPTH_BIAS: f32 = 1_000_000.0;                        // Lines draw over terrain and units
pub const TARGET_LINES_NODE_NAME: &str = "target_lines";

// Tile to world conversion
pub const ISO_WORLD_SCALE: f32 = 1.0;
pub const TILE_WORLD_SIZE: f32 = 4.0 * ISO_WORLD_SCALE;  // Width of one tile in world units
pub const TILE_HEIGHT_STEP: f32 = 1.0 * ISO_WORLD_SCALE; // World height of one elevation level
pub const LINE_HEAD_SIZE: f32 = 3.0 * ISO_WORLD_SCALE;   // Edge length of the endpoint marker quads

// Demo scene
pub const DEMO_MAP_TILES: i32 = 32;
pub const DEMO_UNIT_SPEED: f32 = 3.0;          // World units per second
pub const DEMO_ARRIVAL_THRESHOLD: f32 = 0.2;   // Distance at which a unit snaps to its next path node
pub const DEMO_AIR_ALTITUDE: f32 = 6.0;
pub const DEMO_CAMERA_HEIGHT: f32 = 80.0;
