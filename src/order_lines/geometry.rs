// Order config + unit state -> world-space polyline points
use bevy::prelude::*;

use crate::coords::{path_node_to_world, TileProjector};
use crate::types::{PathNode, SelectedUnit};

/// Points of one order line. Point 0 is the destination end, the last point the unit.
#[derive(Clone, PartialEq, Debug)]
pub struct LinePath {
    pub points: Vec<Vec3>,
    pub is_attack: bool,
    pub follows_target: bool, // Point 0 is the live position of the order's target entity
}

impl LinePath {
    pub fn destination(&self) -> Vec3 {
        self.points[0]
    }

    pub fn source(&self) -> Vec3 {
        self.points[self.points.len() - 1]
    }
}

/// Build the line for a unit, or `None` when the unit needs no line at all.
/// With `debug_paths` off only the first and last path nodes are drawn.
pub fn build_line_path(
    unit: &SelectedUnit,
    debug_paths: bool,
    projector: &dyn TileProjector,
) -> Option<LinePath> {
    let order = unit.order.filter(|config| config.has_target());

    if let Some(config) = order {
        if !config.path_nodes.is_empty() {
            return Some(LinePath {
                points: path_points(&config.path_nodes, unit.world_position, debug_paths, projector),
                is_attack: config.is_attack,
                follows_target: false,
            });
        }
        if let Some(target_position) = unit.target_position {
            return Some(LinePath {
                points: vec![target_position, unit.world_position],
                is_attack: config.is_attack,
                follows_target: true,
            });
        }
        // Target no longer resolvable, treat as if there were no order
    }

    if !unit.is_air() {
        return None;
    }

    // Idle air units keep a stub anchored on their own tile
    let stub = PathNode::on_tile(unit.tile);
    Some(LinePath {
        points: path_points(&[stub, stub], unit.world_position, debug_paths, projector),
        is_attack: false,
        follows_target: false,
    })
}

fn path_points(
    nodes: &[PathNode],
    live_source: Vec3,
    debug_paths: bool,
    projector: &dyn TileProjector,
) -> Vec<Vec3> {
    let mut points: Vec<Vec3> = if debug_paths {
        nodes.iter().map(|node| path_node_to_world(projector, node)).collect()
    } else {
        let first = &nodes[0];
        let last = &nodes[nodes.len() - 1];
        vec![path_node_to_world(projector, first), path_node_to_world(projector, last)]
    };

    // The unit may have moved since the path was computed
    if let Some(source) = points.last_mut() {
        *source = live_source;
    }
    points
}
