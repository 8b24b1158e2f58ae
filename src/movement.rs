// Demo unit movement - walks units along their order paths and chases attack targets
use bevy::prelude::*;

use crate::constants::*;
use crate::coords::{path_node_to_world, IsoCoords};
use crate::types::*;

/// Units closer than this to their attack target hold position
const ATTACK_RANGE: f32 = 2.0 * TILE_WORLD_SIZE;

/// System: Advance every unit one step toward the next node of its path.
/// Reaching a node drops it from the path; reaching the destination clears the order.
pub fn advance_units_system(
    time: Res<Time>,
    coords: Res<IsoCoords>,
    mut units: Query<(&Unit, &mut Transform, &mut TilePosition, &mut UnitOrders)>,
    targets: Query<&GlobalTransform>,
) {
    let step = DEMO_UNIT_SPEED * time.delta_secs();

    for (unit, mut transform, mut tile, mut orders) in units.iter_mut() {
        let Some(order) = orders.target_lines.as_ref() else {
            continue;
        };
        let altitude = if unit.zone == ZoneType::Air { DEMO_AIR_ALTITUDE } else { 0.0 };

        let goal = if order.path_nodes.len() >= 2 {
            // The last node is where the unit set out from; head for the one before it
            let next = order.path_nodes[order.path_nodes.len() - 2];
            Some((path_node_to_world(&*coords, &next), Some(next.tile)))
        } else if let Some(target) = order.target {
            targets
                .get(target)
                .ok()
                .map(|t| t.translation())
                .filter(|pos| horizontal_distance(*pos, transform.translation) > ATTACK_RANGE)
                .map(|pos| (pos, None))
        } else {
            None
        };

        let Some((goal, goal_tile)) = goal else {
            if order.path_nodes.len() == 1 {
                orders.target_lines = None;
            }
            continue;
        };

        let offset = Vec3::new(goal.x - transform.translation.x, 0.0, goal.z - transform.translation.z);
        let distance = offset.length();
        if distance <= step.max(DEMO_ARRIVAL_THRESHOLD) {
            transform.translation = Vec3::new(goal.x, goal.y + altitude, goal.z);
            if let Some(goal_tile) = goal_tile {
                tile.0 = goal_tile;
                if let Some(order) = orders.target_lines.as_mut() {
                    order.path_nodes.pop();
                }
            }
        } else {
            transform.translation += offset / distance * step;
        }
    }
}

/// System: Clear recalc requests once the overlay has seen them
pub fn clear_recalc_system(mut orders: Query<&mut UnitOrders>) {
    for mut orders in orders.iter_mut() {
        if let Some(order) = orders.target_lines.as_mut().filter(|order| order.is_recalc) {
            order.is_recalc = false;
        }
    }
}

#[inline]
fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    (dx * dx + dz * dz).sqrt()
}
