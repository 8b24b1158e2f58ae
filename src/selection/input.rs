// Keyboard handling for the demo: selection groups, overlay toggles and reissued orders
use bevy::prelude::*;
use rand::Rng;

use crate::constants::DEMO_MAP_TILES;
use crate::order_lines::{TargetLines, TargetLinesSettings};
use crate::types::*;

use super::state::{CurrentPlayer, SelectionState};

/// Entities bound to the number keys
#[derive(Resource, Default, Debug)]
pub struct DemoGroups {
    pub groups: Vec<Vec<Entity>>,
}

const GROUP_KEYS: [KeyCode; 3] = [KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3];

/// System: Number keys select groups, T toggles lines, P toggles full paths, F forces a refresh
pub fn selection_hotkey_system(
    keyboard: Res<ButtonInput<KeyCode>>,
    groups: Res<DemoGroups>,
    mut selection_state: ResMut<SelectionState>,
    mut settings: ResMut<TargetLinesSettings>,
    mut target_lines: ResMut<TargetLines>,
) {
    for (index, key) in GROUP_KEYS.iter().enumerate() {
        if keyboard.just_pressed(*key) {
            if let Some(group) = groups.groups.get(index) {
                selection_state.select_only(group.iter().copied());
                info!("Selected group {} ({} entities)", index + 1, group.len());
            }
        }
    }

    if keyboard.just_pressed(KeyCode::Escape) {
        selection_state.clear();
    }

    if keyboard.just_pressed(KeyCode::KeyT) {
        settings.enabled = !settings.enabled;
        info!("Order lines {}", if settings.enabled { "enabled" } else { "disabled" });
    }

    if keyboard.just_pressed(KeyCode::KeyP) {
        settings.debug_paths = !settings.debug_paths;
        // Existing lines keep their shape until the next structural change, so rebuild them now
        target_lines.force_show();
        info!("Full path display {}", if settings.debug_paths { "on" } else { "off" });
    }

    if keyboard.just_pressed(KeyCode::KeyF) {
        target_lines.force_show();
    }
}

/// System: R reissues random move orders to the selection, A orders an attack on the nearest enemy
pub fn order_hotkey_system(
    keyboard: Res<ButtonInput<KeyCode>>,
    selection_state: Res<SelectionState>,
    current_player: Res<CurrentPlayer>,
    mut units: Query<(Entity, &Unit, &TilePosition, &Transform, &mut UnitOrders)>,
) {
    let reissue = keyboard.just_pressed(KeyCode::KeyR);
    let attack = keyboard.just_pressed(KeyCode::KeyA);
    if !reissue && !attack {
        return;
    }

    let enemies: Vec<(Entity, Vec3)> = units
        .iter()
        .filter(|(_, unit, ..)| current_player.0.is_some_and(|player| unit.owner != player))
        .map(|(entity, _, _, transform, _)| (entity, transform.translation))
        .collect();

    let mut rng = rand::thread_rng();
    for &entity in &selection_state.selected {
        let Ok((_, unit, tile, transform, mut orders)) = units.get_mut(entity) else {
            continue;
        };
        if !unit.kind.is_unit() {
            continue;
        }

        if reissue {
            let destination = TileCoord::new(
                rng.gen_range(0..DEMO_MAP_TILES),
                rng.gen_range(0..DEMO_MAP_TILES),
                0,
            );
            let mut order = OrderConfig::move_along(straight_path(destination, tile.0));
            order.is_recalc = true;
            orders.target_lines = Some(order);
        } else if let Some((target, _)) = enemies
            .iter()
            .filter(|(enemy, _)| !selection_state.is_selected(*enemy))
            .min_by(|(_, a), (_, b)| {
                a.distance_squared(transform.translation)
                    .total_cmp(&b.distance_squared(transform.translation))
            })
        {
            orders.target_lines = Some(OrderConfig::attack(*target));
        }
    }
}

/// Stair-step path between two tiles, destination first
pub fn straight_path(destination: TileCoord, start: TileCoord) -> Vec<PathNode> {
    let mut nodes = vec![PathNode::on_tile(start)];
    let mut current = start;
    while (current.rx, current.ry) != (destination.rx, destination.ry) {
        current.rx += (destination.rx - current.rx).signum();
        current.ry += (destination.ry - current.ry).signum();
        nodes.push(PathNode::on_tile(current));
    }
    nodes.reverse();
    nodes
}
