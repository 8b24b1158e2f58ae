// Demo scene setup - camera, light, ground and a handful of units with orders
use bevy::prelude::*;
use std::f32::consts::PI;

use crate::constants::*;
use crate::coords::{path_node_to_world, IsoCoords, TileProjector};
use crate::selection::{straight_path, CurrentPlayer, DemoGroups, SelectionState};
use crate::types::*;

pub fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    coords: Res<IsoCoords>,
) {
    // Directional light (sun)
    commands.spawn((
        DirectionalLight {
            illuminance: 10000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform {
            translation: Vec3::new(0.0, 50.0, 0.0),
            rotation: Quat::from_rotation_x(-PI / 4.0),
            ..default()
        },
    ));

    commands.insert_resource(AmbientLight {
        color: Color::srgb(0.4, 0.4, 0.6),
        brightness: 300.0,
        affects_lightmapped_meshes: false,
    });

    let map_extent = DEMO_MAP_TILES as f32 * coords.tile_size;
    let centre = Vec3::new(map_extent / 2.0, 0.0, map_extent / 2.0);

    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(map_extent, map_extent))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.25, 0.3, 0.22),
            perceptual_roughness: 0.95,
            ..default()
        })),
        Transform::from_translation(centre),
    ));

    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(centre.x, DEMO_CAMERA_HEIGHT, centre.z + DEMO_CAMERA_HEIGHT * 0.75)
            .looking_at(centre, Vec3::Y),
    ));

    commands.spawn((
        Text::new("1/2/3: Select group | Esc: Clear | R: Reissue orders | A: Attack nearest enemy\nT: Toggle lines | P: Full paths | F: Force refresh"),
        TextFont {
            font_size: 18.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        },
    ));
}

/// Mesh/material pair per kind of demo entity
struct DemoPalette {
    ground: (Handle<Mesh>, Handle<StandardMaterial>),
    air: (Handle<Mesh>, Handle<StandardMaterial>),
    enemy: (Handle<Mesh>, Handle<StandardMaterial>),
    building: (Handle<Mesh>, Handle<StandardMaterial>),
}

impl DemoPalette {
    fn new(meshes: &mut Assets<Mesh>, materials: &mut Assets<StandardMaterial>) -> Self {
        let mut solid = |color: Color| {
            materials.add(StandardMaterial {
                base_color: color,
                ..default()
            })
        };
        let ground_material = solid(Color::srgb(0.3, 0.5, 0.9));
        let air_material = solid(Color::srgb(0.9, 0.9, 0.4));
        let enemy_material = solid(Color::srgb(0.85, 0.25, 0.2));
        let building_material = solid(Color::srgb(0.55, 0.55, 0.55));
        Self {
            ground: (meshes.add(Cuboid::new(1.5, 1.5, 1.5)), ground_material),
            air: (meshes.add(Sphere::new(0.9)), air_material),
            enemy: (meshes.add(Cuboid::new(1.5, 1.5, 1.5)), enemy_material),
            building: (meshes.add(Cuboid::new(5.0, 3.0, 5.0)), building_material),
        }
    }
}

pub fn spawn_demo_units(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    coords: Res<IsoCoords>,
    current_player: Res<CurrentPlayer>,
    mut selection_state: ResMut<SelectionState>,
) {
    let palette = DemoPalette::new(&mut meshes, &mut materials);
    let player = current_player.0.unwrap_or(PlayerId(0));
    let enemy_player = PlayerId(player.0 + 1);

    let mut spawn = |kind: ObjectKind, owner: PlayerId, zone: ZoneType, tile: TileCoord, order: Option<OrderConfig>| {
        let (mesh, material) = match (kind, zone) {
            (ObjectKind::Building, _) => &palette.building,
            (_, ZoneType::Air) => &palette.air,
            _ if owner != player => &palette.enemy,
            _ => &palette.ground,
        };
        let altitude = if zone == ZoneType::Air { DEMO_AIR_ALTITUDE } else { 0.0 };
        let position = path_node_to_world(&*coords, &PathNode::on_tile(tile)) + Vec3::Y * altitude;
        commands
            .spawn((
                Mesh3d(mesh.clone()),
                MeshMaterial3d(material.clone()),
                Transform::from_translation(position),
                Unit { kind, owner, zone },
                TilePosition(tile),
                UnitOrders { target_lines: order },
            ))
            .id()
    };

    let scout = spawn(
        ObjectKind::Unit,
        player,
        ZoneType::Ground,
        TileCoord::new(4, 4, 0),
        Some(OrderConfig::move_along(straight_path(TileCoord::new(20, 12, 0), TileCoord::new(4, 4, 0)))),
    );
    let tank = spawn(
        ObjectKind::Unit,
        player,
        ZoneType::Ground,
        TileCoord::new(6, 10, 0),
        Some(OrderConfig::move_along(vec![
            PathNode::on_tile(TileCoord::new(14, 22, 0)),
            PathNode::on_bridge(TileCoord::new(10, 18, 0), 1),
            PathNode::on_bridge(TileCoord::new(8, 14, 0), 1),
            PathNode::on_tile(TileCoord::new(6, 10, 0)),
        ])),
    );
    let idle_infantry = spawn(ObjectKind::Unit, player, ZoneType::Ground, TileCoord::new(3, 20, 0), None);
    let gunship = spawn(ObjectKind::Unit, player, ZoneType::Air, TileCoord::new(12, 6, 0), None);
    let enemy = spawn(
        ObjectKind::Unit,
        enemy_player,
        ZoneType::Ground,
        TileCoord::new(26, 26, 0),
        Some(OrderConfig::move_along(straight_path(TileCoord::new(18, 28, 0), TileCoord::new(26, 26, 0)))),
    );
    let hunter = spawn(
        ObjectKind::Unit,
        player,
        ZoneType::Ground,
        TileCoord::new(16, 16, 0),
        Some(OrderConfig::attack(enemy)),
    );
    let depot = spawn(ObjectKind::Building, player, ZoneType::Ground, TileCoord::new(28, 4, 0), None);

    let groups = vec![
        vec![scout, tank, idle_infantry],
        vec![gunship, tank],
        vec![hunter, enemy, depot],
    ];
    selection_state.select_only(groups[0].iter().copied());
    commands.insert_resource(DemoGroups { groups });

    info!(
        "Spawned demo units, tile (0, 0) centre at {:?}",
        coords.tile_to_world(0.5, 0.5, 0.0)
    );
}
