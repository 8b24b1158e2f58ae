// Bevy adapter - feeds the selection into TargetLines and mirrors its render objects as entities
use bevy::asset::RenderAssetUsages;
use bevy::pbr::{NotShadowCaster, NotShadowReceiver};
use bevy::prelude::*;
use bevy::render::mesh::{PrimitiveTopology, VertexAttributeValues};
use std::collections::HashMap;

use super::{LineFrame, LineHead, LineObjectId, LineRenderObject, LineStyle, SceneOp, TargetLines, TargetLinesSettings, TickOutcome};
use crate::constants::{LINE_DEPTH_BIAS, LINE_HEAD_SIZE};
use crate::coords::IsoCoords;
use crate::selection::{CurrentPlayer, SelectionState};
use crate::types::{SelectedUnit, TilePosition, Unit, UnitOrders};

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetLinesSet {
    Update,
    Sync,
}

/// Registers the order line overlay. Reads `CurrentPlayer` at build time if it was inserted first.
pub struct TargetLinesPlugin;

impl Plugin for TargetLinesPlugin {
    fn build(&self, app: &mut App) {
        let current_player = app
            .world()
            .get_resource::<CurrentPlayer>()
            .copied()
            .unwrap_or_default();

        app.insert_resource(current_player)
            .insert_resource(TargetLines::new(current_player.0))
            .init_resource::<TargetLinesSettings>()
            .init_resource::<SelectionState>()
            .init_resource::<IsoCoords>()
            .init_resource::<LineEntities>()
            .configure_sets(Update, (TargetLinesSet::Update, TargetLinesSet::Sync).chain())
            .add_systems(Startup, setup_target_lines)
            .add_systems(Update, target_lines_update_system.in_set(TargetLinesSet::Update))
            .add_systems(Update, target_lines_sync_system.in_set(TargetLinesSet::Sync))
            .add_systems(Last, target_lines_teardown_system);
    }
}

// Marker component for the container every order line hangs off
#[derive(Component)]
pub struct TargetLinesRoot;

// Root of one unit's order line (line + two heads as children)
#[derive(Component)]
pub struct OrderLineRoot {
    pub unit: Entity,
    pub object: LineObjectId,
}

// Marker component for the endpoint marker quads
#[derive(Component)]
pub struct OrderLineHead;

/// Shared materials and the marker quad mesh, created once at startup
#[derive(Resource)]
pub struct LineAssets {
    pub head_mesh: Handle<Mesh>,
    pub attack_line: Handle<StandardMaterial>,
    pub move_line: Handle<StandardMaterial>,
    pub attack_head: Handle<StandardMaterial>,
    pub move_head: Handle<StandardMaterial>,
}

impl LineAssets {
    fn line_material(&self, style: LineStyle) -> Handle<StandardMaterial> {
        match style {
            LineStyle::Attack => self.attack_line.clone(),
            LineStyle::Move => self.move_line.clone(),
        }
    }

    fn head_material(&self, style: LineStyle) -> Handle<StandardMaterial> {
        match style {
            LineStyle::Attack => self.attack_head.clone(),
            LineStyle::Move => self.move_head.clone(),
        }
    }
}

/// Entities spawned for one render object
#[derive(Debug, Clone)]
pub struct SpawnedLine {
    pub root: Entity,
    pub src_head: Entity,
    pub dest_head: Entity,
    pub mesh: Handle<Mesh>,
}

#[derive(Resource, Default, Debug)]
pub struct LineEntities {
    pub container: Option<Entity>,
    pub spawned: HashMap<LineObjectId, SpawnedLine>,
}

fn line_material(color: Color) -> StandardMaterial {
    StandardMaterial {
        base_color: color,
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        depth_bias: LINE_DEPTH_BIAS,
        ..default()
    }
}

fn head_material(color: Color) -> StandardMaterial {
    StandardMaterial {
        cull_mode: None,
        double_sided: true,
        ..line_material(color)
    }
}

/// System: Create the container node and shared materials
pub fn setup_target_lines(
    mut commands: Commands,
    mut target_lines: ResMut<TargetLines>,
    mut entities: ResMut<LineEntities>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let node = target_lines.create();
    let (name, palette) = (node.name, node.palette);

    commands.insert_resource(LineAssets {
        head_mesh: meshes.add(Rectangle::new(LINE_HEAD_SIZE, LINE_HEAD_SIZE)),
        attack_line: materials.add(line_material(palette.color(LineStyle::Attack))),
        move_line: materials.add(line_material(palette.color(LineStyle::Move))),
        attack_head: materials.add(head_material(palette.color(LineStyle::Attack))),
        move_head: materials.add(head_material(palette.color(LineStyle::Move))),
    });

    let container = commands
        .spawn((
            Name::new(name),
            TargetLinesRoot,
            Transform::default(),
            Visibility::Visible,
        ))
        .id();
    entities.container = Some(container);
    info!("Target lines ready (container {:?})", container);
}

/// System: Build per-unit views of the selection and run one TargetLines tick
pub fn target_lines_update_system(
    time: Res<Time>,
    settings: Res<TargetLinesSettings>,
    coords: Res<IsoCoords>,
    selection: Res<SelectionState>,
    mut target_lines: ResMut<TargetLines>,
    units: Query<(&Unit, &TilePosition, &Transform, Option<&UnitOrders>)>,
    positions: Query<&Transform>,
    camera: Query<&GlobalTransform, With<Camera3d>>,
) {
    let views: Vec<SelectedUnit> = selection
        .selected
        .iter()
        .filter_map(|&entity| {
            let (unit, tile, transform, orders) = units.get(entity).ok()?;
            let order = orders.and_then(|orders| orders.target_lines.as_ref());
            let target_position = order
                .and_then(|config| config.target)
                .and_then(|target| positions.get(target).ok())
                .map(|target| target.translation);
            Some(SelectedUnit {
                entity,
                kind: unit.kind,
                owner: unit.owner,
                zone: unit.zone,
                tile: tile.0,
                world_position: transform.translation,
                order,
                target_position,
            })
        })
        .collect();

    let frame = LineFrame {
        settings: *settings,
        camera_rotation: camera.single().map(GlobalTransform::rotation).unwrap_or(Quat::IDENTITY),
        projector: &*coords,
    };

    match target_lines.update(time.elapsed(), &frame, &views) {
        Ok(TickOutcome::Disabled) | Ok(TickOutcome::Idle { hidden: false }) => {}
        Ok(outcome) => debug!("Target lines tick: {:?}", outcome),
        Err(err) => error!("Target lines: {}", err),
    }
}

/// System: Apply queued attach/detach operations and push patched geometry to the renderer
pub fn target_lines_sync_system(
    mut commands: Commands,
    mut target_lines: ResMut<TargetLines>,
    mut entities: ResMut<LineEntities>,
    assets: Option<Res<LineAssets>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut pending: Local<Vec<SceneOp>>,
    mut roots: Query<&mut Visibility, (With<OrderLineRoot>, Without<TargetLinesRoot>)>,
    mut containers: Query<&mut Visibility, (With<TargetLinesRoot>, Without<OrderLineRoot>)>,
    mut heads: Query<&mut Transform, With<OrderLineHead>>,
) {
    let Some(assets) = assets else {
        return;
    };

    let container_visible = target_lines.scene_node().is_some_and(|node| node.visible);
    if let Some(mut visibility) = entities.container.and_then(|e| containers.get_mut(e).ok()) {
        visibility.set_if_neq(visibility_for(container_visible));
    }

    pending.extend(target_lines.lines_mut().drain_scene_ops());
    for op in pending.drain(..) {
        match op {
            SceneOp::Detach { object, .. } => {
                if let Some(spawned) = entities.spawned.remove(&object) {
                    commands.entity(spawned.root).despawn();
                    meshes.remove(&spawned.mesh);
                }
            }
            SceneOp::Attach { unit, object } => {
                // Skip objects already replaced before this sync ran
                let Some(line) = target_lines.lines().get(unit).filter(|line| line.id == object) else {
                    continue;
                };
                let spawned = spawn_order_line(&mut commands, &mut meshes, &assets, unit, line);
                if let Some(container) = entities.container {
                    commands.entity(container).add_child(spawned.root);
                }
                entities.spawned.insert(object, spawned);
            }
        }
    }

    for (_, line) in target_lines.lines_mut().iter_mut() {
        let Some(spawned) = entities.spawned.get(&line.id) else {
            continue;
        };

        if let Ok(mut visibility) = roots.get_mut(spawned.root) {
            visibility.set_if_neq(visibility_for(line.visible));
        }

        if line.line.needs_update {
            if let Some(mesh) = meshes.get_mut(&spawned.mesh) {
                write_line_positions(mesh, &line.line.vertices);
            }
            line.line.needs_update = false;
        }

        sync_head(&mut heads, spawned.src_head, &mut line.src_head);
        sync_head(&mut heads, spawned.dest_head, &mut line.dest_head);
    }
}

/// System: Release every line, the container and the shared assets when the app shuts down
pub fn target_lines_teardown_system(
    mut commands: Commands,
    mut exit_events: EventReader<AppExit>,
    mut target_lines: ResMut<TargetLines>,
    mut entities: ResMut<LineEntities>,
    assets: Option<Res<LineAssets>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if exit_events.read().next().is_none() {
        return;
    }

    let count = target_lines.lines().len();
    target_lines.dispose();
    // The sync system will not run again, so the queued detaches are handled here
    let detached = target_lines.lines_mut().drain_scene_ops().count();

    // Line roots are children of the container and go with it
    let container = entities.container.take();
    for (_, spawned) in entities.spawned.drain() {
        meshes.remove(&spawned.mesh);
        if container.is_none() {
            commands.entity(spawned.root).despawn();
        }
    }
    if let Some(container) = container {
        commands.entity(container).despawn();
    }

    if let Some(assets) = assets {
        meshes.remove(&assets.head_mesh);
        for material in [&assets.attack_line, &assets.move_line, &assets.attack_head, &assets.move_head] {
            materials.remove(material);
        }
        commands.remove_resource::<LineAssets>();
    }

    info!("Target lines disposed ({} lines, {} detached)", count, detached);
}

fn visibility_for(visible: bool) -> Visibility {
    if visible {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    }
}

fn sync_head(heads: &mut Query<&mut Transform, With<OrderLineHead>>, entity: Entity, head: &mut LineHead) {
    if !head.needs_update {
        return;
    }
    // Freshly spawned heads are not queryable yet but already carry the right transform
    if let Ok(mut transform) = heads.get_mut(entity) {
        transform.translation = head.translation;
        transform.rotation = head.rotation;
    }
    head.needs_update = false;
}

fn head_transform(head: &LineHead) -> Transform {
    Transform::from_translation(head.translation).with_rotation(head.rotation)
}

fn spawn_order_line(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    assets: &LineAssets,
    unit: Entity,
    line: &LineRenderObject,
) -> SpawnedLine {
    let mesh = meshes.add(create_line_strip_mesh(&line.line.vertices));

    let root = commands
        .spawn((
            Name::new("order_line"),
            OrderLineRoot { unit, object: line.id },
            Transform::default(),
            visibility_for(line.visible),
        ))
        .id();

    let line_entity = commands
        .spawn((
            Mesh3d(mesh.clone()),
            MeshMaterial3d(assets.line_material(line.style)),
            Transform::default(),
            NotShadowCaster,
            NotShadowReceiver,
        ))
        .id();

    let mut spawn_head = |head: &LineHead| {
        commands
            .spawn((
                Mesh3d(assets.head_mesh.clone()),
                MeshMaterial3d(assets.head_material(line.style)),
                head_transform(head),
                OrderLineHead,
                NotShadowCaster,
                NotShadowReceiver,
            ))
            .id()
    };
    let src_head = spawn_head(&line.src_head);
    let dest_head = spawn_head(&line.dest_head);

    commands.entity(root).add_children(&[line_entity, src_head, dest_head]);

    SpawnedLine {
        root,
        src_head,
        dest_head,
        mesh,
    }
}

/// Create a line strip mesh through the given world-space points
pub fn create_line_strip_mesh(vertices: &[Vec3]) -> Mesh {
    let positions: Vec<[f32; 3]> = vertices.iter().map(|v| v.to_array()).collect();
    let normals = vec![[0.0, 1.0, 0.0]; positions.len()];

    let mut mesh = Mesh::new(PrimitiveTopology::LineStrip, RenderAssetUsages::default());
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh
}

/// Overwrite vertex positions in place; only reallocates if the vertex count changed
fn write_line_positions(mesh: &mut Mesh, vertices: &[Vec3]) {
    if let Some(VertexAttributeValues::Float32x3(positions)) = mesh.attribute_mut(Mesh::ATTRIBUTE_POSITION) {
        if positions.len() == vertices.len() {
            for (dst, src) in positions.iter_mut().zip(vertices) {
                *dst = src.to_array();
            }
            return;
        }
    }
    let positions: Vec<[f32; 3]> = vertices.iter().map(|v| v.to_array()).collect();
    let normals = vec![[0.0, 1.0, 0.0]; positions.len()];
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::TARGET_LINES_NODE_NAME;
    use crate::types::{ObjectKind, OrderConfig, PathNode, PlayerId, TileCoord, ZoneType};

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()))
            .init_asset::<Mesh>()
            .init_asset::<StandardMaterial>()
            .insert_resource(CurrentPlayer(Some(PlayerId(1))))
            .add_plugins(TargetLinesPlugin);
        app
    }

    fn spawn_unit(app: &mut App, owner: u32, order: Option<OrderConfig>) -> Entity {
        app.world_mut()
            .spawn((
                Unit {
                    kind: ObjectKind::Unit,
                    owner: PlayerId(owner),
                    zone: ZoneType::Ground,
                },
                TilePosition(TileCoord::new(2, 2, 0)),
                Transform::from_xyz(9.0, 0.0, 9.0),
                UnitOrders { target_lines: order },
            ))
            .id()
    }

    fn move_order() -> OrderConfig {
        OrderConfig::move_along(vec![
            PathNode::on_tile(TileCoord::new(5, 5, 0)),
            PathNode::on_tile(TileCoord::new(2, 2, 0)),
        ])
    }

    fn count_line_roots(app: &mut App) -> usize {
        let world = app.world_mut();
        world.query::<&OrderLineRoot>().iter(world).count()
    }

    #[test]
    fn test_selected_unit_gets_line_entities() {
        let mut app = test_app();
        let unit = spawn_unit(&mut app, 1, Some(move_order()));
        app.world_mut().resource_mut::<SelectionState>().select_only([unit]);

        app.update();

        let target_lines = app.world().resource::<TargetLines>();
        assert!(target_lines.scene_node().is_some());
        assert_eq!(target_lines.lines().len(), 1);
        assert_eq!(app.world().resource::<LineEntities>().spawned.len(), 1);
        assert_eq!(count_line_roots(&mut app), 1);
    }

    #[test]
    fn test_other_players_units_are_ignored() {
        let mut app = test_app();
        let enemy = spawn_unit(&mut app, 2, Some(move_order()));
        app.world_mut().resource_mut::<SelectionState>().select_only([enemy]);

        app.update();

        assert!(app.world().resource::<TargetLines>().lines().is_empty());
        assert_eq!(count_line_roots(&mut app), 0);
    }

    #[test]
    fn test_deselecting_despawns_line_entities() {
        let mut app = test_app();
        let unit = spawn_unit(&mut app, 1, Some(move_order()));
        app.world_mut().resource_mut::<SelectionState>().select_only([unit]);
        app.update();
        assert_eq!(count_line_roots(&mut app), 1);

        app.world_mut().resource_mut::<SelectionState>().clear();
        app.update();

        assert!(app.world().resource::<LineEntities>().spawned.is_empty());
        assert_eq!(count_line_roots(&mut app), 0);
    }

    #[test]
    fn test_moving_unit_patches_mesh_in_place() {
        let mut app = test_app();
        let unit = spawn_unit(&mut app, 1, Some(move_order()));
        app.world_mut().resource_mut::<SelectionState>().select_only([unit]);
        app.update();

        let before = app.world().resource::<LineEntities>().spawned.clone();
        app.world_mut().entity_mut(unit).insert(Transform::from_xyz(10.0, 0.0, 9.5));
        app.update();

        let after = &app.world().resource::<LineEntities>().spawned;
        assert_eq!(before.keys().collect::<Vec<_>>(), after.keys().collect::<Vec<_>>());

        let spawned = after.values().next().expect("spawned line");
        let mesh = app.world().resource::<Assets<Mesh>>().get(&spawned.mesh).expect("mesh");
        let Some(VertexAttributeValues::Float32x3(positions)) = mesh.attribute(Mesh::ATTRIBUTE_POSITION) else {
            panic!("line mesh has no positions");
        };
        assert_eq!(positions.last(), Some(&[10.0, 0.0, 9.5]));
    }

    #[test]
    fn test_disabling_hides_container() {
        let mut app = test_app();
        app.update();
        app.world_mut().resource_mut::<TargetLinesSettings>().enabled = false;
        app.update();

        let container = app.world().resource::<LineEntities>().container.expect("container");
        assert_eq!(app.world().get::<Visibility>(container), Some(&Visibility::Hidden));
    }

    #[test]
    fn test_app_exit_releases_lines_and_assets() {
        let mut app = test_app();
        let unit = spawn_unit(&mut app, 1, Some(move_order()));
        app.world_mut().resource_mut::<SelectionState>().select_only([unit]);
        app.update();

        let line_mesh = app.world().resource::<LineEntities>().spawned.values().next().expect("line").mesh.clone();
        let head_mesh = app.world().resource::<LineAssets>().head_mesh.clone();
        let container = app.world().resource::<LineEntities>().container.expect("container");
        assert_eq!(app.world().get::<Name>(container).map(Name::as_str), Some(TARGET_LINES_NODE_NAME));

        app.world_mut().send_event(AppExit::Success);
        app.update();

        assert_eq!(count_line_roots(&mut app), 0);
        assert!(app.world().get_entity(container).is_err());
        assert!(app.world().get_resource::<LineAssets>().is_none());
        let meshes = app.world().resource::<Assets<Mesh>>();
        assert!(meshes.get(&line_mesh).is_none());
        assert!(meshes.get(&head_mesh).is_none());
        assert!(app.world().resource::<Assets<StandardMaterial>>().is_empty());
        assert!(app.world().resource::<TargetLines>().scene_node().is_none());
    }
}
