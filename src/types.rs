use bevy::prelude::*;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct PlayerId(pub u32);

/// Movement zone a unit occupies. Air units always get a line stub.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum ZoneType {
    #[default]
    Ground,
    Water,
    Air,
}

/// What kind of game object an entity is. Only `Unit` draws order lines.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ObjectKind {
    Unit,
    Building,
    Overlay,
}

impl ObjectKind {
    pub fn is_unit(self) -> bool {
        matches!(self, ObjectKind::Unit)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct TileCoord {
    pub rx: i32,
    pub ry: i32,
    pub z: i32,
}

impl TileCoord {
    pub const fn new(rx: i32, ry: i32, z: i32) -> Self {
        Self { rx, ry, z }
    }
}

/// One waypoint of an order path
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PathNode {
    pub tile: TileCoord,
    pub bridge_elevation: Option<i32>, // Extra height when the node sits on a bridge
}

impl PathNode {
    pub const fn on_tile(tile: TileCoord) -> Self {
        Self { tile, bridge_elevation: None }
    }

    pub const fn on_bridge(tile: TileCoord, elevation: i32) -> Self {
        Self { tile, bridge_elevation: Some(elevation) }
    }
}

/// A unit's current movement/attack instruction as exposed for order lines.
///
/// Path nodes are stored destination-first: node 0 is where the unit is going,
/// the last node is the tile it set out from.
#[derive(Clone, Debug, Default)]
pub struct OrderConfig {
    pub path_nodes: Vec<PathNode>,
    pub target: Option<Entity>,
    pub is_attack: bool,
    pub is_recalc: bool, // Set by the order system to force a redraw of an identical order
}

impl OrderConfig {
    pub fn move_along(path_nodes: Vec<PathNode>) -> Self {
        Self { path_nodes, ..default() }
    }

    pub fn attack(target: Entity) -> Self {
        Self {
            target: Some(target),
            is_attack: true,
            ..default()
        }
    }

    /// Whether this order points anywhere: a non-empty path or an explicit target
    pub fn has_target(&self) -> bool {
        !self.path_nodes.is_empty() || self.target.is_some()
    }

    /// Structural equality: path shape, target identity and attack flag.
    /// `is_recalc` is deliberately ignored.
    pub fn same_order(&self, other: &OrderConfig) -> bool {
        self.is_attack == other.is_attack
            && self.target == other.target
            && self.path_nodes == other.path_nodes
    }
}

/// Absent configs compare equal to each other and unequal to any present one
pub fn configs_equal(a: Option<&OrderConfig>, b: Option<&OrderConfig>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.same_order(b),
        _ => false,
    }
}

pub fn config_has_target(config: Option<&OrderConfig>) -> bool {
    config.is_some_and(OrderConfig::has_target)
}

// ECS components describing a unit as the order line overlay sees it

#[derive(Component, Clone, Copy, Debug)]
pub struct Unit {
    pub kind: ObjectKind,
    pub owner: PlayerId,
    pub zone: ZoneType,
}

#[derive(Component, Clone, Copy, Debug, Default)]
pub struct TilePosition(pub TileCoord);

#[derive(Component, Clone, Debug, Default)]
pub struct UnitOrders {
    pub target_lines: Option<OrderConfig>,
}

/// Read-only view of one selected entity for a single tick
#[derive(Clone, Copy, Debug)]
pub struct SelectedUnit<'a> {
    pub entity: Entity,
    pub kind: ObjectKind,
    pub owner: PlayerId,
    pub zone: ZoneType,
    pub tile: TileCoord,
    pub world_position: Vec3,
    pub order: Option<&'a OrderConfig>,
    pub target_position: Option<Vec3>, // Live position of `order.target`, if it still exists
}

impl SelectedUnit<'_> {
    pub fn is_air(&self) -> bool {
        self.zone == ZoneType::Air
    }

    pub fn has_target(&self) -> bool {
        config_has_target(self.order)
    }
}
