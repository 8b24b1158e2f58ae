// Per-unit line render objects: polyline + two camera-facing endpoint markers
use bevy::prelude::*;
use std::collections::HashMap;

use super::geometry::LinePath;

/// Identity of one constructed render object. A rebuild always yields a new id.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct LineObjectId(pub u64);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LineStyle {
    Move,
    Attack,
}

impl LineStyle {
    pub fn from_attack(is_attack: bool) -> Self {
        if is_attack {
            LineStyle::Attack
        } else {
            LineStyle::Move
        }
    }
}

/// Owned vertex buffer of the line, patched in place
#[derive(Debug)]
pub struct Polyline {
    pub vertices: Vec<Vec3>,
    pub needs_update: bool,
}

/// Endpoint marker quad, always rotated to face the camera
#[derive(Clone, Copy, Debug)]
pub struct LineHead {
    pub translation: Vec3,
    pub rotation: Quat,
    pub needs_update: bool,
}

impl LineHead {
    fn facing_camera(translation: Vec3, camera_rotation: Quat) -> Self {
        Self {
            translation,
            rotation: camera_rotation,
            needs_update: true,
        }
    }

    fn move_to(&mut self, translation: Vec3, camera_rotation: Quat) {
        self.translation = translation;
        self.rotation = camera_rotation;
        self.needs_update = true;
    }
}

#[derive(Debug)]
pub struct LineRenderObject {
    pub id: LineObjectId,
    pub style: LineStyle,
    pub follows_target: bool,
    pub visible: bool, // Root visibility, toggled by the auto-hide timer
    pub line: Polyline,
    pub src_head: LineHead,
    pub dest_head: LineHead,
}

impl LineRenderObject {
    fn new(id: LineObjectId, path: LinePath, camera_rotation: Quat) -> Self {
        let src_head = LineHead::facing_camera(path.source(), camera_rotation);
        let dest_head = LineHead::facing_camera(path.destination(), camera_rotation);
        Self {
            id,
            style: LineStyle::from_attack(path.is_attack),
            follows_target: path.follows_target,
            visible: false,
            line: Polyline {
                vertices: path.points,
                needs_update: true,
            },
            src_head,
            dest_head,
        }
    }

    pub fn source(&self) -> Vec3 {
        self.src_head.translation
    }

    pub fn destination(&self) -> Vec3 {
        self.dest_head.translation
    }

    /// Compare live endpoint positions against the cached marker positions
    pub fn endpoint_drift(&self, live_source: Vec3, live_target: Option<Vec3>) -> LineUpdate {
        let source = (live_source != self.src_head.translation).then_some(live_source);
        let dest = live_target.filter(|&target| target != self.dest_head.translation);
        if source.is_none() && dest.is_none() {
            LineUpdate::Unchanged
        } else {
            LineUpdate::EndpointsOnly { source, dest }
        }
    }

    fn patch(&mut self, source: Option<Vec3>, dest: Option<Vec3>, camera_rotation: Quat) {
        if let Some(source) = source {
            if let Some(last) = self.line.vertices.last_mut() {
                *last = source;
            }
            self.src_head.move_to(source, camera_rotation);
        }
        if let Some(dest) = dest {
            if let Some(first) = self.line.vertices.first_mut() {
                *first = dest;
            }
            self.dest_head.move_to(dest, camera_rotation);
        }
        self.line.needs_update = true;
    }
}

/// What should happen to one unit's render object this tick
#[derive(Clone, PartialEq, Debug)]
pub enum LineUpdate {
    Unchanged,
    EndpointsOnly { source: Option<Vec3>, dest: Option<Vec3> },
    FullRebuild(LinePath),
    Remove,
}

/// Scene graph root mutations, drained by the renderer backend
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SceneOp {
    Attach { unit: Entity, object: LineObjectId },
    Detach { unit: Entity, object: LineObjectId },
}

/// Owns every unit's render object, at most one per unit
#[derive(Default, Debug)]
pub struct LineRenderer {
    objects: HashMap<Entity, LineRenderObject>,
    scene_ops: Vec<SceneOp>,
    next_id: u64,
}

impl LineRenderer {
    pub fn apply(&mut self, unit: Entity, update: LineUpdate, camera_rotation: Quat) -> bool {
        match update {
            LineUpdate::Unchanged => false,
            LineUpdate::EndpointsOnly { source, dest } => {
                self.patch_endpoints(unit, source, dest, camera_rotation)
            }
            LineUpdate::FullRebuild(path) => {
                self.rebuild(unit, path, camera_rotation);
                true
            }
            LineUpdate::Remove => self.dispose(unit),
        }
    }

    /// Replace the unit's render object wholesale. The previous one is detached first.
    pub fn rebuild(&mut self, unit: Entity, path: LinePath, camera_rotation: Quat) -> LineObjectId {
        self.dispose(unit);

        let id = LineObjectId(self.next_id);
        self.next_id += 1;
        self.objects.insert(unit, LineRenderObject::new(id, path, camera_rotation));
        self.scene_ops.push(SceneOp::Attach { unit, object: id });
        id
    }

    /// Move the source and/or destination end of an existing line in place.
    /// Returns false when the unit has no render object.
    pub fn patch_endpoints(
        &mut self,
        unit: Entity,
        source: Option<Vec3>,
        dest: Option<Vec3>,
        camera_rotation: Quat,
    ) -> bool {
        if source.is_none() && dest.is_none() {
            return false;
        }
        match self.objects.get_mut(&unit) {
            Some(object) => {
                object.patch(source, dest, camera_rotation);
                true
            }
            None => false,
        }
    }

    /// Detach and drop the unit's render object. Safe to call repeatedly.
    pub fn dispose(&mut self, unit: Entity) -> bool {
        match self.objects.remove(&unit) {
            Some(object) => {
                self.scene_ops.push(SceneOp::Detach { unit, object: object.id });
                true
            }
            None => false,
        }
    }

    pub fn dispose_all(&mut self) -> usize {
        let count = self.objects.len();
        for (unit, object) in self.objects.drain() {
            self.scene_ops.push(SceneOp::Detach { unit, object: object.id });
        }
        count
    }

    pub fn set_all_visible(&mut self, visible: bool) {
        for object in self.objects.values_mut() {
            object.visible = visible;
        }
    }

    pub fn endpoint_drift(&self, unit: Entity, live_source: Vec3, live_target: Option<Vec3>) -> LineUpdate {
        self.objects
            .get(&unit)
            .map_or(LineUpdate::Unchanged, |object| object.endpoint_drift(live_source, live_target))
    }

    /// The line was drawn to a target entity whose position can no longer be read
    pub fn lost_target(&self, unit: Entity, live_target: Option<Vec3>) -> bool {
        live_target.is_none() && self.objects.get(&unit).is_some_and(|object| object.follows_target)
    }

    pub fn get(&self, unit: Entity) -> Option<&LineRenderObject> {
        self.objects.get(&unit)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Entity, &LineRenderObject)> {
        self.objects.iter().map(|(&unit, object)| (unit, object))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut LineRenderObject)> {
        self.objects.iter_mut().map(|(&unit, object)| (unit, object))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn drain_scene_ops(&mut self) -> std::vec::Drain<'_, SceneOp> {
        self.scene_ops.drain(..)
    }

    pub fn pending_scene_ops(&self) -> &[SceneOp] {
        &self.scene_ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(points: &[Vec3], is_attack: bool) -> LinePath {
        LinePath { points: points.to_vec(), is_attack, follows_target: false }
    }

    const DEST: Vec3 = Vec3::new(10.0, 0.0, 10.0);
    const MID: Vec3 = Vec3::new(5.0, 0.0, 5.0);
    const SRC: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    #[test]
    fn test_rebuild_attaches_hidden_object() {
        let mut renderer = LineRenderer::default();
        let unit = Entity::from_raw(1);
        let id = renderer.rebuild(unit, path(&[DEST, SRC], true), Quat::IDENTITY);

        let object = renderer.get(unit).expect("object");
        assert_eq!(object.id, id);
        assert_eq!(object.style, LineStyle::Attack);
        assert!(!object.visible);
        assert_eq!(object.destination(), DEST);
        assert_eq!(object.source(), SRC);
        assert_eq!(renderer.pending_scene_ops(), &[SceneOp::Attach { unit, object: id }]);
    }

    #[test]
    fn test_rebuild_replaces_previous_object() {
        let mut renderer = LineRenderer::default();
        let unit = Entity::from_raw(1);
        let first = renderer.rebuild(unit, path(&[DEST, SRC], false), Quat::IDENTITY);
        let second = renderer.rebuild(unit, path(&[DEST, MID, SRC], false), Quat::IDENTITY);

        assert_ne!(first, second);
        assert_eq!(renderer.len(), 1);
        let ops: Vec<_> = renderer.drain_scene_ops().collect();
        assert_eq!(
            ops,
            vec![
                SceneOp::Attach { unit, object: first },
                SceneOp::Detach { unit, object: first },
                SceneOp::Attach { unit, object: second },
            ]
        );
        assert!(renderer.pending_scene_ops().is_empty());
    }

    #[test]
    fn test_patch_moves_only_endpoints_in_place() {
        let mut renderer = LineRenderer::default();
        let unit = Entity::from_raw(1);
        let id = renderer.rebuild(unit, path(&[DEST, MID, SRC], false), Quat::IDENTITY);
        renderer.drain_scene_ops();

        let camera = Quat::from_rotation_y(0.5);
        let moved = Vec3::new(1.0, 0.0, 0.5);
        assert!(renderer.patch_endpoints(unit, Some(moved), None, camera));

        let object = renderer.get(unit).expect("object");
        assert_eq!(object.id, id);
        assert_eq!(object.line.vertices, vec![DEST, MID, moved]);
        assert_eq!(object.src_head.translation, moved);
        assert_eq!(object.src_head.rotation, camera);
        assert_eq!(object.dest_head.rotation, Quat::IDENTITY);
        assert!(renderer.pending_scene_ops().is_empty());
    }

    #[test]
    fn test_patch_destination() {
        let mut renderer = LineRenderer::default();
        let unit = Entity::from_raw(1);
        renderer.rebuild(unit, path(&[DEST, SRC], true), Quat::IDENTITY);
        let new_dest = Vec3::new(11.0, 0.0, 9.0);
        renderer.patch_endpoints(unit, None, Some(new_dest), Quat::IDENTITY);
        assert_eq!(renderer.get(unit).map(|o| o.line.vertices.clone()), Some(vec![new_dest, SRC]));
    }

    #[test]
    fn test_patch_without_object_is_skipped() {
        let mut renderer = LineRenderer::default();
        assert!(!renderer.patch_endpoints(Entity::from_raw(1), Some(SRC), None, Quat::IDENTITY));
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let mut renderer = LineRenderer::default();
        let unit = Entity::from_raw(1);
        let id = renderer.rebuild(unit, path(&[DEST, SRC], false), Quat::IDENTITY);
        renderer.drain_scene_ops();

        assert!(renderer.dispose(unit));
        assert!(!renderer.dispose(unit));
        assert_eq!(renderer.pending_scene_ops(), &[SceneOp::Detach { unit, object: id }]);
        assert!(renderer.get(unit).is_none());
    }

    #[test]
    fn test_endpoint_drift() {
        let mut renderer = LineRenderer::default();
        let unit = Entity::from_raw(1);
        renderer.rebuild(unit, path(&[DEST, SRC], false), Quat::IDENTITY);

        assert_eq!(renderer.endpoint_drift(unit, SRC, None), LineUpdate::Unchanged);
        assert_eq!(renderer.endpoint_drift(unit, SRC, Some(DEST)), LineUpdate::Unchanged);
        assert_eq!(
            renderer.endpoint_drift(unit, MID, Some(DEST)),
            LineUpdate::EndpointsOnly { source: Some(MID), dest: None }
        );
        assert_eq!(
            renderer.endpoint_drift(unit, SRC, Some(MID)),
            LineUpdate::EndpointsOnly { source: None, dest: Some(MID) }
        );
        assert_eq!(renderer.endpoint_drift(Entity::from_raw(2), MID, None), LineUpdate::Unchanged);
    }

    #[test]
    fn test_lost_target_only_for_target_lines() {
        let mut renderer = LineRenderer::default();
        let chaser = Entity::from_raw(1);
        let walker = Entity::from_raw(2);
        renderer.rebuild(
            chaser,
            LinePath { points: vec![DEST, SRC], is_attack: true, follows_target: true },
            Quat::IDENTITY,
        );
        renderer.rebuild(walker, path(&[DEST, SRC], false), Quat::IDENTITY);

        assert!(renderer.lost_target(chaser, None));
        assert!(!renderer.lost_target(chaser, Some(DEST)));
        assert!(!renderer.lost_target(walker, None));
        assert!(!renderer.lost_target(Entity::from_raw(3), None));
    }

    #[test]
    fn test_apply_remove_and_dispose_all() {
        let mut renderer = LineRenderer::default();
        renderer.rebuild(Entity::from_raw(1), path(&[DEST, SRC], false), Quat::IDENTITY);
        renderer.rebuild(Entity::from_raw(2), path(&[DEST, SRC], false), Quat::IDENTITY);

        assert!(renderer.apply(Entity::from_raw(1), LineUpdate::Remove, Quat::IDENTITY));
        assert!(!renderer.apply(Entity::from_raw(1), LineUpdate::Remove, Quat::IDENTITY));
        assert_eq!(renderer.dispose_all(), 1);
        assert!(renderer.is_empty());
        assert_eq!(renderer.dispose_all(), 0);
    }
}
