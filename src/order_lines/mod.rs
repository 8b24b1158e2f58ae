// Order lines - per-unit movement/attack path overlays for the current selection
//
// Submodules:
// - geometry: order config + unit state -> polyline points
// - render: per-unit render objects (line + endpoint markers) and their lifecycle
// - snapshot: last-seen order configs for change detection
// - auto_hide: shared show/auto-hide timer
// - plugin: bevy systems mirroring render objects into the ECS world

mod auto_hide;
mod geometry;
pub mod plugin;
mod render;
mod snapshot;


use bevy::prelude::*;
use std::time::Duration;
use thiserror::Error;

use crate::constants::{ATTACK_LINE_COLOR, MOVE_LINE_COLOR, TARGET_LINES_NODE_NAME};
use crate::coords::TileProjector;
use crate::selection::SelectionChangeDetector;
use crate::types::{PlayerId, SelectedUnit};

pub use auto_hide::{AutoHideScheduler, AutoHideState};
pub use geometry::{build_line_path, LinePath};
pub use plugin::{TargetLinesPlugin, TargetLinesSet};
pub use render::{LineHead, LineObjectId, LineRenderObject, LineRenderer, LineStyle, LineUpdate, Polyline, SceneOp};
pub use snapshot::OrderSnapshotTracker;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetLinesError {
    #[error("target lines updated before create() set up the scene node")]
    NotCreated,
}

/// Runtime toggles, polled every tick
#[derive(Resource, Clone, Copy, Debug)]
pub struct TargetLinesSettings {
    pub enabled: bool,
    pub debug_paths: bool, // Draw every path node instead of just the endpoints
}

impl Default for TargetLinesSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            debug_paths: false,
        }
    }
}

/// Shared line/marker colours, one set per line style
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinePalette {
    pub attack: Color,
    pub movement: Color,
}

impl LinePalette {
    pub fn color(&self, style: LineStyle) -> Color {
        match style {
            LineStyle::Attack => self.attack,
            LineStyle::Move => self.movement,
        }
    }
}

impl Default for LinePalette {
    fn default() -> Self {
        Self {
            attack: ATTACK_LINE_COLOR,
            movement: MOVE_LINE_COLOR,
        }
    }
}

/// The container node every line root hangs off
#[derive(Clone, Debug)]
pub struct LineContainer {
    pub name: &'static str,
    pub visible: bool,
    pub palette: LinePalette,
}

/// Everything `update` reads from the outside world besides the selection
pub struct LineFrame<'a> {
    pub settings: TargetLinesSettings,
    pub camera_rotation: Quat,
    pub projector: &'a dyn TileProjector,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TickOutcome {
    Disabled,
    SelectionReset { tracked: usize },
    Updated { rebuilt: usize, removed: usize, patched: usize },
    Idle { hidden: bool },
}

/// Only units count, and only those of the current player when one is set
fn is_watched(unit: &SelectedUnit, current_player: Option<PlayerId>) -> bool {
    unit.kind.is_unit() && current_player.is_none_or(|player| unit.owner == player)
}

/// Order line overlay for the selected units of one player
#[derive(Resource, Debug, Default)]
pub struct TargetLines {
    current_player: Option<PlayerId>,
    container: Option<LineContainer>,
    snapshots: OrderSnapshotTracker,
    lines: LineRenderer,
    selection: SelectionChangeDetector,
    auto_hide: AutoHideScheduler,
}

impl TargetLines {
    pub fn new(current_player: Option<PlayerId>) -> Self {
        Self {
            current_player,
            ..default()
        }
    }

    /// Set up the container node and palette. Calling it again does nothing.
    pub fn create(&mut self) -> &LineContainer {
        self.container.get_or_insert_with(|| LineContainer {
            name: TARGET_LINES_NODE_NAME,
            visible: true,
            palette: LinePalette::default(),
        })
    }

    pub fn scene_node(&self) -> Option<&LineContainer> {
        self.container.as_ref()
    }

    /// Rebuild every line on the next tick even if the selection is unchanged
    pub fn force_show(&mut self) {
        self.selection.invalidate();
    }

    pub fn lines(&self) -> &LineRenderer {
        &self.lines
    }

    pub fn lines_mut(&mut self) -> &mut LineRenderer {
        &mut self.lines
    }

    pub fn snapshots(&self) -> &OrderSnapshotTracker {
        &self.snapshots
    }

    pub fn auto_hide_state(&self) -> AutoHideState {
        self.auto_hide.state()
    }

    /// Structural decision for a unit whose order changed since its last snapshot
    fn plan_rebuild(unit: &SelectedUnit, frame: &LineFrame) -> LineUpdate {
        match build_line_path(unit, frame.settings.debug_paths, frame.projector) {
            Some(path) => LineUpdate::FullRebuild(path),
            None => LineUpdate::Remove,
        }
    }

    pub fn update(
        &mut self,
        now: Duration,
        frame: &LineFrame,
        selection: &[SelectedUnit],
    ) -> Result<TickOutcome, TargetLinesError> {
        let container = self.container.as_mut().ok_or(TargetLinesError::NotCreated)?;
        container.visible = frame.settings.enabled;
        if !frame.settings.enabled {
            return Ok(TickOutcome::Disabled);
        }

        if self.selection.observe(selection.iter().map(|unit| unit.entity)) {
            return Ok(self.reset_selection(now, frame, selection));
        }

        let current_player = self.current_player;
        let mut rebuilt = 0;
        let mut removed = 0;
        let mut patched = 0;
        let mut order_changed = false;
        for unit in selection.iter().filter(|unit| is_watched(unit, current_player)) {
            let changed = self.snapshots.has_changed(unit.entity, unit.order);
            if changed {
                self.snapshots.record(unit.entity, unit.order);
            }

            // A despawned target leaves the order unchanged but the line unanchored
            if changed || self.lines.lost_target(unit.entity, unit.target_position) {
                order_changed = true;
                let update = Self::plan_rebuild(unit, frame);
                let is_removal = matches!(update, LineUpdate::Remove);
                if self.lines.apply(unit.entity, update, frame.camera_rotation) {
                    if is_removal {
                        removed += 1;
                    } else {
                        rebuilt += 1;
                    }
                }
                if unit.has_target() {
                    self.auto_hide.show(now, &mut self.lines);
                }
            }

            let drift = self.lines.endpoint_drift(unit.entity, unit.world_position, unit.target_position);
            if self.lines.apply(unit.entity, drift, frame.camera_rotation) {
                patched += 1;
                self.auto_hide.show(now, &mut self.lines);
            }
        }

        // A changed order holds the lines open even when nothing had to be redrawn
        if order_changed || patched > 0 {
            return Ok(TickOutcome::Updated { rebuilt, removed, patched });
        }

        let hidden = self.auto_hide.evaluate(now, &mut self.lines);
        Ok(TickOutcome::Idle { hidden })
    }

    fn reset_selection(&mut self, now: Duration, frame: &LineFrame, selection: &[SelectedUnit]) -> TickOutcome {
        self.auto_hide.hide(&mut self.lines);
        self.snapshots.clear();
        self.lines.dispose_all();

        let current_player = self.current_player;
        let mut tracked = 0;
        for unit in selection.iter().filter(|unit| is_watched(unit, current_player)) {
            self.snapshots.record(unit.entity, unit.order);
            if let LineUpdate::FullRebuild(path) = Self::plan_rebuild(unit, frame) {
                self.lines.rebuild(unit.entity, path, frame.camera_rotation);
                tracked += 1;
            }
            if unit.is_air() || unit.has_target() {
                self.auto_hide.show(now, &mut self.lines);
            }
        }
        TickOutcome::SelectionReset { tracked }
    }

    /// Release every render object and the container. `create` may be called again afterwards.
    pub fn dispose(&mut self) {
        self.lines.dispose_all();
        self.snapshots.clear();
        self.selection.invalidate();
        self.auto_hide = AutoHideScheduler::default();
        self.container = None;
    }
}
