// Last-seen order configs per watched unit, for change detection
use bevy::prelude::*;
use std::collections::HashMap;

use crate::types::{configs_equal, OrderConfig};

/// Stores an owned copy of each unit's order config as of the last time it was drawn.
/// A recorded `None` is a real snapshot ("had no order"), distinct from "never seen".
#[derive(Default, Debug)]
pub struct OrderSnapshotTracker {
    snapshots: HashMap<Entity, Option<OrderConfig>>,
}

impl OrderSnapshotTracker {
    pub fn record(&mut self, unit: Entity, config: Option<&OrderConfig>) {
        self.snapshots.insert(unit, config.cloned());
    }

    pub fn has_changed(&self, unit: Entity, live: Option<&OrderConfig>) -> bool {
        let Some(snapshot) = self.snapshots.get(&unit) else {
            return true;
        };
        if live.is_some_and(|config| config.is_recalc) {
            return true;
        }
        !configs_equal(snapshot.as_ref(), live)
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    pub fn contains(&self, unit: Entity) -> bool {
        self.snapshots.contains_key(&unit)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
