// Selection state shared between input handling and the order line overlay
use bevy::prelude::*;

use crate::types::PlayerId;

/// Selection state resource - tracks which entities are selected (Vec preserves selection order)
#[derive(Resource, Default, Debug)]
pub struct SelectionState {
    pub selected: Vec<Entity>,  // First element is primary selection
}

impl SelectionState {
    pub fn select_only(&mut self, entities: impl IntoIterator<Item = Entity>) {
        self.selected.clear();
        self.selected.extend(entities);
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, entity: Entity) -> bool {
        self.selected.contains(&entity)
    }
}

/// The local player. `None` means lines are drawn for every owner.
#[derive(Resource, Default, Clone, Copy, Debug)]
pub struct CurrentPlayer(pub Option<PlayerId>);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_only_replaces_previous() {
        let mut state = SelectionState::default();
        state.select_only([Entity::from_raw(1), Entity::from_raw(2)]);
        state.select_only([Entity::from_raw(3)]);
        assert_eq!(state.selected, vec![Entity::from_raw(3)]);
        assert!(state.is_selected(Entity::from_raw(3)));
        assert!(!state.is_selected(Entity::from_raw(1)));
    }

    #[test]
    fn test_clear_empties_selection() {
        let mut state = SelectionState::default();
        state.select_only([Entity::from_raw(1)]);
        state.clear();
        assert!(state.selected.is_empty());
    }
}
