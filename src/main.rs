use bevy::log::LogPlugin;
use bevy::prelude::*;

use order_lines::movement::{advance_units_system, clear_recalc_system};
use order_lines::selection::{order_hotkey_system, selection_hotkey_system, DemoGroups};
use order_lines::setup::{setup_scene, spawn_demo_units};
use order_lines::types::PlayerId;
use order_lines::{CurrentPlayer, TargetLinesPlugin, TargetLinesSet};

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(LogPlugin {
            filter: "info,wgpu=error,order_lines=debug".into(),
            ..default()
        }))
        // Must be in place before the overlay plugin reads it
        .insert_resource(CurrentPlayer(Some(PlayerId(1))))
        .add_plugins(TargetLinesPlugin)
        .init_resource::<DemoGroups>()
        .add_systems(Startup, (setup_scene, spawn_demo_units))
        .add_systems(Update, (
            selection_hotkey_system,
            order_hotkey_system,
            advance_units_system,
        ).chain().before(TargetLinesSet::Update))
        .add_systems(Update, clear_recalc_system.after(TargetLinesSet::Update))
        .run();
}
