// Selection module - which entities the order line overlay is watching
//
// Submodules:
// - state: SelectionState and CurrentPlayer resources
// - fingerprint: membership fingerprint and change detection
// - input: keyboard selection and overlay toggles for the demo

mod fingerprint;
mod input;
mod state;

pub use fingerprint::{SelectionChangeDetector, SelectionFingerprint};
pub use input::{order_hotkey_system, selection_hotkey_system, straight_path, DemoGroups};
pub use state::{CurrentPlayer, SelectionState};
