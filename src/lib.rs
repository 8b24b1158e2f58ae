// Order line overlay for selected units: move and attack lines that track
// unit orders, patch their endpoints as units move and hide after a delay.

pub mod constants;
pub mod coords;
pub mod movement;
pub mod order_lines;
pub mod selection;
pub mod setup;
pub mod types;

pub use order_lines::{TargetLines, TargetLinesError, TargetLinesPlugin, TargetLinesSet, TargetLinesSettings};
pub use selection::{CurrentPlayer, SelectionState};
