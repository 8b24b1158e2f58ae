// Shared show/auto-hide timer for all order lines
use std::time::Duration;

use super::render::LineRenderer;
use crate::constants::TARGET_LINE_DISPLAY_DURATION;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum AutoHideState {
    #[default]
    Hidden,
    VisibleSince(Duration),
}

/// One visibility window for every line. Callers only evaluate on ticks without updates.
#[derive(Debug)]
pub struct AutoHideScheduler {
    state: AutoHideState,
    display_duration: Duration,
}

impl Default for AutoHideScheduler {
    fn default() -> Self {
        Self::new(TARGET_LINE_DISPLAY_DURATION)
    }
}

impl AutoHideScheduler {
    pub fn new(display_duration: Duration) -> Self {
        Self {
            state: AutoHideState::Hidden,
            display_duration,
        }
    }

    pub fn state(&self) -> AutoHideState {
        self.state
    }

    pub fn show(&mut self, now: Duration, lines: &mut LineRenderer) {
        self.state = AutoHideState::VisibleSince(now);
        lines.set_all_visible(true);
    }

    pub fn hide(&mut self, lines: &mut LineRenderer) {
        self.state = AutoHideState::Hidden;
        lines.set_all_visible(false);
    }

    /// Hide everything once the window has been open for the display duration.
    /// Returns true if this call hid the lines.
    pub fn evaluate(&mut self, now: Duration, lines: &mut LineRenderer) -> bool {
        match self.state {
            AutoHideState::VisibleSince(start) if now.saturating_sub(start) >= self.display_duration => {
                self.hide(lines);
                true
            }
            _ => false,
        }
    }
}
