//! Autonomous scroll modes.
//!
//! One mode is active at a time. The dispatcher's key-read timeout is the clock: each
//! timeout produces exactly one [`TickAction`] for the active mode.

/// Scroll mode state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollMode {
    #[default]
    None,
    ContinuousUp,
    ContinuousDown,
    /// Repaint the last page whenever the file grows
    Tail,
    /// Scroll one line at a time towards the end as the file grows
    Follow,
}

/// Work performed on one clock tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickAction {
    /// Refresh the page if the EOF marker is visible and the file grew
    Idle,
    ScrollUp,
    ScrollDown,
    RepaintAtEof,
    ScrollAtEof,
}

impl ScrollMode {
    /// Flip to `requested`, or back to `None` if it is already active
    pub fn toggle(self, requested: ScrollMode) -> ScrollMode {
        if self == requested {
            ScrollMode::None
        } else {
            requested
        }
    }

    pub fn tick_action(self) -> TickAction {
        match self {
            ScrollMode::None => TickAction::Idle,
            ScrollMode::ContinuousUp => TickAction::ScrollUp,
            ScrollMode::ContinuousDown => TickAction::ScrollDown,
            ScrollMode::Tail => TickAction::RepaintAtEof,
            ScrollMode::Follow => TickAction::ScrollAtEof,
        }
    }

    /// State after a tick that could not move the view any further
    pub fn at_boundary(self) -> ScrollMode {
        match self {
            ScrollMode::ContinuousUp | ScrollMode::ContinuousDown => ScrollMode::None,
            other => other,
        }
    }

    /// Status line indicator
    pub fn label(self) -> Option<&'static str> {
        match self {
            ScrollMode::None => None,
            ScrollMode::ContinuousUp => Some("scrolling up"),
            ScrollMode::ContinuousDown => Some("scrolling down"),
            ScrollMode::Tail => Some("tail"),
            ScrollMode::Follow => Some("follow"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_flips_on_and_off() {
        let mode = ScrollMode::None.toggle(ScrollMode::Tail);
        assert_eq!(mode, ScrollMode::Tail);
        assert_eq!(mode.toggle(ScrollMode::Tail), ScrollMode::None);
    }

    #[test]
    fn test_toggle_switches_between_modes() {
        assert_eq!(
            ScrollMode::Tail.toggle(ScrollMode::Follow),
            ScrollMode::Follow
        );
        assert_eq!(
            ScrollMode::ContinuousUp.toggle(ScrollMode::ContinuousDown),
            ScrollMode::ContinuousDown
        );
    }

    #[test]
    fn test_tick_actions() {
        assert_eq!(ScrollMode::None.tick_action(), TickAction::Idle);
        assert_eq!(ScrollMode::ContinuousUp.tick_action(), TickAction::ScrollUp);
        assert_eq!(
            ScrollMode::ContinuousDown.tick_action(),
            TickAction::ScrollDown
        );
        assert_eq!(ScrollMode::Tail.tick_action(), TickAction::RepaintAtEof);
        assert_eq!(ScrollMode::Follow.tick_action(), TickAction::ScrollAtEof);
    }

    #[test]
    fn test_continuous_modes_stop_at_boundary() {
        assert_eq!(ScrollMode::ContinuousDown.at_boundary(), ScrollMode::None);
        assert_eq!(ScrollMode::ContinuousUp.at_boundary(), ScrollMode::None);
        assert_eq!(ScrollMode::Tail.at_boundary(), ScrollMode::Tail);
        assert_eq!(ScrollMode::Follow.at_boundary(), ScrollMode::Follow);
    }
}
