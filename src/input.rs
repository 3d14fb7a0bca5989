//! Input naming: the event vocabulary documents bind handlers to, plus a
//! small tracker that turns raw pointer transitions into those names.

/// Event names usable in an `onevent` attribute.
pub mod event {
    pub const MOUSE_CLICK: &str = "mouseclick";
    pub const MOUSE_RIGHT_CLICK: &str = "mouserightclick";
    pub const MOUSE_RELEASE: &str = "mouserelease";
    pub const KEY_DOWN: &str = "keydown";
    pub const KEY_UP: &str = "keyup";
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Button {
    Left,
    Right,
}

/// Debounces raw pointer state into routable event names.
///
/// Only the first pressed button counts until it is released; a release
/// without a matching press produces nothing.
#[derive(Default)]
pub struct PointerTracker {
    held: Option<Button>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// A button went down. Returns the event to route, if any.
    pub fn press(&mut self, button: Button) -> Option<&'static str> {
        if self.held.is_some() {
            return None;
        }
        self.held = Some(button);
        Some(match button {
            Button::Left => event::MOUSE_CLICK,
            Button::Right => event::MOUSE_RIGHT_CLICK,
        })
    }

    /// A button came up. Returns the event to route, if any.
    pub fn release(&mut self, button: Button) -> Option<&'static str> {
        if self.held != Some(button) {
            return None;
        }
        self.held = None;
        Some(event::MOUSE_RELEASE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_release_cycle() {
        let mut tracker = PointerTracker::new();
        assert_eq!(tracker.press(Button::Left), Some(event::MOUSE_CLICK));
        assert_eq!(tracker.release(Button::Left), Some(event::MOUSE_RELEASE));
        assert_eq!(tracker.press(Button::Right), Some(event::MOUSE_RIGHT_CLICK));
    }

    #[test]
    fn first_press_wins() {
        let mut tracker = PointerTracker::new();
        assert_eq!(tracker.press(Button::Left), Some(event::MOUSE_CLICK));
        assert_eq!(tracker.press(Button::Right), None);
        // Releasing the second button changes nothing.
        assert_eq!(tracker.release(Button::Right), None);
        assert_eq!(tracker.release(Button::Left), Some(event::MOUSE_RELEASE));
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut tracker = PointerTracker::new();
        assert_eq!(tracker.release(Button::Left), None);
    }
}
