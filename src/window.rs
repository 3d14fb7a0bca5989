//! Window kind flags.
//!
//! The `windowtype` attribute of a window document selects how the OS window
//! front end should create the surface. The crate itself never creates a
//! window; it only carries the flags through to whoever does.

use bitflags::bitflags;

bitflags! {
    /// OS window creation hints.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct WindowFlags: u32 {
        const SHOWN              = 1 << 0;
        const HIDDEN             = 1 << 1;
        const BORDERLESS         = 1 << 2;
        const RESIZABLE          = 1 << 3;
        const MINIMIZED          = 1 << 4;
        const MAXIMIZED          = 1 << 5;
        const FULLSCREEN         = 1 << 6;
        const FULLSCREEN_DESKTOP = 1 << 7;
        const ALWAYS_ON_TOP      = 1 << 8;
        const SKIP_TASKBAR       = 1 << 9;
        const UTILITY            = 1 << 10;
        const TOOLTIP            = 1 << 11;
        const POPUP_MENU         = 1 << 12;
        const INPUT_FOCUS        = 1 << 13;
        const MOUSE_FOCUS        = 1 << 14;
    }
}

impl WindowFlags {
    /// Flags for a `windowtype` name. Unrecognized or absent names fall back
    /// to a normally shown window.
    pub fn from_kind(name: &str) -> Self {
        match name {
            "shown" => Self::SHOWN,
            "hidden" => Self::HIDDEN,
            "borderless" => Self::BORDERLESS,
            "resizable" => Self::RESIZABLE,
            "minimized" => Self::MINIMIZED,
            "maximized" => Self::MAXIMIZED,
            "fullscreen" => Self::FULLSCREEN,
            "fullscreen_desktop" => Self::FULLSCREEN_DESKTOP,
            "always_on_top" => Self::ALWAYS_ON_TOP,
            "skip_taskbar" => Self::SKIP_TASKBAR,
            "utility" => Self::UTILITY,
            "tooltip" => Self::TOOLTIP,
            "popup_menu" => Self::POPUP_MENU,
            "input_focus" => Self::INPUT_FOCUS,
            "mouse_focus" => Self::MOUSE_FOCUS,
            _ => Self::SHOWN,
        }
    }
}

impl Default for WindowFlags {
    fn default() -> Self {
        Self::SHOWN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_kind_names_map() {
        assert_eq!(WindowFlags::from_kind("popup_menu"), WindowFlags::POPUP_MENU);
        assert_eq!(WindowFlags::from_kind("borderless"), WindowFlags::BORDERLESS);
    }

    #[test]
    fn unknown_or_absent_kind_is_shown() {
        assert_eq!(WindowFlags::from_kind("holographic"), WindowFlags::SHOWN);
        assert_eq!(WindowFlags::from_kind(""), WindowFlags::SHOWN);
        assert_eq!(WindowFlags::default(), WindowFlags::SHOWN);
    }
}
