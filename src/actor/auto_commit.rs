//! Pointer-exit check run on every auto-commit tick.

use crate::sys::geometry::{Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoCommit {
    Commit,
    Dismiss,
    Wait,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerCheck {
    pub keyboard_triggered: bool,
    pub pointer: Point,
    pub popup: Option<Rect>,
    pub secondary: Option<Rect>,
    /// Typing in search or an open submenu holds the popup open.
    pub suppressed: bool,
    /// Leaving the popup commits instead of dismissing.
    pub commit_on_exit: bool,
}

impl PointerCheck {
    pub fn evaluate(&self) -> AutoCommit {
        if self.keyboard_triggered || self.suppressed {
            return AutoCommit::Wait;
        }
        let inside = |rect: Option<Rect>| rect.is_some_and(|r| r.contains(self.pointer));
        if inside(self.popup) || inside(self.secondary) {
            return AutoCommit::Wait;
        }
        if self.commit_on_exit { AutoCommit::Commit } else { AutoCommit::Dismiss }
    }
}
