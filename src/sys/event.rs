//! Raw input as the host delivers it to the switcher.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::geometry::Point;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const CTRL = 1 << 1;
        const ALT = 1 << 2;
        const SUPER = 1 << 3;
    }
}

/// Logical keys, already translated from the host's keysyms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Tab,
    Return,
    KpEnter,
    Space,
    BackSpace,
    Left,
    Right,
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    /// Function keys, 1-based.
    F(u8),
    /// Keypad digits 0-9.
    Keypad(u8),
    /// The key above Tab, used as the group-switch key.
    Grave,
    Super,
    Char(char),
    Other(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key, modifiers: Modifiers) -> Self { KeyEvent { key, modifiers } }

    pub fn plain(key: Key) -> Self { KeyEvent { key, modifiers: Modifiers::empty() } }
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    Primary,
    Secondary,
    Middle,
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum MouseInput {
    Button(MouseButton),
    ScrollUp,
    ScrollDown,
}

/// What the pointer was over, as hit-tested by the renderer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MouseTarget {
    Item(usize),
    Inside,
    Outside,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MouseEvent {
    pub input: MouseInput,
    pub target: MouseTarget,
    pub position: Point,
}

/// Navigation direction of a show request or workspace move.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TriggerSource {
    #[default]
    Keyboard,
    Pointer,
}

/// How the popup was opened: by which device, and with which modifiers held.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct TriggerBinding {
    pub source: TriggerSource,
    pub modifiers: Modifiers,
}

impl TriggerBinding {
    pub fn keyboard(modifiers: Modifiers) -> Self {
        TriggerBinding { source: TriggerSource::Keyboard, modifiers }
    }

    pub fn pointer() -> Self {
        TriggerBinding {
            source: TriggerSource::Pointer,
            modifiers: Modifiers::empty(),
        }
    }

    pub fn is_keyboard(&self) -> bool { self.source == TriggerSource::Keyboard }
}
