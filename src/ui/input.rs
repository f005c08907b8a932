//! Maps raw key and mouse events onto switcher commands.
//!
//! Key handling is an ordered chain where the first handler that claims the
//! event wins: direct index keys, search text, composite keys, directional
//! keys, then the configurable action keys. Whatever is left is either a
//! dismiss, a commit or ignored. The dispatcher only decides; the popup
//! controller carries the command out.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::trace;

use crate::common::config::{Config, MouseSettings, UpDownAction};
use crate::sys::event::{Direction, Key, KeyEvent, Modifiers, MouseButton, MouseEvent, MouseInput, MouseTarget};

/// Named actions that keys and mouse buttons can be bound to.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActionName {
    Activate,
    Select,
    SelectNext,
    SelectPrevious,
    Dismiss,
    CloseQuit,
    Kill,
    ToggleAbove,
    ToggleSticky,
    MaximizeOnCurrentMonitor,
    NewWindow,
    CreateThumbnail,
    OpenPreferences,
    ToggleSearch,
    ToggleSwitcherMode,
    ToggleSingleApp,
    ToggleGroupByApp,
    ToggleGroupByWorkspace,
    CycleFilterScope,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Select by position; `activate` also commits it.
    Select { index: usize, activate: bool },
    SearchPush(char),
    SearchPop,
    /// Turn search on with this first character.
    StartSearch(char),
    ExitSingleApp,
    Next,
    Previous,
    SelectFirst,
    SelectLast,
    ToggleSingleApp,
    ToggleGroupByApp,
    CycleFilterScope,
    /// First overlay-key press; opens the double-press window.
    ArmOverlay,
    /// Second overlay-key press inside the window.
    OverlayDoublePress,
    SwitchWorkspace(Direction),
    MoveSelected { direction: Direction, new_workspace: bool },
    /// Run a named action on `target`, or on the selection when `None`.
    Run { action: ActionName, target: Option<usize> },
    Dismiss,
    Commit,
    Ignore,
}

/// Popup state the key chain depends on.
#[derive(Debug, Clone, Copy)]
pub struct KeyContext<'a> {
    pub config: &'a Config,
    pub search_active: bool,
    pub single_app: bool,
    /// Modifiers held when the popup was triggered.
    pub trigger: Modifiers,
    pub overlay_armed: bool,
}

pub fn dispatch_key(event: KeyEvent, cx: &KeyContext<'_>) -> Command {
    let command = direct_index(event)
        .or_else(|| search_text(event, cx))
        .or_else(|| composite(event, cx))
        .or_else(|| directional(event, cx))
        .or_else(|| action_key(event, cx))
        .unwrap_or_else(|| unclaimed(event));
    trace!(?event, ?command, "dispatched key");
    command
}

fn direct_index(event: KeyEvent) -> Option<Command> {
    let index = match event.key {
        Key::F(n @ 1..=12) => usize::from(n - 1),
        Key::Keypad(0) => 9,
        Key::Keypad(d @ 1..=9) => usize::from(d - 1),
        _ => return None,
    };
    let activate = !event.modifiers.contains(Modifiers::SHIFT);
    Some(Command::Select { index, activate })
}

fn is_plain_text(modifiers: Modifiers) -> bool {
    (modifiers - Modifiers::SHIFT).is_empty()
}

fn search_text(event: KeyEvent, cx: &KeyContext<'_>) -> Option<Command> {
    if !cx.search_active {
        return None;
    }
    match event.key {
        Key::BackSpace => Some(Command::SearchPop),
        Key::Space if is_plain_text(event.modifiers) => Some(Command::SearchPush(' ')),
        Key::Char(c) if is_plain_text(event.modifiers) && (c.is_alphanumeric() || c == ' ') => {
            Some(Command::SearchPush(c))
        }
        _ => None,
    }
}

fn composite(event: KeyEvent, cx: &KeyContext<'_>) -> Option<Command> {
    let shift = event.modifiers.contains(Modifiers::SHIFT);
    match event.key {
        Key::Escape if cx.single_app => Some(Command::ExitSingleApp),
        Key::Tab => {
            let held = event.modifiers - Modifiers::SHIFT;
            let expected = cx.trigger - Modifiers::SHIFT;
            if held != expected {
                return None;
            }
            Some(if shift { Command::Previous } else { Command::Next })
        }
        Key::Grave if shift => Some(Command::ToggleGroupByApp),
        Key::Grave => Some(Command::ToggleSingleApp),
        Key::Super if cx.overlay_armed => Some(Command::OverlayDoublePress),
        Key::Super => Some(Command::ArmOverlay),
        _ => None,
    }
}

fn directional(event: KeyEvent, cx: &KeyContext<'_>) -> Option<Command> {
    let direction = match event.key {
        Key::Left | Key::Up | Key::PageUp => Direction::Backward,
        Key::Right | Key::Down | Key::PageDown => Direction::Forward,
        Key::Home => return Some(Command::SelectFirst),
        Key::End => return Some(Command::SelectLast),
        _ => return None,
    };
    if event.modifiers.contains(Modifiers::CTRL) {
        let new_workspace = event.modifiers.contains(Modifiers::SHIFT);
        return Some(Command::MoveSelected { direction, new_workspace });
    }
    let step = match direction {
        Direction::Forward => Command::Next,
        Direction::Backward => Command::Previous,
    };
    let command = match event.key {
        Key::Left | Key::Right => step,
        Key::PageUp | Key::PageDown => Command::SwitchWorkspace(direction),
        _ => match cx.config.settings.keys.up_down {
            UpDownAction::Nothing => Command::Ignore,
            UpDownAction::Navigate => step,
            UpDownAction::SwitchWorkspace => Command::SwitchWorkspace(direction),
            UpDownAction::ToggleSingleApp => Command::ToggleSingleApp,
            UpDownAction::CycleFilterScope => Command::CycleFilterScope,
        },
    };
    Some(command)
}

fn action_key(event: KeyEvent, cx: &KeyContext<'_>) -> Option<Command> {
    let Key::Char(c) = event.key else { return None };
    let keys = &cx.config.settings.keys;
    let shift_ok = !keys.require_shift || event.modifiers.contains(Modifiers::SHIFT);
    if shift_ok
        && let Some(action) = cx.config.action_for_key(c)
    {
        return Some(Command::Run { action, target: None });
    }
    if cx.config.settings.search.type_to_search
        && !cx.search_active
        && is_plain_text(event.modifiers)
        && (c.is_alphanumeric() || c.is_ascii_punctuation())
    {
        return Some(Command::StartSearch(c));
    }
    None
}

fn unclaimed(event: KeyEvent) -> Command {
    match event.key {
        Key::Escape | Key::Tab => Command::Dismiss,
        Key::Space | Key::Return | Key::KpEnter => Command::Commit,
        _ => Command::Ignore,
    }
}

pub fn dispatch_mouse(event: MouseEvent, mouse: &MouseSettings) -> Command {
    let (bindings, target) = match event.target {
        MouseTarget::Item(index) => (&mouse.on_item, Some(index)),
        MouseTarget::Inside => (&mouse.inside, None),
        MouseTarget::Outside => (&mouse.outside, None),
    };
    let action = match event.input {
        MouseInput::Button(MouseButton::Primary) => bindings.primary,
        MouseInput::Button(MouseButton::Secondary) => bindings.secondary,
        MouseInput::Button(MouseButton::Middle) => bindings.middle,
        MouseInput::ScrollUp => bindings.scroll_up,
        MouseInput::ScrollDown => bindings.scroll_down,
    };
    let command = match action {
        Some(action) => Command::Run { action, target },
        None => Command::Ignore,
    };
    trace!(?event, ?command, "dispatched mouse");
    command
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sys::geometry::Point;

    fn cx(config: &Config) -> KeyContext<'_> {
        KeyContext {
            config,
            search_active: false,
            single_app: false,
            trigger: Modifiers::ALT,
            overlay_armed: false,
        }
    }

    fn key(key: Key, modifiers: Modifiers) -> KeyEvent { KeyEvent::new(key, modifiers) }

    #[test]
    fn function_and_keypad_keys_select_directly() {
        let config = Config::default();
        let cx = cx(&config);
        assert_eq!(dispatch_key(KeyEvent::plain(Key::F(1)), &cx), Command::Select {
            index: 0,
            activate: true
        });
        assert_eq!(dispatch_key(key(Key::F(12), Modifiers::SHIFT), &cx), Command::Select {
            index: 11,
            activate: false
        });
        assert_eq!(dispatch_key(KeyEvent::plain(Key::Keypad(0)), &cx), Command::Select {
            index: 9,
            activate: true
        });
        assert_eq!(dispatch_key(KeyEvent::plain(Key::Keypad(3)), &cx), Command::Select {
            index: 2,
            activate: true
        });
        assert_eq!(dispatch_key(KeyEvent::plain(Key::F(13)), &cx), Command::Ignore);
    }

    #[test]
    fn search_text_only_while_searching() {
        let config = Config::default();
        let mut cx = cx(&config);
        assert_eq!(dispatch_key(KeyEvent::plain(Key::BackSpace), &cx), Command::Ignore);
        assert_eq!(dispatch_key(KeyEvent::plain(Key::Char('q')), &cx), Command::Run {
            action: ActionName::CloseQuit,
            target: None
        });

        cx.search_active = true;
        assert_eq!(dispatch_key(KeyEvent::plain(Key::Char('q')), &cx), Command::SearchPush('q'));
        assert_eq!(dispatch_key(KeyEvent::plain(Key::Space), &cx), Command::SearchPush(' '));
        assert_eq!(dispatch_key(KeyEvent::plain(Key::BackSpace), &cx), Command::SearchPop);
        assert_eq!(dispatch_key(KeyEvent::plain(Key::Return), &cx), Command::Commit);
    }

    #[test]
    fn tab_needs_the_trigger_modifiers() {
        let config = Config::default();
        let cx = cx(&config);
        assert_eq!(dispatch_key(key(Key::Tab, Modifiers::ALT), &cx), Command::Next);
        assert_eq!(
            dispatch_key(key(Key::Tab, Modifiers::ALT | Modifiers::SHIFT), &cx),
            Command::Previous
        );
        assert_eq!(dispatch_key(key(Key::Tab, Modifiers::SUPER), &cx), Command::Dismiss);
    }

    #[test]
    fn escape_leaves_single_app_before_dismissing() {
        let config = Config::default();
        let mut cx = cx(&config);
        assert_eq!(dispatch_key(KeyEvent::plain(Key::Escape), &cx), Command::Dismiss);
        cx.single_app = true;
        assert_eq!(dispatch_key(KeyEvent::plain(Key::Escape), &cx), Command::ExitSingleApp);
    }

    #[test]
    fn group_and_overlay_keys() {
        let config = Config::default();
        let mut cx = cx(&config);
        assert_eq!(dispatch_key(KeyEvent::plain(Key::Grave), &cx), Command::ToggleSingleApp);
        assert_eq!(dispatch_key(key(Key::Grave, Modifiers::SHIFT), &cx), Command::ToggleGroupByApp);
        assert_eq!(dispatch_key(KeyEvent::plain(Key::Super), &cx), Command::ArmOverlay);
        cx.overlay_armed = true;
        assert_eq!(dispatch_key(KeyEvent::plain(Key::Super), &cx), Command::OverlayDoublePress);
    }

    #[test]
    fn directional_keys() {
        let mut config = Config::default();
        assert_eq!(dispatch_key(KeyEvent::plain(Key::Left), &cx(&config)), Command::Previous);
        assert_eq!(
            dispatch_key(KeyEvent::plain(Key::Down), &cx(&config)),
            Command::SwitchWorkspace(Direction::Forward)
        );
        assert_eq!(
            dispatch_key(KeyEvent::plain(Key::PageUp), &cx(&config)),
            Command::SwitchWorkspace(Direction::Backward)
        );
        assert_eq!(dispatch_key(KeyEvent::plain(Key::End), &cx(&config)), Command::SelectLast);
        assert_eq!(
            dispatch_key(key(Key::Right, Modifiers::CTRL), &cx(&config)),
            Command::MoveSelected { direction: Direction::Forward, new_workspace: false }
        );
        assert_eq!(
            dispatch_key(key(Key::Up, Modifiers::CTRL | Modifiers::SHIFT), &cx(&config)),
            Command::MoveSelected { direction: Direction::Backward, new_workspace: true }
        );

        config.settings.keys.up_down = UpDownAction::Navigate;
        assert_eq!(dispatch_key(KeyEvent::plain(Key::Up), &cx(&config)), Command::Previous);
        config.settings.keys.up_down = UpDownAction::CycleFilterScope;
        assert_eq!(dispatch_key(KeyEvent::plain(Key::Up), &cx(&config)), Command::CycleFilterScope);
        config.settings.keys.up_down = UpDownAction::Nothing;
        assert_eq!(dispatch_key(KeyEvent::plain(Key::Down), &cx(&config)), Command::Ignore);
    }

    #[test]
    fn action_keys_respect_require_shift() {
        let mut config = Config::default();
        config.settings.keys.require_shift = true;
        let cx = cx(&config);
        assert_eq!(dispatch_key(KeyEvent::plain(Key::Char('k')), &cx), Command::Ignore);
        assert_eq!(dispatch_key(key(Key::Char('K'), Modifiers::SHIFT), &cx), Command::Run {
            action: ActionName::Kill,
            target: None
        });
    }

    #[test]
    fn type_to_search_starts_with_unbound_characters() {
        let mut config = Config::default();
        config.settings.search.type_to_search = true;
        let cx = cx(&config);
        assert_eq!(dispatch_key(KeyEvent::plain(Key::Char('z')), &cx), Command::StartSearch('z'));
        assert_eq!(dispatch_key(KeyEvent::plain(Key::Char('q')), &cx), Command::Run {
            action: ActionName::CloseQuit,
            target: None
        });
        assert_eq!(dispatch_key(key(Key::Char('z'), Modifiers::CTRL), &cx), Command::Ignore);
    }

    #[test]
    fn unclaimed_keys() {
        let config = Config::default();
        let cx = cx(&config);
        assert_eq!(dispatch_key(KeyEvent::plain(Key::Space), &cx), Command::Commit);
        assert_eq!(dispatch_key(KeyEvent::plain(Key::KpEnter), &cx), Command::Commit);
        assert_eq!(dispatch_key(KeyEvent::plain(Key::Other(0xffe1)), &cx), Command::Ignore);
    }

    #[test]
    fn mouse_tables_depend_on_the_target() {
        let mouse = MouseSettings::default();
        let event = |input, target| MouseEvent { input, target, position: Point::default() };

        assert_eq!(
            dispatch_mouse(event(MouseInput::Button(MouseButton::Middle), MouseTarget::Item(2)), &mouse),
            Command::Run { action: ActionName::CloseQuit, target: Some(2) }
        );
        assert_eq!(
            dispatch_mouse(event(MouseInput::ScrollDown, MouseTarget::Inside), &mouse),
            Command::Run { action: ActionName::SelectNext, target: None }
        );
        assert_eq!(
            dispatch_mouse(event(MouseInput::Button(MouseButton::Primary), MouseTarget::Outside), &mouse),
            Command::Run { action: ActionName::Dismiss, target: None }
        );
        assert_eq!(
            dispatch_mouse(event(MouseInput::ScrollUp, MouseTarget::Outside), &mouse),
            Command::Ignore
        );
    }
}
