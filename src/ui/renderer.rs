//! The boundary between the switcher and whatever draws it.
//!
//! A renderer is told what changed through [`SwitcherEvent`]s and reads
//! the current state back through [`ItemListSource`] and
//! [`SelectionController`].

use serde::{Deserialize, Serialize};

use crate::model::filter::{FilterScope, SwitcherMode};
use crate::model::item::ItemList;
use crate::sys::geometry::Rect;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[serde(tag = "type")]
pub enum SwitcherEvent {
    ListRebuilt {
        len: usize,
        selected: Option<usize>,
        scope: FilterScope,
        mode: SwitcherMode,
        search_active: bool,
        /// Show the "filter widened" indicator.
        filter_changed: bool,
    },
    SelectionChanged {
        index: Option<usize>,
    },
    ItemRemoved {
        index: usize,
        selected: Option<usize>,
    },
    Hidden {
        committed: bool,
    },
}

#[derive(thiserror::Error, Debug)]
pub enum GrabError {
    #[error("another client holds the keyboard grab")]
    AlreadyGrabbed,
    #[error("input grab failed: {0}")]
    Failed(String),
}

pub trait Renderer {
    fn notify(&self, event: &SwitcherEvent);

    fn grab_input(&self) -> Result<(), GrabError>;

    fn release_input(&self);

    fn popup_bounds(&self) -> Option<Rect>;

    /// Extra region (thumbnail, submenu) that still counts as inside.
    fn secondary_bounds(&self) -> Option<Rect> { None }
}

pub trait ItemListSource {
    fn current_list(&self) -> ItemList;

    fn is_search_active(&self) -> bool;

    fn current_filter_scope(&self) -> FilterScope;
}

pub trait SelectionController {
    fn selected_index(&self) -> Option<usize>;

    fn select(&mut self, index: usize) -> bool;

    fn next(&mut self) -> bool;

    fn previous(&mut self) -> bool;
}
