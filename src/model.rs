pub mod filter;
pub mod item;
pub mod item_source;
pub mod search;
pub mod selection;

pub use filter::{
    BuildParams, FilterScope, GroupPolicy, InitialSelection, SearchQuery, SingleApp, SortOrder,
    SwitcherMode,
};
pub use item::{AppId, AppInfo, ItemKey, ItemList, SwitchableItem, SystemAction, WindowId, WindowInfo};
pub use item_source::{BuildOutcome, Fallback, ItemSource};
pub use selection::{InitialHints, Removal, Selection, SelectionState};
