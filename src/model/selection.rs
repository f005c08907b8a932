use super::filter::InitialSelection;
use super::item::{ItemKey, ItemList, SwitchableItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Selected(usize),
}

impl Selection {
    pub fn index(self) -> Option<usize> {
        match self {
            Selection::None => None,
            Selection::Selected(index) => Some(index),
        }
    }
}

/// Host facts the initial policy needs when a fresh list arrives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitialHints {
    /// Focused window (window lists) or focused app (app lists).
    pub focused: Option<ItemKey>,
    /// Origin for FIRST/SECOND instead of the list edge.
    pub anchor: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    NotPresent,
    Removed { index: usize },
    /// The last item went away; the caller has to repopulate.
    Exhausted,
}

/// First (or, when reversed, last) item on `workspace`.
pub fn workspace_anchor(list: &ItemList, workspace: usize, reversed: bool) -> Option<usize> {
    let on_workspace =
        |item: &SwitchableItem| item.window().is_some_and(|w| w.is_on_workspace(workspace));
    if reversed {
        list.iter().rposition(on_workspace)
    } else {
        list.iter().position(on_workspace)
    }
}

#[derive(Debug, Clone)]
pub struct SelectionState {
    list: ItemList,
    selection: Selection,
    policy: InitialSelection,
    reversed: bool,
    wraparound: bool,
    /// Index the NONE policy would have picked, used by the first navigation.
    deferred: Option<usize>,
}

impl SelectionState {
    pub fn new(policy: InitialSelection, wraparound: bool) -> Self {
        SelectionState {
            list: ItemList::default(),
            selection: Selection::None,
            policy,
            reversed: false,
            wraparound,
            deferred: None,
        }
    }

    pub fn list(&self) -> &ItemList { &self.list }

    pub fn selection(&self) -> Selection { self.selection }

    pub fn selected_index(&self) -> Option<usize> { self.selection.index() }

    pub fn selected_item(&self) -> Option<&SwitchableItem> {
        self.selected_index().and_then(|index| self.list.get(index))
    }

    pub fn selected_key(&self) -> Option<ItemKey> { self.selected_item().map(SwitchableItem::key) }

    pub fn is_reversed(&self) -> bool { self.reversed }

    pub fn set_reversed(&mut self, reversed: bool) { self.reversed = reversed; }

    pub fn set_policy(&mut self, policy: InitialSelection) { self.policy = policy; }

    pub fn set_wraparound(&mut self, wraparound: bool) { self.wraparound = wraparound; }

    /// Installs a fresh list and applies the initial policy.
    pub fn reset(&mut self, list: ItemList, hints: &InitialHints) {
        self.list = list;
        self.apply_initial(hints);
    }

    /// Installs a rebuilt list, keeping `prior` selected if it survived.
    pub fn replace(&mut self, list: ItemList, prior: Option<&ItemKey>, hints: &InitialHints) {
        self.list = list;
        match prior.and_then(|key| self.list.position(key)) {
            Some(index) => {
                self.deferred = None;
                self.selection = Selection::Selected(index);
            }
            None => self.apply_initial(hints),
        }
    }

    fn apply_initial(&mut self, hints: &InitialHints) {
        self.deferred = None;
        if self.list.is_empty() {
            self.selection = Selection::None;
            return;
        }
        let active = hints.focused.as_ref().and_then(|key| self.list.position(key)).unwrap_or(0);
        self.selection = match self.policy {
            InitialSelection::Active => Selection::Selected(active),
            InitialSelection::None => {
                self.deferred = Some(active);
                Selection::None
            }
            InitialSelection::First => Selection::Selected(self.offset(0, hints.anchor)),
            InitialSelection::Second => Selection::Selected(self.offset(1, hints.anchor)),
        };
    }

    /// `n` steps in from the anchor (or list edge), falling back to the
    /// anchor itself when the list is too short.
    fn offset(&self, n: usize, anchor: Option<usize>) -> usize {
        let len = self.list.len();
        if self.reversed {
            let base = anchor.unwrap_or(len - 1).min(len - 1);
            base.checked_sub(n).unwrap_or(base)
        } else {
            let base = anchor.unwrap_or(0).min(len - 1);
            if base + n < len { base + n } else { base }
        }
    }

    /// Selects the first item in navigation order.
    pub fn select_first(&mut self) -> bool {
        if self.list.is_empty() {
            return false;
        }
        let first = self.offset(0, None);
        self.select(first)
    }

    pub fn select_last(&mut self) -> bool {
        let len = self.list.len();
        if len == 0 {
            return false;
        }
        self.select(if self.reversed { 0 } else { len - 1 })
    }

    /// Out-of-range indexes are ignored.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.list.len() {
            return false;
        }
        self.deferred = None;
        self.selection = Selection::Selected(index);
        true
    }

    /// Returns false when `key` is gone and the policy picked instead.
    pub fn select_key(&mut self, key: &ItemKey, hints: &InitialHints) -> bool {
        match self.list.position(key) {
            Some(index) => self.select(index),
            None => {
                self.apply_initial(hints);
                false
            }
        }
    }

    pub fn next(&mut self) -> bool { self.navigate(!self.reversed) }

    pub fn previous(&mut self) -> bool { self.navigate(self.reversed) }

    fn navigate(&mut self, forward: bool) -> bool {
        let len = self.list.len();
        if len == 0 {
            return false;
        }
        let current = match self.selection {
            Selection::Selected(index) => index,
            Selection::None => {
                let promoted = self.deferred.take().unwrap_or(0);
                self.selection = Selection::Selected(promoted.min(len - 1));
                return true;
            }
        };
        let target = if forward {
            if current + 1 < len {
                current + 1
            } else if self.wraparound {
                0
            } else {
                return false;
            }
        } else if current > 0 {
            current - 1
        } else if self.wraparound {
            len - 1
        } else {
            return false;
        };
        self.selection = Selection::Selected(target);
        target != current
    }

    /// Fast path for a single externally removed item.
    pub fn remove(&mut self, key: &ItemKey) -> Removal {
        let Some(removed) = self.list.position(key) else {
            return Removal::NotPresent;
        };
        if self.list.len() == 1 {
            self.list = ItemList::default();
            self.selection = Selection::None;
            self.deferred = None;
            return Removal::Exhausted;
        }
        self.list = self.list.without(removed);
        let remaining = self.list.len();
        let reconcile = |index: usize| {
            if removed < index {
                index - 1
            } else if removed == index {
                removed.min(remaining - 1)
            } else {
                index
            }
        };
        if let Selection::Selected(index) = self.selection {
            self.selection = Selection::Selected(reconcile(index));
        }
        self.deferred = self.deferred.map(reconcile);
        Removal::Removed { index: removed }
    }
}
