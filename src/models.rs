use std::fmt;

use uuid::Uuid;

/// Opaque per-item identifier, unique for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId(Uuid);

impl ItemId {
    pub fn new() -> Self {
        ItemId(Uuid::new_v4())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone)]
pub struct EditState {
    /// When true the item is rendered as an edit form instead of a static label.
    pub editing: bool,
    /// Live (possibly unsaved) form text, harvested before every dispatch so
    /// in-progress edits survive unrelated redraws.
    pub current_text: String,
}

#[derive(Debug, Clone)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub checked: bool,
    pub edit: EditState,
}

impl Item {
    pub fn new(name: &str) -> Self {
        Item {
            id: ItemId::new(),
            name: name.to_string(),
            checked: false,
            edit: EditState {
                editing: false,
                current_text: name.to_string(),
            },
        }
    }
}

/// Every user-visible operation on the list. The UI layer only translates
/// raw input events into these; `Store::apply` does the rest.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    AddItem(String),
    ToggleChecked(ItemId),
    Delete(ItemId),
    ToggleFilter,
    ToggleEdit(ItemId),
    SubmitEdit(ItemId, String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("no item with id {0}")]
    NotFound(ItemId),
    #[error("index {index} out of range (list has {len} items)")]
    OutOfRange { index: usize, len: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Browse,
    NewItem,
}
