use std::collections::HashMap;

use crate::models::{Action, Item, ItemId, StoreError};

/// The single in-memory container of all items plus the display filter flag.
///
/// `Vec` keeps insertion order as display order; lookups by id are linear,
/// which is fine at shopping-list sizes.
#[derive(Debug, Clone)]
pub struct Store {
    pub items: Vec<Item>,
    pub hide_checked_items: bool,
}

impl Store {
    pub fn new() -> Self {
        Store {
            items: Vec::new(),
            hide_checked_items: false,
        }
    }

    /// The startup list: same four entries the app has always seeded.
    pub fn seeded() -> Self {
        let mut store = Store::new();
        store.add_item("apples");
        store.add_item("oranges");
        store.add_item("milk");
        store.add_item("bread");
        store.items[2].checked = true;
        store
    }

    /// Appends a new item. No trimming, no dedup; an empty name is accepted.
    pub fn add_item(&mut self, name: &str) {
        self.items.push(Item::new(name));
    }

    pub fn index_of(&self, id: ItemId) -> Result<usize, StoreError> {
        self.items
            .iter()
            .position(|item| item.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    pub fn get(&self, id: ItemId) -> Result<&Item, StoreError> {
        self.items
            .iter()
            .find(|item| item.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    pub fn toggle_checked(&mut self, id: ItemId) -> Result<(), StoreError> {
        let index = self.index_of(id)?;
        self.items[index].checked = !self.items[index].checked;
        Ok(())
    }

    /// Removes the item at a positional index into the full (unfiltered) list.
    /// Callers resolve the index from an id immediately beforehand.
    pub fn delete_item(&mut self, index: usize) -> Result<Item, StoreError> {
        if index >= self.items.len() {
            return Err(StoreError::OutOfRange {
                index,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(index))
    }

    pub fn toggle_filter(&mut self) {
        self.hide_checked_items = !self.hide_checked_items;
    }

    /// Flips edit mode. Entering edit mode keeps the last-known
    /// `current_text`; it is never reset to `name`.
    pub fn toggle_edit(&mut self, index: usize) -> Result<(), StoreError> {
        if index >= self.items.len() {
            return Err(StoreError::OutOfRange {
                index,
                len: self.items.len(),
            });
        }
        let edit = &mut self.items[index].edit;
        edit.editing = !edit.editing;
        Ok(())
    }

    /// Commits an edit unconditionally, even if the new title is empty or
    /// unchanged, and leaves edit mode.
    pub fn submit_edit(&mut self, id: ItemId, new_title: &str) -> Result<(), StoreError> {
        let index = self.index_of(id)?;
        let item = &mut self.items[index];
        item.name = new_title.to_string();
        item.edit.editing = false;
        item.edit.current_text = new_title.to_string();
        Ok(())
    }

    /// Copies live (unsaved) edit-form text back into the store. `live` maps
    /// item id to whatever the on-screen form currently shows. Runs before
    /// every dispatch so an in-progress edit elsewhere in the list is not
    /// wiped out by the redraw an unrelated action triggers.
    pub fn harvest_editing_text(&mut self, live: &HashMap<ItemId, String>) {
        for item in &mut self.items {
            if !item.edit.editing {
                continue;
            }
            if let Some(text) = live.get(&item.id) {
                if !text.is_empty() {
                    item.edit.current_text = text.clone();
                }
            }
        }
    }

    /// Items the renderer should show, in original relative order.
    pub fn visible(&self) -> Vec<&Item> {
        self.items
            .iter()
            .filter(|item| !self.hide_checked_items || !item.checked)
            .collect()
    }

    /// Dispatch table from actions to mutators. Positional mutators get their
    /// index resolved from the id here, right before the call. A failed
    /// action leaves the store unchanged.
    pub fn apply(&mut self, action: Action) -> Result<(), StoreError> {
        match action {
            Action::AddItem(name) => {
                self.add_item(&name);
                Ok(())
            }
            Action::ToggleChecked(id) => self.toggle_checked(id),
            Action::Delete(id) => {
                let index = self.index_of(id)?;
                self.delete_item(index)?;
                Ok(())
            }
            Action::ToggleFilter => {
                self.toggle_filter();
                Ok(())
            }
            Action::ToggleEdit(id) => {
                let index = self.index_of(id)?;
                self.toggle_edit(index)
            }
            Action::SubmitEdit(id, new_title) => self.submit_edit(id, &new_title),
        }
    }
}
