use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::ListItem,
};
use std::collections::HashMap;

use crate::models::{Item, ItemId};
use crate::store::Store;

pub const CHECKED_MARK: &str = "[x] ";
pub const UNCHECKED_MARK: &str = "[ ] ";
pub const EDIT_LABEL: &str = "Item name: ";

fn marker(item: &Item) -> Span<'static> {
    if item.checked {
        Span::styled(CHECKED_MARK, Style::default().fg(Color::Green))
    } else {
        Span::raw(UNCHECKED_MARK)
    }
}

/// One list row. A static label normally; an inline edit form when the item
/// is in edit mode, pre-filled with the live form text (falling back to the
/// harvested `current_text`, never the stale `name`).
pub fn item_line(item: &Item, live_text: Option<&str>) -> Line<'static> {
    let mut spans = vec![marker(item)];

    if item.edit.editing {
        let text = live_text.unwrap_or(&item.edit.current_text);
        spans.push(Span::styled(
            EDIT_LABEL,
            Style::default().fg(Color::Cyan),
        ));
        spans.push(Span::styled(
            text.to_string(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled("▏", Style::default().fg(Color::Cyan)));
        spans.push(Span::styled(
            "  (enter: submit)",
            Style::default().fg(Color::DarkGray),
        ));
    } else if item.checked {
        spans.push(Span::styled(
            item.name.clone(),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::CROSSED_OUT),
        ));
    } else {
        spans.push(Span::styled(
            item.name.clone(),
            Style::default().fg(Color::White),
        ));
    }

    Line::from(spans)
}

/// Rebuilds every row from the store's visible subset, preserving order.
/// The whole list is regenerated on each draw; there is no diffing.
pub fn list_items(
    store: &Store,
    live_edits: &HashMap<ItemId, String>,
) -> Vec<ListItem<'static>> {
    store
        .visible()
        .into_iter()
        .map(|item| {
            let live = live_edits.get(&item.id).map(String::as_str);
            ListItem::new(item_line(item, live))
        })
        .collect()
}

/// The filter checkbox shown in the header.
pub fn filter_line(store: &Store) -> Line<'static> {
    let mark = if store.hide_checked_items { "[x]" } else { "[ ]" };
    Line::from(vec![
        Span::styled(format!("{mark} "), Style::default().fg(Color::Yellow)),
        Span::raw("hide checked items  "),
        Span::styled("(f to toggle)", Style::default().fg(Color::DarkGray)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn static_label_shows_name_and_marker() {
        let item = Item::new("apples");
        assert_eq!(line_text(&item_line(&item, None)), "[ ] apples");

        let mut checked = Item::new("milk");
        checked.checked = true;
        assert_eq!(line_text(&item_line(&checked, None)), "[x] milk");
    }

    #[test]
    fn edit_form_prefills_current_text_not_name() {
        let mut item = Item::new("apples");
        item.edit.editing = true;
        item.edit.current_text = "apples and pears".to_string();

        let text = line_text(&item_line(&item, None));
        assert!(text.contains("Item name: apples and pears"));
        assert!(!text.contains("Item name: apples▏"));
    }

    #[test]
    fn edit_form_prefers_live_text() {
        let mut item = Item::new("apples");
        item.edit.editing = true;

        let text = line_text(&item_line(&item, Some("app")));
        assert!(text.contains("Item name: app"));
    }

    #[test]
    fn hidden_checked_items_are_not_rendered() {
        let mut store = Store::seeded();
        store.toggle_filter();
        let rows = list_items(&store, &HashMap::new());
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn empty_store_renders_empty_list() {
        let store = Store::new();
        assert!(list_items(&store, &HashMap::new()).is_empty());
    }
}
