use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListState, Paragraph},
    Frame, Terminal,
};
use std::collections::HashMap;
use std::io;

use crate::models::{Action, InputMode, ItemId};
use crate::render;
use crate::store::Store;

pub struct App {
    pub store: Store,
    pub list_state: ListState,
    pub input_mode: InputMode,
    /// Text of the "new item" entry field.
    pub input_buffer: String,
    /// Live form text per editing item, harvested into the store on every
    /// dispatch. This is the stand-in for reading the on-screen forms back.
    pub live_edits: HashMap<ItemId, String>,
    pub status: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(store: Store) -> Self {
        let mut app = App {
            store,
            list_state: ListState::default(),
            input_mode: InputMode::Browse,
            input_buffer: String::new(),
            live_edits: HashMap::new(),
            status: None,
            should_quit: false,
        };
        app.clamp_selection();
        app
    }

    fn selected_id(&self) -> Option<ItemId> {
        let visible = self.store.visible();
        self.list_state
            .selected()
            .and_then(|i| visible.get(i).map(|item| item.id))
    }

    fn selected_editing(&self) -> bool {
        self.selected_id()
            .and_then(|id| self.store.get(id).ok())
            .map(|item| item.edit.editing)
            .unwrap_or(false)
    }

    pub fn next_item(&mut self) {
        let len = self.store.visible().len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous_item(&mut self) {
        let len = self.store.visible().len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    /// Runs one action through the store: harvest live edit text first so
    /// nothing typed so far is lost to the redraw, then apply, then bring
    /// the live buffers and selection back in line with the new state.
    /// A failed action leaves the store untouched and only sets the status
    /// line; the event loop keeps going.
    fn dispatch(&mut self, action: Action) {
        log::debug!("dispatch {:?}", action);
        self.store.harvest_editing_text(&self.live_edits);
        self.status = None;
        if let Err(err) = self.store.apply(action) {
            log::warn!("action failed: {err}");
            self.status = Some(err.to_string());
        }
        self.sync_live_edits();
        self.clamp_selection();
    }

    /// Seeds a live buffer for every item that just entered edit mode and
    /// drops buffers of items that left it or were deleted.
    fn sync_live_edits(&mut self) {
        let store = &self.store;
        self.live_edits.retain(|id, _| {
            store
                .get(*id)
                .map(|item| item.edit.editing)
                .unwrap_or(false)
        });
        for item in &self.store.items {
            if item.edit.editing {
                self.live_edits
                    .entry(item.id)
                    .or_insert_with(|| item.edit.current_text.clone());
            }
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.store.visible().len();
        if len == 0 {
            self.list_state.select(None);
            return;
        }
        match self.list_state.selected() {
            Some(i) if i >= len => self.list_state.select(Some(len - 1)),
            None => self.list_state.select(Some(0)),
            _ => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match self.input_mode {
            InputMode::NewItem => self.handle_entry_key(key),
            InputMode::Browse => {
                if self.selected_editing() {
                    self.handle_edit_form_key(key);
                } else {
                    self.handle_browse_key(key);
                }
            }
        }
    }

    fn handle_entry_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                let name = std::mem::take(&mut self.input_buffer);
                self.dispatch(Action::AddItem(name));
                self.input_mode = InputMode::Browse;
            }
            KeyCode::Esc => {
                self.input_buffer.clear();
                self.input_mode = InputMode::Browse;
            }
            KeyCode::Char(c) => {
                self.input_buffer.push(c);
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            _ => {}
        }
    }

    fn handle_edit_form_key(&mut self, key: KeyEvent) {
        let Some(id) = self.selected_id() else {
            return;
        };
        match key.code {
            KeyCode::Enter => {
                let title = self.live_edits.get(&id).cloned().unwrap_or_default();
                self.dispatch(Action::SubmitEdit(id, title));
            }
            // Closes the form; the text typed so far is harvested and kept,
            // there is no discard path.
            KeyCode::Esc => {
                self.dispatch(Action::ToggleEdit(id));
            }
            KeyCode::Char(c) => {
                self.live_edits.entry(id).or_default().push(c);
            }
            KeyCode::Backspace => {
                if let Some(text) = self.live_edits.get_mut(&id) {
                    text.pop();
                }
            }
            KeyCode::Down => self.next_item(),
            KeyCode::Up => self.previous_item(),
            _ => {}
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Char('a') => {
                self.input_mode = InputMode::NewItem;
            }
            KeyCode::Char(' ') => {
                if let Some(id) = self.selected_id() {
                    self.dispatch(Action::ToggleChecked(id));
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = self.selected_id() {
                    self.dispatch(Action::Delete(id));
                }
            }
            KeyCode::Char('e') => {
                if let Some(id) = self.selected_id() {
                    self.dispatch(Action::ToggleEdit(id));
                }
            }
            KeyCode::Char('f') => {
                self.dispatch(Action::ToggleFilter);
            }
            KeyCode::Down => self.next_item(),
            KeyCode::Up => self.previous_item(),
            _ => {}
        }
    }
}

pub fn run_tui(store: Store) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(store);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                app.handle_key(key);
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

pub fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.area());

    let header = Paragraph::new(render::filter_line(&app.store))
        .block(Block::default().borders(Borders::ALL).title("Shopping List"));
    f.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)].as_ref())
        .split(chunks[1]);

    let list = List::new(render::list_items(&app.store, &app.live_edits))
        .block(Block::default().borders(Borders::ALL).title("Items"))
        .highlight_style(
            Style::default()
                .bg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");
    f.render_stateful_widget(list, body[0], &mut app.list_state);

    render_item_info(f, app, body[1]);

    let footer: Paragraph = match app.input_mode {
        InputMode::NewItem => Paragraph::new(app.input_buffer.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Add item (enter: add, esc: cancel)"),
        ),
        InputMode::Browse => {
            if let Some(status) = &app.status {
                Paragraph::new(status.as_str())
                    .style(Style::default().fg(Color::Red))
                    .block(Block::default().borders(Borders::ALL).title("Error"))
            } else {
                Paragraph::new("a: add  space: check  d: delete  e: edit  f: filter  q: quit")
                    .style(Style::default().fg(Color::DarkGray))
                    .block(Block::default().borders(Borders::ALL))
            }
        }
    };
    f.render_widget(footer, chunks[2]);
}

fn render_item_info(f: &mut Frame, app: &App, area: Rect) {
    let selected = app
        .selected_id()
        .and_then(|id| app.store.get(id).ok());
    let info_text = if let Some(item) = selected {
        format!(
            "Item: {}\nChecked: {}\nEditing: {}\n\nControls:\n• space: toggle check\n• d: delete\n• e: edit",
            item.name,
            if item.checked { "yes" } else { "no" },
            if item.edit.editing { "yes" } else { "no" },
        )
    } else {
        "No item selected\n\nControls:\n• ↑/↓: Navigate\n• a: Add an item".to_string()
    };

    let info = Paragraph::new(info_text)
        .block(Block::default().borders(Borders::ALL).title("Item Info"))
        .style(Style::default().fg(Color::White));

    f.render_widget(info, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;

    fn test_app() -> App {
        App::new(Store::seeded())
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn backspace(app: &mut App, count: usize) {
        for _ in 0..count {
            press(app, KeyCode::Backspace);
        }
    }

    fn buffer_text(app: &mut App) -> String {
        let backend = TestBackend::new(70, 18);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| ui(frame, app)).unwrap();

        let buf = terminal.backend().buffer();
        let area = buf.area;
        let mut lines = Vec::new();
        for y in area.y..area.y + area.height {
            let mut line = String::new();
            for x in area.x..area.x + area.width {
                line.push_str(buf.get(x, y).symbol());
            }
            lines.push(line.trim_end().to_string());
        }
        lines.join("\n")
    }

    #[test]
    fn initial_render_shows_seeded_items() {
        let mut app = test_app();
        let screen = buffer_text(&mut app);
        assert!(screen.contains("apples"));
        assert!(screen.contains("oranges"));
        assert!(screen.contains("[x] milk"));
        assert!(screen.contains("bread"));
    }

    #[test]
    fn add_item_via_entry_field() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.input_mode, InputMode::NewItem);

        type_str(&mut app, "eggs");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.input_mode, InputMode::Browse);
        assert_eq!(app.store.items.len(), 5);
        assert_eq!(app.store.items[4].name, "eggs");
        assert!(app.input_buffer.is_empty());
        assert!(buffer_text(&mut app).contains("eggs"));
    }

    #[test]
    fn empty_submission_is_accepted() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.store.items.len(), 5);
        assert_eq!(app.store.items[4].name, "");
    }

    #[test]
    fn entry_field_escape_cancels() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('a'));
        type_str(&mut app, "q");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.input_mode, InputMode::Browse);
        assert_eq!(app.store.items.len(), 4);
        assert!(!app.should_quit);
    }

    #[test]
    fn space_toggles_checked_on_selected_item() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char(' '));
        assert!(app.store.items[0].checked);
        assert!(buffer_text(&mut app).contains("[x] apples"));
    }

    #[test]
    fn delete_removes_selected_item() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.store.items.len(), 3);
        assert!(!buffer_text(&mut app).contains("apples"));
    }

    #[test]
    fn filter_toggle_hides_checked_and_round_trips() {
        let mut app = test_app();
        let before = buffer_text(&mut app);

        press(&mut app, KeyCode::Char('f'));
        let filtered = buffer_text(&mut app);
        assert!(!filtered.contains("milk"));
        assert!(filtered.contains("apples"));
        assert!(filtered.contains("bread"));

        press(&mut app, KeyCode::Char('f'));
        assert_eq!(buffer_text(&mut app), before);
    }

    #[test]
    fn navigation_wraps_around_visible_items() {
        let mut app = test_app();
        press(&mut app, KeyCode::Up);
        assert_eq!(app.list_state.selected(), Some(3));
        press(&mut app, KeyCode::Down);
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[test]
    fn selection_clamps_after_delete() {
        let mut app = test_app();
        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.list_state.selected(), Some(2));

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.list_state.selected(), None);
        assert!(app.store.items.is_empty());
    }

    #[test]
    fn edit_flow_preserves_unsaved_text_across_unrelated_toggle() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('e'));
        assert!(app.store.items[0].edit.editing);

        // Replace the pre-filled "apples" with "foo".
        backspace(&mut app, 6);
        type_str(&mut app, "foo");

        // Check a different item; the open edit must survive the redraw.
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char(' '));

        let apples = &app.store.items[0];
        assert!(apples.edit.editing);
        assert_eq!(apples.edit.current_text, "foo");
        assert_eq!(apples.name, "apples");
        assert!(buffer_text(&mut app).contains("Item name: foo"));
    }

    #[test]
    fn submit_edit_commits_and_renders_new_text() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('e'));
        backspace(&mut app, 6);
        type_str(&mut app, "X");
        press(&mut app, KeyCode::Enter);

        let apples = &app.store.items[0];
        assert_eq!(apples.name, "X");
        assert_eq!(apples.edit.current_text, "X");
        assert!(!apples.edit.editing);

        let screen = buffer_text(&mut app);
        assert!(screen.contains("[ ] X"));
        assert!(!screen.contains("Item name:"));
    }

    #[test]
    fn closing_edit_form_retains_typed_text() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('e'));
        type_str(&mut app, " pie");
        press(&mut app, KeyCode::Esc);

        let apples = &app.store.items[0];
        assert!(!apples.edit.editing);
        assert_eq!(apples.edit.current_text, "apples pie");
        assert_eq!(apples.name, "apples");

        // Reopening picks the retained text back up.
        press(&mut app, KeyCode::Char('e'));
        assert!(buffer_text(&mut app).contains("Item name: apples pie"));
    }

    #[test]
    fn edit_form_renders_prefilled_with_current_text() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('e'));
        assert!(buffer_text(&mut app).contains("Item name: apples"));
    }

    #[test]
    fn failed_action_reports_error_and_leaves_store_unchanged() {
        let mut app = test_app();
        let ghost = ItemId::new();
        app.dispatch(Action::Delete(ghost));

        assert_eq!(app.store.items.len(), 4);
        assert!(app.status.is_some());
        assert!(buffer_text(&mut app).contains("no item with id"));
        assert!(!app.should_quit);

        // The next successful action clears the status line.
        press(&mut app, KeyCode::Char(' '));
        assert!(app.status.is_none());
    }

    #[test]
    fn quit_key_sets_flag() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn typing_q_in_entry_field_does_not_quit() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        assert_eq!(app.input_buffer, "q");
    }

    #[test]
    fn empty_store_renders_without_items() {
        let mut app = App::new(Store::new());
        assert_eq!(app.list_state.selected(), None);
        let screen = buffer_text(&mut app);
        assert!(!screen.contains("apples"));
        assert!(screen.contains("No item selected"));
    }
}
