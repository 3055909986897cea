use crate::config::ViewMode;
use crate::model::{Todo, TodoFilter};
use crate::mvi::Reducer;
use crate::store::TodoState;
use crate::ui::commands::{UiCommand, UiCommandSender};
use crate::ui::editor::{EditorIntent, EditorReducer, EditorState, EditorSubmit};
use crate::ui::layout::grid_columns;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PopupKind {
    Editor,
    Shortcuts,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Focus {
    List,
    Popup(PopupKind),
}

/// Generic MVI dispatch: takes current state, runs reducer, stores result.
macro_rules! dispatch_mvi {
    ($self:expr, $field:ident, $reducer:ty, $intent:expr) => {
        $self.$field = <$reducer>::reduce(std::mem::take(&mut $self.$field), $intent);
    };
}

/// View state of the terminal client.
///
/// `store` mirrors the latest store snapshot; everything else is local to the view.
pub struct App {
    should_quit: bool,
    focus: Focus,
    size: Option<(u16, u16)>,
    view: ViewMode,
    store: TodoState,
    /// Index into the filtered list.
    selection: usize,
    editor: EditorState,
    commands: Option<UiCommandSender>,
    command_error: Option<String>,
}

impl App {
    pub fn new(view: ViewMode) -> Self {
        Self {
            should_quit: false,
            focus: Focus::List,
            size: None,
            view,
            store: TodoState::default(),
            selection: 0,
            editor: EditorState::default(),
            commands: None,
            command_error: None,
        }
    }

    pub fn set_command_sender(&mut self, sender: UiCommandSender) {
        self.commands = Some(sender);
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn request_quit(&mut self) {
        self.should_quit = true;
    }

    pub fn store(&self) -> &TodoState {
        &self.store
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view
    }

    pub fn editor(&self) -> &EditorState {
        &self.editor
    }

    pub fn command_error(&self) -> Option<&str> {
        self.command_error.as_deref()
    }

    pub fn size(&self) -> Option<(u16, u16)> {
        self.size
    }

    pub fn show_popup(&self) -> bool {
        matches!(self.focus, Focus::Popup(_))
    }

    pub fn popup_kind(&self) -> Option<PopupKind> {
        match self.focus {
            Focus::Popup(kind) => Some(kind),
            Focus::List => None,
        }
    }

    pub fn toggle_shortcuts(&mut self) {
        self.focus = match self.focus {
            Focus::Popup(PopupKind::Shortcuts) => Focus::List,
            _ => Focus::Popup(PopupKind::Shortcuts),
        };
    }

    pub fn close_popup(&mut self) {
        if self.editor.is_visible() {
            dispatch_mvi!(self, editor, EditorReducer, EditorIntent::Close);
        }
        self.focus = Focus::List;
    }

    pub fn on_resize(&mut self, cols: u16, rows: u16) {
        self.size = Some((cols, rows));
    }

    /// Mirror a new store snapshot, keeping the selection on the same todo when it survives.
    pub fn on_store_update(&mut self, state: TodoState) {
        let selected_id = self.selected_todo().map(|todo| todo.id.clone());
        self.store = state;

        let visible = self.store.visible();
        if let Some(index) = selected_id
            .as_deref()
            .and_then(|id| visible.iter().position(|todo| todo.id == id))
        {
            self.selection = index;
        } else {
            self.selection = self.selection.min(visible.len().saturating_sub(1));
        }

        // The todo being renamed was deleted elsewhere.
        if let Some(id) = self.editor.editing_id() {
            if self.store.find(id).is_none() {
                tracing::debug!(id, "edited todo disappeared; closing editor");
                self.close_popup();
            }
        }
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn visible(&self) -> Vec<&Todo> {
        self.store.visible()
    }

    pub fn selection(&self) -> usize {
        self.selection
    }

    pub fn selected_todo(&self) -> Option<&Todo> {
        self.store.visible().get(self.selection).copied()
    }

    /// Cards per row in grid view, 1 in list view.
    pub fn columns(&self) -> usize {
        match (self.view, self.size) {
            (ViewMode::Grid, Some((cols, _))) => grid_columns(cols),
            _ => 1,
        }
    }

    pub fn move_selection(&mut self, delta: isize) {
        let len = self.store.visible().len();
        if len == 0 {
            self.selection = 0;
            return;
        }
        let next = self.selection as isize + delta;
        self.selection = next.clamp(0, len as isize - 1) as usize;
    }

    /// Up/down: one row in list view, one card row in grid view.
    pub fn move_rows(&mut self, rows: isize) {
        self.move_selection(rows * self.columns() as isize);
    }

    pub fn select_first(&mut self) {
        self.selection = 0;
    }

    pub fn select_last(&mut self) {
        self.selection = self.store.visible().len().saturating_sub(1);
    }

    // ========================================================================
    // Store commands
    // ========================================================================

    pub fn toggle_selected(&mut self) {
        if let Some(id) = self.selected_todo().map(|todo| todo.id.clone()) {
            self.send_command(UiCommand::Toggle { id });
        }
    }

    pub fn remove_selected(&mut self) {
        if let Some(id) = self.selected_todo().map(|todo| todo.id.clone()) {
            self.send_command(UiCommand::Remove { id });
        }
    }

    pub fn clear_completed(&mut self) {
        if self.store.counts().completed > 0 {
            self.send_command(UiCommand::ClearCompleted);
        }
    }

    pub fn refresh(&mut self) {
        self.send_command(UiCommand::Refresh);
    }

    pub fn set_filter(&mut self, filter: TodoFilter) {
        if filter != self.store.filter {
            self.selection = 0;
            self.send_command(UiCommand::SetFilter { filter });
        }
    }

    pub fn cycle_filter(&mut self) {
        self.set_filter(self.store.filter.next());
    }

    /// Dismiss the store error, or a local queue error if that is what is showing.
    pub fn dismiss_error(&mut self) {
        if self.command_error.take().is_some() {
            return;
        }
        if self.store.error.is_some() {
            self.send_command(UiCommand::ClearError);
        }
    }

    pub fn toggle_view(&mut self) {
        self.view = self.view.toggled();
    }

    // ========================================================================
    // Editor popup (MVI pattern)
    // ========================================================================

    pub fn dispatch_editor(&mut self, intent: EditorIntent) {
        dispatch_mvi!(self, editor, EditorReducer, intent);
    }

    pub fn open_composer(&mut self) {
        self.dispatch_editor(EditorIntent::Compose);
        self.focus = Focus::Popup(PopupKind::Editor);
    }

    pub fn open_editor_for_selected(&mut self) {
        let Some((id, title)) = self
            .selected_todo()
            .map(|todo| (todo.id.clone(), todo.title.clone()))
        else {
            return;
        };
        self.dispatch_editor(EditorIntent::Edit { id, title });
        self.focus = Focus::Popup(PopupKind::Editor);
    }

    /// Send what the editor holds and close it. A blank new title keeps it open.
    pub fn submit_editor(&mut self) {
        match self.editor.submission() {
            EditorSubmit::Add { title } => {
                self.send_command(UiCommand::Add { title });
            }
            EditorSubmit::Rename { id, update } => {
                self.send_command(UiCommand::Update { id, update });
            }
            EditorSubmit::Nothing => {
                if matches!(self.editor, EditorState::Composing { .. }) {
                    return;
                }
            }
        }
        self.close_popup();
    }

    pub fn on_paste(&mut self, text: &str) {
        if self.editor.is_visible() {
            self.dispatch_editor(EditorIntent::Paste(text.to_string()));
        }
    }

    fn send_command(&mut self, command: UiCommand) -> bool {
        let Some(sender) = &self.commands else {
            return false;
        };

        match sender.try_send(command) {
            Ok(()) => {
                self.command_error = None;
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "ui command dropped");
                self.command_error = Some(format!("Command not sent: {err}"));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{SyncFailure, SyncOp};
    use chrono::{TimeZone, Utc};
    use tokio::sync::mpsc;

    fn todo(id: &str, completed: bool, minute: u32) -> Todo {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, minute, 0).unwrap();
        Todo {
            id: id.to_string(),
            title: format!("todo {id}"),
            completed,
            created_at: at,
            updated_at: at,
        }
    }

    fn loaded(todos: Vec<Todo>) -> TodoState {
        TodoState {
            todos,
            loading: false,
            ..TodoState::default()
        }
    }

    fn app_with_queue() -> (App, mpsc::Receiver<UiCommand>) {
        let (tx, rx) = mpsc::channel(8);
        let mut app = App::new(ViewMode::List);
        app.set_command_sender(tx);
        app.on_store_update(loaded(vec![
            todo("c", false, 3),
            todo("b", true, 2),
            todo("a", false, 1),
        ]));
        (app, rx)
    }

    #[test]
    fn selection_follows_todo_across_refresh() {
        let (mut app, _rx) = app_with_queue();
        app.move_selection(1);
        assert_eq!(app.selected_todo().map(|t| t.id.as_str()), Some("b"));

        app.on_store_update(loaded(vec![
            todo("d", false, 4),
            todo("c", false, 3),
            todo("b", true, 2),
        ]));
        assert_eq!(app.selection(), 2);
        assert_eq!(app.selected_todo().map(|t| t.id.as_str()), Some("b"));
    }

    #[test]
    fn selection_clamps_when_list_shrinks() {
        let (mut app, _rx) = app_with_queue();
        app.select_last();
        app.on_store_update(loaded(vec![todo("c", false, 3)]));
        assert_eq!(app.selection(), 0);
        app.move_selection(5);
        assert_eq!(app.selection(), 0);
    }

    #[test]
    fn toggle_sends_selected_id() {
        let (mut app, mut rx) = app_with_queue();
        app.toggle_selected();
        assert_eq!(rx.try_recv().unwrap(), UiCommand::Toggle { id: "c".to_string() });
    }

    #[test]
    fn commands_on_empty_list_are_not_sent() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut app = App::new(ViewMode::List);
        app.set_command_sender(tx);
        app.on_store_update(loaded(Vec::new()));
        app.toggle_selected();
        app.remove_selected();
        app.clear_completed();
        app.open_editor_for_selected();
        assert!(rx.try_recv().is_err());
        assert!(!app.show_popup());
    }

    #[test]
    fn composer_submits_trimmed_title_and_closes() {
        let (mut app, mut rx) = app_with_queue();
        app.open_composer();
        for ch in " Buy milk ".chars() {
            app.dispatch_editor(EditorIntent::Insert(ch));
        }
        app.submit_editor();
        assert_eq!(
            rx.try_recv().unwrap(),
            UiCommand::Add { title: "Buy milk".to_string() }
        );
        assert!(!app.show_popup());
    }

    #[test]
    fn blank_composer_stays_open() {
        let (mut app, mut rx) = app_with_queue();
        app.open_composer();
        app.submit_editor();
        assert!(rx.try_recv().is_err());
        assert_eq!(app.popup_kind(), Some(PopupKind::Editor));
    }

    #[test]
    fn editor_closes_when_its_todo_disappears() {
        let (mut app, _rx) = app_with_queue();
        app.open_editor_for_selected();
        assert_eq!(app.editor().editing_id(), Some("c"));
        app.on_store_update(loaded(vec![todo("a", false, 1)]));
        assert!(!app.editor().is_visible());
        assert!(!app.show_popup());
    }

    #[test]
    fn filter_change_resets_selection() {
        let (mut app, mut rx) = app_with_queue();
        app.select_last();
        app.cycle_filter();
        assert_eq!(app.selection(), 0);
        assert_eq!(
            rx.try_recv().unwrap(),
            UiCommand::SetFilter { filter: TodoFilter::Active }
        );
        // Re-selecting the current filter is a no-op.
        app.set_filter(TodoFilter::All);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn dismiss_error_only_when_present() {
        let (mut app, mut rx) = app_with_queue();
        app.dismiss_error();
        assert!(rx.try_recv().is_err());

        let mut state = app.store().clone();
        state.error = Some(SyncFailure::new(SyncOp::Add, "Failed to add todo: boom"));
        app.on_store_update(state);
        app.dismiss_error();
        assert_eq!(rx.try_recv().unwrap(), UiCommand::ClearError);
    }

    #[test]
    fn full_queue_surfaces_local_error() {
        let (tx, _rx) = mpsc::channel(1);
        let mut app = App::new(ViewMode::List);
        app.set_command_sender(tx);
        app.refresh();
        app.refresh();
        assert!(app.command_error().is_some());
        app.dismiss_error();
        assert!(app.command_error().is_none());
    }

    #[test]
    fn grid_rows_move_by_columns() {
        let (mut app, _rx) = app_with_queue();
        app.toggle_view();
        app.on_resize(70, 30);
        assert_eq!(app.columns(), 2);
        app.move_rows(1);
        assert_eq!(app.selection(), 2);
        app.move_rows(-1);
        assert_eq!(app.selection(), 0);
    }
}
