use crate::config::ViewMode;
use crate::model::{Todo, TodoFilter};
use crate::ui::app::{App, PopupKind};
use crate::ui::footer::Footer;
use crate::ui::header::Header;
use crate::ui::input::SHORTCUTS;
use crate::ui::layout::{
    centered_rect_by_size, grid_cell, grid_columns, grid_rows, grid_scroll, layout_regions,
};
use crate::ui::theme::{
    ACCENT, ACTIVE_HIGHLIGHT, GLOBAL_BORDER, HEADER_TEXT, MUTED_TEXT, POPUP_BORDER, STATUS_OK,
};
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn draw(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();
    let (header, body, footer) = layout_regions(area);
    let state = app.store();

    frame.render_widget(Header::new().widget(state), header);
    frame.render_widget(Clear, body);

    let visible = app.visible();
    if visible.is_empty() {
        draw_placeholder(frame, body, state.loading, state.filter);
    } else {
        match app.view_mode() {
            ViewMode::List => draw_list(frame, body, &visible, app.selection()),
            ViewMode::Grid => draw_grid(frame, body, &visible, app.selection()),
        }
    }

    let error = app
        .command_error()
        .map(str::to_string)
        .or_else(|| state.error.as_ref().map(ToString::to_string));
    frame.render_widget(Footer::new().widget(footer, error.as_deref()), footer);

    match app.popup_kind() {
        Some(PopupKind::Editor) => draw_editor(frame, area, app),
        Some(PopupKind::Shortcuts) => draw_shortcuts(frame, area),
        None => {}
    }
}

fn draw_placeholder(frame: &mut Frame<'_>, body: Rect, loading: bool, filter: TodoFilter) {
    let message = if loading {
        "Loading todos…"
    } else {
        match filter {
            TodoFilter::All => "No todos yet. Press n to add one.",
            TodoFilter::Active => "Nothing left to do.",
            TodoFilter::Completed => "No completed todos.",
        }
    };
    let area = centered_rect_by_size(body, body.width, 1);
    frame.render_widget(
        Paragraph::new(message)
            .style(Style::default().fg(MUTED_TEXT))
            .alignment(Alignment::Center),
        area,
    );
}

fn checkbox(todo: &Todo) -> Span<'static> {
    if todo.completed {
        Span::styled("[✓] ", Style::default().fg(STATUS_OK))
    } else {
        Span::styled("[ ] ", Style::default().fg(HEADER_TEXT))
    }
}

fn title_style(todo: &Todo) -> Style {
    if todo.completed {
        Style::default()
            .fg(MUTED_TEXT)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default().fg(HEADER_TEXT)
    }
}

fn draw_list(frame: &mut Frame<'_>, body: Rect, todos: &[&Todo], selection: usize) {
    let items: Vec<ListItem> = todos
        .iter()
        .map(|todo| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!(" {}  ", todo.created_at.format(TIMESTAMP_FORMAT)),
                    Style::default().fg(MUTED_TEXT),
                ),
                checkbox(todo),
                Span::styled(todo.title.clone(), title_style(todo)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .highlight_style(Style::default().bg(ACTIVE_HIGHLIGHT))
        .highlight_symbol("›");
    let mut list_state = ListState::default().with_selected(Some(selection));
    frame.render_stateful_widget(list, body, &mut list_state);
}

fn draw_grid(frame: &mut Frame<'_>, body: Rect, todos: &[&Todo], selection: usize) {
    let columns = grid_columns(body.width);
    let first_row = grid_scroll(selection, columns, grid_rows(body.height));

    for (index, todo) in todos.iter().enumerate() {
        let Some(cell) = grid_cell(body, index, columns, first_row) else {
            continue;
        };
        let border = if index == selection {
            Style::default().fg(ACCENT)
        } else {
            Style::default().fg(GLOBAL_BORDER)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(Line::from(checkbox(todo)))
            .title_bottom(Line::from(Span::styled(
                format!(" {} ", todo.created_at.format(TIMESTAMP_FORMAT)),
                Style::default().fg(MUTED_TEXT),
            )));
        let card = Paragraph::new(Span::styled(todo.title.clone(), title_style(todo)))
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(card, cell);
    }
}

fn draw_editor(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let editor = app.editor();
    let Some(buffer) = editor.buffer() else {
        return;
    };
    let popup = centered_rect_by_size(area, 60.min(area.width.saturating_sub(4)), 5);
    let block = Block::default()
        .title(format!(" {} ", editor.title()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(POPUP_BORDER));
    let inner = block.inner(popup);
    frame.render_widget(Clear, popup);
    frame.render_widget(block, popup);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    // Scroll horizontally so the cursor stays inside the box.
    let cursor = editor.cursor();
    let width = usize::from(inner.width);
    let offset = cursor.saturating_sub(width.saturating_sub(1));
    let shown: String = buffer.chars().skip(offset).take(width).collect();

    let lines = vec![
        Line::from(Span::styled(shown, Style::default().fg(HEADER_TEXT))),
        Line::from(""),
        Line::from(Span::styled(
            "Enter: save │ Esc: cancel",
            Style::default().fg(MUTED_TEXT),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), inner);

    let x = inner.x + (cursor - offset) as u16;
    frame.set_cursor_position((x.min(inner.x + inner.width - 1), inner.y));
}

fn draw_shortcuts(frame: &mut Frame<'_>, area: Rect) {
    let key_width = SHORTCUTS
        .iter()
        .map(|(keys, _)| keys.chars().count())
        .max()
        .unwrap_or(0);
    let lines: Vec<Line> = SHORTCUTS
        .iter()
        .map(|(keys, action)| {
            Line::from(vec![
                Span::styled(
                    format!(" {keys:<key_width$}  "),
                    Style::default().fg(ACCENT),
                ),
                Span::styled(*action, Style::default().fg(HEADER_TEXT)),
            ])
        })
        .collect();

    let height = lines.len() as u16 + 2;
    let popup = centered_rect_by_size(area, 48, height);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .title(" Shortcuts ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(POPUP_BORDER)),
        ),
        popup,
    );
}
