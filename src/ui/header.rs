use crate::model::TodoFilter;
use crate::store::{FeedStatus, SyncPhase, TodoState};
use crate::ui::theme::{
    ACCENT, GLOBAL_BORDER, HEADER_SEPARATOR, HEADER_TEXT, MUTED_TEXT, STATUS_ERROR, STATUS_OK,
    STATUS_WARN,
};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

/// Title, filter tabs with counts, and sync status.
pub struct Header;

impl Header {
    pub fn new() -> Self {
        Self
    }

    pub fn widget(&self, state: &TodoState) -> Paragraph<'static> {
        let text_style = Style::default().fg(HEADER_TEXT);
        let separator_style = Style::default().fg(HEADER_SEPARATOR);
        let counts = state.counts();

        let mut spans = vec![
            Span::styled("  ", text_style),
            Span::styled("Todos", text_style.add_modifier(Modifier::BOLD)),
            Span::styled("  │ ", separator_style),
        ];
        for filter in TodoFilter::ALL {
            let label = format!(" {} {} ", filter.label(), counts.get(filter));
            let style = if filter == state.filter {
                Style::default()
                    .fg(Color::Black)
                    .bg(ACCENT)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(MUTED_TEXT)
            };
            spans.push(Span::styled(label, style));
            spans.push(Span::styled(" ", text_style));
        }
        spans.push(Span::styled(" │  ", separator_style));
        let (dot, feed_color, feed_label) = feed_indicator(state.feed);
        spans.push(Span::styled(dot, Style::default().fg(feed_color)));
        spans.push(Span::styled(format!(" {feed_label}"), text_style));
        if state.phase() == SyncPhase::Loading {
            spans.push(Span::styled("  │  ", separator_style));
            spans.push(Span::styled("loading…", Style::default().fg(STATUS_WARN)));
        }

        Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::TOP | Borders::BOTTOM)
                .border_style(Style::default().fg(GLOBAL_BORDER)),
        )
    }
}

fn feed_indicator(status: FeedStatus) -> (&'static str, Color, &'static str) {
    match status {
        FeedStatus::Live => ("●", STATUS_OK, "live"),
        FeedStatus::Connecting => ("●", STATUS_WARN, "connecting"),
        FeedStatus::Closed => ("●", STATUS_ERROR, "offline"),
        FeedStatus::Detached => ("○", MUTED_TEXT, "manual refresh"),
    }
}
