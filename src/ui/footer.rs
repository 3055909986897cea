use crate::ui::theme::{GLOBAL_BORDER, HEADER_TEXT, STATUS_ERROR};
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const HINTS: &str =
    " n: New │ Space: Toggle │ Enter: Edit │ d: Delete │ Tab: Filter │ v: View │ ?: Help │ q: Quit";

/// Key hints, or the current error banner when there is one.
pub struct Footer;

impl Default for Footer {
    fn default() -> Self {
        Self::new()
    }
}

impl Footer {
    pub fn new() -> Self {
        Self
    }

    pub fn widget(&self, area: Rect, error: Option<&str>) -> Paragraph<'static> {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(GLOBAL_BORDER));

        if let Some(message) = error {
            let style = Style::default().fg(STATUS_ERROR);
            let line = Line::from(vec![
                Span::styled(" ✖ ", style.add_modifier(Modifier::BOLD)),
                Span::styled(message.to_string(), style),
                Span::styled(
                    "  (x: dismiss)",
                    Style::default().fg(HEADER_TEXT).add_modifier(Modifier::DIM),
                ),
            ]);
            return Paragraph::new(line).block(block);
        }

        let version = format!("v{} ", VERSION);

        // Calculate padding using char count, not byte count (for Unicode)
        let hints_width = HINTS.chars().count();
        let version_width = version.chars().count();
        let content_width = area.width.saturating_sub(2) as usize; // minus borders
        let padding = content_width
            .saturating_sub(hints_width)
            .saturating_sub(version_width);

        let text_style = Style::default().fg(HEADER_TEXT).add_modifier(Modifier::DIM);

        let line = Line::from(vec![
            Span::styled(HINTS, text_style),
            Span::styled(" ".repeat(padding), text_style),
            Span::styled(version, text_style),
        ]);

        Paragraph::new(line)
            .style(text_style)
            .alignment(Alignment::Left)
            .block(block)
    }
}
