use ratatui::layout::Rect;

/// Width of one card in grid view, borders included.
pub const CARD_WIDTH: u16 = 30;
/// Height of one card in grid view, borders included.
pub const CARD_HEIGHT: u16 = 5;

pub fn layout_regions(area: Rect) -> (Rect, Rect, Rect) {
    let header_height = area.height.min(3);
    let footer_height = 3.min(area.height.saturating_sub(header_height));
    let header = Rect {
        x: area.x,
        y: area.y,
        width: area.width,
        height: header_height,
    };
    let footer = Rect {
        x: area.x,
        y: area.y + area.height.saturating_sub(footer_height),
        width: area.width,
        height: footer_height,
    };
    let body = Rect {
        x: area.x,
        y: area.y + header_height,
        width: area.width,
        height: area.height.saturating_sub(header_height + footer_height),
    };
    (header, body, footer)
}

pub fn body_rect(area: Rect) -> Rect {
    layout_regions(area).1
}

/// Rectangle of at most `width` x `height`, centered in `area`.
pub fn centered_rect_by_size(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Number of card columns that fit in `width`; never zero.
pub fn grid_columns(width: u16) -> usize {
    usize::from((width / CARD_WIDTH).max(1))
}

/// Number of card rows that fit in `height`; never zero.
pub fn grid_rows(height: u16) -> usize {
    usize::from((height / CARD_HEIGHT).max(1))
}

/// First grid row to draw so that `selected` stays on screen.
pub fn grid_scroll(selected: usize, columns: usize, visible_rows: usize) -> usize {
    let row = selected / columns.max(1);
    row.saturating_sub(visible_rows.saturating_sub(1))
}

/// Screen rectangle of card `index`, or `None` when it is scrolled out of `area`.
pub fn grid_cell(area: Rect, index: usize, columns: usize, first_row: usize) -> Option<Rect> {
    let columns = columns.max(1);
    let row = (index / columns).checked_sub(first_row)?;
    let col = index % columns;
    let x = area.x + (col as u16).checked_mul(CARD_WIDTH)?;
    let y = area.y + u16::try_from(row).ok()?.checked_mul(CARD_HEIGHT)?;
    if y + CARD_HEIGHT > area.y + area.height || x + CARD_WIDTH > area.x + area.width {
        return None;
    }
    Some(Rect {
        x,
        y,
        width: CARD_WIDTH,
        height: CARD_HEIGHT,
    })
}
