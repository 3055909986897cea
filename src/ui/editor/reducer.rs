use crate::mvi::Reducer;
use crate::ui::editor::intent::EditorIntent;
use crate::ui::editor::state::EditorState;

pub struct EditorReducer;

impl Reducer for EditorReducer {
    type State = EditorState;
    type Intent = EditorIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            EditorIntent::Compose => EditorState::Composing {
                buffer: String::new(),
                cursor: 0,
            },
            EditorIntent::Edit { id, title } => EditorState::Editing {
                id,
                cursor: title.chars().count(),
                original: title.clone(),
                buffer: title,
            },
            EditorIntent::Close => EditorState::Hidden,
            edit => apply_edit(state, edit),
        }
    }
}

fn apply_edit(state: EditorState, intent: EditorIntent) -> EditorState {
    match state {
        EditorState::Hidden => EditorState::Hidden,
        EditorState::Composing { buffer, cursor } => {
            let (buffer, cursor) = edit_buffer(buffer, cursor, intent);
            EditorState::Composing { buffer, cursor }
        }
        EditorState::Editing {
            id,
            original,
            buffer,
            cursor,
        } => {
            let (buffer, cursor) = edit_buffer(buffer, cursor, intent);
            EditorState::Editing {
                id,
                original,
                buffer,
                cursor,
            }
        }
    }
}

fn byte_offset(buffer: &str, cursor: usize) -> usize {
    buffer
        .char_indices()
        .nth(cursor)
        .map(|(offset, _)| offset)
        .unwrap_or(buffer.len())
}

fn edit_buffer(mut buffer: String, cursor: usize, intent: EditorIntent) -> (String, usize) {
    let len = buffer.chars().count();
    let cursor = cursor.min(len);
    match intent {
        EditorIntent::Insert(ch) if !ch.is_control() => {
            buffer.insert(byte_offset(&buffer, cursor), ch);
            (buffer, cursor + 1)
        }
        EditorIntent::Paste(text) => {
            // Titles are single-line.
            let text: String = text
                .chars()
                .map(|ch| if ch == '\n' || ch == '\t' { ' ' } else { ch })
                .filter(|ch| !ch.is_control())
                .collect();
            let inserted = text.chars().count();
            buffer.insert_str(byte_offset(&buffer, cursor), &text);
            (buffer, cursor + inserted)
        }
        EditorIntent::Backspace if cursor > 0 => {
            buffer.remove(byte_offset(&buffer, cursor - 1));
            (buffer, cursor - 1)
        }
        EditorIntent::Delete if cursor < len => {
            buffer.remove(byte_offset(&buffer, cursor));
            (buffer, cursor)
        }
        EditorIntent::CursorLeft => (buffer, cursor.saturating_sub(1)),
        EditorIntent::CursorRight => (buffer, (cursor + 1).min(len)),
        EditorIntent::CursorHome => (buffer, 0),
        EditorIntent::CursorEnd => (buffer, len),
        _ => (buffer, cursor),
    }
}
