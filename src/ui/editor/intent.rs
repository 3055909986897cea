use crate::mvi::Intent;

#[derive(Debug, Clone)]
pub enum EditorIntent {
    /// Open an empty buffer for a new todo.
    Compose,
    /// Open a buffer pre-filled with an existing title.
    Edit { id: String, title: String },
    Insert(char),
    Paste(String),
    Backspace,
    Delete,
    CursorLeft,
    CursorRight,
    CursorHome,
    CursorEnd,
    Close,
}

impl Intent for EditorIntent {}
