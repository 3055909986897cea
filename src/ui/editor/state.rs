use crate::model::TodoUpdate;
use crate::mvi::State;

/// `cursor` is a char index into `buffer`, never past its end.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditorState {
    #[default]
    Hidden,
    Composing {
        buffer: String,
        cursor: usize,
    },
    Editing {
        id: String,
        original: String,
        buffer: String,
        cursor: usize,
    },
}

impl State for EditorState {}

/// What confirming the editor should send to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorSubmit {
    Add { title: String },
    Rename { id: String, update: TodoUpdate },
    /// Nothing worth sending; the editor just closes.
    Nothing,
}

impl EditorState {
    pub fn is_visible(&self) -> bool {
        !matches!(self, Self::Hidden)
    }

    pub fn buffer(&self) -> Option<&str> {
        match self {
            Self::Hidden => None,
            Self::Composing { buffer, .. } | Self::Editing { buffer, .. } => Some(buffer),
        }
    }

    pub fn cursor(&self) -> usize {
        match self {
            Self::Hidden => 0,
            Self::Composing { cursor, .. } | Self::Editing { cursor, .. } => *cursor,
        }
    }

    /// Id of the todo being renamed.
    pub fn editing_id(&self) -> Option<&str> {
        match self {
            Self::Editing { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Editing { .. } => "Edit todo",
            _ => "New todo",
        }
    }

    /// Titles are trimmed. Blank input is never sent, and a rename that
    /// leaves the title unchanged is skipped.
    pub fn submission(&self) -> EditorSubmit {
        match self {
            Self::Hidden => EditorSubmit::Nothing,
            Self::Composing { buffer, .. } => {
                let title = buffer.trim();
                if title.is_empty() {
                    EditorSubmit::Nothing
                } else {
                    EditorSubmit::Add {
                        title: title.to_string(),
                    }
                }
            }
            Self::Editing {
                id,
                original,
                buffer,
                ..
            } => {
                let title = buffer.trim();
                if title.is_empty() || title == original {
                    EditorSubmit::Nothing
                } else {
                    EditorSubmit::Rename {
                        id: id.clone(),
                        update: TodoUpdate::title(title),
                    }
                }
            }
        }
    }
}
