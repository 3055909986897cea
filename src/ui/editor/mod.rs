//! Title editor popup: composing a new todo or renaming an existing one.

mod intent;
mod reducer;
mod state;

pub use intent::EditorIntent;
pub use reducer::EditorReducer;
pub use state::{EditorState, EditorSubmit};
