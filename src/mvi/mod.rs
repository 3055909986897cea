//! Model-View-Intent primitives shared by the store and the terminal view.
//!
//! ```text
//! Intent ──→ Reducer ──→ State ──→ View
//!    ↑                              │
//!    └──────────────────────────────┘
//! ```
//!
//! Side effects (service calls, feed notices) happen outside the reducer and
//! are fed back in as intents carrying their outcome.

mod intent;
mod reducer;
mod state;

pub use intent::Intent;
pub use reducer::Reducer;
pub use state::State;
