use super::intent::Intent;
use super::state::State;

/// The only place state transitions happen: `(State, Intent) -> State`.
pub trait Reducer {
    type State: State;
    type Intent: Intent;

    /// Must not perform I/O.
    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State;
}
