use crate::mvi::Reducer;
use crate::store::intent::StoreIntent;
use crate::store::state::TodoState;

pub struct TodoReducer;

impl Reducer for TodoReducer {
    type State = TodoState;
    type Intent = StoreIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            // A successful load leaves any earlier error in place; only
            // ClearError empties the slot.
            StoreIntent::Loaded { todos } => TodoState {
                todos,
                loading: false,
                ..state
            },
            StoreIntent::LoadFailed { failure } => TodoState {
                loading: false,
                error: Some(failure),
                ..state
            },
            StoreIntent::Failed { failure } => TodoState {
                error: Some(failure),
                ..state
            },
            StoreIntent::SetFilter { filter } => TodoState { filter, ..state },
            StoreIntent::ClearError => TodoState { error: None, ..state },
            StoreIntent::Feed { status } => TodoState { feed: status, ..state },
        }
    }
}
