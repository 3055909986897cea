//! Commands the view hands to the store.
//!
//! The view never awaits the service: commands go through a bounded queue and
//! each service-bound one runs on its own task, so a slow request never blocks
//! input or other requests.

use tokio::sync::mpsc;

use crate::model::{TodoFilter, TodoUpdate};
use crate::store::TodoStore;

pub const COMMAND_QUEUE: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub enum UiCommand {
    Add { title: String },
    Update { id: String, update: TodoUpdate },
    Toggle { id: String },
    Remove { id: String },
    ClearCompleted,
    Refresh,
    SetFilter { filter: TodoFilter },
    ClearError,
}

impl UiCommand {
    fn mutates(&self) -> bool {
        matches!(
            self,
            UiCommand::Add { .. }
                | UiCommand::Update { .. }
                | UiCommand::Toggle { .. }
                | UiCommand::Remove { .. }
                | UiCommand::ClearCompleted
        )
    }
}

pub type UiCommandSender = mpsc::Sender<UiCommand>;

/// Drain `commands` until every sender is gone.
///
/// With no change feed attached nothing refreshes the store after a write,
/// so `refresh_after_write` makes each mutation follow up with a refresh.
pub async fn run_executor(
    store: TodoStore,
    mut commands: mpsc::Receiver<UiCommand>,
    refresh_after_write: bool,
) {
    while let Some(command) = commands.recv().await {
        tracing::debug!(?command, "ui command");
        match command {
            UiCommand::SetFilter { filter } => store.set_filter(filter),
            UiCommand::ClearError => store.clear_error(),
            command => {
                let store = store.clone();
                tokio::spawn(async move {
                    let refresh = refresh_after_write && command.mutates();
                    execute(&store, command).await;
                    if refresh {
                        store.refresh().await;
                    }
                });
            }
        }
    }
}

async fn execute(store: &TodoStore, command: UiCommand) {
    match command {
        UiCommand::Add { title } => store.add(&title).await,
        UiCommand::Update { id, update } => store.set(&id, update).await,
        UiCommand::Toggle { id } => store.toggle(&id).await,
        UiCommand::Remove { id } => store.remove(&id).await,
        UiCommand::ClearCompleted => store.clear_completed().await,
        UiCommand::Refresh => store.refresh().await,
        UiCommand::SetFilter { filter } => store.set_filter(filter),
        UiCommand::ClearError => store.clear_error(),
    }
}
