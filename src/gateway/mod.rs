//! Boundary over the remote todo collection.
//!
//! Four operations, no retries: every failure is returned to the caller as a
//! [`ServiceError`] on the first attempt.

mod error;
mod rest;

pub use error::{ApiErrorBody, ServiceError};
pub use rest::RestGateway;

use async_trait::async_trait;

use crate::model::{NewTodo, Todo, TodoUpdate};

#[async_trait]
pub trait TodoGateway: Send + Sync {
    /// All rows, newest first.
    async fn list(&self) -> Result<Vec<Todo>, ServiceError>;

    /// Insert one row and return it with server-assigned id and timestamps.
    async fn create(&self, draft: &NewTodo) -> Result<Todo, ServiceError>;

    /// Patch the row with `id`. Fails with [`ServiceError::NotFound`] when no row matched.
    async fn update(&self, id: &str, update: &TodoUpdate) -> Result<Todo, ServiceError>;

    /// Remove the row with `id`. Removing an id that no longer exists succeeds.
    async fn delete(&self, id: &str) -> Result<(), ServiceError>;
}
