//! Terminal todo list kept in sync with a hosted Postgres table.
//!
//! The [`store`] holds the local copy of the remote collection and re-reads
//! it whenever the [`realtime`] change feed reports a change. Writes go
//! through the [`gateway`] and only appear locally after that refresh.

pub mod config;
pub mod error;
pub mod filter;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod mvi;
pub mod realtime;
pub mod shutdown;
pub mod store;
pub mod ui;
