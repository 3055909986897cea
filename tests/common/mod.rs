//! Shared test utilities and mock infrastructure.

#![allow(dead_code, unused_imports)]

pub mod memory;
pub mod mock_backend;
pub mod mock_realtime;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::Duration;
use supatodo::model::Todo;
use tempfile::TempDir;

/// Upper bound for anything a test waits on.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Write `content` to a temporary `config.toml`.
pub fn temp_config(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, content).expect("Failed to write config");
    (temp_dir, config_path)
}

/// Environment lookup over a fixed set of variables.
pub fn env_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: Vec<(String, String)> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| {
        vars.iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }
}

pub fn at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, minute, 0).unwrap()
}

pub fn todo(id: &str, title: &str, completed: bool, minute: u32) -> Todo {
    Todo {
        id: id.to_string(),
        title: title.to_string(),
        completed,
        created_at: at(minute),
        updated_at: at(minute),
    }
}

/// A row as PostgREST returns it.
pub fn todo_row(id: &str, title: &str, completed: bool, minute: u32) -> Value {
    json!({
        "id": id,
        "title": title,
        "completed": completed,
        "created_at": at(minute).to_rfc3339(),
        "updated_at": at(minute).to_rfc3339(),
    })
}

/// Await `future`, failing the test instead of hanging.
pub async fn within<F: std::future::Future>(future: F) -> F::Output {
    tokio::time::timeout(TEST_TIMEOUT, future)
        .await
        .expect("timed out")
}
