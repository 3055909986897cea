mod loader;
mod types;

pub use loader::{ConfigError, KEY_VARS, URL_VARS};
pub use types::{Config, Defaults, RealtimeConfig, SupabaseConfig, TableConfig, ViewMode};
