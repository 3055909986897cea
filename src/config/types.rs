use serde::{Deserialize, Serialize};

use crate::model::TodoFilter;

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub supabase: SupabaseConfig,
    #[serde(default)]
    pub table: TableConfig,
    #[serde(default)]
    pub realtime: RealtimeConfig,
    #[serde(default)]
    pub defaults: Defaults,
}

/// Endpoint and credential of the hosted data service.
///
/// Both are normally supplied through the environment; the file values are
/// only used when the environment leaves them unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupabaseConfig {
    /// Project URL (e.g., "https://abcd.supabase.co").
    #[serde(default)]
    pub url: String,
    /// Public anon key, sent as both `apikey` and bearer token.
    #[serde(default)]
    pub anon_key: String,
}

/// The collection the todos live in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    #[serde(default = "default_table_name")]
    pub name: String,
    #[serde(default = "default_schema")]
    pub schema: String,
}

/// Change-feed settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// When false the list is re-read after each own write and on demand.
    #[serde(default = "default_realtime_enabled")]
    pub enabled: bool,
    /// Channel name, joined as topic `realtime:<channel>`.
    #[serde(default = "default_channel")]
    pub channel: String,
    /// Seconds between keep-alive heartbeats (default: 25).
    #[serde(default = "default_heartbeat_seconds")]
    pub heartbeat_seconds: u64,
}

/// Default client settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defaults {
    /// TCP connect timeout in seconds (default: 5). Requests themselves never time out.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Filter mode on startup.
    #[serde(default)]
    pub filter: TodoFilter,
    /// Layout on startup.
    #[serde(default)]
    pub view: ViewMode,
}

/// List or grid presentation of the todo set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    List,
    Grid,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::List => ViewMode::Grid,
            ViewMode::Grid => ViewMode::List,
        }
    }
}

fn default_table_name() -> String {
    "todos".to_string()
}

fn default_schema() -> String {
    "public".to_string()
}

fn default_realtime_enabled() -> bool {
    true
}

fn default_channel() -> String {
    "todos-channel".to_string()
}

fn default_heartbeat_seconds() -> u64 {
    25
}

fn default_connect_timeout() -> u64 {
    5
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: default_table_name(),
            schema: default_schema(),
        }
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            enabled: default_realtime_enabled(),
            channel: default_channel(),
            heartbeat_seconds: default_heartbeat_seconds(),
        }
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            connect_timeout_seconds: default_connect_timeout(),
            filter: TodoFilter::default(),
            view: ViewMode::default(),
        }
    }
}
