use std::path::{Path, PathBuf};

use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable naming the log file base path.
pub const LOG_ENV_VAR: &str = "SUPATODO_LOG";

/// Initialize tracing with file output.
///
/// Logging is off unless a path is given (`--log-file`) or `SUPATODO_LOG` is
/// set: anything written to stdout would tear the terminal UI. The level comes
/// from `RUST_LOG` (default `info`).
///
/// Returns the file actually written, `{path}.{timestamp}.{pid}`, so that
/// concurrent instances never share a file.
pub fn init_tracing(path: Option<&Path>) -> Option<PathBuf> {
    let base = match path {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(std::env::var_os(LOG_ENV_VAR)?),
    };
    let unique_path = unique_log_path(&base);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file = match std::fs::File::create(&unique_path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("Warning: Failed to create log file {}: {}", unique_path.display(), err);
            return None;
        }
    };

    let file_layer = fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::UtcTime::rfc_3339());

    if tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .is_err()
    {
        return None;
    }
    Some(unique_path)
}

fn unique_log_path(base: &Path) -> PathBuf {
    let pid = std::process::id();
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let mut name = base.as_os_str().to_os_string();
    name.push(format!(".{timestamp}.{pid}"));
    PathBuf::from(name)
}
