//! Environment Configuration Loader
//!
//! botfleet components read their settings from environment variables.
//! `load_environment()` seeds the process environment from a `KEY=VALUE`
//! file so a service unit and a developer shell see the same values.
//!
//! Lookup order: `$FLEET_ENV_FILE`, `/etc/botfleet/environment`, `.env`.
//! The first file found wins; variables already present in the process
//! environment are never overridden.
//!
//! ```no_run
//! use fleet_core::config::{get_config, load_environment};
//!
//! load_environment();
//! let bind = get_config("FLEET_BIND", "127.0.0.1:8090");
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Variable naming an explicit environment file
pub const ENV_FILE_VAR: &str = "FLEET_ENV_FILE";

/// Fallback environment files, in priority order
pub const ENV_FILE_PATHS: &[&str] = &["/etc/botfleet/environment", ".env"];

/// Load variables from the first environment file that exists.
///
/// Returns the path that was loaded, or `None` when no file was found.
pub fn load_environment() -> Option<String> {
    if let Some(custom) = get_config_opt(ENV_FILE_VAR) {
        if let Some(path) = try_load_env_file(&custom) {
            return Some(path);
        }
        warn!("{} points at {}, which could not be loaded", ENV_FILE_VAR, custom);
    }

    for path in ENV_FILE_PATHS {
        if let Some(loaded) = try_load_env_file(path) {
            return Some(loaded);
        }
    }

    debug!("No environment file found, using existing environment");
    None
}

fn try_load_env_file(path: &str) -> Option<String> {
    let path_obj = Path::new(path);
    if !path_obj.exists() {
        return None;
    }

    let content = match fs::read_to_string(path_obj) {
        Ok(content) => content,
        Err(e) => {
            warn!("Failed to read environment file {}: {}", path, e);
            return None;
        }
    };

    let mut loaded = 0;
    let mut skipped = 0;
    for (key, value) in content.lines().filter_map(parse_env_line) {
        if std::env::var_os(&key).is_some() {
            skipped += 1;
            continue;
        }
        debug!("Loaded: {}={}", key, redact(&key, &value));
        std::env::set_var(&key, &value);
        loaded += 1;
    }

    info!(
        "Loaded {} environment variables from {} ({} already set)",
        loaded, path, skipped
    );
    Some(path.to_string())
}

fn redact<'a>(key: &str, value: &'a str) -> &'a str {
    if key.contains("KEY") || key.contains("TOKEN") || key.contains("SECRET") {
        "***"
    } else {
        value
    }
}

/// Parse one `KEY=VALUE` line. Comments, blank lines and lines without a
/// key yield `None`. Surrounding single or double quotes are stripped and
/// an optional leading `export ` is ignored.
fn parse_env_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let line = line.strip_prefix("export ").unwrap_or(line);

    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }

    let value = value.trim();
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(value);

    Some((key.to_string(), value.to_string()))
}

/// Get a configuration value with a default.
pub fn get_config(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get an optional, non-empty configuration value.
pub fn get_config_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get a boolean configuration value.
pub fn get_config_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes" | "on"))
        .unwrap_or(default)
}

/// Get an integer configuration value.
pub fn get_config_int(key: &str, default: i64) -> i64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Get a millisecond duration; unset, unparsable and zero values yield `None`.
pub fn get_config_millis(key: &str) -> Option<Duration> {
    get_config_opt(key)
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
}
